pub mod device_finder;
pub mod permissions;

pub use device_finder::DeviceFinder;

// Макросы логирования: аргументы форматируются, только если уровень включён
// (детектор и цикл опроса вызываются на каждом тике)
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! trace_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!($($arg)*);
        }
    };
}
