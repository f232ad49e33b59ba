use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwipeError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Ошибка D-Bus: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Ошибка слежения за файлом: {0}")]
    Watch(#[from] notify::Error),

    /// Не удалось опросить состояние указателя: тик пропускается
    #[error("Не удалось получить состояние указателя: {0}")]
    PlatformQuery(String),

    /// Действие не выполнено: сообщаем оператору, цикл продолжает работу
    #[error("Не удалось выполнить действие: {0}")]
    Dispatch(String),

    #[error("Действие не настроено")]
    ConfigUnavailable,

    #[error("Неизвестная клавиша: {0}")]
    InvalidKey(String),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl SwipeError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(SwipeError::DeviceNotFound(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, SwipeError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! swipe_error {
    (platform_query, $($arg:tt)*) => {
        $crate::error::SwipeError::PlatformQuery(format!($($arg)*))
    };
    (dispatch, $($arg:tt)*) => {
        $crate::error::SwipeError::Dispatch(format!($($arg)*))
    };
    (invalid_key, $($arg:tt)*) => {
        $crate::error::SwipeError::InvalidKey(format!($($arg)*))
    };
    (device_not_found, $($arg:tt)*) => {
        $crate::error::SwipeError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::SwipeError::Permission(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::SwipeError::Internal(format!($($arg)*))
    };
}
