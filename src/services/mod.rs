pub mod action_dispatcher;
pub mod config_provider;
pub mod gesture_detector;
pub mod gesture_monitor;
pub mod key_synthesizer;
pub mod notifier;
pub mod pointer_sampler;
pub mod program_launcher;
pub mod virtual_device;

pub use action_dispatcher::ActionDispatcher;
pub use config_provider::ConfigProvider;
pub use gesture_detector::{GestureDetector, GestureThresholds};
pub use gesture_monitor::GestureMonitor;
pub use notifier::create_notifier;
pub use pointer_sampler::create_pointer_sampler;
pub use program_launcher::ProcessLauncher;
pub use virtual_device::VirtualDevice;
