use crate::error::Result;
use crate::events::{KeyCode, VirtualKeyEvent};

/// Capability to inject key events into the host input stack
pub trait KeySynthesizer: Send + Sync {
    /// Send a single key press or release
    fn send_event(&self, event: VirtualKeyEvent) -> Result<()>;

    fn key_down(&self, key: KeyCode) -> Result<()> {
        self.send_event(VirtualKeyEvent::press(key))
    }

    fn key_up(&self, key: KeyCode) -> Result<()> {
        self.send_event(VirtualKeyEvent::release(key))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::events::KeyState;
    use crate::swipe_error;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    /// Записывает события вместо отправки; может отказывать на заданной клавише
    #[derive(Default)]
    pub struct RecordingSynthesizer {
        events: Mutex<Vec<(KeyCode, KeyState, Instant)>>,
        fail_on: Option<(KeyCode, KeyState)>,
    }

    impl RecordingSynthesizer {
        pub fn failing_on(key: KeyCode, state: KeyState) -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                fail_on: Some((key, state)),
            }
        }

        pub fn events(&self) -> Vec<(KeyCode, KeyState)> {
            self.events
                .lock()
                .iter()
                .map(|&(key, state, _)| (key, state))
                .collect()
        }

        /// События вместе с моментом отправки (часы tokio)
        pub fn timed_events(&self) -> Vec<(KeyCode, KeyState, Instant)> {
            self.events.lock().clone()
        }
    }

    impl KeySynthesizer for RecordingSynthesizer {
        fn send_event(&self, event: VirtualKeyEvent) -> Result<()> {
            if self.fail_on == Some((event.key_code, event.state)) {
                return Err(swipe_error!(internal, "отказ на {}", event.key_code));
            }
            self.events
                .lock()
                .push((event.key_code, event.state, Instant::now()));
            Ok(())
        }
    }
}
