pub mod gesture;
pub mod keyboard;
pub mod pointer;

pub use gesture::GestureTriggered;
pub use keyboard::{KeyChord, KeyCode, KeyState};
pub use pointer::Sample;

/// События для виртуальной клавиатуры
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualKeyEvent {
    pub key_code: KeyCode,
    pub state: KeyState,
    pub timestamp: std::time::Instant,
}

impl VirtualKeyEvent {
    pub fn new(key_code: KeyCode, state: KeyState) -> Self {
        Self {
            key_code,
            state,
            timestamp: std::time::Instant::now(),
        }
    }

    pub fn press(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyState::Pressed)
    }

    pub fn release(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyState::Released)
    }
}
