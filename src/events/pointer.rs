use std::fmt;
use std::time::Instant;

/// Мгновенный снимок состояния указателя за один тик опроса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Вертикальная координата, 0 - верхний край экрана
    pub y: i32,
    pub button_pressed: bool,
    pub timestamp: Instant,
}

impl Sample {
    pub fn new(y: i32, button_pressed: bool, timestamp: Instant) -> Self {
        Self {
            y,
            button_pressed,
            timestamp,
        }
    }

    /// Снимок с текущим временем тика (учитывает паузу времени tokio в тестах)
    pub fn now(y: i32, button_pressed: bool) -> Self {
        Self::new(y, button_pressed, tokio::time::Instant::now().into_std())
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "y={} {}",
            self.y,
            if self.button_pressed { "down" } else { "up" }
        )
    }
}
