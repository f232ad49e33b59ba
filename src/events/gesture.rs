use std::fmt;
use std::time::Instant;

/// Жест распознан: нажатие у верхнего края и протяжка вниз дальше порога
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTriggered {
    pub origin_y: i32,
    pub y: i32,
    pub at: Instant,
}

impl GestureTriggered {
    pub fn delta(&self) -> i32 {
        self.y.saturating_sub(self.origin_y)
    }
}

impl fmt::Display for GestureTriggered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "свайп вниз {} -> {} (Δ{})", self.origin_y, self.y, self.delta())
    }
}
