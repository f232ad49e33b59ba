//! GestureDetector: чистая машина состояний "нажатие у верхнего края -> свайп вниз"
//!
//! Детектор не знает ни об устройствах, ни о действиях: на вход получает Sample,
//! на выход отдаёт GestureTriggered или ничего. Всё время берётся из timestamp
//! снимков, поэтому кулдаун проверяется сравнением меток, а не сном.

use crate::config::GestureConfig;
use crate::debug_if_enabled;
use crate::events::{GestureTriggered, Sample};
use std::time::{Duration, Instant};

/// Пороги распознавания жеста
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureThresholds {
    /// Нажатие засчитывается, только если y < top_tolerance
    pub top_tolerance: i32,
    /// Срабатывание, когда y - press_origin_y > drag_threshold
    pub drag_threshold: i32,
    /// Минимальная пауза между двумя срабатываниями
    pub cooldown: Duration,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self::from(&GestureConfig::default())
    }
}

impl From<&GestureConfig> for GestureThresholds {
    fn from(config: &GestureConfig) -> Self {
        Self {
            top_tolerance: config.top_tolerance_px,
            drag_threshold: config.drag_threshold_px,
            cooldown: Duration::from_millis(config.cooldown_ms),
        }
    }
}

/// Логическая фаза детектора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Armed,
    Cooldown,
}

#[derive(Debug, Default)]
struct GestureState {
    pressed_near_top: bool,
    // Имеет смысл только при pressed_near_top == true
    press_origin_y: i32,
    // Кнопка на предыдущем снимке: нужна для поиска фронта нажатия
    button_down: bool,
    // Одно срабатывание на одно нажатие
    fired_this_press: bool,
    last_trigger: Option<Instant>,
}

pub struct GestureDetector {
    thresholds: GestureThresholds,
    state: GestureState,
}

impl GestureDetector {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            state: GestureState::default(),
        }
    }

    pub fn thresholds(&self) -> GestureThresholds {
        self.thresholds
    }

    /// Обработать один снимок указателя
    pub fn observe(&mut self, sample: &Sample) -> Option<GestureTriggered> {
        let was_down = self.state.button_down;
        self.state.button_down = sample.button_pressed;

        if !sample.button_pressed {
            if was_down && self.state.pressed_near_top {
                debug_if_enabled!("Кнопка отпущена на {}, жест сброшен", sample);
            }
            self.state.pressed_near_top = false;
            self.state.fired_this_press = false;
            return None;
        }

        if !was_down {
            // Фронт нажатия: взводимся только у верхнего края
            if sample.y < self.thresholds.top_tolerance {
                debug_if_enabled!("Нажатие у верхнего края: {}", sample);
                self.state.pressed_near_top = true;
                self.state.press_origin_y = sample.y;
                self.state.fired_this_press = false;
            }
            return None;
        }

        if !self.state.pressed_near_top || self.state.fired_this_press {
            return None;
        }

        // Знаковая разница: засчитывается только движение вниз
        if sample.y.saturating_sub(self.state.press_origin_y) <= self.thresholds.drag_threshold {
            return None;
        }

        if self.cooldown_active(sample.timestamp) {
            debug_if_enabled!("Свайп на {} подавлен: кулдаун ещё не истёк", sample);
            return None;
        }

        self.state.fired_this_press = true;
        self.state.last_trigger = Some(sample.timestamp);

        Some(GestureTriggered {
            origin_y: self.state.press_origin_y,
            y: sample.y,
            at: sample.timestamp,
        })
    }

    pub fn cooldown_active(&self, now: Instant) -> bool {
        self.state
            .last_trigger
            .is_some_and(|at| now.saturating_duration_since(at) < self.thresholds.cooldown)
    }

    pub fn phase(&self, now: Instant) -> GesturePhase {
        if self.cooldown_active(now) {
            GesturePhase::Cooldown
        } else if self.state.pressed_near_top && !self.state.fired_this_press {
            GesturePhase::Armed
        } else {
            GesturePhase::Idle
        }
    }
}
