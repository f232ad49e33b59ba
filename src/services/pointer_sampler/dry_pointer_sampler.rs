use crate::error::Result;
use crate::events::Sample;
use std::time::{Duration, Instant};
use tracing::info;

use super::r#trait::PointerSampler;

const CYCLE: Duration = Duration::from_secs(10);
const PRESS_AT: Duration = Duration::from_secs(2);
// Удержание у края перед протяжкой: нажатие должно попасть хотя бы в один тик
const HOLD_TIME: Duration = Duration::from_millis(150);
const DRAG_TIME: Duration = Duration::from_millis(500);
const DRAG_DISTANCE: i32 = 300;

/// Эмуляция указателя: раз в 10 секунд нажатие у верхнего края и свайп вниз
pub struct DryRunPointerSampler {
    started: Instant,
    screen_height: i32,
    announced_cycle: Option<u128>,
}

impl DryRunPointerSampler {
    pub fn new(screen_height: u32) -> Self {
        info!("Dry-run режим - PointerSampler работает в режиме эмуляции");
        Self {
            started: tokio::time::Instant::now().into_std(),
            screen_height: screen_height.clamp(1, i32::MAX as u32) as i32,
            announced_cycle: None,
        }
    }

    fn emulate(&mut self, now: Instant) -> (i32, bool) {
        let elapsed = now.saturating_duration_since(self.started);
        let cycle = elapsed.as_millis() / CYCLE.as_millis();
        let phase = Duration::from_millis((elapsed.as_millis() % CYCLE.as_millis()) as u64);

        if phase < PRESS_AT {
            return (self.screen_height / 2, false);
        }

        let pressed = phase - PRESS_AT;
        if pressed <= HOLD_TIME + DRAG_TIME {
            if self.announced_cycle != Some(cycle) {
                self.announced_cycle = Some(cycle);
                info!("Dry-run: эмулируем свайп вниз от верхнего края");
            }
            let dragged = pressed.saturating_sub(HOLD_TIME);
            let y = (dragged.as_millis() as i64 * i64::from(DRAG_DISTANCE)
                / DRAG_TIME.as_millis() as i64) as i32;
            return (y, true);
        }

        (DRAG_DISTANCE, false)
    }
}

impl PointerSampler for DryRunPointerSampler {
    fn sample(&mut self) -> Result<Sample> {
        let sample = Sample::now(0, false);
        let (y, button_pressed) = self.emulate(sample.timestamp);
        Ok(Sample { y, button_pressed, ..sample })
    }
}
