use smallvec::SmallVec;

/// Изменение состояния указателя, извлечённое из события устройства
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerUpdate {
    Button(bool),
    RelativeY(i32),
    AbsoluteY { value: i32, min: i32, max: i32 },
}

/// Общий снимок указателя, в который пишут потоки чтения всех устройств
#[derive(Debug)]
pub struct PointerState {
    y: i32,
    screen_height: i32,
    // Источники, у которых сейчас нажата кнопка
    pressed_sources: SmallVec<[usize; 4]>,
    live_sources: SmallVec<[usize; 4]>,
}

impl PointerState {
    pub fn new(screen_height: u32) -> Self {
        let screen_height = screen_height.clamp(1, i32::MAX as u32) as i32;
        Self {
            // Положение мыши до первого движения неизвестно
            y: screen_height / 2,
            screen_height,
            pressed_sources: SmallVec::new(),
            live_sources: SmallVec::new(),
        }
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn button_down(&self) -> bool {
        !self.pressed_sources.is_empty()
    }

    pub fn live_readers(&self) -> usize {
        self.live_sources.len()
    }

    /// Источник читается; повторный запуск после переподключения учитывается один раз
    pub fn reader_started(&mut self, source: usize) {
        if !self.live_sources.contains(&source) {
            self.live_sources.push(source);
        }
    }

    /// Источник больше не читается: его нажатие не должно "залипнуть"
    pub fn reader_failed(&mut self, source: usize) {
        self.live_sources.retain(|&mut live| live != source);
        self.release(source);
    }

    pub fn apply(&mut self, source: usize, update: PointerUpdate) {
        let bottom = self.screen_height - 1;
        match update {
            PointerUpdate::Button(true) => {
                if !self.pressed_sources.contains(&source) {
                    self.pressed_sources.push(source);
                }
            }
            PointerUpdate::Button(false) => self.release(source),
            PointerUpdate::RelativeY(delta) => {
                self.y = self.y.saturating_add(delta).clamp(0, bottom);
            }
            PointerUpdate::AbsoluteY { value, min, max } => {
                self.y = if max > min {
                    let offset = i64::from(value.clamp(min, max)) - i64::from(min);
                    (offset * i64::from(bottom) / (i64::from(max) - i64::from(min))) as i32
                } else {
                    value.clamp(0, bottom)
                };
            }
        }
    }

    fn release(&mut self, source: usize) {
        self.pressed_sources.retain(|&mut pressed| pressed != source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_motion_starts_mid_screen_and_clamps() {
        let mut state = PointerState::new(1080);
        assert_eq!(state.y(), 540);

        state.apply(0, PointerUpdate::RelativeY(-5000));
        assert_eq!(state.y(), 0);

        state.apply(0, PointerUpdate::RelativeY(120));
        assert_eq!(state.y(), 120);

        state.apply(0, PointerUpdate::RelativeY(5000));
        assert_eq!(state.y(), 1079);
    }

    #[test]
    fn test_absolute_axis_is_scaled_to_screen() {
        let mut state = PointerState::new(1001);
        state.apply(0, PointerUpdate::AbsoluteY { value: 0, min: 0, max: 4000 });
        assert_eq!(state.y(), 0);

        state.apply(0, PointerUpdate::AbsoluteY { value: 2000, min: 0, max: 4000 });
        assert_eq!(state.y(), 500);

        state.apply(0, PointerUpdate::AbsoluteY { value: 9000, min: 0, max: 4000 });
        assert_eq!(state.y(), 1000);
    }

    #[test]
    fn test_degenerate_absolute_range_is_taken_as_pixels() {
        let mut state = PointerState::new(1080);
        state.apply(0, PointerUpdate::AbsoluteY { value: 7, min: 0, max: 0 });
        assert_eq!(state.y(), 7);
    }

    #[test]
    fn test_button_is_merged_across_sources() {
        let mut state = PointerState::new(1080);
        state.apply(0, PointerUpdate::Button(true));
        state.apply(1, PointerUpdate::Button(true));
        state.apply(0, PointerUpdate::Button(false));
        assert!(state.button_down());

        state.apply(1, PointerUpdate::Button(false));
        assert!(!state.button_down());
    }

    #[test]
    fn test_failed_reader_releases_its_button() {
        let mut state = PointerState::new(1080);
        state.reader_started(0);
        state.reader_started(1);
        state.apply(1, PointerUpdate::Button(true));

        state.reader_failed(1);
        assert!(!state.button_down());
        assert_eq!(state.live_readers(), 1);
    }

    #[test]
    fn test_reader_recovers_after_failure() {
        let mut state = PointerState::new(1080);
        state.reader_started(0);
        state.apply(0, PointerUpdate::Button(true));

        state.reader_failed(0);
        assert_eq!(state.live_readers(), 0);
        assert!(!state.button_down());

        // Переподключённое устройство получает новый номер источника
        state.reader_started(1);
        state.reader_started(1);
        assert_eq!(state.live_readers(), 1);

        state.apply(1, PointerUpdate::Button(true));
        assert!(state.button_down());
    }

    #[test]
    fn test_distant_sources_do_not_share_a_press() {
        let mut state = PointerState::new(1080);
        state.apply(0, PointerUpdate::Button(true));
        state.apply(64, PointerUpdate::Button(true));

        state.apply(64, PointerUpdate::Button(false));
        assert!(state.button_down());

        state.apply(0, PointerUpdate::Button(false));
        assert!(!state.button_down());
    }
}
