use crate::config::{ActionConfig, ActionMode};
use crate::error::Result;
use crate::events::{KeyChord, KeyCode};
use crate::services::key_synthesizer::KeySynthesizer;
use crate::services::program_launcher::{split_command_line, ProgramLauncher};
use crate::swipe_error;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Результат выполнения действия
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Launched { pid: u32 },
    ChordSent { keys: usize },
    /// Путь к программе пуст: действие не настроено
    Skipped,
}

/// Выполняет ровно одно действие на каждое срабатывание жеста
pub struct ActionDispatcher {
    synthesizer: Arc<dyn KeySynthesizer>,
    launcher: Arc<dyn ProgramLauncher>,
}

impl ActionDispatcher {
    pub fn new(synthesizer: Arc<dyn KeySynthesizer>, launcher: Arc<dyn ProgramLauncher>) -> Self {
        Self {
            synthesizer,
            launcher,
        }
    }

    pub async fn dispatch(&self, config: &ActionConfig) -> Result<DispatchOutcome> {
        match config.mode {
            ActionMode::ProgramLaunch => self.launch_program(&config.program_path),
            ActionMode::KeyChord => self.send_chord(&config.chord, config.key_press_delay).await,
        }
    }

    fn launch_program(&self, program_path: &str) -> Result<DispatchOutcome> {
        if program_path.trim().is_empty() {
            debug!("Путь к программе не задан, действие пропущено");
            return Ok(DispatchOutcome::Skipped);
        }

        let (program, args) = split_command_line(program_path)?;
        let pid = self.launcher.launch(&program, &args)?;

        info!("Запущена программа {} (pid {})", program, pid);
        Ok(DispatchOutcome::Launched { pid })
    }

    /// Нажать клавиши по порядку, подождать, отпустить в обратном порядке
    async fn send_chord(&self, chord: &KeyChord, press_delay: Duration) -> Result<DispatchOutcome> {
        let mut pressed: SmallVec<[KeyCode; 4]> = SmallVec::new();

        for &key in chord.keys() {
            if let Err(e) = self.synthesizer.key_down(key) {
                self.release_pressed(&pressed);
                return Err(swipe_error!(dispatch, "не удалось нажать {} из {}: {}", key, chord, e));
            }
            pressed.push(key);
        }

        // Удерживаем, чтобы приложение увидело комбинацию, а не отдельные нажатия
        sleep(press_delay).await;

        let mut first_failure = None;
        for &key in chord.keys().iter().rev() {
            if let Err(e) = self.synthesizer.key_up(key) {
                error!("Не удалось отпустить {}: {}", key, e);
                first_failure.get_or_insert((key, e));
            }
        }

        if let Some((key, e)) = first_failure {
            return Err(swipe_error!(dispatch, "не удалось отпустить {} из {}: {}", key, chord, e));
        }

        info!("Отправлена комбинация {}", chord);
        Ok(DispatchOutcome::ChordSent { keys: chord.len() })
    }

    fn release_pressed(&self, pressed: &[KeyCode]) {
        for &key in pressed.iter().rev() {
            if let Err(e) = self.synthesizer.key_up(key) {
                warn!("Не удалось отпустить {} после ошибки: {}", key, e);
            }
        }
    }
}
