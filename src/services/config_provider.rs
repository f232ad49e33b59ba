use crate::config::{ActionConfig, Config};
use crate::error::{Result, SwipeError};
use notify::{Config as WatcherConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, warn};

/// Источник актуальной конфигурации действия
///
/// Читатели получают `Arc` целиком: либо старое, либо новое значение,
/// частично записанного состояния не бывает.
pub struct ConfigProvider {
    path: PathBuf,
    current: RwLock<Option<Arc<ActionConfig>>>,
}

impl ConfigProvider {
    pub fn new(path: impl AsRef<Path>, action: Option<ActionConfig>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            current: RwLock::new(action.map(Arc::new)),
        }
    }

    pub fn from_config(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        Ok(Self::new(path, config.action_config()?))
    }

    pub fn get_action_config(&self) -> Result<Arc<ActionConfig>> {
        self.current
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(SwipeError::ConfigUnavailable)
    }

    pub fn update(&self, action: Option<ActionConfig>) {
        *self.current.write() = action.map(Arc::new);
    }

    /// Перечитать файл конфигурации; при ошибке остаётся прежнее значение
    pub fn reload(&self) -> Result<()> {
        let config = Config::load(&self.path)?;
        let action = config.action_config()?;

        match &action {
            Some(action) => info!(
                "Конфигурация действия перечитана из {:?}: {:?}",
                self.path, action.mode
            ),
            None => warn!("В {:?} нет секции [action], действие отключено", self.path),
        }

        self.update(action);
        Ok(())
    }

    /// Перечитывать конфигурацию при каждом сохранении файла
    ///
    /// Слежение действует, пока жив возвращённый watcher. Редакторы часто
    /// заменяют файл целиком, поэтому наблюдаем за каталогом.
    pub fn watch(self: &Arc<Self>) -> Result<RecommendedWatcher> {
        let target = if self.path.is_absolute() {
            self.path.clone()
        } else {
            std::env::current_dir()?.join(&self.path)
        };
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        let file_name = target.file_name().map(OsString::from);
        let provider = Arc::downgrade(self);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        return;
                    }
                    if event.paths.iter().any(|p| p.file_name() == file_name.as_deref()) {
                        reload_saved(&provider, &target);
                    }
                }
                Err(e) => error!("Ошибка слежения за конфигурацией: {:?}", e),
            },
            WatcherConfig::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!("Слежение за изменениями {:?} включено", self.path);
        Ok(watcher)
    }
}

fn reload_saved(provider: &Weak<ConfigProvider>, target: &Path) {
    let Some(provider) = provider.upgrade() else {
        return;
    };

    // Пустой файл: запись ещё не закончена, ждём следующего события
    match std::fs::metadata(target) {
        Ok(metadata) if metadata.len() > 0 => {}
        _ => {
            debug!("{:?} пуст или недоступен, ждём завершения записи", target);
            return;
        }
    }

    if let Err(e) = provider.reload() {
        warn!("Не удалось перечитать сохранённую конфигурацию, оставляем прежнюю: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActionMode;
    use crate::events::KeyChord;
    use figment::Jail;
    use std::time::Duration;

    fn program(path: &str) -> ActionConfig {
        ActionConfig {
            mode: ActionMode::ProgramLaunch,
            program_path: path.to_string(),
            chord: KeyChord::default(),
            key_press_delay: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_unconfigured_provider_reports_unavailable() {
        let provider = ConfigProvider::new("swipedown.toml", None);
        assert!(matches!(
            provider.get_action_config(),
            Err(SwipeError::ConfigUnavailable)
        ));
    }

    #[test]
    fn test_update_is_visible_to_next_read() {
        let provider = ConfigProvider::new("swipedown.toml", Some(program("/usr/bin/foot")));
        let before = provider.get_action_config().unwrap();

        provider.update(Some(program("/usr/bin/kitty")));

        assert_eq!(before.program_path, "/usr/bin/foot");
        assert_eq!(provider.get_action_config().unwrap().program_path, "/usr/bin/kitty");
    }

    #[test]
    fn test_concurrent_readers_see_complete_values() {
        let provider = Arc::new(ConfigProvider::new("swipedown.toml", Some(program("a"))));

        let writer = {
            let provider = Arc::clone(&provider);
            std::thread::spawn(move || {
                for i in 0..2000 {
                    let mut action = program(&format!("/bin/{}", i));
                    if i % 2 == 0 {
                        action.mode = ActionMode::KeyChord;
                        action.program_path = format!("/chord/{}", i);
                    }
                    provider.update(Some(action));
                }
            })
        };

        for _ in 0..2000 {
            let action = provider.get_action_config().unwrap();
            match action.mode {
                ActionMode::KeyChord => assert!(action.program_path.starts_with("/chord/")),
                ActionMode::ProgramLaunch => assert!(!action.program_path.starts_with("/chord/")),
            }
        }

        writer.join().unwrap();
    }

    #[test]
    fn test_reload_picks_up_saved_file() {
        Jail::expect_with(|jail| {
            jail.create_file("swipedown.toml", "[action]\nprogram_path = \"/usr/bin/foot\"\n")?;
            let config = Config::load("swipedown.toml").map_err(|e| e.to_string())?;
            let provider =
                ConfigProvider::from_config("swipedown.toml", &config).map_err(|e| e.to_string())?;

            jail.create_file(
                "swipedown.toml",
                "[action]\nmode = \"key_chord\"\nkey_combination = \"alt+tab\"\n",
            )?;
            provider.reload().map_err(|e| e.to_string())?;

            let action = provider.get_action_config().map_err(|e| e.to_string())?;
            assert_eq!(action.mode, ActionMode::KeyChord);
            assert_eq!(action.chord.to_string(), "alt+tab");
            Ok(())
        });
    }

    #[test]
    fn test_saved_file_is_picked_up_without_signal() {
        Jail::expect_with(|jail| {
            jail.create_file("swipedown.toml", "[action]\nprogram_path = \"/usr/bin/foot\"\n")?;
            let config = Config::load("swipedown.toml").map_err(|e| e.to_string())?;
            let provider = Arc::new(
                ConfigProvider::from_config("swipedown.toml", &config).map_err(|e| e.to_string())?,
            );
            let _watcher = provider.watch().map_err(|e| e.to_string())?;

            jail.create_file("swipedown.toml", "[action]\nprogram_path = \"/usr/bin/kitty\"\n")?;

            let deadline = std::time::Instant::now() + Duration::from_secs(5);
            loop {
                let current = provider.get_action_config().ok().map(|a| a.program_path.clone());
                if current.as_deref() == Some("/usr/bin/kitty") {
                    break;
                }
                if std::time::Instant::now() > deadline {
                    return Err(format!("новое значение не подхвачено: {:?}", current).into());
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Ok(())
        });
    }

    #[test]
    fn test_failed_reload_keeps_previous_value() {
        Jail::expect_with(|jail| {
            jail.create_file("swipedown.toml", "[action]\nkey_combination = \"shift+bogus\"\n")?;
            let provider = ConfigProvider::new("swipedown.toml", Some(program("/usr/bin/foot")));

            assert!(provider.reload().is_err());
            let action = provider.get_action_config().map_err(|e| e.to_string())?;
            assert_eq!(action.program_path, "/usr/bin/foot");
            Ok(())
        });
    }
}
