use crate::events::KeyChord;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    // Отсутствие секции означает "действие не настроено"
    #[serde(default)]
    pub action: Option<ActionSettings>,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub device_path: String,
    /// Высота экрана в пикселях: ограничивает относительное движение мыши
    pub screen_height: u32,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GestureConfig {
    pub top_tolerance_px: i32,
    pub drag_threshold_px: i32,
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ActionMode {
    #[serde(rename = "program", alias = "ProgramPath")]
    ProgramLaunch,
    #[serde(rename = "key_chord", alias = "KeyCombination")]
    KeyChord,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionSettings {
    pub mode: ActionMode,
    pub program_path: String,
    pub key_combination: String,
    pub key_press_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Показывать ошибки действий через org.freedesktop.Notifications
    pub desktop: bool,
}

/// Разобранная конфигурация действия, которую читает ActionDispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    pub mode: ActionMode,
    pub program_path: String,
    pub chord: KeyChord,
    pub key_press_delay: Duration,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_path: "auto".to_string(),
            screen_height: 1080,
            poll_interval_ms: 15,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            top_tolerance_px: 10,
            drag_threshold_px: 100,
            cooldown_ms: 2000,
        }
    }
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            mode: ActionMode::ProgramLaunch,
            program_path: String::new(),
            key_combination: "shift+tab".to_string(),
            key_press_delay_ms: 100,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { desktop: true }
    }
}

impl ActionSettings {
    pub fn to_action_config(&self) -> Result<ActionConfig> {
        let chord: KeyChord = self
            .key_combination
            .parse()
            .with_context(|| format!("Неверная комбинация клавиш '{}'", self.key_combination))?;

        Ok(ActionConfig {
            mode: self.mode,
            program_path: self.program_path.clone(),
            chord,
            key_press_delay: Duration::from_millis(self.key_press_delay_ms),
        })
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SWIPEDOWN_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек ввода
        if self.input.device_path.is_empty() {
            anyhow::bail!("device_path не может быть пустым (используйте \"auto\")");
        }

        if self.input.screen_height == 0 {
            anyhow::bail!("screen_height должно быть больше 0");
        }

        if !(1..=100).contains(&self.input.poll_interval_ms) {
            anyhow::bail!("poll_interval_ms должно быть в диапазоне 1..=100");
        }

        // Валидация порогов жеста
        if self.gesture.top_tolerance_px <= 0 {
            anyhow::bail!("top_tolerance_px должно быть больше 0");
        }

        if self.gesture.drag_threshold_px <= 0 {
            anyhow::bail!("drag_threshold_px должно быть больше 0");
        }

        // Валидация действия
        if let Some(action) = &self.action {
            if action.key_press_delay_ms > 1000 {
                anyhow::bail!("key_press_delay_ms должно быть не больше 1000");
            }
            action.to_action_config()?;
        }

        Ok(())
    }

    /// Конфигурация действия, если секция [action] задана
    pub fn action_config(&self) -> Result<Option<ActionConfig>> {
        self.action
            .as_ref()
            .map(ActionSettings::to_action_config)
            .transpose()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.input.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.action.is_none());
        assert_eq!(config.gesture.top_tolerance_px, 10);
        assert_eq!(config.gesture.drag_threshold_px, 100);
        assert_eq!(config.gesture.cooldown_ms, 2000);
    }

    #[test]
    fn test_default_action_is_empty_program() {
        let action = ActionSettings::default().to_action_config().unwrap();
        assert_eq!(action.mode, ActionMode::ProgramLaunch);
        assert!(action.program_path.is_empty());
        assert_eq!(action.chord, KeyChord::default());
        assert_eq!(action.key_press_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.input.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gesture.drag_threshold_px = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "json".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.action = Some(ActionSettings {
            key_combination: "shift+nope".to_string(),
            ..ActionSettings::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "swipedown.toml",
                r#"
                [gesture]
                drag_threshold_px = 150

                [action]
                mode = "key_chord"
                key_combination = "super+d"
                "#,
            )?;

            let config = Config::load("swipedown.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.gesture.drag_threshold_px, 150);
            assert_eq!(config.gesture.top_tolerance_px, 10);

            let action = config
                .action_config()
                .map_err(|e| e.to_string())?
                .expect("секция [action] задана");
            assert_eq!(action.mode, ActionMode::KeyChord);
            assert_eq!(action.chord.to_string(), "super+d");
            Ok(())
        });
    }

    #[test]
    fn test_legacy_mode_names_are_accepted() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "swipedown.toml",
                r#"
                [action]
                mode = "KeyCombination"
                "#,
            )?;

            let config = Config::load("swipedown.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.action.map(|a| a.mode), Some(ActionMode::KeyChord));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "swipedown.toml",
                r#"
                [action]
                program_path = "/usr/bin/foot"
                "#,
            )?;
            jail.set_env("SWIPEDOWN_GESTURE__COOLDOWN_MS", "500");
            jail.set_env("SWIPEDOWN_ACTION__PROGRAM_PATH", "/usr/bin/alacritty");

            let config = Config::load("swipedown.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.gesture.cooldown_ms, 500);
            assert_eq!(
                config.action.map(|a| a.program_path),
                Some("/usr/bin/alacritty".to_string())
            );
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load("absent.toml").map_err(|e| e.to_string())?;
            assert!(config.action.is_none());
            assert_eq!(config.input.device_path, "auto");
            Ok(())
        });
    }
}
