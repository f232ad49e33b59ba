use crate::error::{Result, SwipeError};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Проверить права доступа к устройствам ввода и uinput
pub fn check_permissions() -> Result<()> {
    info!("Проверка прав доступа...");

    // Без /dev/input указатель не прочитать: это фатально
    check_input_devices_access()?;

    // Без /dev/uinput работает только запуск программ
    if let Err(e) = check_uinput_access() {
        warn!("{} - комбинации клавиш работать не будут", e);
    }

    check_not_root();

    info!("Проверка прав доступа завершена");
    Ok(())
}

fn check_input_devices_access() -> Result<()> {
    let input_dir = "/dev/input";

    if !Path::new(input_dir).exists() {
        return Err(SwipeError::Permission(format!("Директория {} не существует", input_dir)));
    }

    match fs::read_dir(input_dir) {
        Ok(_) => {
            info!("Доступ к {} подтвержден", input_dir);
            Ok(())
        }
        Err(e) => Err(SwipeError::Permission(format!(
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            input_dir, e
        ))),
    }
}

fn check_uinput_access() -> Result<()> {
    open_for_write(Path::new("/dev/uinput"))
}

/// Открыть устройство на запись так же, как это сделает uinput:
/// учитываются владелец, группа, root и ACL
fn open_for_write(device: &Path) -> Result<()> {
    match OpenOptions::new().write(true).open(device) {
        Ok(_) => {
            info!("Доступ к {:?} подтвержден", device);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SwipeError::Permission(format!(
            "{:?} не существует, возможно модуль uinput не загружен",
            device
        ))),
        Err(e) => Err(SwipeError::Permission(format!(
            "Нет прав на запись в {:?} ({}). Добавьте пользователя в группу 'uinput' или 'input'",
            device, e
        ))),
    }
}

fn check_not_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("⚠️  Приложение запущено от имени root!");
            warn!("   Действие будет запускать программы тоже от имени root");
            for command in get_setup_commands() {
                warn!("   {}", command);
            }
        }
        Ok(user) => {
            info!("Приложение запущено от имени пользователя: {}", user);
        }
        Err(_) => {
            warn!("Не удалось определить пользователя");
        }
    }
}

/// Получить рекомендуемые команды для настройки прав доступа
pub fn get_setup_commands() -> Vec<String> {
    vec![
        "# Добавить пользователя в необходимые группы:".to_string(),
        "sudo usermod -a -G input,uinput $USER".to_string(),
        "".to_string(),
        "# Загрузить модуль uinput:".to_string(),
        "sudo modprobe uinput".to_string(),
        "".to_string(),
        "# После выполнения команд перезайдите в систему".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writable_file_passes_regardless_of_mode_bits() {
        let dir = std::env::temp_dir().join("swipedown-permissions-test");
        fs::create_dir_all(&dir).unwrap();
        let device = dir.join("uinput");
        fs::write(&device, b"").unwrap();

        // 0600: писать может только владелец, биты группы и остальных пусты
        let mut permissions = fs::metadata(&device).unwrap().permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut permissions, 0o600);
        fs::set_permissions(&device, permissions).unwrap();

        assert!(open_for_write(&device).is_ok());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_device_is_a_permission_error() {
        let result = open_for_write(Path::new("/definitely/not/uinput"));
        assert!(matches!(result, Err(SwipeError::Permission(_))));
    }

    #[test]
    fn test_setup_commands() {
        let commands = get_setup_commands();
        assert!(!commands.is_empty());
        assert!(commands.iter().any(|cmd| cmd.contains("usermod")));
        assert!(commands.iter().any(|cmd| cmd.contains("modprobe")));
    }
}
