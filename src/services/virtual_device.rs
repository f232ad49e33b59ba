use crate::error::{Result, SwipeError};
use crate::events::{KeyState, VirtualKeyEvent};
use crate::services::key_synthesizer::KeySynthesizer;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Виртуальная клавиатура uinput для синтеза комбинаций
pub struct VirtualDevice {
    device: Mutex<Option<uinput::Device>>,
    device_name: String,
    dry_run: bool,
}

impl VirtualDevice {
    pub fn new(device_name: &str, dry_run: bool) -> Result<Self> {
        info!("Инициализация VirtualDevice '{}' (dry_run: {})", device_name, dry_run);

        let device = if dry_run {
            None
        } else {
            Some(Self::create_virtual_device(device_name)?)
        };

        Ok(Self {
            device: Mutex::new(device),
            device_name: device_name.to_string(),
            dry_run,
        })
    }

    /// Устройство без uinput: каждое событие завершится ошибкой, но демон продолжит работу
    pub fn unavailable(device_name: &str) -> Self {
        Self {
            device: Mutex::new(None),
            device_name: device_name.to_string(),
            dry_run: false,
        }
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}' для инъекции клавиш", device_name);

        let virtual_device = uinput::default()?
            .name(device_name)?
            .event(uinput::event::Keyboard::All)?
            .create()
            .map_err(|e| {
                SwipeError::Internal(format!(
                    "Не удалось создать виртуальное устройство '{}': {}",
                    device_name, e
                ))
            })?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }
}

impl KeySynthesizer for VirtualDevice {
    fn send_event(&self, event: VirtualKeyEvent) -> Result<()> {
        if self.dry_run {
            info!("[DRY RUN] Виртуальное событие: {} {:?}", event.key_code, event.state);
            return Ok(());
        }

        debug!("Обработка виртуального события: {:?}", event);

        let mut guard = self.device.lock();
        let device = guard.as_mut().ok_or_else(|| {
            SwipeError::Internal("Виртуальное устройство недоступно".to_string())
        })?;

        let keycode = i32::from(event.key_code.value());
        let value = match event.state {
            KeyState::Pressed => 1,
            KeyState::Released => 0,
        };

        // Отправляем событие клавиши (EV_KEY)
        device.write(1, keycode, value).map_err(|e| {
            SwipeError::Internal(format!("Не удалось отправить событие клавиши {}: {}", event.key_code, e))
        })?;

        // Синхронизируем события (EV_SYN)
        device.write(0, 0, 0).map_err(|e| {
            SwipeError::Internal(format!("Не удалось синхронизировать события: {}", e))
        })?;

        debug!("Виртуальное событие {} отправлено", event.key_code);
        Ok(())
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if !self.dry_run {
            info!("Закрытие виртуального устройства '{}'", self.device_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::KeyCode;

    #[test]
    fn test_dry_run_device_accepts_events() {
        let device = VirtualDevice::new("swipedown test", true).unwrap();
        assert!(device.key_down(KeyCode(42)).is_ok());
        assert!(device.key_up(KeyCode(42)).is_ok());
    }

    #[test]
    fn test_unavailable_device_reports_errors() {
        let device = VirtualDevice::unavailable("swipedown test");
        assert!(matches!(device.key_down(KeyCode(42)), Err(SwipeError::Internal(_))));
    }
}
