use crate::error::{Result, SwipeError};
use evdev::{AbsoluteAxisCode, Device, KeyCode, PropType, RelativeAxisCode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти устройства-указатели: "auto" - все подходящие, иначе только указанное
    pub fn find_pointer_devices(device_path: &str) -> Result<Vec<PathBuf>> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(vec![path])
            } else {
                SwipeError::device_not_found(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        Self::auto_find_pointers()
    }

    fn auto_find_pointers() -> Result<Vec<PathBuf>> {
        info!("Начинаем автопоиск устройств-указателей...");

        let input_dir = Path::new("/dev/input");

        let entries = fs::read_dir(input_dir).map_err(|e| {
            SwipeError::Permission(format!("Нет доступа к /dev/input: {}", e))
        })?;

        let mut event_devices = Vec::new();

        for entry in entries {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

            if name.starts_with("event") {
                event_devices.push(path);
            }
        }

        // Сортируем устройства по номеру
        event_devices.sort();

        let pointers: Vec<PathBuf> = event_devices
            .into_iter()
            .filter(|path| Self::probe(path))
            .collect();

        if pointers.is_empty() {
            return SwipeError::device_not_found(
                "Не найдено ни одного доступного устройства-указателя. \
                 Убедитесь, что пользователь добавлен в группу 'input'",
            );
        }

        info!("Найдено устройств-указателей: {}", pointers.len());
        Ok(pointers)
    }

    fn probe(device_path: &Path) -> bool {
        match Device::open(device_path) {
            Ok(device) => {
                let pointer = Self::is_pointer_device(&device);
                if pointer {
                    info!(
                        "Устройство {:?} подходит как указатель ({})",
                        device_path,
                        device.name().unwrap_or("Unknown")
                    );
                } else {
                    debug!("Устройство {:?} не является указателем", device_path);
                }
                pointer
            }
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                false
            }
        }
    }

    /// Указатель: есть основная кнопка и вертикальная ось
    pub fn is_pointer_device(device: &Device) -> bool {
        let has_button = device.supported_keys().is_some_and(|keys| {
            keys.contains(KeyCode::BTN_LEFT) || keys.contains(KeyCode::BTN_TOUCH)
        });

        let has_rel_y = device
            .supported_relative_axes()
            .is_some_and(|axes| axes.contains(RelativeAxisCode::REL_Y));

        let has_abs_y = device
            .supported_absolute_axes()
            .is_some_and(|axes| axes.contains(AbsoluteAxisCode::ABS_Y));

        // Тачпад двигает курсор относительно, его ABS_Y не совпадает с экраном
        if has_abs_y && !has_rel_y && device.properties().contains(PropType::POINTER) {
            warn!(
                "Тачпад {} пропущен: абсолютные координаты тачпада не соответствуют экрану",
                device.name().unwrap_or("Unknown")
            );
            return false;
        }

        has_button && (has_rel_y || has_abs_y)
    }
}
