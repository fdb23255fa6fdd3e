use crate::error::{Result, TriggerError};
use crate::events::KeyCode;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти устройство ввода, с которого читается клавиша-триггер
    pub fn find_trigger_device(device_path: &str, key: KeyCode) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                TriggerError::device_not_found(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        Self::auto_find(key)
    }

    fn auto_find(key: KeyCode) -> Result<PathBuf> {
        info!("Автопоиск устройства с клавишей {}...", key);

        // Сначала стабильные имена из by-id
        if let Some(device) = Self::find_by_id(key)? {
            info!("Найдено устройство по ID: {:?}", device);
            return Ok(device);
        }

        if let Some(device) = Self::find_by_event_devices(key)? {
            info!("Найдено устройство среди event устройств: {:?}", device);
            return Ok(device);
        }

        TriggerError::device_not_found(format!(
            "Не найдено доступное устройство с клавишей {}. \
             Убедитесь, что пользователь добавлен в группу 'input'",
            key
        ))
    }

    fn find_by_id(key: KeyCode) -> Result<Option<PathBuf>> {
        let by_id_dir = Path::new("/dev/input/by-id");

        if !by_id_dir.exists() {
            debug!("Директория /dev/input/by-id не существует");
            return Ok(None);
        }

        let entries = fs::read_dir(by_id_dir)
            .map_err(|e| TriggerError::Permission(format!("Нет доступа к /dev/input/by-id: {}", e)))?;

        let mut candidates = Vec::new();

        for entry in entries {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();

            if !name.contains("event") {
                continue;
            }

            if Self::supports_key(&path, key) {
                candidates.push((Self::priority(&name), path));
            }
        }

        // Лучший кандидат - с наибольшим приоритетом
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(candidates.into_iter().next().map(|(_, path)| path))
    }

    fn find_by_event_devices(key: KeyCode) -> Result<Option<PathBuf>> {
        let input_dir = Path::new("/dev/input");

        let entries = fs::read_dir(input_dir)
            .map_err(|e| TriggerError::Permission(format!("Нет доступа к /dev/input: {}", e)))?;

        let mut event_devices: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("event"))
            })
            .collect();

        // Сортируем устройства по номеру
        event_devices.sort_by_key(|path| Self::event_number(path));

        Ok(event_devices.into_iter().find(|path| Self::supports_key(path, key)))
    }

    /// Основные интерфейсы клавиатур и мышей предпочтительнее дополнительных
    fn priority(name: &str) -> u32 {
        if name.ends_with("-event-kbd") || name.ends_with("-event-mouse") {
            100
        } else if name.contains("if0") {
            50
        } else {
            10
        }
    }

    fn event_number(path: &Path) -> u32 {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("event"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(u32::MAX)
    }

    fn supports_key(device_path: &Path, key: KeyCode) -> bool {
        match evdev::Device::open(device_path) {
            Ok(device) => {
                let supported = device
                    .supported_keys()
                    .is_some_and(|keys| keys.contains(evdev::KeyCode::new(key.value())));

                debug!(
                    "Устройство {:?} ({}): клавиша {} {}",
                    device_path,
                    device.name().unwrap_or("Unknown"),
                    key,
                    if supported { "поддерживается" } else { "не поддерживается" }
                );
                supported
            }
            Err(e) => {
                warn!("Устройство {:?} недоступно: {}", device_path, e);
                false
            }
        }
    }
}
