use crate::error::{Result, TriggerError};
use crate::events::KeyCode;
use crate::trace_if_enabled;
use crate::utils::DeviceFinder;
use evdev::Device;
use parking_lot::Mutex;
use tracing::{info, warn};

use super::r#trait::TriggerMonitor;

/// Чтение состояния клавиш через ioctl EVIOCGKEY. Устройство не захватывается
/// эксклюзивно: оператор продолжает пользоваться им как обычно.
pub struct EvdevTriggerMonitor {
    device: Mutex<Device>,
    device_name: String,
}

impl EvdevTriggerMonitor {
    pub fn new(device_path: &str, key: KeyCode) -> Result<Self> {
        info!("Инициализация EvdevTriggerMonitor для клавиши {}", key);

        let path = DeviceFinder::find_trigger_device(device_path, key)?;

        let device = Device::open(&path).map_err(|e| {
            TriggerError::DeviceNotFound(format!("Не удалось открыть устройство {:?}: {}", path, e))
        })?;

        let device_name = device.name().unwrap_or("Unknown").to_string();

        let supports_key = device
            .supported_keys()
            .is_some_and(|keys| keys.contains(evdev::KeyCode::new(key.value())));
        if !supports_key {
            warn!(
                "Устройство '{}' не сообщает о поддержке клавиши {}, триггер может не срабатывать",
                device_name, key
            );
        }

        info!("Клавиша-триггер читается с устройства '{}' ({:?})", device_name, path);

        Ok(Self {
            device: Mutex::new(device),
            device_name,
        })
    }
}

impl TriggerMonitor for EvdevTriggerMonitor {
    fn is_held(&self, key: KeyCode) -> bool {
        match self.device.lock().get_key_state() {
            Ok(state) => state.contains(evdev::KeyCode::new(key.value())),
            Err(e) => {
                trace_if_enabled!("Не удалось прочитать состояние клавиш '{}': {}", self.device_name, e);
                false
            }
        }
    }
}
