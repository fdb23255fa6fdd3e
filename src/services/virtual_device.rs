use crate::error::{Result, TriggerError};
use crate::events::{KeyCode, KeyState, VirtualKeyEvent};
use crate::services::injection_worker::InputInjector;
use tracing::{debug, error, info};

/// Виртуальная клавиатура uinput для синтетических нажатий
pub struct VirtualDevice {
    device: Option<uinput::Device>,
    device_name: String,
    dry_run: bool,
    // Клавиши, для которых отправлено нажатие без отпускания
    pressed: Vec<KeyCode>,
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
            device,
            device_name: device_name.to_string(),
            dry_run,
            pressed: Vec::new(),
        })
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}' для инъекции клавиш", device_name);

        let virtual_device = uinput::default()?
            .name(device_name)?
            .event(uinput::event::Keyboard::All)?
            .create()?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    /// Отпустить все клавиши, оставшиеся нажатыми
    pub fn release_all_keys(&mut self) -> Result<()> {
        let stuck: Vec<KeyCode> = self.pressed.drain(..).collect();
        for key_code in stuck {
            debug!("Отправка финального release события для {}", key_code);
            self.send_event(VirtualKeyEvent::release(key_code))?;
        }
        Ok(())
    }

    fn track(&mut self, event: &VirtualKeyEvent) {
        match event.state {
            KeyState::Pressed => {
                if !self.pressed.contains(&event.key_code) {
                    self.pressed.push(event.key_code);
                }
            }
            KeyState::Released => self.pressed.retain(|key| *key != event.key_code),
        }
    }
}

impl InputInjector for VirtualDevice {
    fn send_event(&mut self, event: VirtualKeyEvent) -> Result<()> {
        if self.dry_run {
            info!("[DRY RUN] Виртуальное событие: {}", event);
            self.track(&event);
            return Ok(());
        }

        let Some(device) = self.device.as_mut() else {
            return Err(TriggerError::Injection("Виртуальное устройство недоступно".to_string()));
        };

        let keycode = event.key_code.value() as i32;

        // EV_KEY
        device.write(1, keycode, event.state.value()).map_err(|e| {
            TriggerError::Injection(format!("Не удалось отправить событие клавиши {}: {}", keycode, e))
        })?;

        // EV_SYN / SYN_REPORT
        device.write(0, 0, 0).map_err(|e| {
            TriggerError::Injection(format!("Не удалось синхронизировать события: {}", e))
        })?;

        self.track(&event);
        debug!("Виртуальное событие {} отправлено", event);
        Ok(())
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if let Err(e) = self.release_all_keys() {
            error!("Не удалось отпустить клавиши при закрытии '{}': {}", self.device_name, e);
        }
        if !self.dry_run {
            info!("Закрытие виртуального устройства '{}'", self.device_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_tracks_pressed_keys() {
        let mut device = VirtualDevice::new("test", true).unwrap();

        device.send_event(VirtualKeyEvent::press(KeyCode::new(24))).unwrap();
        assert_eq!(device.pressed, vec![KeyCode::new(24)]);

        device.send_event(VirtualKeyEvent::release(KeyCode::new(24))).unwrap();
        assert!(device.pressed.is_empty());
    }

    #[test]
    fn test_release_all_keys_clears_state() {
        let mut device = VirtualDevice::new("test", true).unwrap();
        device.send_event(VirtualKeyEvent::press(KeyCode::new(30))).unwrap();
        device.send_event(VirtualKeyEvent::press(KeyCode::new(24))).unwrap();

        device.release_all_keys().unwrap();
        assert!(device.pressed.is_empty());
    }
}
