use crate::config::Config;
use crate::error::Result;
use crate::events::KeyCode;
use std::sync::Arc;

/// Опрос физического состояния клавиши-триггера
pub trait TriggerMonitor: Send + Sync {
    /// Неблокирующий запрос "зажата ли клавиша сейчас".
    /// Ошибка запроса трактуется как "не зажата".
    fn is_held(&self, key: KeyCode) -> bool;
}

/// Factory function to create an appropriate trigger monitor based on the dry_run flag
pub fn create_trigger_monitor(config: &Config, dry_run: bool) -> Result<Arc<dyn TriggerMonitor>> {
    if dry_run {
        Ok(Arc::new(super::dry_trigger_monitor::DryRunTriggerMonitor::new()))
    } else {
        Ok(Arc::new(super::evdev_trigger_monitor::EvdevTriggerMonitor::new(
            &config.input.device_path,
            config.trigger_key()?,
        )?))
    }
}
