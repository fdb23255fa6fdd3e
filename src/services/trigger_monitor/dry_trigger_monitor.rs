use crate::events::KeyCode;
use tracing::info;

use super::r#trait::TriggerMonitor;

/// Dry-run: клавиша-триггер никогда не считается зажатой
pub struct DryRunTriggerMonitor;

impl DryRunTriggerMonitor {
    pub fn new() -> Self {
        info!("Инициализация DryRunTriggerMonitor: триггер всегда отпущен");
        Self
    }
}

impl TriggerMonitor for DryRunTriggerMonitor {
    fn is_held(&self, _key: KeyCode) -> bool {
        false
    }
}
