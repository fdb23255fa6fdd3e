mod dry_trigger_monitor;
mod evdev_trigger_monitor;
mod r#trait;

pub use self::r#trait::{create_trigger_monitor, TriggerMonitor};
