use std::fmt;

/// Сообщение от цикла детекции к InjectionWorker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// Один раз нажать и отпустить выходную клавишу
    Fire,
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::Fire => write!(f, "fire"),
        }
    }
}
