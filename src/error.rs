use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Ошибка захвата экрана: {0}")]
    Capture(String),

    #[error("Ошибка инъекции ввода: {0}")]
    Injection(String),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),
}

impl TriggerError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(TriggerError::DeviceNotFound(msg.into()))
    }

    pub fn invalid_config<T>(msg: impl Into<String>) -> Result<T> {
        Err(TriggerError::InvalidConfig(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, TriggerError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! trigger_error {
    (config, $($arg:tt)*) => {
        $crate::error::TriggerError::InvalidConfig(format!($($arg)*))
    };
    (capture, $($arg:tt)*) => {
        $crate::error::TriggerError::Capture(format!($($arg)*))
    };
    (injection, $($arg:tt)*) => {
        $crate::error::TriggerError::Injection(format!($($arg)*))
    };
    (device_not_found, $($arg:tt)*) => {
        $crate::error::TriggerError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::TriggerError::Permission(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_macro_builds_variant() {
        let err = trigger_error!(capture, "монитор {} недоступен", 0);
        assert!(matches!(err, TriggerError::Capture(ref msg) if msg == "монитор 0 недоступен"));
    }

    #[test]
    fn test_invalid_config_helper() {
        let result: Result<()> = TriggerError::invalid_config("fps должно быть больше 0");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("fps"));
    }
}
