use crate::error::{Result, TriggerError};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::{info, warn};

const INPUT_DIR: &str = "/dev/input";
const UINPUT_DEVICE: &str = "/dev/uinput";

/// Проверить доступ к устройствам до запуска ядра
pub fn check_permissions() -> Result<()> {
    info!("Проверка прав доступа...");

    // Чтение клавиши-триггера
    check_input_devices_access()?;

    // Виртуальная клавиатура
    check_uinput_access()?;

    warn_if_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_input_devices_access() -> Result<()> {
    if !Path::new(INPUT_DIR).exists() {
        return Err(TriggerError::Permission(format!("Директория {} не существует", INPUT_DIR)));
    }

    fs::read_dir(INPUT_DIR).map_err(|e| {
        TriggerError::Permission(format!(
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            INPUT_DIR, e
        ))
    })?;

    info!("Доступ к {} подтвержден", INPUT_DIR);
    Ok(())
}

fn check_uinput_access() -> Result<()> {
    if !Path::new(UINPUT_DEVICE).exists() {
        return Err(TriggerError::Permission(format!(
            "{} не существует: загрузите модуль командой 'sudo modprobe uinput'",
            UINPUT_DEVICE
        )));
    }

    // Пробуем открыть на запись
    OpenOptions::new().write(true).open(UINPUT_DEVICE).map_err(|e| {
        TriggerError::Permission(format!(
            "Нет прав на запись в {}: {}. Добавьте пользователя в группу 'uinput' или 'input'",
            UINPUT_DEVICE, e
        ))
    })?;

    info!("Доступ к {} подтвержден", UINPUT_DEVICE);
    Ok(())
}

fn warn_if_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("Приложение запущено от имени root");
            warn!("Рекомендуется: sudo usermod -a -G input,uinput $USER и запуск от обычного пользователя");
        }
        Ok(user) => info!("Приложение запущено от имени пользователя: {}", user),
        Err(_) => warn!("Не удалось определить пользователя"),
    }
}

/// Команды для настройки прав доступа (выводятся при ошибке проверки)
pub fn setup_commands() -> Vec<&'static str> {
    vec![
        "sudo usermod -a -G input,uinput $USER",
        "sudo modprobe uinput",
        "echo 'uinput' | sudo tee /etc/modules-load.d/uinput.conf",
    ]
}
