use crate::error::{Result, TriggerError};
use crate::events::KeyCode;
use crate::mappings::{KeyNames, FIRST_BUTTON_CODE, MAX_KEY_CODE};
use crate::services::color_detector::{Hsv, HsvRange, HUE_MAX};
use anyhow::Context;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Диапазон HSV по умолчанию (жёлтая обводка)
pub const DEFAULT_HSV_RANGE: [[u8; 3]; 2] = [[30, 125, 150], [30, 255, 255]];

/// Префикс переменных окружения
pub const ENV_PREFIX: &str = "CHROMA_";

/// Конфигурация ядра. Имена полей верхнего уровня совпадают с форматом
/// config.json, поэтому старые файлы загружаются без изменений.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Половина стороны области захвата в пикселях
    pub fov: f64,
    /// Клавиша-триггер: evdev код или имя клавиши
    pub keybind: KeyBinding,
    /// Пауза после выстрела, мс
    pub shooting_rate: f64,
    /// Целевая частота захвата кадров
    pub fps: f64,
    /// Нижняя и верхняя границы HSV (включительно)
    pub hsv_range: [[u8; 3]; 2],
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Клавиша в конфигурации: числом (evdev код) или строкой ("mouse5", "o")
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum KeyBinding {
    Code(u16),
    Name(String),
}

impl KeyBinding {
    pub fn code(&self) -> std::result::Result<u16, String> {
        match self {
            KeyBinding::Code(code) => Ok(*code),
            KeyBinding::Name(name) => KeyNames::translate(name),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// "auto" или путь к /dev/input/eventN с клавишей-триггером
    pub device_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub key: KeyBinding,
    pub device_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    pub poll_interval_ms: u64,
    pub capture_backoff_ms: u64,
    pub unhealthy_after: u32,
    pub shutdown_timeout_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_path: "auto".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            key: KeyBinding::Name("o".to_string()),
            device_name: "Chroma-Trigger Virtual Keyboard".to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1,
            capture_backoff_ms: 1000,
            unhealthy_after: 5,
            shutdown_timeout_ms: 5000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fov: 5.0,
            keybind: KeyBinding::Name("mouse5".to_string()),
            shooting_rate: 250.0,
            fps: 200.0,
            hsv_range: DEFAULT_HSV_RANGE,
            logging: LoggingConfig::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl Config {
    /// Загрузить конфигурацию: значения по умолчанию, затем файл
    /// (TOML или JSON по расширению), затем переменные окружения CHROMA_*
    pub fn load<P: AsRef<Path>>(config_path: P) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();

        let config: Config = Self::figment(config_path)
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    /// Предупредить о числовом keybind из старого config.json.
    /// Вызывается после инициализации логирования.
    pub fn warn_legacy_keybind<P: AsRef<Path>>(&self, config_path: P) {
        if let Some(code) = Self::legacy_numeric_keybind(config_path.as_ref(), &self.keybind) {
            warn!(
                "keybind задан числом в JSON: {} читается как evdev код {}, а не как виртуальный код Windows. \
                 Укажите имя клавиши, например \"mouse1\"",
                code,
                KeyNames::describe(code)
            );
        }
    }

    fn is_json(config_path: &Path) -> bool {
        config_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    /// Старый config.json хранит keybind как VK код, его смысл для evdev другой
    fn legacy_numeric_keybind(config_path: &Path, keybind: &KeyBinding) -> Option<u16> {
        match keybind {
            KeyBinding::Code(code) if Self::is_json(config_path) => Some(*code),
            _ => None,
        }
    }

    fn figment(config_path: &Path) -> Figment {
        let base = Figment::from(Serialized::defaults(Config::default()));

        let with_file = if Self::is_json(config_path) {
            base.merge(Json::file(config_path))
        } else {
            base.merge(Toml::file(config_path))
        };

        with_file.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Проверить инварианты. Ядро не запускается с некорректной конфигурацией.
    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return TriggerError::invalid_config(format!("Неверный уровень логирования: {}", self.logging.level)),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => return TriggerError::invalid_config(format!("Неверный формат логирования: {}", self.logging.format)),
        }

        if !self.fov.is_finite() || self.fov <= 0.0 {
            return TriggerError::invalid_config(format!("fov должно быть больше 0, получено {}", self.fov));
        }

        if !self.fps.is_finite() || self.fps <= 0.0 {
            return TriggerError::invalid_config(format!("fps должно быть больше 0, получено {}", self.fps));
        }

        if !self.shooting_rate.is_finite() || self.shooting_rate < 0.0 {
            return TriggerError::invalid_config(format!(
                "shooting_rate не может быть отрицательным, получено {}",
                self.shooting_rate
            ));
        }

        // Слишком большие интервалы не помещаются в Duration
        if Duration::try_from_secs_f64(1.0 / self.fps).is_err() {
            return TriggerError::invalid_config(format!("fps слишком мало: {}", self.fps));
        }

        if Duration::try_from_secs_f64(self.shooting_rate / 1000.0).is_err() {
            return TriggerError::invalid_config(format!(
                "shooting_rate слишком велико: {}",
                self.shooting_rate
            ));
        }

        self.validate_hsv_range()?;

        let trigger = self.keybind.code().map_err(TriggerError::InvalidConfig)?;
        if trigger == 0 || trigger > MAX_KEY_CODE {
            return TriggerError::invalid_config(format!("keybind вне диапазона evdev кодов: {}", trigger));
        }

        let output = self.output.key.code().map_err(TriggerError::InvalidConfig)?;
        if output == 0 || output >= FIRST_BUTTON_CODE {
            return TriggerError::invalid_config(format!(
                "output.key должна быть клавишей клавиатуры, получено {}",
                output
            ));
        }

        // Валидация таймингов
        if self.timing.poll_interval_ms == 0 || self.timing.poll_interval_ms > 100 {
            return TriggerError::invalid_config("timing.poll_interval_ms должно быть в диапазоне 1..=100");
        }

        if self.timing.capture_backoff_ms == 0 {
            return TriggerError::invalid_config("timing.capture_backoff_ms должно быть больше 0");
        }

        if self.timing.unhealthy_after == 0 {
            return TriggerError::invalid_config("timing.unhealthy_after должно быть больше 0");
        }

        Ok(())
    }

    fn validate_hsv_range(&self) -> Result<()> {
        let [low, high] = self.hsv_range;

        for (channel, name) in ["H", "S", "V"].iter().enumerate() {
            if low[channel] > high[channel] {
                return TriggerError::invalid_config(format!(
                    "hsv_range: нижняя граница канала {} ({}) больше верхней ({})",
                    name, low[channel], high[channel]
                ));
            }
        }

        if high[0] > HUE_MAX {
            return TriggerError::invalid_config(format!(
                "hsv_range: тон (H) не может превышать {}, получено {}",
                HUE_MAX, high[0]
            ));
        }

        Ok(())
    }

    /// Клавиша-триггер. Вызывать после validate()
    pub fn trigger_key(&self) -> Result<KeyCode> {
        self.keybind
            .code()
            .map(KeyCode)
            .map_err(TriggerError::InvalidConfig)
    }

    /// Клавиша, которую нажимает виртуальное устройство
    pub fn output_key(&self) -> Result<KeyCode> {
        self.output
            .key
            .code()
            .map(KeyCode)
            .map_err(TriggerError::InvalidConfig)
    }

    pub fn color_range(&self) -> HsvRange {
        let [low, high] = self.hsv_range;
        HsvRange::new(Hsv::from(low), Hsv::from(high))
    }

    /// Интервал между кадрами: 1 / fps
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.shooting_rate / 1000.0)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.poll_interval_ms)
    }

    pub fn capture_backoff(&self) -> Duration {
        Duration::from_millis(self.timing.capture_backoff_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.shutdown_timeout_ms)
    }
}
