//! Заглушки внешних зависимостей для тестов.

use crate::error::Result;
use crate::events::{CaptureRegion, KeyCode, VirtualKeyEvent};
use crate::services::frame_source::{CaptureBackend, CaptureHandle};
use crate::services::injection_worker::InputInjector;
use crate::services::trigger_monitor::TriggerMonitor;
use crate::trigger_error;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Default)]
struct CaptureScript {
    failing_binds: u32,
    failing_grabs: u32,
    color: [u8; 3],
    bind_times: Vec<Instant>,
    grab_times: Vec<Instant>,
}

/// Захват с заранее заданным числом ошибок привязки и снятия кадра
#[derive(Clone)]
pub struct ScriptedCapture {
    script: Arc<Mutex<CaptureScript>>,
    screen: (u32, u32),
}

impl ScriptedCapture {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(CaptureScript::default())),
            screen: (1920, 1080),
        }
    }

    pub fn fail_binds(&self, count: u32) {
        self.script.lock().failing_binds = count;
    }

    pub fn fail_grabs(&self, count: u32) {
        self.script.lock().failing_grabs = count;
    }

    /// Цвет всех пикселей следующих кадров
    pub fn set_color(&self, rgb: [u8; 3]) {
        self.script.lock().color = rgb;
    }

    /// Моменты всех попыток привязки
    pub fn bind_times(&self) -> Vec<Instant> {
        self.script.lock().bind_times.clone()
    }

    /// Моменты успешных захватов
    pub fn grab_times(&self) -> Vec<Instant> {
        self.script.lock().grab_times.clone()
    }
}

impl CaptureBackend for ScriptedCapture {
    fn screen_size(&self) -> Result<(u32, u32)> {
        Ok(self.screen)
    }

    fn bind(&mut self, region: &CaptureRegion) -> Result<Box<dyn CaptureHandle>> {
        let mut script = self.script.lock();
        script.bind_times.push(Instant::now());

        if script.failing_binds > 0 {
            script.failing_binds -= 1;
            return Err(trigger_error!(capture, "устройство занято"));
        }

        Ok(Box::new(ScriptedHandle {
            script: Arc::clone(&self.script),
            width: region.width(),
            height: region.height(),
        }))
    }
}

struct ScriptedHandle {
    script: Arc<Mutex<CaptureScript>>,
    width: u32,
    height: u32,
}

impl CaptureHandle for ScriptedHandle {
    fn grab(&mut self) -> Result<RgbaImage> {
        let mut script = self.script.lock();

        if script.failing_grabs > 0 {
            script.failing_grabs -= 1;
            return Err(trigger_error!(capture, "кадр недоступен"));
        }

        script.grab_times.push(Instant::now());
        let [r, g, b] = script.color;
        Ok(RgbaImage::from_pixel(self.width, self.height, Rgba([r, g, b, 255])))
    }
}

/// Триггер, состояние которого переключает тест
#[derive(Clone)]
pub struct ToggleTrigger {
    held: Arc<AtomicBool>,
}

impl ToggleTrigger {
    pub fn new(held: bool) -> Self {
        Self {
            held: Arc::new(AtomicBool::new(held)),
        }
    }

    pub fn set_held(&self, held: bool) {
        self.held.store(held, Ordering::SeqCst);
    }
}

impl TriggerMonitor for ToggleTrigger {
    fn is_held(&self, _key: KeyCode) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct InjectorLog {
    events: Vec<(Instant, VirtualKeyEvent)>,
    failing: u32,
}

/// Инжектор, записывающий события вместо отправки в систему
#[derive(Clone, Default)]
pub struct RecordingInjector {
    log: Arc<Mutex<InjectorLog>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Следующие `count` вызовов завершатся ошибкой
    pub fn fail_next(&self, count: u32) {
        self.log.lock().failing = count;
    }

    pub fn events(&self) -> Vec<VirtualKeyEvent> {
        self.log.lock().events.iter().map(|(_, event)| *event).collect()
    }

    pub fn event_times(&self) -> Vec<Instant> {
        self.log.lock().events.iter().map(|(at, _)| *at).collect()
    }
}

impl InputInjector for RecordingInjector {
    fn send_event(&mut self, event: VirtualKeyEvent) -> Result<()> {
        let mut log = self.log.lock();

        if log.failing > 0 {
            log.failing -= 1;
            return Err(trigger_error!(injection, "uinput недоступен"));
        }

        log.events.push((Instant::now(), event));
        Ok(())
    }
}
