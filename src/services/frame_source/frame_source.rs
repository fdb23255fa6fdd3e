use crate::debug_if_enabled;
use crate::error::{Result, TriggerError};
use crate::events::{CaptureRegion, Frame};
use crate::services::frame_slot::FramePublisher;
use crate::utils::shutdown::{is_shutdown, sleep_or_shutdown};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{info, warn};

use super::r#trait::{CaptureBackend, CaptureHandle};

/// Тайминги цикла обновления кадра
#[derive(Debug, Clone, Copy)]
pub struct CaptureTiming {
    /// Пауза после успешного захвата (1 / fps)
    pub frame_interval: Duration,
    /// Пауза перед переинициализацией после ошибки
    pub backoff: Duration,
}

/// Счётчики захвата, доступные снаружи цикла
#[derive(Debug)]
pub struct CaptureStats {
    frames: AtomicU64,
    failures: AtomicU64,
    consecutive_failures: AtomicU64,
    reinit_attempts: AtomicU64,
    unhealthy: AtomicBool,
    unhealthy_after: u64,
}

/// Снимок счётчиков
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSnapshot {
    pub frames: u64,
    pub failures: u64,
    pub consecutive_failures: u64,
    pub reinit_attempts: u64,
}

impl CaptureStats {
    pub fn new(unhealthy_after: u32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            consecutive_failures: AtomicU64::new(0),
            reinit_attempts: AtomicU64::new(0),
            unhealthy: AtomicBool::new(false),
            unhealthy_after: u64::from(unhealthy_after.max(1)),
        }
    }

    fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        if self.unhealthy.swap(false, Ordering::Relaxed) {
            info!("Захват экрана восстановлен");
        }
    }

    /// Возвращает длину текущей серии ошибок
    fn record_failure(&self) -> u64 {
        self.failures.fetch_add(1, Ordering::Relaxed);
        let streak = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;

        if streak >= self.unhealthy_after && !self.unhealthy.swap(true, Ordering::Relaxed) {
            warn!(
                "Захват экрана не работает уже {} попыток подряд, продолжаем попытки",
                streak
            );
        }

        streak
    }

    fn record_reinit(&self) {
        self.reinit_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Серия ошибок достигла порога unhealthy_after
    pub fn is_unhealthy(&self) -> bool {
        self.unhealthy.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
            reinit_attempts: self.reinit_attempts.load(Ordering::Relaxed),
        }
    }
}

/// Источник кадров для одной фиксированной области
pub struct FrameSource {
    backend: Box<dyn CaptureBackend>,
    handle: Option<Box<dyn CaptureHandle>>,
    region: CaptureRegion,
    next_sequence: u64,
    stats: Arc<CaptureStats>,
}

impl FrameSource {
    /// Привязаться к области. Ошибка привязки не фатальна: источник
    /// создаётся без дескриптора, и первый же acquire() сообщит об ошибке.
    pub fn new(backend: Box<dyn CaptureBackend>, region: CaptureRegion, stats: Arc<CaptureStats>) -> Self {
        let mut source = Self {
            backend,
            handle: None,
            region,
            next_sequence: 0,
            stats,
        };
        source.bind();
        source
    }

    fn bind(&mut self) {
        match self.backend.bind(&self.region) {
            Ok(handle) => {
                self.handle = Some(handle);
            }
            Err(e) => {
                warn!("Не удалось инициализировать захват области {}: {}", self.region, e);
                self.handle = None;
            }
        }
    }

    /// Снять последний кадр области
    pub fn acquire(&mut self) -> Result<Frame> {
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| TriggerError::Capture("дескриптор захвата не инициализирован".to_string()))?;

        let pixels = handle.grab()?;
        self.next_sequence += 1;

        Ok(Frame::new(pixels, self.next_sequence))
    }

    /// Пересоздать дескриптор захвата. Старый освобождается до создания нового.
    pub fn reinitialize(&mut self) -> bool {
        self.stats.record_reinit();
        self.handle = None;
        self.bind();
        self.handle.is_some()
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// Цикл обновления кадра. Повторяет попытки бесконечно, до сигнала остановки.
    pub async fn run(
        mut self,
        publisher: FramePublisher,
        timing: CaptureTiming,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            "FrameSource запущен: область {}, интервал {:?}, backoff {:?}",
            self.region, timing.frame_interval, timing.backoff
        );

        loop {
            if is_shutdown(&shutdown) {
                break;
            }

            match self.acquire() {
                Ok(frame) => {
                    self.stats.record_frame();
                    debug_if_enabled!("Опубликован кадр #{}", frame.sequence());
                    publisher.publish(frame);

                    if sleep_or_shutdown(timing.frame_interval, &mut shutdown).await {
                        break;
                    }
                }
                Err(e) => {
                    let streak = self.stats.record_failure();
                    warn!("Ошибка захвата кадра (подряд: {}): {}", streak, e);

                    // Источник считается неисправным до успешной переинициализации
                    self.handle = None;

                    if sleep_or_shutdown(timing.backoff, &mut shutdown).await {
                        break;
                    }

                    if self.reinitialize() {
                        info!("Захват переинициализирован для области {}", self.region);
                    }
                }
            }
        }

        info!(
            "FrameSource остановлен, кадров: {}",
            self.stats.snapshot().frames
        );
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        if self.handle.take().is_some() {
            debug_if_enabled!("Дескриптор захвата освобождён");
        }
    }
}
