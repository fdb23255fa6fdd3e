use crate::config::Config;
use crate::error::Result;
use crate::events::CaptureRegion;
use crate::services::action_channel::action_channel;
use crate::services::detection_loop::{DetectionLoop, DetectionTiming};
use crate::services::frame_slot::frame_slot;
use crate::services::frame_source::{
    create_capture_backend, CaptureBackend, CaptureSnapshot, CaptureStats, CaptureTiming, FrameSource,
};
use crate::services::injection_worker::{create_input_injector, InjectionWorker, InputInjector};
use crate::services::trigger_monitor::{create_trigger_monitor, TriggerMonitor};
use crate::utils::shutdown::shutdown_signal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{error, info, warn};

/// Внешние зависимости ядра: захват экрана, состояние клавиш, синтетический ввод
pub struct Backends {
    pub capture: Box<dyn CaptureBackend>,
    pub trigger: Arc<dyn TriggerMonitor>,
    pub injector: Box<dyn InputInjector>,
}

impl Backends {
    /// Реальные реализации или их dry-run варианты
    pub fn create(config: &Config, dry_run: bool) -> Result<Self> {
        Ok(Self {
            capture: create_capture_backend(dry_run)?,
            trigger: create_trigger_monitor(config, dry_run)?,
            injector: create_input_injector(config, dry_run)?,
        })
    }
}

/// Запущенное ядро: три независимые задачи и сигнал остановки
pub struct Orchestrator {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    region: CaptureRegion,
    capture_stats: Arc<CaptureStats>,
    fired: Arc<AtomicU64>,
    shutdown_timeout: Duration,
}

impl Orchestrator {
    /// Проверить конфигурацию, построить область захвата и запустить циклы.
    /// Должен вызываться внутри tokio runtime.
    pub fn start(config: Arc<Config>, backends: Backends) -> Result<Self> {
        config.validate()?;

        let trigger_key = config.trigger_key()?;
        let output_key = config.output_key()?;

        let Backends {
            capture,
            trigger,
            injector,
        } = backends;

        let (screen_width, screen_height) = capture.screen_size()?;
        let region = CaptureRegion::centered(config.fov, screen_width, screen_height)?;
        info!(
            "Область захвата {} на экране {}x{}",
            region, screen_width, screen_height
        );

        let capture_stats = Arc::new(CaptureStats::new(config.timing.unhealthy_after));
        let fired = Arc::new(AtomicU64::new(0));

        let (shutdown_tx, shutdown_rx) = shutdown_signal();
        let (publisher, latest) = frame_slot();
        let (action_tx, action_rx) = action_channel();

        let frame_source = FrameSource::new(capture, region, Arc::clone(&capture_stats));
        let capture_timing = CaptureTiming {
            frame_interval: config.frame_interval(),
            backoff: config.capture_backoff(),
        };

        let detection = DetectionLoop::new(
            trigger,
            trigger_key,
            config.color_range(),
            latest,
            action_tx,
            DetectionTiming {
                poll_interval: config.poll_interval(),
                cooldown: config.cooldown(),
            },
        );

        let worker = InjectionWorker::new(injector, output_key, action_rx, Arc::clone(&fired));

        // Потребитель запускается первым
        let tasks = vec![
            ("InjectionWorker", tokio::spawn(worker.run(shutdown_rx.clone()))),
            (
                "FrameSource",
                tokio::spawn(frame_source.run(publisher, capture_timing, shutdown_rx.clone())),
            ),
            ("DetectionLoop", tokio::spawn(detection.run(shutdown_rx))),
        ];

        info!("Все сервисы запущены");

        Ok(Self {
            shutdown_tx,
            tasks,
            region,
            capture_stats,
            fired,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn region(&self) -> CaptureRegion {
        self.region
    }

    pub fn capture_stats(&self) -> CaptureSnapshot {
        self.capture_stats.snapshot()
    }

    pub fn is_capture_unhealthy(&self) -> bool {
        self.capture_stats.is_unhealthy()
    }

    /// Сколько нажатий реально отправлено
    pub fn fired_count(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Остановить циклы и дождаться их завершения. После возврата ввод не отправляется.
    pub async fn stop(self) {
        info!("Завершение работы...");
        let _ = self.shutdown_tx.send(true);

        if join_or_abort(self.tasks, self.shutdown_timeout).await {
            info!("Все сервисы завершили работу корректно");
        }

        info!("Отправлено нажатий за сессию: {}", self.fired.load(Ordering::Relaxed));
    }
}

/// Дождаться задач в пределах `timeout`, оставшиеся прервать и тоже дождаться.
/// false - пришлось прерывать.
async fn join_or_abort(mut tasks: Vec<(&'static str, JoinHandle<()>)>, timeout: Duration) -> bool {
    let joined = tokio::time::timeout(timeout, async {
        for (name, handle) in tasks.iter_mut() {
            report_exit(*name, handle.await);
        }
    })
    .await;

    if joined.is_ok() {
        return true;
    }

    warn!("Таймаут при завершении сервисов, прерываем задачи");
    for (name, handle) in tasks {
        if handle.is_finished() {
            continue;
        }
        warn!("Прерывание задачи {}", name);
        handle.abort();
        // Прерванная задача могла быть внутри send_event: ждём её фактического завершения
        report_exit(name, handle.await);
    }

    false
}

fn report_exit(name: &str, result: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!("Задача {} завершилась паникой: {}", name, e);
        }
    }
}
