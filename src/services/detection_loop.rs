use crate::debug_if_enabled;
use crate::events::{Frame, KeyCode, TriggerEvent};
use crate::services::action_channel::ActionSender;
use crate::services::color_detector::{ColorDetector, HsvRange};
use crate::services::frame_slot::LatestFrame;
use crate::services::trigger_monitor::TriggerMonitor;
use crate::utils::shutdown::{is_shutdown, sleep_or_shutdown};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{info, warn};

/// Тайминги цикла принятия решения
#[derive(Debug, Clone, Copy)]
pub struct DetectionTiming {
    /// Шаг опроса, пока выстрела нет
    pub poll_interval: Duration,
    /// Пауза после выстрела
    pub cooldown: Duration,
}

/// Цикл "клавиша зажата И цвет найден -> Fire".
/// Два логических состояния: ожидание (шаг poll_interval) и остывание (cooldown).
pub struct DetectionLoop {
    monitor: Arc<dyn TriggerMonitor>,
    trigger_key: KeyCode,
    range: HsvRange,
    latest: LatestFrame,
    sender: ActionSender,
    timing: DetectionTiming,
    // Результат для последнего проверенного кадра: (sequence, совпадение)
    last_verdict: Option<(u64, bool)>,
}

impl DetectionLoop {
    pub fn new(
        monitor: Arc<dyn TriggerMonitor>,
        trigger_key: KeyCode,
        range: HsvRange,
        latest: LatestFrame,
        sender: ActionSender,
        timing: DetectionTiming,
    ) -> Self {
        Self {
            monitor,
            trigger_key,
            range,
            latest,
            sender,
            timing,
            last_verdict: None,
        }
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Цикл детекции запущен: триггер {}, диапазон {}, cooldown {:?}",
            self.trigger_key, self.range, self.timing.cooldown
        );

        // Даже при нулевом cooldown между выстрелами проходит хотя бы один шаг опроса
        let fire_pause = self.timing.cooldown.max(self.timing.poll_interval);
        let mut fired: u64 = 0;

        loop {
            if is_shutdown(&shutdown) {
                break;
            }

            if let Some(frame) = self.matching_frame() {
                if !self.sender.send(TriggerEvent::Fire) {
                    warn!("Канал действий закрыт, цикл детекции завершается");
                    break;
                }
                fired += 1;
                debug_if_enabled!(
                    "Fire #{} отправлен (кадр #{}, возраст {:?})",
                    fired,
                    frame.sequence(),
                    frame.captured_at().elapsed()
                );

                if sleep_or_shutdown(fire_pause, &mut shutdown).await {
                    break;
                }
            } else if sleep_or_shutdown(self.timing.poll_interval, &mut shutdown).await {
                break;
            }
        }

        // self.sender уничтожается вместе с циклом: InjectionWorker увидит закрытие канала
        info!("Цикл детекции остановлен, отправлено событий: {}", fired);
    }

    /// Кадр, по которому нужно выстрелить, если триггер зажат и цвет найден
    fn matching_frame(&mut self) -> Option<Arc<Frame>> {
        // Клавишу проверяем первой: без неё кадр не анализируется
        if !self.monitor.is_held(self.trigger_key) {
            return None;
        }

        let frame = self.latest.get()?;
        self.frame_matches(&frame).then_some(frame)
    }

    fn frame_matches(&mut self, frame: &Frame) -> bool {
        if let Some((sequence, verdict)) = self.last_verdict {
            if sequence == frame.sequence() {
                return verdict;
            }
        }

        let verdict = ColorDetector::matches(frame, &self.range);
        self.last_verdict = Some((frame.sequence(), verdict));
        verdict
    }
}
