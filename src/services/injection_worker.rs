use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{KeyCode, TriggerEvent, VirtualKeyEvent};
use crate::services::action_channel::ActionReceiver;
use crate::services::VirtualDevice;
use crate::utils::shutdown::is_shutdown;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// Синтетический ввод (uinput, dry-run, тестовые заглушки)
pub trait InputInjector: Send {
    fn send_event(&mut self, event: VirtualKeyEvent) -> Result<()>;
}

/// Factory function: виртуальная клавиатура uinput или её dry-run вариант
pub fn create_input_injector(config: &Config, dry_run: bool) -> Result<Box<dyn InputInjector>> {
    Ok(Box::new(VirtualDevice::new(&config.output.device_name, dry_run)?))
}

/// Потребитель канала действий: на каждое Fire - нажатие и отпускание выходной клавиши
pub struct InjectionWorker {
    injector: Box<dyn InputInjector>,
    output_key: KeyCode,
    receiver: ActionReceiver,
    fired: Arc<AtomicU64>,
}

impl InjectionWorker {
    pub fn new(
        injector: Box<dyn InputInjector>,
        output_key: KeyCode,
        receiver: ActionReceiver,
        fired: Arc<AtomicU64>,
    ) -> Self {
        Self {
            injector,
            output_key,
            receiver,
            fired,
        }
    }

    /// Работает, пока канал открыт. Закрытие канала - штатный сигнал завершения.
    pub async fn run(mut self, shutdown: watch::Receiver<bool>) {
        info!("InjectionWorker запущен, выходная клавиша: {}", self.output_key);

        while let Some(event) = self.receiver.recv().await {
            // После сигнала остановки ничего больше не нажимаем
            if is_shutdown(&shutdown) {
                self.receiver.close();
                debug_if_enabled!("Событие {} отброшено: идёт остановка", event);
                break;
            }

            self.handle_event(event);
        }

        info!(
            "InjectionWorker завершён, отправлено нажатий: {}",
            self.fired.load(Ordering::Relaxed)
        );
    }

    fn handle_event(&mut self, event: TriggerEvent) {
        match event {
            TriggerEvent::Fire => {
                // Ошибки не повторяем
                let pressed = self.injector.send_event(VirtualKeyEvent::press(self.output_key));
                if let Err(e) = &pressed {
                    error!("Ошибка отправки события нажатия: {}", e);
                }

                let released = self.injector.send_event(VirtualKeyEvent::release(self.output_key));
                if let Err(e) = &released {
                    error!("Ошибка отправки события отпускания: {}", e);
                }

                if pressed.is_ok() && released.is_ok() {
                    let total = self.fired.fetch_add(1, Ordering::Relaxed) + 1;
                    debug_if_enabled!("Нажатие #{} отправлено", total);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::KeyState;
    use crate::services::action_channel::action_channel;
    use crate::services::testing::RecordingInjector;
    use crate::utils::shutdown::shutdown_signal;

    const OUTPUT: KeyCode = KeyCode(24);

    #[tokio::test]
    async fn test_fire_emits_press_then_release() {
        let injector = RecordingInjector::new();
        let fired = Arc::new(AtomicU64::new(0));
        let (tx, rx) = action_channel();
        let (_shutdown_tx, shutdown_rx) = shutdown_signal();

        let worker = InjectionWorker::new(Box::new(injector.clone()), OUTPUT, rx, fired.clone());

        tx.send(TriggerEvent::Fire);
        tx.send(TriggerEvent::Fire);
        drop(tx);

        // Закрытие канала завершает работу
        worker.run(shutdown_rx).await;

        let states: Vec<KeyState> = injector.events().iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![KeyState::Pressed, KeyState::Released, KeyState::Pressed, KeyState::Released]
        );
        assert!(injector.events().iter().all(|e| e.key_code == OUTPUT));
        assert_eq!(fired.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_injection_failure_is_dropped() {
        let injector = RecordingInjector::new();
        injector.fail_next(1);
        let fired = Arc::new(AtomicU64::new(0));
        let (tx, rx) = action_channel();
        let (_shutdown_tx, shutdown_rx) = shutdown_signal();

        let worker = InjectionWorker::new(Box::new(injector.clone()), OUTPUT, rx, fired.clone());

        tx.send(TriggerEvent::Fire);
        tx.send(TriggerEvent::Fire);
        drop(tx);
        worker.run(shutdown_rx).await;

        // Первое нажатие потеряно, отпускание и второе событие прошли
        assert_eq!(injector.events().len(), 3);
        assert_eq!(fired.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_events_after_shutdown_are_not_injected() {
        let injector = RecordingInjector::new();
        let fired = Arc::new(AtomicU64::new(0));
        let (tx, rx) = action_channel();
        let (shutdown_tx, shutdown_rx) = shutdown_signal();

        let worker = InjectionWorker::new(Box::new(injector.clone()), OUTPUT, rx, fired.clone());

        tx.send(TriggerEvent::Fire);
        let _ = shutdown_tx.send(true);

        // Отправитель ещё жив, но воркер всё равно выходит
        worker.run(shutdown_rx).await;

        assert!(injector.events().is_empty());
        assert!(tx.is_closed());
    }
}
