use crate::events::TriggerEvent;
use tokio::sync::mpsc;

/// Канал действий: один отправитель (цикл детекции), один получатель (InjectionWorker).
/// Отправка не блокирует и не ждёт получателя, порядок сообщений сохраняется.
pub fn action_channel() -> (ActionSender, ActionReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ActionSender { tx }, ActionReceiver { rx })
}

pub struct ActionSender {
    tx: mpsc::UnboundedSender<TriggerEvent>,
}

impl ActionSender {
    /// false - получатель уже завершился
    pub fn send(&self, event: TriggerEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct ActionReceiver {
    rx: mpsc::UnboundedReceiver<TriggerEvent>,
}

impl ActionReceiver {
    /// None - все отправители закрыты, дальше сообщений не будет
    pub async fn recv(&mut self) -> Option<TriggerEvent> {
        self.rx.recv().await
    }

    /// Закрыть канал со стороны получателя, уже отправленное можно дочитать
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order_without_coalescing() {
        let (tx, mut rx) = action_channel();

        assert!(tx.send(TriggerEvent::Fire));
        assert!(tx.send(TriggerEvent::Fire));
        drop(tx);

        assert_eq!(rx.recv().await, Some(TriggerEvent::Fire));
        assert_eq!(rx.recv().await, Some(TriggerEvent::Fire));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_send_after_receiver_closed_reports_failure() {
        let (tx, mut rx) = action_channel();
        rx.close();

        assert!(tx.is_closed());
        assert!(!tx.send(TriggerEvent::Fire));
    }
}
