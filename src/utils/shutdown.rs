use tokio::sync::watch;
use tokio::time::{sleep, Duration};

/// Создать сигнал остановки: отправитель у оркестратора, получатели у циклов
pub fn shutdown_signal() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Запрошена ли остановка. Закрытый канал тоже считается остановкой.
pub fn is_shutdown(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Подождать `duration` или сигнал остановки, что наступит раньше.
/// Возвращает true, если циклу пора завершаться.
pub async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if is_shutdown(shutdown) {
        return true;
    }

    tokio::select! {
        _ = sleep(duration) => is_shutdown(shutdown),
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}
