use crate::events::Frame;
use std::sync::Arc;
use tokio::sync::watch;

/// Создать одноместный слот для последнего кадра: один писатель, любое число читателей
pub fn frame_slot() -> (FramePublisher, LatestFrame) {
    let (tx, rx) = watch::channel(None);
    (FramePublisher { tx }, LatestFrame { rx })
}

/// Сторона FrameSource: публикует новый кадр, заменяя предыдущий целиком
pub struct FramePublisher {
    tx: watch::Sender<Option<Arc<Frame>>>,
}

impl FramePublisher {
    pub fn publish(&self, frame: Frame) {
        // send_replace не требует живых читателей
        self.tx.send_replace(Some(Arc::new(frame)));
    }

    pub fn subscribe(&self) -> LatestFrame {
        LatestFrame {
            rx: self.tx.subscribe(),
        }
    }
}

/// Сторона читателя: мгновенный снимок последнего опубликованного кадра
#[derive(Clone)]
pub struct LatestFrame {
    rx: watch::Receiver<Option<Arc<Frame>>>,
}

impl LatestFrame {
    /// None, пока не опубликован ни один кадр. Блокировка внутри borrow()
    /// держится только на время клонирования Arc.
    pub fn get(&self) -> Option<Arc<Frame>> {
        self.rx.borrow().clone()
    }
}
