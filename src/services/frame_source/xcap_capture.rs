use crate::error::Result;
use crate::events::CaptureRegion;
use crate::trigger_error;
use image::RgbaImage;
use tracing::{debug, info};
use xcap::Monitor;

use super::r#trait::{CaptureBackend, CaptureHandle};

/// Захват через xcap. Работает с основным монитором, координаты области - локальные для него.
pub struct XcapCapture;

impl XcapCapture {
    pub fn new() -> Self {
        info!("Инициализация XcapCapture");
        Self
    }

    fn primary_monitor() -> Result<Monitor> {
        let monitors = Monitor::all()
            .map_err(|e| trigger_error!(capture, "Не удалось получить список мониторов: {}", e))?;

        let fallback = monitors.first().cloned();

        monitors
            .into_iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or(fallback)
            .ok_or_else(|| trigger_error!(capture, "Монитор не найден"))
    }
}

impl CaptureBackend for XcapCapture {
    fn screen_size(&self) -> Result<(u32, u32)> {
        let monitor = Self::primary_monitor()?;

        let width = monitor
            .width()
            .map_err(|e| trigger_error!(capture, "Не удалось получить ширину монитора: {}", e))?;
        let height = monitor
            .height()
            .map_err(|e| trigger_error!(capture, "Не удалось получить высоту монитора: {}", e))?;

        debug!("Размер основного монитора: {}x{}", width, height);
        Ok((width, height))
    }

    fn bind(&mut self, region: &CaptureRegion) -> Result<Box<dyn CaptureHandle>> {
        let monitor = Self::primary_monitor()?;
        let name = monitor.name().unwrap_or_else(|_| "Unknown".to_string());

        info!("Захват привязан к монитору '{}', область {}", name, region);

        Ok(Box::new(XcapHandle {
            monitor,
            region: *region,
        }))
    }
}

struct XcapHandle {
    monitor: Monitor,
    region: CaptureRegion,
}

impl CaptureHandle for XcapHandle {
    fn grab(&mut self) -> Result<RgbaImage> {
        self.monitor
            .capture_region(
                self.region.left as u32,
                self.region.top as u32,
                self.region.width(),
                self.region.height(),
            )
            .map_err(|e| trigger_error!(capture, "Не удалось снять область {}: {}", self.region, e))
    }
}

impl Drop for XcapHandle {
    fn drop(&mut self) {
        debug!("Освобождение дескриптора захвата для области {}", self.region);
    }
}
