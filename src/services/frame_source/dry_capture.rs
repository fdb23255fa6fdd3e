use crate::error::Result;
use crate::events::CaptureRegion;
use image::RgbaImage;
use tracing::info;

use super::r#trait::{CaptureBackend, CaptureHandle};

/// Размер эмулируемого экрана в dry-run режиме
const DRY_RUN_SCREEN: (u32, u32) = (1920, 1080);

pub struct DryRunCapture;

impl DryRunCapture {
    pub fn new() -> Self {
        info!("Инициализация DryRunCapture (экран {}x{})", DRY_RUN_SCREEN.0, DRY_RUN_SCREEN.1);
        Self
    }
}

impl CaptureBackend for DryRunCapture {
    fn screen_size(&self) -> Result<(u32, u32)> {
        Ok(DRY_RUN_SCREEN)
    }

    fn bind(&mut self, region: &CaptureRegion) -> Result<Box<dyn CaptureHandle>> {
        info!("[DRY RUN] Привязка захвата к области {}", region);
        Ok(Box::new(DryRunHandle {
            width: region.width(),
            height: region.height(),
        }))
    }
}

struct DryRunHandle {
    width: u32,
    height: u32,
}

impl CaptureHandle for DryRunHandle {
    fn grab(&mut self) -> Result<RgbaImage> {
        // Чёрный кадр: в типичный диапазон цвета не попадает
        Ok(RgbaImage::new(self.width, self.height))
    }
}
