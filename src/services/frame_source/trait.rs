use crate::error::Result;
use crate::events::CaptureRegion;
use image::RgbaImage;

/// Поставщик захвата экрана: выдаёт размеры экрана и привязывает дескриптор к области
pub trait CaptureBackend: Send {
    /// Размер экрана, относительно которого строится область захвата
    fn screen_size(&self) -> Result<(u32, u32)>;

    /// Создать дескриптор захвата для области. Освобождение - drop дескриптора.
    fn bind(&mut self, region: &CaptureRegion) -> Result<Box<dyn CaptureHandle>>;
}

/// Дескриптор, привязанный к одной области
pub trait CaptureHandle: Send {
    /// Снять текущее содержимое области (RGBA)
    fn grab(&mut self) -> Result<RgbaImage>;
}

/// Factory function to create a capture backend based on the dry_run flag
pub fn create_capture_backend(dry_run: bool) -> Result<Box<dyn CaptureBackend>> {
    if dry_run {
        return Ok(Box::new(super::dry_capture::DryRunCapture::new()));
    }

    #[cfg(feature = "screen-capture")]
    {
        Ok(Box::new(super::xcap_capture::XcapCapture::new()))
    }

    #[cfg(not(feature = "screen-capture"))]
    {
        Err(crate::trigger_error!(
            capture,
            "Сборка без feature \"screen-capture\": реальный захват экрана недоступен, используйте --dry-run"
        ))
    }
}
