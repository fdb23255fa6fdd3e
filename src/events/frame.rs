use crate::error::{Result, TriggerError};
use image::RgbaImage;
use std::fmt;
use std::time::Instant;

/// Прямоугольник захвата в координатах экрана (right/bottom не включаются)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CaptureRegion {
    /// Квадрат с полустороной `fov` вокруг центра экрана.
    /// Координаты усекаются к нулю, как при int() от дробного центра.
    pub fn centered(fov: f64, screen_width: u32, screen_height: u32) -> Result<Self> {
        if !fov.is_finite() || fov <= 0.0 {
            return TriggerError::invalid_config(format!("fov должно быть больше 0, получено {}", fov));
        }

        let center_x = screen_width as f64 / 2.0;
        let center_y = screen_height as f64 / 2.0;

        let region = Self {
            left: (center_x - fov) as i32,
            top: (center_y - fov) as i32,
            right: (center_x + fov) as i32,
            bottom: (center_y + fov) as i32,
        };

        if region.left < 0
            || region.top < 0
            || region.right > screen_width as i32
            || region.bottom > screen_height as i32
        {
            return TriggerError::invalid_config(format!(
                "Область захвата {} выходит за пределы экрана {}x{} (fov = {})",
                region, screen_width, screen_height, fov
            ));
        }

        if region.width() == 0 || region.height() == 0 {
            return TriggerError::invalid_config(format!("Область захвата {} пуста (fov = {})", region, fov));
        }

        Ok(region)
    }

    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.left, self.top, self.right, self.bottom)
    }
}

/// Кадр области захвата. Порядок каналов - RGBA, после создания не меняется.
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: RgbaImage,
    sequence: u64,
    captured_at: Instant,
}

impl Frame {
    pub fn new(pixels: RgbaImage, sequence: u64) -> Self {
        Self {
            pixels,
            sequence,
            captured_at: Instant::now(),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Порядковый номер кадра внутри одного FrameSource
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_region_full_hd() {
        let region = CaptureRegion::centered(200.0, 1920, 1080).unwrap();

        assert_eq!(region, CaptureRegion { left: 760, top: 340, right: 1160, bottom: 740 });
        assert_eq!(region.width(), 400);
        assert_eq!(region.height(), 400);
    }

    #[test]
    fn test_centered_region_truncates_fractional_fov() {
        let region = CaptureRegion::centered(5.5, 1920, 1080).unwrap();

        // 960 - 5.5 = 954.5 -> 954, 960 + 5.5 = 965.5 -> 965
        assert_eq!(region, CaptureRegion { left: 954, top: 534, right: 965, bottom: 545 });
    }

    #[test]
    fn test_region_larger_than_screen_is_rejected() {
        let result = CaptureRegion::centered(600.0, 1920, 1080);
        assert!(matches!(result, Err(TriggerError::InvalidConfig(_))));
    }

    #[test]
    fn test_degenerate_region_is_rejected() {
        // Нечётная высота: центр 540.5, fov 0.2 даёт top == bottom
        assert!(CaptureRegion::centered(0.2, 1920, 1081).is_err());
    }

    #[test]
    fn test_frame_keeps_sequence() {
        let frame = Frame::new(RgbaImage::new(4, 2), 7);

        assert_eq!(frame.sequence(), 7);
        assert_eq!((frame.width(), frame.height()), (4, 2));
    }
}
