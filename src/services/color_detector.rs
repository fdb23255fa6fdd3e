use crate::events::Frame;
use std::fmt;

/// Максимальный тон в 8-битном HSV (OpenCV: H в [0, 180))
pub const HUE_MAX: u8 = 179;

/// Цвет в 8-битном HSV: H в [0, 179], S и V в [0, 255]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Преобразование RGB -> HSV с округлением как у cv2.cvtColor(COLOR_RGB2HSV)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        let v = r.max(g).max(b);
        let diff = v - r.min(g).min(b);

        let s = if v == 0 { 0 } else { (2 * 255 * diff + v) / (2 * v) };

        let h = if diff == 0 {
            0
        } else {
            // Тон в единицах diff: сектор R - [-1, 1], G - [1, 3], B - [3, 5]
            let sector = if v == r {
                g - b
            } else if v == g {
                b - r + 2 * diff
            } else {
                r - g + 4 * diff
            };

            let h = (60 * sector + diff).div_euclid(2 * diff);
            if h < 0 { h + 180 } else { h }
        };

        Self {
            h: h as u8,
            s: s as u8,
            v: v as u8,
        }
    }
}

impl From<[u8; 3]> for Hsv {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl fmt::Display for Hsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.h, self.s, self.v)
    }
}

/// Включительный диапазон HSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub low: Hsv,
    pub high: Hsv,
}

impl HsvRange {
    pub fn new(low: Hsv, high: Hsv) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, color: Hsv) -> bool {
        (self.low.h..=self.high.h).contains(&color.h)
            && (self.low.s..=self.high.s).contains(&color.s)
            && (self.low.v..=self.high.v).contains(&color.v)
    }
}

impl fmt::Display for HsvRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.low, self.high)
    }
}

/// Проверка наличия цвета в кадре. Без состояния.
pub struct ColorDetector;

impl ColorDetector {
    /// true, если хотя бы один пиксель кадра попадает в диапазон по всем трём каналам.
    /// Альфа-канал игнорируется.
    pub fn matches(frame: &Frame, range: &HsvRange) -> bool {
        frame
            .pixels()
            .pixels()
            .any(|pixel| range.contains(Hsv::from_rgb(pixel[0], pixel[1], pixel[2])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        Frame::new(RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255])), 0)
    }

    fn yellow_range() -> HsvRange {
        HsvRange::new(Hsv::new(30, 125, 150), Hsv::new(30, 255, 255))
    }

    #[test]
    fn test_primary_colors_to_hsv() {
        assert_eq!(Hsv::from_rgb(255, 0, 0), Hsv::new(0, 255, 255));
        assert_eq!(Hsv::from_rgb(0, 255, 0), Hsv::new(60, 255, 255));
        assert_eq!(Hsv::from_rgb(0, 0, 255), Hsv::new(120, 255, 255));
        assert_eq!(Hsv::from_rgb(255, 255, 0), Hsv::new(30, 255, 255));
    }

    #[test]
    fn test_grayscale_has_no_hue_or_saturation() {
        assert_eq!(Hsv::from_rgb(0, 0, 0), Hsv::new(0, 0, 0));
        assert_eq!(Hsv::from_rgb(255, 255, 255), Hsv::new(0, 0, 255));
        assert_eq!(Hsv::from_rgb(128, 128, 128), Hsv::new(0, 0, 128));
    }

    #[test]
    fn test_hue_wraps_for_magenta_side() {
        // R максимален, G < B: отрицательный тон переносится в верх диапазона
        let hsv = Hsv::from_rgb(255, 0, 128);
        assert_eq!(hsv.v, 255);
        assert_eq!(hsv.s, 255);
        assert_eq!(hsv.h, 165);
        assert!(hsv.h <= HUE_MAX);
    }

    #[test]
    fn test_no_pixel_in_range() {
        let frame = solid_frame(10, 10, [0, 0, 255]);
        assert!(!ColorDetector::matches(&frame, &yellow_range()));
    }

    #[test]
    fn test_single_pixel_in_range_matches() {
        let mut pixels = RgbaImage::from_pixel(10, 10, Rgba([20, 20, 20, 255]));
        pixels.put_pixel(9, 9, Rgba([255, 255, 0, 255]));
        let frame = Frame::new(pixels, 1);

        assert!(ColorDetector::matches(&frame, &yellow_range()));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let exact = Hsv::new(30, 200, 200);
        let range = HsvRange::new(exact, exact);
        assert!(range.contains(exact));

        // Пиксель, ровно равный нижней границе
        let low = HsvRange::new(Hsv::new(30, 255, 255), Hsv::new(40, 255, 255));
        assert!(ColorDetector::matches(&solid_frame(1, 1, [255, 255, 0]), &low));

        // Пиксель, ровно равный верхней границе
        let high = HsvRange::new(Hsv::new(0, 0, 0), Hsv::new(30, 255, 255));
        assert!(ColorDetector::matches(&solid_frame(1, 1, [255, 255, 0]), &high));
    }

    #[test]
    fn test_one_channel_outside_is_no_match() {
        // Тон и насыщенность подходят, яркость ниже границы
        let range = HsvRange::new(Hsv::new(30, 125, 150), Hsv::new(30, 255, 255));
        let dim_yellow = solid_frame(3, 3, [100, 100, 0]);

        assert_eq!(Hsv::from_rgb(100, 100, 0).v, 100);
        assert!(!ColorDetector::matches(&dim_yellow, &range));
    }

    #[test]
    fn test_alpha_is_ignored() {
        let frame = Frame::new(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 0, 0])), 0);
        assert!(ColorDetector::matches(&frame, &yellow_range()));
    }

    #[test]
    fn test_empty_frame_never_matches() {
        let frame = Frame::new(RgbaImage::new(0, 0), 0);
        let everything = HsvRange::new(Hsv::new(0, 0, 0), Hsv::new(HUE_MAX, 255, 255));
        assert!(!ColorDetector::matches(&frame, &everything));
    }
}
