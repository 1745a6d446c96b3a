use glam::Vec2;

/// Default cap on `devicePixelRatio`; denser displays render at 2x.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

/// Size of a render surface in device pixels. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSize {
    pub width: u32,
    pub height: u32,
}

impl DeviceSize {
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Window size in CSS pixels plus the pixel ratio the surfaces render at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    css: Vec2,
    pixel_ratio: f32,
}

impl Viewport {
    /// Builds a viewport, clamping degenerate sizes to one CSS pixel and the
    /// ratio into `(0, max_ratio]`.
    pub fn new(css_width: f32, css_height: f32, device_ratio: f32, max_ratio: f32) -> Self {
        let sane = |v: f32| if v.is_finite() && v >= 1.0 { v } else { 1.0 };
        let pixel_ratio = if device_ratio.is_finite() && device_ratio > 0.0 {
            device_ratio.min(max_ratio.max(f32::MIN_POSITIVE))
        } else {
            1.0
        };
        Self {
            css: Vec2::new(sane(css_width), sane(css_height)),
            pixel_ratio,
        }
    }

    pub fn css_size(&self) -> Vec2 {
        self.css
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.css.x / self.css.y
    }

    /// Backing size of both the presentable surface and the offscreen buffer.
    pub fn device_size(&self) -> DeviceSize {
        let px = |v: f32| ((v * self.pixel_ratio).floor() as u32).max(1);
        DeviceSize {
            width: px(self.css.x),
            height: px(self.css.y),
        }
    }
}
