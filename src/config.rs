use crate::interaction::DEFAULT_SMOOTHING;
use crate::viewport::DEFAULT_MAX_PIXEL_RATIO;

pub const DEFAULT_CANVAS_ID: &str = "c";
/// Shader time added per rendered frame.
pub const DEFAULT_TIME_STEP: f32 = 0.01;

/// Runtime knobs. The visual itself (shape, colours) is fixed in the shaders.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub canvas_id: String,
    pub max_pixel_ratio: f32,
    pub smoothing: f32,
    pub time_step: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_id: DEFAULT_CANVAS_ID.to_string(),
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
            smoothing: DEFAULT_SMOOTHING,
            time_step: DEFAULT_TIME_STEP,
        }
    }
}

impl Settings {
    /// Applies overrides looked up by `data-*` key (`max-pixel-ratio`,
    /// `smoothing`, `time-step`). Unparseable or out-of-range values are
    /// logged and ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse(&lookup, "max-pixel-ratio", |v| v > 0.0) {
            self.max_pixel_ratio = v;
        }
        if let Some(v) = parse(&lookup, "smoothing", |v| v > 0.0 && v <= 1.0) {
            self.smoothing = v;
        }
        if let Some(v) = parse(&lookup, "time-step", |v| v >= 0.0) {
            self.time_step = v;
        }
        self
    }
}

fn parse<F>(lookup: &F, key: &str, valid: impl Fn(f32) -> bool) -> Option<f32>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<f32>() {
        Ok(v) if v.is_finite() && valid(v) => Some(v),
        _ => {
            log::warn!("ignoring data-{key}={raw:?}");
            None
        }
    }
}
