//! Pointer tracking and the smoothed haze intensity.

use glam::Vec2;

/// Below this normalized distance from the centre the haze is at full strength.
pub const INNER_RADIUS: f32 = 0.7;
/// At and beyond this distance the haze target is zero.
pub const OUTER_RADIUS: f32 = 1.1;
/// Fraction of the remaining gap closed each frame.
pub const DEFAULT_SMOOTHING: f32 = 0.15;

/// Last known pointer position in `[0,1]²`, y measured from the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub position: Vec2,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            position: Vec2::splat(0.5),
        }
    }
}

impl Pointer {
    /// Normalizes surface-local client coordinates against the CSS size of
    /// the surface, flipping y so that 0 is the bottom edge.
    pub fn from_client(client_x: f32, client_y: f32, css_size: Vec2) -> Self {
        let size = css_size.max(Vec2::ONE);
        Self {
            position: Vec2::new(client_x / size.x, 1.0 - client_y / size.y),
        }
    }

    /// Distance from the surface centre with both axes stretched to `[-1,1]`.
    pub fn centre_distance(&self) -> f32 {
        ((self.position - 0.5) * 2.0).length()
    }
}

/// Maps a centre distance onto the intensity target: flat inside
/// [`INNER_RADIUS`], quadratic ease-out to zero at [`OUTER_RADIUS`].
pub fn target_for_distance(distance: f32) -> f32 {
    if distance < INNER_RADIUS {
        1.0
    } else if distance < OUTER_RADIUS {
        let t = (distance - INNER_RADIUS) / (OUTER_RADIUS - INNER_RADIUS);
        1.0 - t * t
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intensity {
    pub target: f32,
    pub current: f32,
    smoothing: f32,
}

impl Default for Intensity {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

impl Intensity {
    pub fn new(smoothing: f32) -> Self {
        Self {
            target: 0.0,
            current: 0.0,
            smoothing,
        }
    }

    /// Retargets from a pointer move. Leaves `current` untouched.
    pub fn aim(&mut self, pointer: &Pointer) {
        self.target = target_for_distance(pointer.centre_distance());
    }

    /// One frame of exponential smoothing towards `target`.
    pub fn step(&mut self) -> f32 {
        self.current += (self.target - self.current) * self.smoothing;
        self.current
    }
}
