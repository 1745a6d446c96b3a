//! CPU reference for the two fragment shaders.
//!
//! Each function follows its GLSL counterpart in `shaders/` statement for
//! statement, including GLSL's `sign` and reversed-edge `smoothstep`
//! semantics. The browser never calls these; they pin down the numbers the
//! GPU is expected to produce.

use glam::{Vec2, Vec3, Vec4};

use crate::frame::{HazeUniforms, RingUniforms};
use crate::sdf::sd_ellipse;

/// Rotation applied to scene coordinates, radians.
pub const ROTATION: f32 = 0.9;
/// Zoom applied after aspect correction.
pub const SCALE: f32 = 1.8;
pub const ELLIPSE_RADIUS: Vec2 = Vec2::new(0.7, 0.275);
pub const RING_THICKNESS: f32 = 0.06;
pub const RING_COLOR: Vec3 = Vec3::new(1.0, 0.843, 0.0);

pub const HAZE_PULL: f32 = -0.15;
pub const HAZE_BASE_RADIUS: f32 = 0.58;
pub const HAZE_RADIUS_GAIN: f32 = 0.15;
pub const HAZE_COLOR: Vec3 = Vec3::new(1.0, 0.0, 1.0);

/// GLSL `sign`: zero maps to zero, unlike `f32::signum`.
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// GLSL `smoothstep`, valid for `edge0 > edge1` as well.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// Maps a `[0,1]²` surface position to rotated scene space.
pub fn scene_coord(unit: Vec2, aspect_ratio: f32) -> Vec2 {
    let mut uv = unit * 2.0 - 1.0;
    uv.x *= aspect_ratio;
    uv *= SCALE;
    let (s, c) = (ROTATION.sin(), ROTATION.cos());
    Vec2::new(uv.x * c - uv.y * s, uv.x * s + uv.y * c)
}

/// Ring pass output for the pixel at `frag_coord` (device pixels, origin
/// bottom-left, pixel centres at `.5`).
pub fn ring_fragment(frag_coord: Vec2, uniforms: &RingUniforms) -> Vec4 {
    let rotated = scene_coord(frag_coord / uniforms.resolution, uniforms.aspect_ratio);
    let d = sd_ellipse(rotated, ELLIPSE_RADIUS);

    let t = RING_THICKNESS;
    let mut ring = smoothstep(t * 2.0, t, d.abs());
    ring *= smoothstep(-t, -t * 0.7, d);
    let glow = (-1.5 * d.abs()).exp().powf(1.2);

    let alpha = (ring * 0.7 + glow * 0.5) * smoothstep(2.0, 0.0, rotated.length());
    (RING_COLOR * alpha).extend(alpha)
}

/// Intermediate values of the haze pass, kept for inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazeSample {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub color: Vec4,
}

/// Haze pass output for `frag_coord`, given the ring pass texel `previous`.
pub fn haze_fragment(frag_coord: Vec2, uniforms: &HazeUniforms, previous: Vec4) -> HazeSample {
    let rotated = scene_coord(frag_coord / uniforms.resolution, uniforms.aspect_ratio);
    let rotated_mouse = scene_coord(uniforms.mouse_position, uniforms.aspect_ratio);

    let intensity = uniforms.intensity;
    let center = rotated + (rotated_mouse - rotated) * HAZE_PULL * intensity;
    let radius = HAZE_BASE_RADIUS + HAZE_RADIUS_GAIN * intensity;
    let distance = center.length() - radius;

    let haze = smoothstep(0.5, -0.3, distance);
    let alpha = haze * intensity * 1.4;

    let rgb = mix(previous.truncate(), HAZE_COLOR, alpha * 0.8);
    let a = previous.w.max(alpha * 0.8);
    HazeSample {
        center,
        radius,
        alpha,
        color: rgb.extend(a),
    }
}
