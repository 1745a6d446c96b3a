//! Analytic signed distance to an axis-aligned ellipse.
//!
//! Mirrors `sdEllipse` in `shaders/ring.frag` operation for operation so the
//! CPU reference and the GPU agree on every pixel.

use glam::Vec2;

use crate::shade::sign;

/// Smallest denominator the cubic solve will divide by. Only reached on the
/// degenerate axis/discriminant cases; all regular inputs are far above it.
pub const DENOM_EPSILON: f32 = 1.0e-20;

/// Signed distance from `p` to the ellipse with semi-axes `ab`, negative
/// inside. Both semi-axes must be positive.
///
/// The side is read from the y offset to the closest point, falling back to
/// the x offset when that is zero (only at the centre of an ellipse whose
/// closest point lies on the folded x axis).
pub fn sd_ellipse(p: Vec2, ab: Vec2) -> f32 {
    let mut p = p.abs();
    let mut ab = ab;
    if p.x > p.y {
        p = Vec2::new(p.y, p.x);
        ab = Vec2::new(ab.y, ab.x);
    }

    let l = ab.y * ab.y - ab.x * ab.x;
    if l.abs() < DENOM_EPSILON {
        // circle
        return p.length() - ab.x;
    }

    let m = ab.x * p.x / l;
    let m2 = m * m;
    let n = ab.y * p.y / l;
    let n2 = n * n;
    let c = (m2 + n2 - 1.0) / 3.0;
    let c3 = c * c * c;
    let q = c3 + m2 * n2 * 2.0;
    let d = c3 + m2 * n2;
    let g = m + m * n2;

    let co = if d < 0.0 {
        let h = (q / c3).clamp(-1.0, 1.0).acos() / 3.0;
        let s = h.cos();
        let t = h.sin() * 3.0_f32.sqrt();
        let rx = (-c * (s + t + 2.0) + m2).sqrt();
        let ry = (-c * (s - t + 2.0) + m2).sqrt();
        (ry + sign(l) * rx + g.abs() / (rx * ry).max(DENOM_EPSILON) - m) / 2.0
    } else {
        let h = 2.0 * m * n * d.sqrt();
        let s = sign(q + h) * (q + h).abs().powf(1.0 / 3.0);
        let u = sign(q - h) * (q - h).abs().powf(1.0 / 3.0);
        let rx = -s - u - c * 4.0 + 2.0 * m2;
        let ry = (s - u) * 3.0_f32.sqrt();
        let rm = (rx * rx + ry * ry).sqrt();
        (ry / (rm - rx).max(DENOM_EPSILON).sqrt() + 2.0 * g / rm.max(DENOM_EPSILON) - m) / 2.0
    };

    let si = (1.0 - co * co).max(0.0).sqrt();
    let r = Vec2::new(ab.x * co, ab.y * si);
    let mut side = p.y - r.y;
    if side == 0.0 {
        side = p.x - r.x;
    }
    (r - p).length() * sign(side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn implicit(p: Vec2, ab: Vec2) -> f32 {
        (p.x / ab.x).powi(2) + (p.y / ab.y).powi(2)
    }

    #[test]
    fn boundary_points_have_zero_distance() {
        let shapes = [
            Vec2::new(0.7, 0.275),
            Vec2::new(1.0, 2.0),
            Vec2::new(3.0, 0.5),
            Vec2::new(0.4, 0.45),
        ];
        for ab in shapes {
            let eps = 1.0e-3 * ab.max_element();
            for step in 0..32 {
                let angle = 0.05 + step as f32 * TAU / 32.0;
                let p = Vec2::new(ab.x * angle.cos(), ab.y * angle.sin());
                let dist = sd_ellipse(p, ab);
                assert!(dist.abs() < eps, "ab={ab:?} angle={angle} dist={dist}");
            }
        }
    }

    #[test]
    fn sign_matches_inside_and_outside() {
        for ab in [Vec2::new(0.7, 0.275), Vec2::new(1.0, 0.6)] {
            for ix in -12..=12 {
                for iy in -12..=12 {
                    let p = Vec2::new(ix as f32 * 0.1 + 0.013, iy as f32 * 0.1 + 0.007);
                    let k = implicit(p, ab);
                    let dist = sd_ellipse(p, ab);
                    if k < 0.9 {
                        assert!(dist < 0.0, "p={p:?} ab={ab:?} dist={dist}");
                    } else if k > 1.1 {
                        assert!(dist > 0.0, "p={p:?} ab={ab:?} dist={dist}");
                    }
                }
            }
        }
    }

    #[test]
    fn centre_distance_is_minor_semi_axis() {
        let dist = sd_ellipse(Vec2::ZERO, Vec2::new(0.7, 0.275));
        assert!((dist + 0.275).abs() < 1.0e-5, "dist={dist}");
    }

    #[test]
    fn centre_is_inside_for_tall_ellipses() {
        for ab in [Vec2::new(1.0, 1.001), Vec2::new(0.275, 0.7), Vec2::new(0.5, 3.0)] {
            let dist = sd_ellipse(Vec2::ZERO, ab);
            assert!((dist + ab.x).abs() < 1.0e-3, "ab={ab:?} dist={dist}");
        }
    }

    #[test]
    fn far_point_on_major_axis() {
        let dist = sd_ellipse(Vec2::new(2.0, 0.0), Vec2::new(0.7, 0.275));
        assert!((dist - 1.3).abs() < 1.0e-4, "dist={dist}");
    }

    #[test]
    fn circle_falls_back_to_radial_distance() {
        let dist = sd_ellipse(Vec2::new(0.3, 0.4), Vec2::splat(1.0));
        assert!((dist + 0.5).abs() < 1.0e-6);
    }
}
