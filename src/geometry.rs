//! Ellipse and rotation primitives for the kinematics engine.
//!
//! The ellipse here is a centered convenience parametrization, not a
//! focus-centered Keplerian orbit: the radius at parameter `angle` is
//!
//! ```text
//! r = b / sqrt(1 - (e * cos(angle))^2)
//! ```
//!
//! which sweeps from `b` at the co-vertices up to `b / sqrt(1 - e^2) = a`
//! along the major axis. The arithmetic form is load-bearing: the per-frame
//! update rules are defined in terms of exactly this radius law.

use glam::Vec2;

/// Radius of the ellipse parametrization at `angle`.
///
/// `e` must stay strictly below 1; at `e = 1` the denominator vanishes at
/// `angle = 0` and `pi` and the result is Inf. That constraint is enforced
/// at configuration time, not here.
#[inline]
pub fn ellipse_radius(b: f32, e: f32, angle: f32) -> f32 {
    b / (1.0 - (e * angle.cos()).powi(2)).sqrt()
}

/// Point on the ellipse with semi-minor axis `b` and eccentricity `e` at
/// parameter `angle` (radians, any range; never reduced mod 2pi).
#[inline]
pub fn ellipse_point(b: f32, e: f32, angle: f32) -> Vec2 {
    let r = ellipse_radius(b, e, angle);
    Vec2::new(r * angle.cos(), r * angle.sin())
}

/// Sample the ellipse at each of `angles`.
pub fn ellipse(b: f32, e: f32, angles: &[f32]) -> Vec<Vec2> {
    angles.iter().map(|&t| ellipse_point(b, e, t)).collect()
}

/// Rigid 2D rotation of `p` by `angle` radians about the origin.
///
/// Pure rotation: no scaling, no shear, and negative angles are handled by
/// the same formula as positive ones.
#[inline]
pub fn rotate(p: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Rotate every point in place by a single shared angle.
pub fn rotate_all(pts: &mut [Vec2], angle: f32) {
    let (sin, cos) = angle.sin_cos();
    for p in pts.iter_mut() {
        *p = Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    fn sample_angles() -> Vec<f32> {
        // A sweep past 2pi on purpose: angles are never wrapped.
        (0..64).map(|i| i as f32 * TAU / 48.0).collect()
    }

    #[test]
    fn radius_law_holds_for_sampled_angles() {
        let b = 0.8;
        let e = 0.6;
        for angle in sample_angles() {
            let p = ellipse_point(b, e, angle);
            let expected = b / (1.0 - (e * angle.cos()).powi(2)).sqrt();
            assert!((p.length() - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_eccentricity_is_a_circle() {
        let b = 1.3;
        for p in ellipse(b, 0.0, &sample_angles()) {
            assert!((p.length() - b).abs() < 1e-5);
        }
    }

    #[test]
    fn major_axis_radius_is_semi_major() {
        let b = 0.8f32;
        let e = 0.6f32;
        let a = b / (1.0 - e * e).sqrt();
        assert!((ellipse_radius(b, e, 0.0) - a).abs() < 1e-6);
        assert!((ellipse_radius(b, e, PI) - a).abs() < 1e-5);
        // Co-vertex radius is exactly b.
        assert!((ellipse_radius(b, e, FRAC_PI_2) - b).abs() < 1e-6);
    }

    #[test]
    fn zero_rotation_is_identity() {
        let p = Vec2::new(0.3, -1.7);
        let q = rotate(p, 0.0);
        assert!((p - q).length() < 1e-6);
    }

    #[test]
    fn rotation_round_trips() {
        let p = Vec2::new(-0.9, 2.4);
        for theta in [0.1, 1.0, -2.5, 7.0, -13.0] {
            let q = rotate(rotate(p, theta), -theta);
            assert!((p - q).length() < 1e-4);
        }
    }

    #[test]
    fn quarter_turn() {
        let q = rotate(Vec2::new(1.0, 0.0), FRAC_PI_2);
        assert!((q - Vec2::new(0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn rotation_preserves_length() {
        let p = Vec2::new(0.6, -0.8);
        for theta in [-3.0, -0.2, 0.7, 5.5] {
            assert!((rotate(p, theta).length() - p.length()).abs() < 1e-5);
        }
    }

    #[test]
    fn rotate_all_matches_scalar_rotate() {
        let mut pts = vec![Vec2::new(1.0, 0.0), Vec2::new(-0.5, 0.5), Vec2::ZERO];
        let expected: Vec<Vec2> = pts.iter().map(|&p| rotate(p, 1.2)).collect();
        rotate_all(&mut pts, 1.2);
        for (p, q) in pts.iter().zip(&expected) {
            assert!((*p - *q).length() < 1e-6);
        }
    }
}
