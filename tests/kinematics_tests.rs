//! Black-box tests for the orbit kinematics engine.
//!
//! These exercise the public construction + iterate + positions contract
//! the presentation shell relies on, across all five kinematic modes.

use std::f32::consts::TAU;

use whorl::{Galaxy, GalaxyConfig, Mode, Vec3, Winding};

fn config(mode: Mode) -> GalaxyConfig {
    GalaxyConfig::new(mode, Winding::Trailing)
        .with_particle_count(512)
        .with_eccentricity(0.6)
        .with_seed(123)
}

fn polar_angle(p: Vec3) -> f32 {
    p.y.atan2(p.x)
}

fn radius(p: Vec3) -> f32 {
    p.length()
}

/// Smallest signed difference between two angles, in (-pi, pi].
fn angle_delta(before: f32, after: f32) -> f32 {
    let mut d = after - before;
    while d > TAU / 2.0 {
        d -= TAU;
    }
    while d < -TAU / 2.0 {
        d += TAU;
    }
    d
}

// ============================================================================
// Solid-body rotation
// ============================================================================

#[test]
fn solid_mode_preserves_radius() {
    let mut galaxy = Galaxy::new(&config(Mode::Solid)).unwrap();
    let before: Vec<f32> = galaxy.positions().iter().map(|&p| radius(p)).collect();

    galaxy.iterate();

    for (r0, p) in before.iter().zip(galaxy.positions()) {
        assert!((r0 - radius(*p)).abs() < 1e-4);
    }
}

#[test]
fn solid_mode_advances_polar_angle_by_the_angular_velocity() {
    let mut galaxy = Galaxy::new(
        &GalaxyConfig::new(Mode::Solid, Winding::Trailing)
            .with_particle_count(4)
            .with_eccentricity(0.6)
            .with_seed(7),
    )
    .unwrap();
    let before: Vec<f32> = galaxy.positions().iter().map(|&p| polar_angle(p)).collect();

    galaxy.iterate();

    for (theta0, p) in before.iter().zip(galaxy.positions()) {
        let d = angle_delta(*theta0, polar_angle(*p));
        assert!((d - 0.01).abs() < 1e-4, "angle step was {}", d);
    }
}

#[test]
fn solid_mode_rotation_rate_is_radius_independent() {
    let mut galaxy = Galaxy::new(&config(Mode::Solid)).unwrap();
    let before: Vec<f32> = galaxy.positions().iter().map(|&p| polar_angle(p)).collect();

    galaxy.iterate();

    let deltas: Vec<f32> = before
        .iter()
        .zip(galaxy.positions())
        .map(|(t0, p)| angle_delta(*t0, polar_angle(*p)))
        .collect();
    let first = deltas[0];
    for d in deltas {
        assert!((d - first).abs() < 1e-4);
    }
}

// ============================================================================
// Differential rotation
// ============================================================================

#[test]
fn differential_1_preserves_radius_but_not_rate() {
    let mut galaxy = Galaxy::new(&config(Mode::Differential1)).unwrap();
    let before: Vec<Vec3> = galaxy.positions().to_vec();

    galaxy.iterate();

    let mut inner_step: Option<f32> = None;
    let mut outer_step: Option<f32> = None;
    for (p0, p) in before.iter().zip(galaxy.positions()) {
        let r = radius(*p0);
        assert!((r - radius(*p)).abs() < 1e-4);

        let step = angle_delta(polar_angle(*p0), polar_angle(*p));
        if r > 0.01 && r < 0.2 {
            inner_step = Some(step);
        } else if r > 0.8 {
            outer_step = Some(step);
        }
    }

    // Angular rate falls off monotonically with radius, so any inner
    // particle outpaces any outer one.
    let inner_step = inner_step.expect("no inner particle in sample");
    let outer_step = outer_step.expect("no outer particle in sample");
    assert!(inner_step > outer_step);
}

#[test]
fn differential_2_preserves_radius_and_stays_finite() {
    let mut galaxy = Galaxy::new(&config(Mode::Differential2)).unwrap();
    let before: Vec<Vec3> = galaxy.positions().to_vec();

    galaxy.iterate();

    // The rim sits at 1.1 * r_max, strictly above every particle, so the
    // angular steps blow up near the rim but never reach the singularity.
    for (p0, p) in before.iter().zip(galaxy.positions()) {
        assert!(p.x.is_finite() && p.y.is_finite());
        assert!((radius(*p0) - radius(*p)).abs() < 1e-3);
    }
}

// ============================================================================
// Density-wave modes
// ============================================================================

#[test]
fn density_wave_keeps_axes_invariant_over_many_frames() {
    let mut galaxy = Galaxy::new(&config(Mode::DensityWave)).unwrap();
    let a0 = galaxy.semi_major_axes().to_vec();
    let b0 = galaxy.semi_minor_axes().to_vec();
    let e = galaxy.eccentricity();
    let squash = (1.0 - e * e).sqrt();

    for _ in 0..500 {
        galaxy.iterate();
    }

    assert_eq!(galaxy.semi_major_axes(), a0.as_slice());
    assert_eq!(galaxy.semi_minor_axes(), b0.as_slice());
    for (a, b) in a0.iter().zip(&b0) {
        assert!((b - a * squash).abs() < 1e-6);
    }
}

#[test]
fn density_wave_keeps_orbit_orientation_fixed() {
    let mut galaxy = Galaxy::new(&config(Mode::DensityWave)).unwrap();
    let orientations = galaxy.orbit_angles().to_vec();

    for _ in 0..50 {
        galaxy.iterate();
    }

    assert_eq!(galaxy.orbit_angles(), orientations.as_slice());
}

#[test]
fn density_wave_advances_orbital_angles_without_wrap() {
    let mut galaxy = Galaxy::new(&config(Mode::DensityWave)).unwrap();
    let omega = galaxy.angular_velocity();
    let start = galaxy.angles().to_vec();

    let frames = 1000;
    for _ in 0..frames {
        galaxy.iterate();
    }

    // Trailing winding steps forward; angles accumulate additively and are
    // never reduced mod 2pi.
    for (t0, t) in start.iter().zip(galaxy.angles()) {
        assert!((t - t0 - frames as f32 * omega).abs() < 1e-2);
    }
}

#[test]
fn leading_winding_steps_angles_backward() {
    let mut galaxy = Galaxy::new(
        &GalaxyConfig::new(Mode::DensityWave, Winding::Leading)
            .with_particle_count(64)
            .with_seed(5),
    )
    .unwrap();
    let start = galaxy.angles().to_vec();

    galaxy.iterate();

    for (t0, t) in start.iter().zip(galaxy.angles()) {
        assert!(t < t0);
    }
}

#[test]
fn pattern_mode_accumulates_orbit_angle_by_pattern_speed() {
    let mut galaxy = Galaxy::new(
        &config(Mode::DensityWavePattern).with_pattern_speed(0.001),
    )
    .unwrap();
    let start = galaxy.orbit_angles().to_vec();

    for _ in 0..10 {
        galaxy.iterate();
    }

    for (o0, o) in start.iter().zip(galaxy.orbit_angles()) {
        assert!((o - o0 - 0.01).abs() < 1e-4);
    }
}

#[test]
fn density_wave_positions_stay_on_the_orbit_radius_law() {
    let mut galaxy = Galaxy::new(&config(Mode::DensityWave)).unwrap();
    for _ in 0..100 {
        galaxy.iterate();
    }

    let e = galaxy.eccentricity();
    for i in 0..galaxy.len() {
        let b = galaxy.semi_minor_axes()[i];
        let angle = galaxy.angles()[i];
        let expected_r = b / (1.0 - (e * angle.cos()).powi(2)).sqrt();
        assert!((radius(galaxy.position(i)) - expected_r).abs() < 1e-3);
    }
}

// ============================================================================
// Construction contract
// ============================================================================

#[test]
fn unknown_mode_string_is_a_configuration_error() {
    let err = "warp_drive".parse::<Mode>();
    assert!(err.is_err());
    // No ensemble exists: construction never ran.
}

#[test]
fn invalid_eccentricity_fails_before_building_the_ensemble() {
    let config = GalaxyConfig::new(Mode::Solid, Winding::Trailing)
        .with_particle_count(100)
        .with_eccentricity(1.0);
    assert!(Galaxy::new(&config).is_err());
}

#[test]
fn ensemble_size_is_fixed_across_frames() {
    let mut galaxy = Galaxy::new(&config(Mode::DensityWavePattern)).unwrap();
    assert_eq!(galaxy.len(), 512);
    for _ in 0..10 {
        galaxy.iterate();
        assert_eq!(galaxy.positions().len(), 512);
    }
}

#[test]
fn positions_stay_in_plane() {
    for mode in Mode::ALL {
        let mut galaxy = Galaxy::new(&config(mode)).unwrap();
        for _ in 0..5 {
            galaxy.iterate();
        }
        for p in galaxy.positions() {
            assert_eq!(p.z, 0.0);
        }
    }
}

#[test]
fn circular_orbits_have_constant_radius_in_density_wave_mode() {
    let mut galaxy = Galaxy::new(
        &GalaxyConfig::new(Mode::DensityWave, Winding::Trailing)
            .with_particle_count(128)
            .with_eccentricity(0.0)
            .with_seed(9),
    )
    .unwrap();

    let before: Vec<f32> = galaxy.positions().iter().map(|&p| radius(p)).collect();
    for _ in 0..200 {
        galaxy.iterate();
    }
    for (r0, p) in before.iter().zip(galaxy.positions()) {
        assert!((r0 - radius(*p)).abs() < 1e-4);
    }
}
