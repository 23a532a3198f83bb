//! The orbit kinematics engine.
//!
//! A [`Galaxy`] owns a fixed-size particle ensemble laid out as parallel
//! arrays (semi-major axis, semi-minor axis, orbit orientation, orbital
//! angle) plus the derived position buffer that the presentation shell
//! uploads to the GPU. [`Galaxy::iterate`] advances the whole ensemble by
//! one frame according to the configured [`Mode`].
//!
//! The update rules are purely elementwise; the only cross-particle
//! coupling is the per-frame maximum-radius reduction in
//! [`Mode::Differential2`]. No particle is added or removed after
//! construction, and `a`, `b` and the eccentricity never change.
//!
//! Numerical fragility is part of the model: a particle sitting at the
//! origin in `differential_1`, or exactly at the rim in `differential_2`,
//! produces NaN/Inf that propagate into its position. Such a particle
//! simply renders off-screen; nothing is clamped or recovered.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::config::{GalaxyConfig, Mode, Winding};
use crate::error::ConfigError;
use crate::geometry::{ellipse_point, rotate};

/// Standard deviation of the half-normal semi-major-axis draw.
const SEMI_MAJOR_SIGMA: f32 = 0.5;

/// Floor for semi-major axes so `ln(a)` stays finite on a degenerate draw.
const SEMI_MAJOR_EPSILON: f32 = 1e-6;

/// Margin applied above the current maximum radius in `differential_2`.
/// A tuning constant inherited from the reference rates; kept literal.
const RIM_MARGIN: f32 = 1.1;

/// A fixed-size ensemble of particles on elliptical orbits.
pub struct Galaxy {
    mode: Mode,
    winding: Winding,
    eccentricity: f32,
    angular_velocity: f32,
    damping: f32,
    pattern_speed: f32,
    /// Semi-major axes, immutable after construction.
    a: Vec<f32>,
    /// Semi-minor axes, `a * sqrt(1 - e^2)`, immutable after construction.
    b: Vec<f32>,
    /// Rigid rotation orienting each ellipse in the plane. Mutated only by
    /// the pattern mode.
    orbit_angle: Vec<f32>,
    /// Position parameter along each particle's own ellipse. Accumulates
    /// without wraparound.
    angle: Vec<f32>,
    /// Derived Cartesian positions (z = 0), recomputed every frame.
    positions: Vec<Vec3>,
}

impl Galaxy {
    /// Validate `config` and build the initial ensemble.
    ///
    /// Configuration errors are reported here, before any allocation; the
    /// ensemble draw itself cannot fail.
    pub fn new(config: &GalaxyConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let n = config.particle_count;
        let mut galaxy = Self {
            mode: config.mode,
            winding: config.winding,
            eccentricity: config.eccentricity,
            angular_velocity: config
                .angular_velocity
                .unwrap_or_else(|| config.mode.default_angular_velocity()),
            damping: config.damping,
            pattern_speed: config.pattern_speed,
            a: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
            orbit_angle: Vec::with_capacity(n),
            angle: Vec::with_capacity(n),
            positions: Vec::with_capacity(n),
        };

        let mut rng = SmallRng::seed_from_u64(config.seed);
        galaxy.generate_data(&mut rng, config.alpha, n);
        Ok(galaxy)
    }

    /// Draw the per-particle orbital parameters and compute initial
    /// positions.
    fn generate_data(&mut self, rng: &mut SmallRng, alpha: f32, n: usize) {
        let e = self.eccentricity;
        let squash = (1.0 - e * e).sqrt();

        for _ in 0..n {
            let a = half_normal(rng, SEMI_MAJOR_SIGMA).max(SEMI_MAJOR_EPSILON);
            let b = a * squash;

            // Log-spiral arrangement of ellipse orientations; the winding
            // sign decides whether the arms trail or lead.
            let orbit_angle = match self.winding {
                Winding::Trailing => -alpha * a.ln(),
                Winding::Leading => alpha * a.ln(),
            };

            let angle = rng.gen::<f32>() * TAU;
            let p = rotate(ellipse_point(b, e, angle), orbit_angle);

            self.a.push(a);
            self.b.push(b);
            self.orbit_angle.push(orbit_angle);
            self.angle.push(angle);
            self.positions.push(Vec3::new(p.x, p.y, 0.0));
        }
    }

    /// Advance the whole ensemble by one frame, in place.
    ///
    /// Callers read [`positions`](Self::positions) only between calls;
    /// partial updates are never observable.
    pub fn iterate(&mut self) {
        match self.mode {
            Mode::Solid => self.step_solid(),
            Mode::Differential1 => self.step_differential_mild(),
            Mode::Differential2 => self.step_differential_rim(),
            Mode::DensityWave => self.step_density_wave(false),
            Mode::DensityWavePattern => self.step_density_wave(true),
        }
    }

    /// Rigid-body rotation: every particle keeps its current radius and
    /// advances its polar angle by the same constant.
    fn step_solid(&mut self) {
        let omega = self.angular_velocity;
        for (p, angle) in self.positions.iter_mut().zip(self.angle.iter_mut()) {
            let r = p.length();
            let theta = p.y.atan2(p.x) + omega;
            *angle = theta;
            p.x = r * theta.cos();
            p.y = r * theta.sin();
        }
    }

    /// Differential rotation with angular rate falling off as `r^damping`.
    /// A particle at the origin divides by zero; the NaN is intentional.
    fn step_differential_mild(&mut self) {
        let omega = self.angular_velocity;
        let damping = self.damping;
        for (p, angle) in self.positions.iter_mut().zip(self.angle.iter_mut()) {
            let r = p.length();
            let theta = p.y.atan2(p.x) + omega / r.powf(damping);
            *angle = theta;
            p.x = r * theta.cos();
            p.y = r * theta.sin();
        }
    }

    /// Differential rotation with the angular rate diverging toward the
    /// rim. Requires one full reduction over the ensemble per frame: the
    /// rim is `RIM_MARGIN` times the current maximum radius, recomputed
    /// before any particle moves.
    fn step_differential_rim(&mut self) {
        let mut r_max = 0.0f32;
        for p in &self.positions {
            r_max = r_max.max(p.length());
        }
        let rim = r_max * RIM_MARGIN;

        let omega = self.angular_velocity;
        let exponent = 1.0 / self.damping;
        for (p, angle) in self.positions.iter_mut().zip(self.angle.iter_mut()) {
            let r = p.length();
            let theta = p.y.atan2(p.x) + omega / (rim - r).powf(exponent);
            *angle = theta;
            p.x = r * theta.cos();
            p.y = r * theta.sin();
        }
    }

    /// Density-wave motion: each particle advances along its own fixed
    /// ellipse and its position is rebuilt from the orbital parameters, so
    /// no radial drift accumulates. With `precess` the spiral pattern
    /// itself slowly rotates, decoupled from the particle motion.
    fn step_density_wave(&mut self, precess: bool) {
        let step = match self.winding {
            Winding::Trailing => self.angular_velocity,
            Winding::Leading => -self.angular_velocity,
        };
        let e = self.eccentricity;

        for i in 0..self.positions.len() {
            self.angle[i] += step;
            if precess {
                self.orbit_angle[i] += self.pattern_speed;
            }
            let p = rotate(ellipse_point(self.b[i], e, self.angle[i]), self.orbit_angle[i]);
            self.positions[i] = Vec3::new(p.x, p.y, 0.0);
        }
    }

    /// Read-only view of the current particle positions (z = 0), valid
    /// between [`iterate`](Self::iterate) calls.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Current position of particle `i`.
    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        self.positions[i]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn eccentricity(&self) -> f32 {
        self.eccentricity
    }

    #[inline]
    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Semi-major axes, constant for the run.
    #[inline]
    pub fn semi_major_axes(&self) -> &[f32] {
        &self.a
    }

    /// Semi-minor axes, constant for the run.
    #[inline]
    pub fn semi_minor_axes(&self) -> &[f32] {
        &self.b
    }

    /// Current ellipse orientations.
    #[inline]
    pub fn orbit_angles(&self) -> &[f32] {
        &self.orbit_angle
    }

    /// Current per-particle orbital angles.
    #[inline]
    pub fn angles(&self) -> &[f32] {
        &self.angle
    }
}

/// |N(0, sigma)| via the Box-Muller transform over two uniform draws.
fn half_normal(rng: &mut SmallRng, sigma: f32) -> f32 {
    // gen() yields [0, 1); keep the log argument away from zero.
    let u1 = rng.gen::<f32>().max(f32::MIN_POSITIVE);
    let u2 = rng.gen::<f32>();
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    (z * sigma).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(mode: Mode) -> GalaxyConfig {
        GalaxyConfig::new(mode, Winding::Trailing)
            .with_particle_count(256)
            .with_seed(7)
    }

    #[test]
    fn half_normal_is_positive() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..10_000 {
            let x = half_normal(&mut rng, SEMI_MAJOR_SIGMA);
            assert!(x >= 0.0);
            assert!(x.is_finite());
        }
    }

    #[test]
    fn half_normal_scale_is_plausible() {
        // Mean of |N(0, sigma)| is sigma * sqrt(2/pi) ~ 0.3989 for sigma 0.5.
        let mut rng = SmallRng::seed_from_u64(2);
        let n = 50_000;
        let sum: f32 = (0..n).map(|_| half_normal(&mut rng, 0.5)).sum();
        let mean = sum / n as f32;
        assert!((mean - 0.3989).abs() < 0.02, "mean was {}", mean);
    }

    #[test]
    fn construction_derives_b_from_a() {
        let galaxy = Galaxy::new(&small_config(Mode::DensityWave)).unwrap();
        let e = galaxy.eccentricity();
        let squash = (1.0 - e * e).sqrt();
        for (a, b) in galaxy.semi_major_axes().iter().zip(galaxy.semi_minor_axes()) {
            assert!(*a > 0.0);
            assert!((b - a * squash).abs() < 1e-6);
        }
    }

    #[test]
    fn construction_is_reproducible_for_a_seed() {
        let g1 = Galaxy::new(&small_config(Mode::Solid)).unwrap();
        let g2 = Galaxy::new(&small_config(Mode::Solid)).unwrap();
        assert_eq!(g1.positions(), g2.positions());
        assert_eq!(g1.semi_major_axes(), g2.semi_major_axes());
    }

    #[test]
    fn trailing_and_leading_mirror_orbit_orientations() {
        let trailing = Galaxy::new(&small_config(Mode::DensityWave)).unwrap();
        let leading = Galaxy::new(
            &GalaxyConfig::new(Mode::DensityWave, Winding::Leading)
                .with_particle_count(256)
                .with_seed(7),
        )
        .unwrap();
        for (t, l) in trailing.orbit_angles().iter().zip(leading.orbit_angles()) {
            assert!((t + l).abs() < 1e-6);
        }
    }

    #[test]
    fn initial_positions_lie_on_the_rotated_ellipse() {
        let galaxy = Galaxy::new(&small_config(Mode::DensityWave)).unwrap();
        let e = galaxy.eccentricity();
        for i in 0..galaxy.len() {
            let expected = rotate(
                ellipse_point(galaxy.semi_minor_axes()[i], e, galaxy.angles()[i]),
                galaxy.orbit_angles()[i],
            );
            let p = galaxy.position(i);
            assert!((p.x - expected.x).abs() < 1e-5);
            assert!((p.y - expected.y).abs() < 1e-5);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn invalid_config_builds_no_ensemble() {
        let config = small_config(Mode::Solid).with_eccentricity(1.5);
        assert!(Galaxy::new(&config).is_err());
    }

    #[test]
    fn angular_velocity_override_wins_over_mode_default() {
        let config = small_config(Mode::Solid).with_angular_velocity(0.5);
        let galaxy = Galaxy::new(&config).unwrap();
        assert_eq!(galaxy.angular_velocity(), 0.5);

        let galaxy = Galaxy::new(&small_config(Mode::Differential2)).unwrap();
        assert_eq!(galaxy.angular_velocity(), 0.1);
    }
}
