//! Run configuration for the orbit kinematics engine.
//!
//! Mode selection is a closed enum rather than a runtime string: the
//! compiler checks exhaustiveness of the per-mode update rules, and unknown
//! mode names are rejected before any ensemble is built.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// The five kinematic models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Rigid-body rotation: every particle advances at the same angular rate.
    #[value(name = "solid")]
    Solid,
    /// Mild differential rotation: angular rate falls off as `r^damping`.
    #[value(name = "differential_1")]
    Differential1,
    /// Rim-limited differential rotation: angular rate diverges toward the
    /// current maximum radius.
    #[value(name = "differential_2")]
    Differential2,
    /// Particles travel along their own fixed elliptical orbits.
    #[value(name = "density_wave")]
    DensityWave,
    /// Density-wave motion plus a slow precession of the spiral pattern.
    #[value(name = "density_wave_pattern")]
    DensityWavePattern,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Solid,
        Mode::Differential1,
        Mode::Differential2,
        Mode::DensityWave,
        Mode::DensityWavePattern,
    ];

    /// Canonical name, matching the CLI spelling.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Solid => "solid",
            Mode::Differential1 => "differential_1",
            Mode::Differential2 => "differential_2",
            Mode::DensityWave => "density_wave",
            Mode::DensityWavePattern => "density_wave_pattern",
        }
    }

    /// Per-mode default angular step per frame, in radians.
    pub fn default_angular_velocity(self) -> f32 {
        match self {
            Mode::Solid => 0.01,
            Mode::Differential1 => 0.02,
            Mode::Differential2 => 0.1,
            Mode::DensityWave | Mode::DensityWavePattern => 0.01,
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sign convention for the log-spiral arrangement of orbit orientations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Winding {
    /// Spiral arms trail the direction of rotation (negative orientation).
    Trailing,
    /// Spiral arms lead the direction of rotation.
    Leading,
}

impl Winding {
    pub fn name(self) -> &'static str {
        match self {
            Winding::Trailing => "trailing",
            Winding::Leading => "leading",
        }
    }
}

impl FromStr for Winding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trailing" => Ok(Winding::Trailing),
            "leading" => Ok(Winding::Leading),
            _ => Err(ConfigError::UnknownWinding(s.to_string())),
        }
    }
}

impl fmt::Display for Winding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for a [`Galaxy`](crate::Galaxy).
///
/// Use method chaining to override defaults:
///
/// ```
/// use whorl::{GalaxyConfig, Mode, Winding};
///
/// let config = GalaxyConfig::new(Mode::DensityWave, Winding::Trailing)
///     .with_particle_count(10_000)
///     .with_eccentricity(0.6)
///     .with_seed(42);
/// ```
#[derive(Clone, Debug)]
pub struct GalaxyConfig {
    /// Kinematic model applied every frame.
    pub mode: Mode,
    /// Trailing or leading spiral arms.
    pub winding: Winding,
    /// Ensemble size, fixed for the whole run.
    pub particle_count: usize,
    /// Shared eccentricity of every orbit, in `[0, 1)`.
    pub eccentricity: f32,
    /// Log-spiral pitch factor for orbit orientations.
    pub alpha: f32,
    /// Angular step per frame; `None` uses the mode default.
    pub angular_velocity: Option<f32>,
    /// Radial damping exponent for the differential modes.
    pub damping: f32,
    /// Per-frame precession of the spiral pattern (pattern mode only).
    pub pattern_speed: f32,
    /// RNG seed for the ensemble draw.
    pub seed: u64,
}

impl GalaxyConfig {
    pub fn new(mode: Mode, winding: Winding) -> Self {
        Self {
            mode,
            winding,
            particle_count: 100_000,
            eccentricity: 0.6,
            alpha: 2.0,
            angular_velocity: None,
            damping: 0.3,
            pattern_speed: 0.001,
            seed: 0,
        }
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_eccentricity(mut self, eccentricity: f32) -> Self {
        self.eccentricity = eccentricity;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_angular_velocity(mut self, omega: f32) -> Self {
        self.angular_velocity = Some(omega);
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_pattern_speed(mut self, speed: f32) -> Self {
        self.pattern_speed = speed;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the fail-fast configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ConfigError::InvalidEccentricity(self.eccentricity));
        }
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        Ok(())
    }
}
