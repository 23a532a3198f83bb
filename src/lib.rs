//! # whorl - spiral galaxy orbit simulator
//!
//! Simulates tens of thousands of particles on elliptical orbits under a
//! handful of kinematic models (rigid rotation, differential rotation,
//! density waves) and renders them as an additive GPU point cloud, either
//! live in a window or exported as a PNG frame sequence.
//!
//! ## Quick Start
//!
//! ```no_run
//! use whorl::app::{self, RunOptions};
//! use whorl::{GalaxyConfig, Mode, Winding};
//!
//! let config = GalaxyConfig::new(Mode::DensityWave, Winding::Trailing)
//!     .with_particle_count(100_000)
//!     .with_seed(42);
//!
//! app::run(RunOptions::new(config)).unwrap();
//! ```
//!
//! ## Core Concepts
//!
//! ### The kinematics engine
//!
//! [`Galaxy`] owns the particle ensemble: per-particle semi-major/minor
//! axes, orbit orientation, and orbital angle, plus the derived position
//! buffer. [`Galaxy::iterate`] advances everything by one frame; the shell
//! reads [`Galaxy::positions`] between calls for GPU upload and trajectory
//! sampling.
//!
//! ### Modes
//!
//! | Mode | Motion |
//! |------|--------|
//! | [`Mode::Solid`] | every particle rotates at the same rate |
//! | [`Mode::Differential1`] | angular rate falls off with radius |
//! | [`Mode::Differential2`] | angular rate diverges toward the rim |
//! | [`Mode::DensityWave`] | particles ride their own fixed ellipses |
//! | [`Mode::DensityWavePattern`] | density wave plus pattern precession |
//!
//! The spiral appearance comes from the initialization: ellipse
//! orientations follow `±alpha * ln(a)`, a logarithmic spiral over the
//! semi-major axes.
//!
//! ### Numerical honesty
//!
//! The update formulas are reproduced exactly, singularities included: a
//! particle at the origin in `differential_1`, or at the rim in
//! `differential_2`, goes NaN and simply stops rendering. Configuration
//! errors, in contrast, are rejected before anything is built.

pub mod app;
pub mod capture;
pub mod clock;
pub mod config;
pub mod error;
pub mod galaxy;
pub mod geometry;
pub mod render;
mod shader;
pub mod trajectory;

pub use config::{GalaxyConfig, Mode, Winding};
pub use error::{CaptureError, ConfigError, RenderError, ShellError};
pub use galaxy::Galaxy;
pub use glam::{Vec2, Vec3};
pub use trajectory::Trajectory;
