//! Trajectory sampling for individual particles.
//!
//! The shell can follow a handful of particle indices across frames,
//! keeping a bounded history of their recent positions. The history is
//! drawn as a second point-sprite layer so single-particle orbits stay
//! visible inside the hundred-thousand-point cloud.

use glam::Vec3;

/// Default history length, one point per frame (30 s at 60 fps).
pub const DEFAULT_TRAIL_LENGTH: usize = 1800;

/// Bounded position history for one tracked particle.
pub struct Trajectory {
    /// Index of the tracked particle in the ensemble.
    particle_index: usize,
    /// RGBA draw color.
    color: [f32; 4],
    points: Vec<Vec3>,
    capacity: usize,
}

impl Trajectory {
    pub fn new(particle_index: usize, color: [f32; 4]) -> Self {
        Self::with_capacity(particle_index, color, DEFAULT_TRAIL_LENGTH)
    }

    pub fn with_capacity(particle_index: usize, color: [f32; 4], capacity: usize) -> Self {
        Self {
            particle_index,
            color,
            points: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append the particle's current position, dropping the oldest sample
    /// once the history is full.
    pub fn record(&mut self, position: Vec3) {
        if self.points.len() == self.capacity {
            self.points.remove(0);
        }
        self.points.push(position);
    }

    #[inline]
    pub fn particle_index(&self) -> usize {
        self.particle_index
    }

    #[inline]
    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Recorded positions, oldest first.
    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut traj = Trajectory::with_capacity(0, [1.0; 4], 8);
        for i in 0..3 {
            traj.record(Vec3::new(i as f32, 0.0, 0.0));
        }
        assert_eq!(traj.len(), 3);
        assert_eq!(traj.points()[0].x, 0.0);
        assert_eq!(traj.points()[2].x, 2.0);
    }

    #[test]
    fn history_is_bounded() {
        let mut traj = Trajectory::with_capacity(0, [1.0; 4], 4);
        for i in 0..10 {
            traj.record(Vec3::new(i as f32, 0.0, 0.0));
        }
        assert_eq!(traj.len(), 4);
        // Oldest samples are dropped first.
        assert_eq!(traj.points()[0].x, 6.0);
        assert_eq!(traj.points()[3].x, 9.0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut traj = Trajectory::with_capacity(0, [1.0; 4], 0);
        traj.record(Vec3::ZERO);
        traj.record(Vec3::ONE);
        assert_eq!(traj.len(), 1);
        assert_eq!(traj.points()[0], Vec3::ONE);
    }
}
