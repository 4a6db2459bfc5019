/// Tunables for the root game behaviour
use nalgebra::{Vector2, Vector3};

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Particles laid out around the window centre when the root is created
    pub initial_particles: u32,
    /// Diagonal distance between neighbouring initial particles
    pub particle_spacing: f32,
    pub particle_scale: f32,
    pub particle_velocity: Vector2<f32>,
    /// Scale lost per second; initial particles live until it reaches zero
    pub particle_shrink: f32,
    /// Speed at which the root pushes every descendant towards -Y
    pub drift_speed: f32,
    pub pose_particle_lifetime: f32,
    pub pose_particle_scale: f32,
    /// Maximum horizontal speed randomly given to pose particles
    pub pose_particle_spread: f32,
    pub root_tint: Vector3<f32>,
    pub particle_tint: Vector3<f32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_particles: 5,
            particle_spacing: 10.0,
            particle_scale: 10.0,
            particle_velocity: Vector2::new(0.0, 20.0),
            particle_shrink: 2.0,
            drift_speed: 10.0,
            pose_particle_lifetime: 3.0,
            pose_particle_scale: 10.0,
            pose_particle_spread: 0.0,
            root_tint: Vector3::new(1.0, 1.0, 1.0),
            particle_tint: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}
