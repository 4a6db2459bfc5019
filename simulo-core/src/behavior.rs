/// Per-kind update behaviour: particles and the root game object
use std::collections::HashSet;

use log::{debug, trace};
use nalgebra::Vector2;

use crate::config::GameConfig;
use crate::error::Result;
use crate::host::ImageId;
use crate::material::Material;
use crate::node::{Node, NodeHandle, NodeKind, NodeState};
use crate::pose::Pose;
use crate::scene::Scene;

/// A short-lived node that drifts at a constant velocity and detaches itself
/// from its parent once its lifetime has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    velocity: Vector2<f32>,
    lifetime: f32,
    age: f32,
    shrink: f32,
}

impl Particle {
    pub fn new(velocity: Vector2<f32>, lifetime: f32) -> Self {
        Self {
            velocity,
            lifetime,
            age: 0.0,
            shrink: 0.0,
        }
    }

    /// Lose `shrink` units of scale per second, bottoming out at zero
    pub fn with_shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn velocity(&self) -> Vector2<f32> {
        self.velocity
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn remaining(&self) -> f32 {
        self.lifetime - self.age
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Root object: spawns particles and reacts to pose events
pub struct Game {
    config: GameConfig,
    particle_material: Material,
    subjects: HashSet<i32>,
}

impl Game {
    /// Create the root node and its initial particles. The caller installs the
    /// returned handle with `Scene::set_root`.
    pub fn create(scene: &Scene, config: GameConfig) -> Result<NodeHandle> {
        let tint = config.root_tint;
        let white_material = scene.create_material(ImageId::SOLID, tint.x, tint.y, tint.z)?;
        let tint = config.particle_tint;
        let particle_material = scene.create_material(ImageId::SOLID, tint.x, tint.y, tint.z)?;

        let game = Game {
            config: config.clone(),
            particle_material: particle_material.clone(),
            subjects: HashSet::new(),
        };
        let root = scene.create(&white_material, NodeKind::Root(Box::new(game)))?;

        let (width, height) = scene.host().window_size();
        let centre = Vector2::new((width / 2) as f32, (height / 2) as f32);
        let count = config.initial_particles as i32;
        for i in 0..count {
            let step = (i - count / 2) as f32;
            let scale = config.particle_scale + step / 2.0;
            let lifetime = if config.particle_shrink > 0.0 {
                scale / config.particle_shrink
            } else {
                f32::INFINITY
            };
            let particle =
                Particle::new(config.particle_velocity, lifetime).with_shrink(config.particle_shrink);
            spawn_particle(
                scene,
                &root,
                &particle_material,
                centre + Vector2::repeat(step * config.particle_spacing),
                scale,
                particle,
            )?;
        }
        debug!("Created root {} with {} particles", root.id(), count);
        Ok(root)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_tracking(&self, subject: i32) -> bool {
        self.subjects.contains(&subject)
    }

    /// Offset applied to every descendant for a tick of `delta` seconds
    pub fn drift(&self, delta: f32) -> Vector2<f32> {
        Vector2::new(0.0, -self.config.drift_speed * delta)
    }

    /// A subject appeared, moved, or left. Each sighting spawns a particle at
    /// the subject's nose.
    pub fn on_pose(
        &mut self,
        scene: &Scene,
        root: &NodeHandle,
        subject: i32,
        pose: Option<Pose>,
    ) -> Result<()> {
        let Some(pose) = pose else {
            if self.subjects.remove(&subject) {
                debug!("Subject {} left", subject);
            }
            return Ok(());
        };
        if self.subjects.insert(subject) {
            debug!("Subject {} appeared", subject);
        }

        let spread = self.config.pose_particle_spread;
        let vx = if spread > 0.0 {
            (scene.host().random() * 2.0 - 1.0) * spread
        } else {
            0.0
        };
        let particle = Particle::new(Vector2::new(vx, 0.0), self.config.pose_particle_lifetime);
        spawn_particle(
            scene,
            root,
            &self.particle_material,
            pose.nose(),
            self.config.pose_particle_scale,
            particle,
        )
    }
}

/// Create a particle node and immediately attach it under `parent`.
pub fn spawn_particle(
    scene: &Scene,
    parent: &NodeHandle,
    material: &Material,
    position: Vector2<f32>,
    scale: f32,
    particle: Particle,
) -> Result<()> {
    let node = scene.create(material, NodeKind::Particle(particle))?;
    {
        let mut node = node.borrow_mut();
        node.set_position(position);
        node.set_scale(Vector2::repeat(scale));
    }
    scene.add_child(parent, node);
    Ok(())
}

/// Advance one node by one tick.
pub(crate) fn update(scene: &Scene, handle: &NodeHandle, delta: f32) -> Result<()> {
    let mut node = handle.borrow_mut();
    if node.state() == NodeState::PendingRemoval {
        trace!("Skipping update of detached {}", node.id());
        return Ok(());
    }
    trace!("Updating {} ({}) delta={}", node.id(), node.kind().name(), delta);

    if let NodeKind::Root(game) = node.kind() {
        let drift = game.drift(delta);
        drop(node);
        return nudge_descendants(scene, handle, drift);
    }
    tick_particle(&mut node, delta);
    Ok(())
}

/// Route a pose event to the root's game behaviour.
pub(crate) fn pose_update(
    scene: &Scene,
    root: &NodeHandle,
    subject: i32,
    pose: Option<Pose>,
) -> Result<()> {
    let mut node = root.borrow_mut();
    match node.kind_mut() {
        NodeKind::Root(game) => game.on_pose(scene, root, subject, pose),
        other => {
            debug!("Root is a {} node; ignoring pose of subject {}", other.name(), subject);
            Ok(())
        }
    }
}

fn tick_particle(node: &mut Node, delta: f32) {
    let (velocity, shrink, expired) = match node.kind_mut() {
        NodeKind::Particle(particle) => {
            particle.age += delta;
            (particle.velocity, particle.shrink, particle.is_expired())
        }
        _ => return,
    };

    node.translate(velocity * delta);
    if shrink != 0.0 {
        let scale = node.scale().map(|s| (s - shrink * delta).max(0.0));
        node.set_scale(scale);
    }
    if expired {
        debug!("Particle {} expired", node.id());
        node.remove_from_parent();
    }
}

fn nudge_descendants(scene: &Scene, parent: &NodeHandle, offset: Vector2<f32>) -> Result<()> {
    for child in scene.children(parent)? {
        child.borrow_mut().translate(offset);
        nudge_descendants(scene, &child, offset)?;
    }
    Ok(())
}
