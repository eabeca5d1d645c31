//! Independent projectile bodies.
//!
//! A projectile moves in a straight line at constant speed until its
//! lifetime runs out, it hits solid terrain, or (for one-shot projectiles)
//! it lands its first valid hit. Collision detection is the environment's
//! job; this module only arbitrates the contacts it is told about.

use bevy::math::Vec2;
use std::collections::HashSet;

use crate::target::TargetId;

/// Everything needed to put one projectile into the world
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSpawn {
    pub template: String,
    pub position: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub lifetime: f32,
    pub owner: Option<TargetId>,
    pub destroy_on_hit: bool,
}

/// What a projectile touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Walls, static props: always stop the projectile
    Solid,
    /// Bodies that projectiles fly through (other characters' movement colliders, triggers)
    PassThrough,
}

/// Why a projectile left the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnReason {
    Expired,
    HitTarget,
    HitObstacle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileEvent {
    Hit { target: TargetId, damage: f32 },
    Despawned(DespawnReason),
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub template: String,
    pub position: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub remaining_lifetime: f32,
    pub owner: Option<TargetId>,
    pub destroy_on_hit: bool,
    already_hit: HashSet<TargetId>,
    alive: bool,
}

impl Projectile {
    pub fn new(spawn: ProjectileSpawn) -> Self {
        let direction = spawn.direction.normalize_or_zero();
        Self {
            template: spawn.template,
            position: spawn.position,
            direction,
            speed: spawn.speed,
            damage: spawn.damage,
            remaining_lifetime: spawn.lifetime,
            owner: spawn.owner,
            destroy_on_hit: spawn.destroy_on_hit,
            already_hit: HashSet::new(),
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    pub fn hit_count(&self) -> usize {
        self.already_hit.len()
    }

    pub fn has_hit(&self, target: TargetId) -> bool {
        self.already_hit.contains(&target)
    }

    /// Advance one step. Returns the expiry event on the tick the lifetime runs out.
    pub fn tick(&mut self, dt: f32) -> Option<ProjectileEvent> {
        if !self.alive || !dt.is_finite() || dt <= 0.0 {
            return None;
        }

        self.position += self.velocity() * dt;
        self.remaining_lifetime -= dt;

        if self.remaining_lifetime <= 0.0 {
            self.remaining_lifetime = 0.0;
            self.alive = false;
            return Some(ProjectileEvent::Despawned(DespawnReason::Expired));
        }
        None
    }

    /// A potential target entered the projectile's hit area.
    ///
    /// Returns the hit and, for one-shot projectiles, the despawn that follows it.
    pub fn on_target_contact(&mut self, target: TargetId) -> Vec<ProjectileEvent> {
        if !self.alive || Some(target) == self.owner || !self.already_hit.insert(target) {
            return Vec::new();
        }

        let mut events = vec![ProjectileEvent::Hit {
            target,
            damage: self.damage,
        }];
        if self.destroy_on_hit {
            self.alive = false;
            events.push(ProjectileEvent::Despawned(DespawnReason::HitTarget));
        }
        events
    }

    /// The projectile's body touched world geometry or another body.
    pub fn on_obstacle_contact(
        &mut self,
        body: TargetId,
        kind: ObstacleKind,
    ) -> Option<ProjectileEvent> {
        if !self.alive || Some(body) == self.owner || kind == ObstacleKind::PassThrough {
            return None;
        }
        self.alive = false;
        Some(ProjectileEvent::Despawned(DespawnReason::HitObstacle))
    }
}
