//! Projectile volleys.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{AimContext, AttackTiming};
use crate::geometry::aim_direction;
use crate::projectile::ProjectileSpawn;

/// Where projectiles appear relative to the wielder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnOrigin {
    /// Weapon position plus an offset whose x mirrors when facing left
    WeaponOffset { offset: [f32; 2] },
    /// A fixed distance from the weapon toward the aim point
    TowardAim { distance: f32 },
}

impl Default for SpawnOrigin {
    fn default() -> Self {
        SpawnOrigin::WeaponOffset { offset: [0.0, 0.0] }
    }
}

impl SpawnOrigin {
    pub fn resolve(&self, origin: Vec2, direction: Vec2, facing_left: bool) -> Vec2 {
        match *self {
            SpawnOrigin::WeaponOffset { offset: [x, y] } => {
                let x = if facing_left { -x } else { x };
                origin + Vec2::new(x, y)
            }
            SpawnOrigin::TowardAim { distance } => origin + direction * distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileAttack {
    pub timing: AttackTiming,
    /// Projectile scene/template key; `None` means the slot is misconfigured
    pub template: Option<String>,
    pub speed: f32,
    pub lifetime: f32,
    pub count: u32,
    /// Total fan width across all projectiles
    pub spread_deg: f32,
    pub destroy_on_hit: bool,
    #[serde(default)]
    pub spawn: SpawnOrigin,
}

impl ProjectileAttack {
    /// Angular offset (radians) of projectile `index` within the fan
    pub fn spread_offset(&self, index: u32) -> f32 {
        if self.count <= 1 {
            return 0.0;
        }
        let total = self.spread_deg.to_radians();
        let step = total / (self.count - 1) as f32;
        -total * 0.5 + step * index as f32
    }

    /// Spawn descriptions for one activation, or `None` without a template.
    pub fn volley(&self, ctx: &AimContext) -> Option<Vec<ProjectileSpawn>> {
        let Some(template) = self.template.as_deref() else {
            warn!(target: "arsenal_core::attack", "projectile attack has no projectile template, skipping volley");
            return None;
        };

        let base = aim_direction(ctx.origin, ctx.aim, ctx.facing_left);
        let position = self.spawn.resolve(ctx.origin, base, ctx.facing_left);

        let spawns = (0..self.count)
            .map(|i| ProjectileSpawn {
                template: template.to_string(),
                position,
                direction: Vec2::from_angle(self.spread_offset(i)).rotate(base),
                speed: self.speed,
                damage: self.timing.damage,
                lifetime: self.lifetime,
                owner: ctx.owner,
                destroy_on_hit: self.destroy_on_hit,
            })
            .collect();
        Some(spawns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetId;

    fn attack(count: u32, spread_deg: f32, spawn: SpawnOrigin) -> ProjectileAttack {
        ProjectileAttack {
            timing: AttackTiming {
                damage: 8.0,
                ..Default::default()
            },
            template: Some("arrow".into()),
            speed: 300.0,
            lifetime: 5.0,
            count,
            spread_deg,
            destroy_on_hit: true,
            spawn,
        }
    }

    fn ctx(aim: Vec2, facing_left: bool) -> AimContext {
        AimContext {
            origin: Vec2::ZERO,
            aim,
            facing_left,
            owner: Some(TargetId(3)),
        }
    }

    #[test]
    fn test_fan_is_symmetric() {
        let a = attack(3, 30.0, SpawnOrigin::default());
        assert!((a.spread_offset(0) + 15f32.to_radians()).abs() < 1e-6);
        assert!(a.spread_offset(1).abs() < 1e-6);
        assert!((a.spread_offset(2) - 15f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_volley_directions_and_owner() {
        let a = attack(3, 90.0, SpawnOrigin::default());
        let spawns = a.volley(&ctx(Vec2::new(10.0, 0.0), false)).unwrap();
        assert_eq!(spawns.len(), 3);
        assert!((spawns[1].direction - Vec2::X).length() < 1e-5);
        assert!((spawns[0].direction.y + spawns[2].direction.y).abs() < 1e-5);
        assert!(spawns.iter().all(|s| s.owner == Some(TargetId(3))));
        assert!(spawns.iter().all(|s| (s.damage - 8.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_offset_mirrors_when_facing_left() {
        let a = attack(1, 0.0, SpawnOrigin::WeaponOffset { offset: [4.0, -2.0] });
        let right = a.volley(&ctx(Vec2::new(10.0, 0.0), false)).unwrap();
        let left = a.volley(&ctx(Vec2::new(-10.0, 0.0), true)).unwrap();
        assert_eq!(right[0].position, Vec2::new(4.0, -2.0));
        assert_eq!(left[0].position, Vec2::new(-4.0, -2.0));
    }

    #[test]
    fn test_toward_aim_spawn() {
        let a = attack(1, 0.0, SpawnOrigin::TowardAim { distance: 5.0 });
        let spawns = a.volley(&ctx(Vec2::new(0.0, 20.0), false)).unwrap();
        assert!((spawns[0].position - Vec2::new(0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_degenerate_aim_uses_facing() {
        let a = attack(1, 0.0, SpawnOrigin::default());
        let spawns = a.volley(&ctx(Vec2::ZERO, true)).unwrap();
        assert_eq!(spawns[0].direction, Vec2::NEG_X);
    }

    #[test]
    fn test_missing_template_skips() {
        let mut a = attack(2, 10.0, SpawnOrigin::default());
        a.template = None;
        assert!(a.volley(&ctx(Vec2::X, false)).is_none());
    }
}
