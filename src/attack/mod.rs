//! Attack behaviors.
//!
//! An attack slot holds either an instant behavior or a charge decorator
//! wrapping one. Behaviors are immutable configuration: activating one
//! returns what should appear in the world (a hitbox, a sweep, a volley)
//! and never changes the behavior itself.
//!
//! Variants:
//! - `Crescent`: a ring-sector hitbox aimed at the captured target
//! - `SweepingCrescent`: the same sector revealed step by step
//! - `Projectile`: a fan of independent projectiles

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Sweep;
use crate::projectile::ProjectileSpawn;
use crate::target::TargetId;

pub mod charge;
pub mod crescent;
pub mod volley;

pub use charge::{
    ChargeProfile, ChargeSession, ChargedAttack, ChargedRelease, ProjectileChargeScaling,
    RatioOrigin,
};
pub use crescent::{CrescentArc, CrescentAttack, SweepSettings, SweepingCrescentAttack};
pub use volley::{ProjectileAttack, SpawnOrigin};

/// Timing and damage shared by every attack kind (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackTiming {
    pub damage: f32,
    pub cooldown: f32,
    pub windup: f32,
    pub active: f32,
}

impl Default for AttackTiming {
    fn default() -> Self {
        Self {
            damage: 10.0,
            cooldown: 0.5,
            windup: 0.1,
            active: 0.2,
        }
    }
}

/// Where and how an attack is being aimed at the moment it activates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimContext {
    /// Weapon position in world space
    pub origin: Vec2,
    /// Aim point captured when the attack began
    pub aim: Vec2,
    pub facing_left: bool,
    pub owner: Option<TargetId>,
}

/// What an activation puts into the world
#[derive(Debug, Clone)]
pub enum Activation {
    /// Static hitbox polygon, relative to the weapon origin
    Hitbox(Vec<Vec2>),
    /// Hitbox revealed progressively, one step per `step_delay`
    Sweep { sweep: Sweep, step_delay: f32 },
    /// Projectiles to launch
    Volley(Vec<ProjectileSpawn>),
    /// Nothing could be produced (missing template); already logged
    Skipped,
}

/// One executable attack kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackBehavior {
    Crescent(CrescentAttack),
    SweepingCrescent(SweepingCrescentAttack),
    Projectile(ProjectileAttack),
}

impl AttackBehavior {
    pub fn timing(&self) -> &AttackTiming {
        match self {
            AttackBehavior::Crescent(c) => &c.timing,
            AttackBehavior::SweepingCrescent(s) => &s.crescent.timing,
            AttackBehavior::Projectile(p) => &p.timing,
        }
    }

    fn timing_mut(&mut self) -> &mut AttackTiming {
        match self {
            AttackBehavior::Crescent(c) => &mut c.timing,
            AttackBehavior::SweepingCrescent(s) => &mut s.crescent.timing,
            AttackBehavior::Projectile(p) => &mut p.timing,
        }
    }

    /// Copy of this behavior dealing `damage` instead of its base damage
    pub fn with_damage(&self, damage: f32) -> Self {
        let mut copy = self.clone();
        copy.timing_mut().damage = damage;
        copy
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AttackBehavior::Crescent(_) => "crescent",
            AttackBehavior::SweepingCrescent(_) => "sweeping_crescent",
            AttackBehavior::Projectile(_) => "projectile",
        }
    }

    /// Realize the attack at the activation instant.
    pub fn activate(&self, ctx: &AimContext) -> Activation {
        match self {
            AttackBehavior::Crescent(c) => Activation::Hitbox(c.hitbox(ctx)),
            AttackBehavior::SweepingCrescent(s) => Activation::Sweep {
                sweep: s.sweep(ctx),
                step_delay: s.sweep.step_delay.max(0.0),
            },
            AttackBehavior::Projectile(p) => match p.volley(ctx) {
                Some(spawns) => Activation::Volley(spawns),
                None => Activation::Skipped,
            },
        }
    }
}

/// Contents of a weapon's light or heavy slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackSlot {
    Instant(AttackBehavior),
    Charged(ChargedAttack),
}

impl AttackSlot {
    pub fn timing(&self) -> &AttackTiming {
        self.behavior().timing()
    }

    /// The executable behavior, unwrapping a charge decorator
    pub fn behavior(&self) -> &AttackBehavior {
        match self {
            AttackSlot::Instant(b) => b,
            AttackSlot::Charged(c) => &c.attack,
        }
    }

    pub fn as_charged(&self) -> Option<&ChargedAttack> {
        match self {
            AttackSlot::Charged(c) => Some(c),
            AttackSlot::Instant(_) => None,
        }
    }

    pub fn is_chargeable(&self) -> bool {
        self.as_charged().is_some()
    }
}

impl From<AttackBehavior> for AttackSlot {
    fn from(behavior: AttackBehavior) -> Self {
        AttackSlot::Instant(behavior)
    }
}

impl From<ChargedAttack> for AttackSlot {
    fn from(charged: ChargedAttack) -> Self {
        AttackSlot::Charged(charged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crescent() -> AttackBehavior {
        AttackBehavior::Crescent(CrescentAttack {
            timing: AttackTiming::default(),
            arc: CrescentArc::default(),
        })
    }

    #[test]
    fn test_with_damage_leaves_original_untouched() {
        let base = crescent();
        let boosted = base.with_damage(99.0);
        assert!((boosted.timing().damage - 99.0).abs() < f32::EPSILON);
        assert!((base.timing().damage - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_slot_unwraps_charge_decorator() {
        let slot = AttackSlot::Charged(ChargedAttack {
            charge: ChargeProfile::default(),
            attack: crescent(),
            projectile_scaling: None,
        });
        assert!(slot.is_chargeable());
        assert_eq!(slot.behavior().kind(), "crescent");
        assert!(!AttackSlot::from(crescent()).is_chargeable());
    }
}
