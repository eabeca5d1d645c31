//! Events a weapon reports to passive observers (animation, UI, audio, damage).

use bevy::math::Vec2;
use serde::Serialize;

use super::Hand;
use crate::projectile::ProjectileSpawn;
use crate::target::TargetId;

/// One damage report: at most one per target per hit window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitReport {
    pub target: TargetId,
    pub damage: f32,
    pub hand: Hand,
    /// Generation of the window that produced the hit
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeaponEvent {
    Equipped { owner: TargetId },
    Unequipped,
    AttackStarted { hand: Hand },
    AttackEnded { hand: Hand },
    HitWindowOpened { hand: Hand, generation: u64 },
    /// A sweep reached its full sector; `early` when the window closed first.
    /// `final_polygon` is the full sector applied last.
    SweepFinished {
        hand: Hand,
        steps: usize,
        early: bool,
        final_polygon: Vec<Vec2>,
    },
    EntityHit(HitReport),
    ChargeStarted { hand: Hand },
    ChargeUpdated { hand: Hand, ratio: f32, level: f32 },
    ChargeReleased { hand: Hand, ratio: f32, damage: f32 },
    ChargeCancelled { hand: Hand },
    ProjectileLaunched(ProjectileSpawn),
}

impl WeaponEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WeaponEvent::Equipped { .. } => "equipped",
            WeaponEvent::Unequipped => "unequipped",
            WeaponEvent::AttackStarted { .. } => "attack_started",
            WeaponEvent::AttackEnded { .. } => "attack_ended",
            WeaponEvent::HitWindowOpened { .. } => "hit_window_opened",
            WeaponEvent::SweepFinished { .. } => "sweep_finished",
            WeaponEvent::EntityHit(_) => "entity_hit",
            WeaponEvent::ChargeStarted { .. } => "charge_started",
            WeaponEvent::ChargeUpdated { .. } => "charge_updated",
            WeaponEvent::ChargeReleased { .. } => "charge_released",
            WeaponEvent::ChargeCancelled { .. } => "charge_cancelled",
            WeaponEvent::ProjectileLaunched(_) => "projectile_launched",
        }
    }

    /// Hand the event concerns, if any
    pub fn hand(&self) -> Option<Hand> {
        match self {
            WeaponEvent::AttackStarted { hand }
            | WeaponEvent::AttackEnded { hand }
            | WeaponEvent::HitWindowOpened { hand, .. }
            | WeaponEvent::SweepFinished { hand, .. }
            | WeaponEvent::ChargeStarted { hand }
            | WeaponEvent::ChargeUpdated { hand, .. }
            | WeaponEvent::ChargeReleased { hand, .. }
            | WeaponEvent::ChargeCancelled { hand } => Some(*hand),
            WeaponEvent::EntityHit(report) => Some(report.hand),
            WeaponEvent::Equipped { .. }
            | WeaponEvent::Unequipped
            | WeaponEvent::ProjectileLaunched(_) => None,
        }
    }
}
