//! Melee crescent attacks, static and sweeping.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::{AimContext, AttackTiming};
use crate::geometry::{build_sector, oriented_arc, segment_count, ArcSpan, Sweep};

/// Shape of a crescent hitbox
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrescentArc {
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Angular width of the sector, (0, 360]
    pub arc_width_deg: f32,
    /// Rotation of the arc center away from the aim direction
    pub arc_center_offset_deg: f32,
}

impl Default for CrescentArc {
    fn default() -> Self {
        Self {
            inner_radius: 18.0,
            outer_radius: 28.0,
            arc_width_deg: 70.0,
            arc_center_offset_deg: 0.0,
        }
    }
}

impl CrescentArc {
    pub fn segments(&self) -> usize {
        segment_count(self.arc_width_deg)
    }

    /// Sector span for the given aim
    pub fn span(&self, ctx: &AimContext) -> ArcSpan {
        oriented_arc(
            ctx.origin,
            ctx.aim,
            self.arc_width_deg,
            self.arc_center_offset_deg,
            ctx.facing_left,
        )
    }

    /// Full sector polygon around `origin` for the given span
    pub fn polygon(&self, origin: Vec2, span: ArcSpan) -> Vec<Vec2> {
        build_sector(
            origin,
            self.inner_radius,
            self.outer_radius,
            span.start,
            span.end,
            self.segments(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrescentAttack {
    pub timing: AttackTiming,
    pub arc: CrescentArc,
}

impl CrescentAttack {
    /// Hitbox polygon relative to the weapon origin
    pub fn hitbox(&self, ctx: &AimContext) -> Vec<Vec2> {
        self.arc.polygon(Vec2::ZERO, self.arc.span(ctx))
    }
}

/// How a sweeping crescent reveals itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// true: grow start -> end, false: grow end -> start (mirrored when facing left)
    pub from_start_edge: bool,
    /// Degrees revealed per step. Loadouts below `MIN_SWEEP_STEP_DEGREES`
    /// are rejected; a `Sweep` built directly clamps up to it.
    pub step_deg: f32,
    /// Seconds between steps
    pub step_delay: f32,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            from_start_edge: true,
            step_deg: 6.0,
            step_delay: 0.016,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepingCrescentAttack {
    pub crescent: CrescentAttack,
    pub sweep: SweepSettings,
}

impl SweepingCrescentAttack {
    pub fn sweep(&self, ctx: &AimContext) -> Sweep {
        let arc = &self.crescent.arc;
        Sweep::new(
            Vec2::ZERO,
            arc.inner_radius,
            arc.outer_radius,
            arc.span(ctx),
            arc.segments(),
            self.sweep.step_deg,
            self.sweep.from_start_edge ^ ctx.facing_left,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::direction_angle;

    fn ctx(aim: Vec2, facing_left: bool) -> AimContext {
        AimContext {
            origin: Vec2::new(100.0, 100.0),
            aim,
            facing_left,
            owner: None,
        }
    }

    #[test]
    fn test_hitbox_is_local_to_weapon() {
        let attack = CrescentAttack {
            timing: AttackTiming::default(),
            arc: CrescentArc::default(),
        };
        let poly = attack.hitbox(&ctx(Vec2::new(200.0, 100.0), false));
        assert_eq!(poly.len(), 2 * 14 + 2);
        // centered on +X: first and last outer vertices symmetric about the axis
        assert!((poly[0].y + poly[14].y).abs() < 1e-3);
        assert!(poly.iter().all(|p| p.x > 0.0));
    }

    #[test]
    fn test_sweep_direction_mirrors_with_facing() {
        let attack = SweepingCrescentAttack {
            crescent: CrescentAttack {
                timing: AttackTiming::default(),
                arc: CrescentArc::default(),
            },
            sweep: SweepSettings::default(),
        };

        let mut right = attack.sweep(&ctx(Vec2::new(200.0, 100.0), false));
        right.advance();
        // growing from the start edge: start stays pinned
        assert!((right.current().start - right.target().start).abs() < 1e-6);

        let mut left = attack.sweep(&ctx(Vec2::new(0.0, 100.0), true));
        left.advance();
        // facing left flips the edge: end stays pinned
        assert!((left.current().end - left.target().end).abs() < 1e-6);
        assert!((direction_angle(Vec2::NEG_X) - left.target().center()).abs() < 1e-4);
    }
}
