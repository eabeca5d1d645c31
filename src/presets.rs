//! Built-in weapon templates.
//!
//! Used by the demo binary and tests, and as the default `ArsenalConfig`.

use crate::attack::{
    AttackBehavior, AttackSlot, AttackTiming, ChargeProfile, ChargedAttack, CrescentArc,
    CrescentAttack, ProjectileAttack, ProjectileChargeScaling, RatioOrigin, SpawnOrigin,
    SweepSettings, SweepingCrescentAttack,
};
use crate::config::WeaponLoadout;
use crate::constants::DEFAULT_LIFE_EXPONENT;
use crate::weapon::ChargeClock;

/// Quick crescent slash, heavier wide slash
pub fn crescent_sword() -> WeaponLoadout {
    WeaponLoadout {
        name: "Crescent Sword".into(),
        description: "Balanced blade with a narrow light arc and a wide heavy arc".into(),
        light: Some(AttackSlot::Instant(AttackBehavior::Crescent(CrescentAttack {
            timing: AttackTiming {
                damage: 12.0,
                cooldown: 0.5,
                windup: 0.1,
                active: 0.25,
            },
            arc: CrescentArc::default(),
        }))),
        heavy: Some(AttackSlot::Instant(AttackBehavior::Crescent(CrescentAttack {
            timing: AttackTiming {
                damage: 28.0,
                cooldown: 1.2,
                windup: 0.1,
                active: 0.75,
            },
            arc: CrescentArc {
                inner_radius: 20.0,
                outer_radius: 36.0,
                arc_width_deg: 140.0,
                arc_center_offset_deg: 15.0,
            },
        }))),
        charge_clock: ChargeClock::Simulation,
        auto_apply_damage: true,
    }
}

/// Both attacks sweep across their arc
pub fn sweeping_scythe() -> WeaponLoadout {
    let sweep = |damage, cooldown, active, width, from_start_edge| {
        AttackSlot::Instant(AttackBehavior::SweepingCrescent(SweepingCrescentAttack {
            crescent: CrescentAttack {
                timing: AttackTiming {
                    damage,
                    cooldown,
                    windup: 0.12,
                    active,
                },
                arc: CrescentArc {
                    inner_radius: 22.0,
                    outer_radius: 40.0,
                    arc_width_deg: width,
                    arc_center_offset_deg: 0.0,
                },
            },
            sweep: SweepSettings {
                from_start_edge,
                step_deg: 6.0,
                step_delay: 0.016,
            },
        }))
    };

    WeaponLoadout {
        name: "Sweeping Scythe".into(),
        description: "Reaping arcs that travel across the swing".into(),
        light: Some(sweep(15.0, 0.6, 0.35, 120.0, true)),
        heavy: Some(sweep(34.0, 1.5, 0.7, 240.0, false)),
        charge_clock: ChargeClock::Simulation,
        auto_apply_damage: true,
    }
}

/// Single bolt and a three-bolt spread
pub fn crossbow() -> WeaponLoadout {
    let bolts = |damage, cooldown, count, spread_deg, destroy_on_hit| {
        AttackSlot::Instant(AttackBehavior::Projectile(ProjectileAttack {
            timing: AttackTiming {
                damage,
                cooldown,
                windup: 0.15,
                active: 0.05,
            },
            template: Some("bolt".into()),
            speed: 420.0,
            lifetime: 2.5,
            count,
            spread_deg,
            destroy_on_hit,
            spawn: SpawnOrigin::WeaponOffset { offset: [8.0, -2.0] },
        }))
    };

    WeaponLoadout {
        name: "Crossbow".into(),
        description: "Fast bolts; the heavy shot pierces".into(),
        light: Some(bolts(9.0, 0.45, 1, 0.0, true)),
        heavy: Some(bolts(14.0, 1.4, 3, 24.0, false)),
        charge_clock: ChargeClock::Simulation,
        auto_apply_damage: true,
    }
}

/// Charged orb volley whose count, speed and range grow with charge
pub fn arcane_staff() -> WeaponLoadout {
    let orb = AttackBehavior::Projectile(ProjectileAttack {
        timing: AttackTiming {
            damage: 40.0,
            cooldown: 0.8,
            windup: 0.0,
            active: 0.1,
        },
        template: Some("orb".into()),
        speed: 300.0,
        lifetime: 5.0,
        count: 1,
        spread_deg: 40.0,
        destroy_on_hit: true,
        spawn: SpawnOrigin::TowardAim { distance: 12.0 },
    });

    WeaponLoadout {
        name: "Arcane Staff".into(),
        description: "Hold to gather orbs; longer charges fire more, faster, farther".into(),
        light: Some(AttackSlot::Instant(AttackBehavior::Projectile(ProjectileAttack {
            timing: AttackTiming {
                damage: 6.0,
                cooldown: 0.3,
                windup: 0.05,
                active: 0.05,
            },
            template: Some("spark".into()),
            speed: 360.0,
            lifetime: 1.5,
            count: 1,
            spread_deg: 0.0,
            destroy_on_hit: true,
            spawn: SpawnOrigin::TowardAim { distance: 12.0 },
        }))),
        heavy: Some(AttackSlot::Charged(ChargedAttack {
            // a release at the minimum charge fires one slow, short-lived orb
            charge: ChargeProfile {
                ratio_origin: RatioOrigin::MinimumCharge,
                ..Default::default()
            },
            attack: orb,
            projectile_scaling: Some(ProjectileChargeScaling {
                max_count: Some(5),
                speed_multiplier: Some([0.25, 1.0]),
                life_multiplier: Some([0.25, 1.0]),
                life_exponent: Some(DEFAULT_LIFE_EXPONENT),
            }),
        })),
        charge_clock: ChargeClock::Simulation,
        auto_apply_damage: true,
    }
}

/// Slam whose damage scales with charge; releases are allowed at any time
pub fn war_hammer() -> WeaponLoadout {
    WeaponLoadout {
        name: "War Hammer".into(),
        description: "Slow swings; the heavy slam can be held for more damage".into(),
        light: Some(AttackSlot::Instant(AttackBehavior::Crescent(CrescentAttack {
            timing: AttackTiming {
                damage: 18.0,
                cooldown: 0.9,
                windup: 0.25,
                active: 0.2,
            },
            arc: CrescentArc {
                inner_radius: 16.0,
                outer_radius: 30.0,
                arc_width_deg: 60.0,
                arc_center_offset_deg: 0.0,
            },
        }))),
        heavy: Some(AttackSlot::Charged(ChargedAttack {
            charge: ChargeProfile {
                min_charge_time: 0.3,
                max_charge_time: 1.5,
                min_damage_fraction: 0.4,
                max_damage_fraction: 1.0,
                requires_minimum_charge: false,
                ratio_origin: RatioOrigin::Zero,
            },
            attack: AttackBehavior::Crescent(CrescentAttack {
                timing: AttackTiming {
                    damage: 60.0,
                    cooldown: 1.8,
                    windup: 0.0,
                    active: 0.3,
                },
                arc: CrescentArc {
                    inner_radius: 10.0,
                    outer_radius: 34.0,
                    arc_width_deg: 100.0,
                    arc_center_offset_deg: -10.0,
                },
            }),
            projectile_scaling: None,
        })),
        charge_clock: ChargeClock::Simulation,
        auto_apply_damage: true,
    }
}

pub fn all() -> Vec<WeaponLoadout> {
    vec![
        crescent_sword(),
        sweeping_scythe(),
        crossbow(),
        arcane_staff(),
        war_hammer(),
    ]
}
