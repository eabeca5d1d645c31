//! Charge decorator.
//!
//! A `ChargedAttack` wraps one executable behavior. Releasing a charge
//! produces a `ChargedRelease`: a fresh copy of the wrapped behavior with
//! charge-derived damage (and, for volleys, count/speed/lifetime). The
//! wrapped behavior is never modified, so repeated charge cycles cannot drift.
//!
//! The charge ratio is clamp(charge_time / max, 0, 1) by default. Profiles
//! with `RatioOrigin::MinimumCharge` measure from the minimum charge time
//! instead, so a release at the minimum deals the minimum damage fraction.

use serde::{Deserialize, Serialize};

use super::AttackBehavior;
use crate::constants::TIMER_EPSILON;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Where the charge ratio starts counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatioOrigin {
    /// ratio = charge_time / max_charge_time
    #[default]
    Zero,
    /// ratio = (charge_time - min_charge_time) / (max_charge_time - min_charge_time)
    MinimumCharge,
}

/// Timing and damage curve of a charge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeProfile {
    pub min_charge_time: f32,
    pub max_charge_time: f32,
    /// Fraction of base damage dealt at minimum charge
    pub min_damage_fraction: f32,
    /// Fraction of base damage dealt at full charge
    pub max_damage_fraction: f32,
    /// Releasing before `min_charge_time` cancels the attack
    pub requires_minimum_charge: bool,
    #[serde(default)]
    pub ratio_origin: RatioOrigin,
}

impl Default for ChargeProfile {
    fn default() -> Self {
        Self {
            min_charge_time: 0.5,
            max_charge_time: 2.0,
            min_damage_fraction: 0.1,
            max_damage_fraction: 1.0,
            requires_minimum_charge: true,
            ratio_origin: RatioOrigin::Zero,
        }
    }
}

impl ChargeProfile {
    /// Scaling input for every charge-derived parameter, in [0, 1]
    pub fn ratio(&self, charge_time: f32) -> f32 {
        match self.ratio_origin {
            RatioOrigin::Zero => self.level(charge_time),
            RatioOrigin::MinimumCharge => {
                let span = self.max_charge_time - self.min_charge_time;
                let raw = if span > f32::EPSILON {
                    (charge_time - self.min_charge_time) / span
                } else if charge_time + TIMER_EPSILON >= self.max_charge_time {
                    1.0
                } else {
                    0.0
                };
                if raw.is_finite() {
                    raw.clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
        }
    }

    /// Fill level for UI feedback: charge_time / max_charge_time, in [0, 1]
    pub fn level(&self, charge_time: f32) -> f32 {
        if self.max_charge_time <= f32::EPSILON {
            return 1.0;
        }
        let raw = charge_time / self.max_charge_time;
        if raw.is_finite() {
            raw.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn can_release(&self, charge_time: f32) -> bool {
        !self.requires_minimum_charge || charge_time + TIMER_EPSILON >= self.min_charge_time
    }

    /// Damage for a release after `charge_time`; zero when the release would be refused
    pub fn damage(&self, base_damage: f32, charge_time: f32) -> f32 {
        if !self.can_release(charge_time) {
            return 0.0;
        }
        lerp(
            self.min_damage_fraction * base_damage,
            self.max_damage_fraction * base_damage,
            self.ratio(charge_time),
        )
    }
}

/// Extra scaling applied when the wrapped behavior is a projectile volley.
/// Each `None` keeps the base value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectileChargeScaling {
    /// Projectile count at full charge; one projectile at zero charge
    #[serde(default)]
    pub max_count: Option<u32>,
    /// Speed multiplier range [at zero charge, at full charge]
    #[serde(default)]
    pub speed_multiplier: Option<[f32; 2]>,
    /// Lifetime multiplier range [at zero charge, at full charge]
    #[serde(default)]
    pub life_multiplier: Option<[f32; 2]>,
    /// Lifetime follows ratio^exponent instead of the ratio itself
    #[serde(default)]
    pub life_exponent: Option<f32>,
}

impl ProjectileChargeScaling {
    pub fn count(&self, base: u32, ratio: f32) -> u32 {
        match self.max_count {
            Some(max) => {
                let max = max.max(1);
                let scaled = lerp(1.0, max as f32, ratio).round();
                (scaled.max(1.0) as u32).min(max)
            }
            None => base,
        }
    }

    pub fn speed(&self, base: f32, ratio: f32) -> f32 {
        match self.speed_multiplier {
            Some([low, high]) => base * lerp(low, high, ratio),
            None => base,
        }
    }

    pub fn life_curve(&self, ratio: f32) -> f32 {
        match self.life_exponent {
            Some(exponent) => ratio.powf(exponent),
            None => ratio,
        }
    }

    pub fn lifetime(&self, base: f32, ratio: f32) -> f32 {
        match self.life_multiplier {
            Some([low, high]) => base * lerp(low, high, self.life_curve(ratio)),
            None => base,
        }
    }
}

/// Charge decorator over one executable behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargedAttack {
    pub charge: ChargeProfile,
    pub attack: AttackBehavior,
    #[serde(default)]
    pub projectile_scaling: Option<ProjectileChargeScaling>,
}

/// Concrete attack produced by releasing a charge
#[derive(Debug, Clone, PartialEq)]
pub struct ChargedRelease {
    pub charge_time: f32,
    pub ratio: f32,
    pub damage: f32,
    pub behavior: AttackBehavior,
}

impl ChargedAttack {
    /// Resolve the attack for a release after `charge_time`.
    /// `None` when the charge is too short to release.
    pub fn release(&self, charge_time: f32) -> Option<ChargedRelease> {
        if !self.charge.can_release(charge_time) {
            return None;
        }

        let ratio = self.charge.ratio(charge_time);
        let damage = self.charge.damage(self.attack.timing().damage, charge_time);
        let mut behavior = self.attack.with_damage(damage);

        if let (AttackBehavior::Projectile(volley), Some(scaling)) =
            (&mut behavior, self.projectile_scaling.as_ref())
        {
            volley.count = scaling.count(volley.count, ratio);
            volley.speed = scaling.speed(volley.speed, ratio);
            volley.lifetime = scaling.lifetime(volley.lifetime, ratio);
        }

        Some(ChargedRelease {
            charge_time,
            ratio,
            damage,
            behavior,
        })
    }
}

/// Live charge accumulation for one charge session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeSession {
    elapsed: f32,
    max_charge_time: f32,
}

impl ChargeSession {
    pub fn new(max_charge_time: f32) -> Self {
        Self {
            elapsed: 0.0,
            max_charge_time: max_charge_time.max(0.0),
        }
    }

    /// Add `dt` seconds, clamped to the maximum charge time.
    pub fn accumulate(&mut self, dt: f32) -> f32 {
        if dt.is_nan() || dt <= 0.0 {
            return self.elapsed;
        }
        self.elapsed = (self.elapsed + dt).min(self.max_charge_time);
        self.elapsed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{AttackTiming, ProjectileAttack, SpawnOrigin};

    fn volley() -> AttackBehavior {
        AttackBehavior::Projectile(ProjectileAttack {
            timing: AttackTiming {
                damage: 40.0,
                ..Default::default()
            },
            template: Some("orb".into()),
            speed: 300.0,
            lifetime: 4.0,
            count: 1,
            spread_deg: 40.0,
            destroy_on_hit: true,
            spawn: SpawnOrigin::default(),
        })
    }

    fn charged_volley() -> ChargedAttack {
        ChargedAttack {
            charge: ChargeProfile {
                ratio_origin: RatioOrigin::MinimumCharge,
                ..Default::default()
            },
            attack: volley(),
            projectile_scaling: Some(ProjectileChargeScaling {
                max_count: Some(5),
                speed_multiplier: Some([0.25, 1.0]),
                life_multiplier: Some([0.25, 1.0]),
                life_exponent: Some(2.0),
            }),
        }
    }

    #[test]
    fn test_ratio_from_zero() {
        let p = ChargeProfile::default();
        assert_eq!(p.ratio(0.0), 0.0);
        assert!((p.ratio(0.5) - 0.25).abs() < 1e-6);
        assert!((p.ratio(1.0) - 0.5).abs() < 1e-6);
        assert_eq!(p.ratio(2.0), 1.0);
        assert_eq!(p.ratio(1e9), 1.0);
        assert_eq!(p.ratio(f32::NAN), 0.0);
        assert_eq!(p.ratio(1.3), p.level(1.3));
    }

    #[test]
    fn test_ratio_from_minimum_charge() {
        let p = ChargeProfile {
            ratio_origin: RatioOrigin::MinimumCharge,
            ..Default::default()
        };
        assert_eq!(p.ratio(0.0), 0.0);
        assert_eq!(p.ratio(0.5), 0.0);
        assert!((p.ratio(1.25) - 0.5).abs() < 1e-6);
        assert_eq!(p.ratio(2.0), 1.0);
        assert_eq!(p.ratio(f32::NAN), 0.0);
    }

    #[test]
    fn test_damage_curve() {
        let p = ChargeProfile::default();
        assert_eq!(p.damage(100.0, 0.2), 0.0);
        // 0.1 + 0.9 * 0.25
        assert!((p.damage(100.0, 0.5) - 32.5).abs() < 1e-4);
        assert!((p.damage(100.0, 2.0) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_optional_minimum_charge() {
        let p = ChargeProfile {
            requires_minimum_charge: false,
            ..Default::default()
        };
        assert!(p.can_release(0.0));
        assert!((p.damage(100.0, 0.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_half_charge_volley() {
        let release = charged_volley().release(1.25).unwrap();
        let AttackBehavior::Projectile(v) = &release.behavior else {
            panic!("expected a projectile behavior");
        };
        assert_eq!(v.count, 3);
        assert!((v.speed - 300.0 * 0.625).abs() < 1e-3);
        // exponential: 0.5^2 = 0.25 -> multiplier 0.4375
        assert!((v.lifetime - 4.0 * 0.4375).abs() < 1e-4);
        assert!((v.timing.damage - 22.0).abs() < 1e-3);
    }

    #[test]
    fn test_count_from_zero_origin() {
        let mut charged = charged_volley();
        charged.charge.ratio_origin = RatioOrigin::Zero;
        // 1.0 / 2.0 -> lerp(1, 5, 0.5)
        let release = charged.release(1.0).unwrap();
        let AttackBehavior::Projectile(v) = &release.behavior else {
            panic!("expected a projectile behavior");
        };
        assert_eq!(v.count, 3);
        assert!((release.ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_release_never_mutates_wrapped_behavior() {
        let charged = charged_volley();
        let before = charged.attack.clone();
        charged.release(2.0).unwrap();
        charged.release(0.7).unwrap();
        assert_eq!(charged.attack, before);
    }

    #[test]
    fn test_release_refused_under_minimum() {
        assert!(charged_volley().release(0.3).is_none());
    }

    #[test]
    fn test_linear_life_without_exponent() {
        let scaling = ProjectileChargeScaling {
            life_multiplier: Some([0.0, 1.0]),
            ..Default::default()
        };
        assert!((scaling.lifetime(10.0, 0.5) - 5.0).abs() < 1e-5);
        assert_eq!(scaling.count(3, 1.0), 3);
    }

    #[test]
    fn test_session_clamps_huge_dt() {
        let mut s = ChargeSession::new(2.0);
        s.accumulate(0.5);
        assert_eq!(s.accumulate(1e30), 2.0);
        assert_eq!(s.accumulate(f32::INFINITY), 2.0);
        assert_eq!(s.accumulate(-1.0), 2.0);
        assert_eq!(s.elapsed(), 2.0);
    }
}
