//! Weapon loadouts and their on-disk form.
//!
//! A loadout names a weapon and fills its light and heavy slots. Files are
//! RON (`.ron`) or JSON (`.json`), picked by extension. The controller
//! trusts validated numbers, so `validate` runs on every load.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::attack::{
    AttackBehavior, AttackSlot, AttackTiming, ChargedAttack, CrescentArc, ProjectileAttack,
    SweepSettings,
};
use crate::constants::MIN_SWEEP_STEP_DEGREES;
use crate::error::ConfigError;
use crate::presets;
use crate::weapon::{ChargeClock, WeaponController};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponLoadout {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub light: Option<AttackSlot>,
    #[serde(default)]
    pub heavy: Option<AttackSlot>,
    #[serde(default)]
    pub charge_clock: ChargeClock,
    /// Deliver hit reports to `Health` components automatically
    #[serde(default = "default_true")]
    pub auto_apply_damage: bool,
}

impl WeaponLoadout {
    /// Fresh controller for this loadout, equipped but without an owner
    pub fn controller(&self) -> WeaponController {
        let mut weapon =
            WeaponController::new(self.name.clone()).with_charge_clock(self.charge_clock);
        if let Some(light) = &self.light {
            weapon = weapon.with_light(light.clone());
        }
        if let Some(heavy) = &self.heavy {
            weapon = weapon.with_heavy(heavy.clone());
        }
        weapon
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            weapon: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".into()));
        }
        if self.light.is_none() && self.heavy.is_none() {
            return Err(invalid("no attack slot configured".into()));
        }
        for (label, slot) in [("light", &self.light), ("heavy", &self.heavy)] {
            if let Some(slot) = slot {
                validate_slot(slot).map_err(|reason| invalid(format!("{label}: {reason}")))?;
            }
        }
        Ok(())
    }
}

fn non_negative(value: f32, what: &str) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{what} must be finite and >= 0, got {value}"))
    }
}

fn positive(value: f32, what: &str) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{what} must be finite and > 0, got {value}"))
    }
}

fn fraction(value: f32, what: &str) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{what} must be in [0, 1], got {value}"))
    }
}

fn validate_timing(timing: &AttackTiming) -> Result<(), String> {
    non_negative(timing.damage, "damage")?;
    non_negative(timing.cooldown, "cooldown")?;
    non_negative(timing.windup, "windup")?;
    non_negative(timing.active, "active")
}

fn validate_arc(arc: &CrescentArc) -> Result<(), String> {
    non_negative(arc.inner_radius, "inner_radius")?;
    positive(arc.outer_radius, "outer_radius")?;
    if arc.inner_radius >= arc.outer_radius {
        return Err(format!(
            "inner_radius ({}) must be below outer_radius ({})",
            arc.inner_radius, arc.outer_radius
        ));
    }
    if !(arc.arc_width_deg > 0.0 && arc.arc_width_deg <= 360.0) {
        return Err(format!(
            "arc_width_deg must be in (0, 360], got {}",
            arc.arc_width_deg
        ));
    }
    if !arc.arc_center_offset_deg.is_finite() {
        return Err("arc_center_offset_deg must be finite".into());
    }
    Ok(())
}

fn validate_sweep(sweep: &SweepSettings) -> Result<(), String> {
    if !(sweep.step_deg.is_finite() && sweep.step_deg >= MIN_SWEEP_STEP_DEGREES) {
        return Err(format!(
            "step_deg must be finite and >= {MIN_SWEEP_STEP_DEGREES}, got {}",
            sweep.step_deg
        ));
    }
    non_negative(sweep.step_delay, "step_delay")
}

fn validate_projectile(volley: &ProjectileAttack) -> Result<(), String> {
    positive(volley.speed, "speed")?;
    positive(volley.lifetime, "lifetime")?;
    if volley.count == 0 {
        return Err("count must be at least 1".into());
    }
    non_negative(volley.spread_deg, "spread_deg")
}

fn validate_behavior(behavior: &AttackBehavior) -> Result<(), String> {
    validate_timing(behavior.timing())?;
    match behavior {
        AttackBehavior::Crescent(c) => validate_arc(&c.arc),
        AttackBehavior::SweepingCrescent(s) => {
            validate_arc(&s.crescent.arc)?;
            validate_sweep(&s.sweep)
        }
        AttackBehavior::Projectile(p) => validate_projectile(p),
    }
}

fn validate_multiplier(range: Option<[f32; 2]>, what: &str) -> Result<(), String> {
    match range {
        Some([low, high]) => {
            non_negative(low, what)?;
            non_negative(high, what)
        }
        None => Ok(()),
    }
}

fn validate_charged(charged: &ChargedAttack) -> Result<(), String> {
    let charge = &charged.charge;
    non_negative(charge.min_charge_time, "min_charge_time")?;
    positive(charge.max_charge_time, "max_charge_time")?;
    if charge.min_charge_time > charge.max_charge_time {
        return Err(format!(
            "min_charge_time ({}) exceeds max_charge_time ({})",
            charge.min_charge_time, charge.max_charge_time
        ));
    }
    fraction(charge.min_damage_fraction, "min_damage_fraction")?;
    fraction(charge.max_damage_fraction, "max_damage_fraction")?;

    if let Some(scaling) = &charged.projectile_scaling {
        if !matches!(charged.attack, AttackBehavior::Projectile(_)) {
            return Err("projectile_scaling on a non-projectile attack".into());
        }
        if scaling.max_count == Some(0) {
            return Err("max_count must be at least 1".into());
        }
        validate_multiplier(scaling.speed_multiplier, "speed_multiplier")?;
        validate_multiplier(scaling.life_multiplier, "life_multiplier")?;
        if let Some(exponent) = scaling.life_exponent {
            positive(exponent, "life_exponent")?;
        }
    }
    validate_behavior(&charged.attack)
}

fn validate_slot(slot: &AttackSlot) -> Result<(), String> {
    match slot {
        AttackSlot::Instant(behavior) => validate_behavior(behavior),
        AttackSlot::Charged(charged) => validate_charged(charged),
    }
}

/// Every weapon the simulation knows about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArsenalConfig {
    pub weapons: Vec<WeaponLoadout>,
}

impl Default for ArsenalConfig {
    fn default() -> Self {
        Self {
            weapons: presets::all(),
        }
    }
}

impl ArsenalConfig {
    pub fn find(&self, name: &str) -> Option<&WeaponLoadout> {
        self.weapons.iter().find(|w| w.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, weapon) in self.weapons.iter().enumerate() {
            weapon.validate()?;
            if self.weapons[..i].iter().any(|w| w.name == weapon.name) {
                return Err(ConfigError::Invalid {
                    weapon: weapon.name.clone(),
                    reason: "duplicate weapon name".into(),
                });
            }
        }
        Ok(())
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a `.ron` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let text = std::fs::read_to_string(path)?;
        let config = match format {
            Format::Ron => Self::from_ron_str(&text)?,
            Format::Json => Self::from_json_str(&text)?,
        };
        info!(path = %path.display(), weapons = config.weapons.len(), "loaded arsenal config");
        Ok(config)
    }

    /// Write to `path` in the format its extension names.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = match Format::of(path)? {
            Format::Ron => self.to_ron_string()?,
            Format::Json => self.to_json_string()?,
        };
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "saved arsenal config");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Ron,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Format::Ron),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{
        ChargeProfile, CrescentAttack, ProjectileChargeScaling, SweepingCrescentAttack,
    };

    fn sword() -> WeaponLoadout {
        WeaponLoadout {
            name: "sword".into(),
            description: String::new(),
            light: Some(AttackSlot::Instant(AttackBehavior::Crescent(CrescentAttack {
                timing: AttackTiming::default(),
                arc: CrescentArc::default(),
            }))),
            heavy: None,
            charge_clock: ChargeClock::Simulation,
            auto_apply_damage: true,
        }
    }

    fn reason(result: Result<(), ConfigError>) -> String {
        match result {
            Err(ConfigError::Invalid { reason, .. }) => reason,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_presets_validate() {
        assert!(ArsenalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_radii_ordering() {
        let mut loadout = sword();
        if let Some(AttackSlot::Instant(AttackBehavior::Crescent(c))) = &mut loadout.light {
            c.arc.inner_radius = 30.0;
        }
        assert!(reason(loadout.validate()).starts_with("light: inner_radius"));
    }

    #[test]
    fn test_arc_width_range() {
        let mut loadout = sword();
        if let Some(AttackSlot::Instant(AttackBehavior::Crescent(c))) = &mut loadout.light {
            c.arc.arc_width_deg = 400.0;
        }
        assert!(reason(loadout.validate()).contains("arc_width_deg"));
    }

    #[test]
    fn test_sweep_step_below_floor_rejected() {
        let mut loadout = sword();
        let mut sweep = SweepSettings {
            step_deg: 0.5,
            ..Default::default()
        };
        let scythe = |sweep: SweepSettings| {
            AttackSlot::Instant(AttackBehavior::SweepingCrescent(SweepingCrescentAttack {
                crescent: CrescentAttack {
                    timing: AttackTiming::default(),
                    arc: CrescentArc::default(),
                },
                sweep,
            }))
        };
        loadout.light = Some(scythe(sweep));
        assert!(reason(loadout.validate()).starts_with("light: step_deg"));

        sweep.step_deg = MIN_SWEEP_STEP_DEGREES;
        loadout.light = Some(scythe(sweep));
        assert!(loadout.validate().is_ok());
    }

    #[test]
    fn test_empty_loadout_rejected() {
        let mut loadout = sword();
        loadout.light = None;
        assert!(loadout.validate().is_err());
    }

    #[test]
    fn test_scaling_requires_projectile() {
        let mut loadout = sword();
        loadout.heavy = Some(AttackSlot::Charged(ChargedAttack {
            charge: ChargeProfile::default(),
            attack: AttackBehavior::Crescent(CrescentAttack {
                timing: AttackTiming::default(),
                arc: CrescentArc::default(),
            }),
            projectile_scaling: Some(ProjectileChargeScaling::default()),
        }));
        assert!(reason(loadout.validate()).starts_with("heavy:"));
    }

    #[test]
    fn test_charge_range() {
        let mut loadout = sword();
        loadout.heavy = Some(AttackSlot::Charged(ChargedAttack {
            charge: ChargeProfile {
                min_charge_time: 3.0,
                max_charge_time: 2.0,
                ..Default::default()
            },
            attack: AttackBehavior::Crescent(CrescentAttack {
                timing: AttackTiming::default(),
                arc: CrescentArc::default(),
            }),
            projectile_scaling: None,
        }));
        assert!(reason(loadout.validate()).contains("min_charge_time"));
    }

    #[test]
    fn test_duplicate_names() {
        let config = ArsenalConfig {
            weapons: vec![sword(), sword()],
        };
        assert!(reason(config.validate()).contains("duplicate"));
    }

    #[test]
    fn test_ron_roundtrip_in_memory() {
        let config = ArsenalConfig::default();
        let text = config.to_ron_string().unwrap();
        let parsed = ArsenalConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unknown_extension() {
        let err = ArsenalConfig::load("arsenal.toml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_loadout_builds_controller() {
        let weapon = sword().controller();
        assert_eq!(weapon.name(), "sword");
        assert!(weapon.can_start_attack(crate::weapon::Hand::Light));
        assert!(!weapon.can_start_attack(crate::weapon::Hand::Heavy));
    }
}
