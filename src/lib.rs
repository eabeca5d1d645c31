//! Arsenal Core - attack resolution for an action-combat game
//!
//! Decides, for every swing or cast, which hitbox exists when, what it may
//! strike and for how much:
//! - Weapon state machine (ready, windup, active, charging) with cooldowns
//! - Crescent (ring-sector) hitboxes and progressive sweeps
//! - Charged attacks scaling damage, projectile count, speed and range
//! - Projectiles with lifetime, pierce and owner exclusion
//! - Generation-tagged timers so stale callbacks never act
//! - Loadout files (RON/JSON), deterministic replay, Bevy plugin

pub mod attack;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod plugin;
pub mod presets;
pub mod projectile;
pub mod replay;
pub mod target;
pub mod weapon;

pub use attack::{AttackBehavior, AttackSlot, AttackTiming, ChargedAttack};
pub use config::{ArsenalConfig, WeaponLoadout};
pub use error::{ActionRejected, ConfigError};
pub use plugin::ArsenalPlugin;
pub use target::TargetId;
pub use weapon::{ChargeClock, Hand, WeaponController, WeaponEvent, WeaponState};
