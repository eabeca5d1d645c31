//! Error types for the arsenal core.
//!
//! `ActionRejected` is not a fault: it reports why a requested transition
//! did not happen so callers can react (play a "can't act" cue, fall back
//! to another action). `ConfigError` covers loadout files.

use std::path::PathBuf;

use crate::weapon::{Hand, WeaponState};

/// Why a weapon action was refused. The weapon state is untouched unless noted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionRejected {
    #[error("weapon is busy ({0:?})")]
    NotReady(WeaponState),
    #[error("{hand} attack on cooldown ({remaining:.3}s left)")]
    OnCooldown { hand: Hand, remaining: f32 },
    #[error("{hand} slot has no attack configured")]
    MissingConfiguration { hand: Hand },
    #[error("{hand} attack cannot be charged")]
    NotChargeable { hand: Hand },
    #[error("{hand} attack must be charged before release")]
    ChargeRequired { hand: Hand },
    #[error("weapon is not charging")]
    NotCharging,
    #[error("{current} attack in progress, {requested} requested")]
    HandMismatch { current: Hand, requested: Hand },
    /// The charge was cancelled and the weapon returned to Ready.
    #[error("released after {charge_time:.3}s, {required:.3}s required")]
    InsufficientCharge { charge_time: f32, required: f32 },
    #[error("charge is driven by the simulation tick")]
    ChargeClockMismatch,
    #[error("hit window already open")]
    WindowAlreadyOpen,
    #[error("no attack is winding up")]
    NoPendingAttack,
    #[error("no hit window is open")]
    WindowNotOpen,
    #[error("weapon is not equipped")]
    Unequipped,
}

/// Loadout loading and validation failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Invalid weapon '{weapon}': {reason}")]
    Invalid { weapon: String, reason: String },
}
