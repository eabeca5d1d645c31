//! Scripted input replay.
//!
//! An `InputScript` is a fixed-rate list of weapon inputs keyed by tick.
//! `run_script` feeds them to a controller in the same order a live
//! simulation would (inputs of a tick first, then the tick itself) and
//! fingerprints the resulting event stream. Two runs of the same script on
//! the same loadout must produce the same digest.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{debug, trace};

use crate::error::ActionRejected;
use crate::target::TargetId;
use crate::weapon::{Hand, WeaponController, WeaponEvent};

/// One caller request to a weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeaponInput {
    Attack { hand: Hand, aim: [f32; 2] },
    StartCharge { hand: Hand, aim: [f32; 2] },
    UpdateCharge { dt: f32 },
    ReleaseCharge { hand: Hand, aim: [f32; 2] },
    CancelCharge,
    OpenHitWindow { hand: Hand },
    /// `generation` ties the close to one window; closes for older windows are ignored
    CloseHitWindow {
        hand: Hand,
        #[serde(default)]
        generation: Option<u64>,
    },
    Interrupt,
    /// A body entered the weapon's hit area
    Contact { target: TargetId },
    MoveTo { origin: [f32; 2] },
    Face { left: bool },
}

impl WeaponInput {
    fn tag(&self) -> u32 {
        match self {
            WeaponInput::Attack { .. } => 0,
            WeaponInput::StartCharge { .. } => 1,
            WeaponInput::UpdateCharge { .. } => 2,
            WeaponInput::ReleaseCharge { .. } => 3,
            WeaponInput::CancelCharge => 4,
            WeaponInput::OpenHitWindow { .. } => 5,
            WeaponInput::CloseHitWindow { .. } => 6,
            WeaponInput::Interrupt => 7,
            WeaponInput::Contact { .. } => 8,
            WeaponInput::MoveTo { .. } => 9,
            WeaponInput::Face { .. } => 10,
        }
    }
}

/// Apply one input. Bookkeeping inputs (move, face, contact) never fail.
pub fn apply_input(weapon: &mut WeaponController, input: &WeaponInput) -> Result<(), ActionRejected> {
    match *input {
        WeaponInput::Attack { hand, aim } => weapon.attack(hand, Vec2::from(aim)),
        WeaponInput::StartCharge { hand, aim } => weapon.start_charge(hand, Vec2::from(aim)),
        WeaponInput::UpdateCharge { dt } => weapon.update_charge(dt).map(|_| ()),
        WeaponInput::ReleaseCharge { hand, aim } => weapon.execute_charged(hand, Vec2::from(aim)),
        WeaponInput::CancelCharge => weapon.cancel_charge(),
        WeaponInput::OpenHitWindow { hand } => weapon.open_hit_window(hand),
        WeaponInput::CloseHitWindow { hand, generation } => {
            weapon.close_hit_window(hand, generation)
        }
        WeaponInput::Interrupt => {
            weapon.interrupt();
            Ok(())
        }
        WeaponInput::Contact { target } => {
            weapon.report_contact(target);
            Ok(())
        }
        WeaponInput::MoveTo { origin } => {
            weapon.set_origin(Vec2::from(origin));
            Ok(())
        }
        WeaponInput::Face { left } => {
            weapon.set_facing(left);
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub tick: u64,
    pub input: WeaponInput,
}

impl InputFrame {
    pub fn new(tick: u64, input: WeaponInput) -> Self {
        Self { tick, input }
    }
}

/// Fixed-rate input recording for one weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    pub tick_rate: u32,
    /// Ticks to simulate, including trailing ticks with no input
    pub ticks: u64,
    pub frames: Vec<InputFrame>,
}

impl InputScript {
    pub fn new(tick_rate: u32, ticks: u64) -> Self {
        Self {
            tick_rate: tick_rate.max(1),
            ticks,
            frames: Vec::new(),
        }
    }

    /// Append an input at `tick`; frames stay sorted, same-tick inputs keep insertion order.
    pub fn push(&mut self, tick: u64, input: WeaponInput) -> &mut Self {
        let index = self.frames.partition_point(|f| f.tick <= tick);
        self.frames.insert(index, InputFrame::new(tick, input));
        self.ticks = self.ticks.max(tick.saturating_add(1));
        self
    }

    /// Tick index closest to `seconds`
    pub fn tick_at(&self, seconds: f32) -> u64 {
        (seconds * self.tick_rate as f32).round().max(0.0) as u64
    }

    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Fingerprint of the inputs themselves
    pub fn hash(&self) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update(self.tick_rate.to_le_bytes());
        hasher.update(self.ticks.to_le_bytes());
        for frame in &self.frames {
            hasher.update(frame.tick.to_le_bytes());
            hash_input(&mut hasher, &frame.input);
        }
        finish(hasher)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

/// Event emitted while replaying, stamped with its tick
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub tick: u64,
    pub event: WeaponEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub tick: u64,
    pub input: WeaponInput,
    pub reason: ActionRejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub events: Vec<TimedEvent>,
    pub rejections: Vec<Rejection>,
    pub digest: u64,
}

impl ReplayOutcome {
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.event.name() == name).count()
    }
}

/// Drive `weapon` through `script`.
pub fn run_script(weapon: &mut WeaponController, script: &InputScript) -> ReplayOutcome {
    let dt = script.dt();
    let mut events = Vec::new();
    let mut rejections = Vec::new();
    let mut frames = script.frames.iter().peekable();

    for tick in 0..script.ticks {
        while let Some(frame) = frames.next_if(|f| f.tick <= tick) {
            if let Err(reason) = apply_input(weapon, &frame.input) {
                trace!(tick, input = ?frame.input, %reason, "input rejected");
                rejections.push(Rejection {
                    tick,
                    input: frame.input,
                    reason,
                });
            }
        }
        collect_events(weapon, tick, &mut events);
        weapon.tick(dt);
        collect_events(weapon, tick, &mut events);
    }

    let digest = digest(events.iter().map(|e| &e.event));
    debug!(
        weapon = weapon.name(),
        ticks = script.ticks,
        events = events.len(),
        rejections = rejections.len(),
        digest,
        "script replayed"
    );
    ReplayOutcome {
        events,
        rejections,
        digest,
    }
}

fn collect_events(weapon: &mut WeaponController, tick: u64, events: &mut Vec<TimedEvent>) {
    events.extend(
        weapon
            .drain_events()
            .into_iter()
            .map(|event| TimedEvent { tick, event }),
    );
}

/// SHA3 fingerprint of an event stream, folded to 64 bits
pub fn digest<'a>(events: impl IntoIterator<Item = &'a WeaponEvent>) -> u64 {
    let mut hasher = Sha3_256::new();
    for event in events {
        hash_event(&mut hasher, event);
    }
    finish(hasher)
}

fn finish(hasher: Sha3_256) -> u64 {
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    u64::from_le_bytes(bytes)
}

fn hash_vec(hasher: &mut Sha3_256, v: Vec2) {
    hasher.update(v.x.to_le_bytes());
    hasher.update(v.y.to_le_bytes());
}

fn hash_hand(hasher: &mut Sha3_256, hand: Hand) {
    hasher.update([hand as u8]);
}

fn hash_input(hasher: &mut Sha3_256, input: &WeaponInput) {
    hasher.update(input.tag().to_le_bytes());
    match *input {
        WeaponInput::Attack { hand, aim }
        | WeaponInput::StartCharge { hand, aim }
        | WeaponInput::ReleaseCharge { hand, aim } => {
            hash_hand(hasher, hand);
            hash_vec(hasher, Vec2::from(aim));
        }
        WeaponInput::UpdateCharge { dt } => hasher.update(dt.to_le_bytes()),
        WeaponInput::OpenHitWindow { hand } => hash_hand(hasher, hand),
        WeaponInput::CloseHitWindow { hand, generation } => {
            hash_hand(hasher, hand);
            hasher.update(generation.unwrap_or(u64::MAX).to_le_bytes());
        }
        WeaponInput::Contact { target } => hasher.update(target.raw().to_le_bytes()),
        WeaponInput::MoveTo { origin } => hash_vec(hasher, Vec2::from(origin)),
        WeaponInput::Face { left } => hasher.update([left as u8]),
        WeaponInput::CancelCharge | WeaponInput::Interrupt => {}
    }
}

fn hash_event(hasher: &mut Sha3_256, event: &WeaponEvent) {
    hasher.update(event.name().as_bytes());
    if let Some(hand) = event.hand() {
        hash_hand(hasher, hand);
    }
    match event {
        WeaponEvent::Equipped { owner } => hasher.update(owner.raw().to_le_bytes()),
        WeaponEvent::HitWindowOpened { generation, .. } => {
            hasher.update(generation.to_le_bytes())
        }
        WeaponEvent::SweepFinished {
            steps,
            early,
            final_polygon,
            ..
        } => {
            hasher.update((*steps as u64).to_le_bytes());
            hasher.update([*early as u8]);
            for &point in final_polygon {
                hash_vec(hasher, point);
            }
        }
        WeaponEvent::EntityHit(report) => {
            hasher.update(report.target.raw().to_le_bytes());
            hasher.update(report.damage.to_le_bytes());
            hasher.update(report.generation.to_le_bytes());
        }
        WeaponEvent::ChargeUpdated { ratio, level, .. } => {
            hasher.update(ratio.to_le_bytes());
            hasher.update(level.to_le_bytes());
        }
        WeaponEvent::ChargeReleased { ratio, damage, .. } => {
            hasher.update(ratio.to_le_bytes());
            hasher.update(damage.to_le_bytes());
        }
        WeaponEvent::ProjectileLaunched(spawn) => {
            hasher.update(spawn.template.as_bytes());
            hash_vec(hasher, spawn.position);
            hash_vec(hasher, spawn.direction);
            hasher.update(spawn.speed.to_le_bytes());
            hasher.update(spawn.damage.to_le_bytes());
            hasher.update(spawn.lifetime.to_le_bytes());
            hasher.update(spawn.owner.map_or(u64::MAX, TargetId::raw).to_le_bytes());
            hasher.update([spawn.destroy_on_hit as u8]);
        }
        WeaponEvent::Unequipped
        | WeaponEvent::AttackStarted { .. }
        | WeaponEvent::AttackEnded { .. }
        | WeaponEvent::ChargeStarted { .. }
        | WeaponEvent::ChargeCancelled { .. } => {}
    }
}
