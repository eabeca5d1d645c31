//! Weapon controller: the attack state machine.
//!
//! ```text
//!   Ready ──attack──▶ Windup ──windup expiry / open_hit_window──▶ Active ──close──▶ Ready
//!     │                                                             ▲
//!     └──start_charge──▶ Charging ──execute_charged (enough charge)─┘
//!                           │
//!                           └──cancel_charge / short release──▶ Ready
//! ```
//!
//! Timed steps (windup expiry, auto-close, sweep steps) are generation-tagged
//! timers polled from `tick`. Every transition that supersedes a window or a
//! charge bumps the generation and drops the timers of the old one, so late
//! callbacks never act on a newer attack.
//!
//! The controller never panics on bad input: refused requests come back as
//! `ActionRejected` and leave the state untouched (except a short charge
//! release, which cancels the charge).

use std::fmt;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::attack::{Activation, AimContext, AttackBehavior, AttackSlot, ChargeSession};
use crate::constants::{MAX_TIMER_FIRES_PER_TICK, TIMER_EPSILON};
use crate::error::ActionRejected;
use crate::geometry::{Sweep, SweepStep};
use crate::target::TargetId;

pub mod events;
pub mod hit_window;
pub mod timers;

pub use events::{HitReport, WeaponEvent};
pub use hit_window::HitWindow;
pub use timers::{ScheduledTimer, Scheduler, TimerKind};

/// Which of the weapon's two attack slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Light,
    Heavy,
}

impl Hand {
    pub fn from_heavy(is_heavy: bool) -> Self {
        if is_heavy {
            Hand::Heavy
        } else {
            Hand::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Hand::Light => "light",
            Hand::Heavy => "heavy",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponState {
    #[default]
    Ready,
    Windup,
    Active,
    Charging,
}

/// Who advances charge time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChargeClock {
    /// `tick` accumulates charge
    #[default]
    Simulation,
    /// The caller feeds `update_charge`; `tick` leaves the charge alone
    External,
}

/// Attack waiting for its hit window
#[derive(Debug, Clone)]
struct PendingAttack {
    hand: Hand,
    behavior: AttackBehavior,
}

#[derive(Debug, Clone)]
struct ActiveCharge {
    hand: Hand,
    session: ChargeSession,
}

#[derive(Debug, Clone)]
struct ActiveSweep {
    sweep: Sweep,
    step_delay: f32,
}

#[derive(Debug, Clone)]
pub struct WeaponController {
    name: String,
    light: Option<AttackSlot>,
    heavy: Option<AttackSlot>,
    charge_clock: ChargeClock,

    state: WeaponState,
    current_hand: Option<Hand>,
    light_cooldown: f32,
    heavy_cooldown: f32,

    origin: Vec2,
    facing_left: bool,
    pending_aim: Option<Vec2>,
    attack_facing_left: bool,

    owner: Option<TargetId>,
    equipped: bool,

    generation: u64,
    scheduler: Scheduler,
    pending: Option<PendingAttack>,
    hit_window: Option<HitWindow>,
    hitbox: Option<Vec<Vec2>>,
    sweep: Option<ActiveSweep>,
    charge: Option<ActiveCharge>,

    events: Vec<WeaponEvent>,
}

impl WeaponController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            light: None,
            heavy: None,
            charge_clock: ChargeClock::default(),
            state: WeaponState::Ready,
            current_hand: None,
            light_cooldown: 0.0,
            heavy_cooldown: 0.0,
            origin: Vec2::ZERO,
            facing_left: false,
            pending_aim: None,
            attack_facing_left: false,
            owner: None,
            equipped: true,
            generation: 0,
            scheduler: Scheduler::default(),
            pending: None,
            hit_window: None,
            hitbox: None,
            sweep: None,
            charge: None,
            events: Vec::new(),
        }
    }

    pub fn with_light(mut self, slot: impl Into<AttackSlot>) -> Self {
        self.light = Some(slot.into());
        self
    }

    pub fn with_heavy(mut self, slot: impl Into<AttackSlot>) -> Self {
        self.heavy = Some(slot.into());
        self
    }

    pub fn with_charge_clock(mut self, clock: ChargeClock) -> Self {
        self.charge_clock = clock;
        self
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WeaponState {
        self.state
    }

    pub fn current_hand(&self) -> Option<Hand> {
        self.current_hand
    }

    pub fn slot(&self, hand: Hand) -> Option<&AttackSlot> {
        match hand {
            Hand::Light => self.light.as_ref(),
            Hand::Heavy => self.heavy.as_ref(),
        }
    }

    pub fn cooldown(&self, hand: Hand) -> f32 {
        match hand {
            Hand::Light => self.light_cooldown,
            Hand::Heavy => self.heavy_cooldown,
        }
    }

    fn cooldown_mut(&mut self, hand: Hand) -> &mut f32 {
        match hand {
            Hand::Light => &mut self.light_cooldown,
            Hand::Heavy => &mut self.heavy_cooldown,
        }
    }

    pub fn charge_clock(&self) -> ChargeClock {
        self.charge_clock
    }

    /// Aim point frozen at the start of the current attack or charge
    pub fn pending_aim(&self) -> Option<Vec2> {
        self.pending_aim
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    pub fn owner(&self) -> Option<TargetId> {
        self.owner
    }

    pub fn is_equipped(&self) -> bool {
        self.equipped
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hit_window(&self) -> Option<&HitWindow> {
        self.hit_window.as_ref()
    }

    /// Current hitbox polygon, relative to the weapon origin
    pub fn hitbox(&self) -> Option<&[Vec2]> {
        self.hitbox.as_deref()
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweep.is_some()
    }

    pub fn charge_time(&self) -> Option<f32> {
        self.charge.as_ref().map(|c| c.session.elapsed())
    }

    /// Scaling ratio of the charge in progress
    pub fn charge_ratio(&self) -> Option<f32> {
        let charge = self.charge.as_ref()?;
        let profile = &self.slot(charge.hand)?.as_charged()?.charge;
        Some(profile.ratio(charge.session.elapsed()))
    }

    /// Fill level of the charge in progress, for UI
    pub fn charge_level(&self) -> Option<f32> {
        let charge = self.charge.as_ref()?;
        let profile = &self.slot(charge.hand)?.as_charged()?.charge;
        Some(profile.level(charge.session.elapsed()))
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Scheduler clock in seconds since creation
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn drain_events(&mut self) -> Vec<WeaponEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------
    // Wielder bookkeeping
    // ---------------------------------------------------------------

    pub fn equip(&mut self, owner: TargetId) {
        self.owner = Some(owner);
        self.equipped = true;
        debug!(weapon = %self.name, %owner, "equipped");
        self.events.push(WeaponEvent::Equipped { owner });
    }

    /// Detach from the wielder, aborting any attack or charge.
    pub fn unequip(&mut self) {
        self.interrupt();
        self.owner = None;
        self.equipped = false;
        debug!(weapon = %self.name, "unequipped");
        self.events.push(WeaponEvent::Unequipped);
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    pub fn set_facing(&mut self, facing_left: bool) {
        self.facing_left = facing_left;
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn can_start_attack(&self, hand: Hand) -> bool {
        self.equipped
            && self.state == WeaponState::Ready
            && self.slot(hand).is_some()
            && self.cooldown(hand) <= TIMER_EPSILON
    }

    pub fn has_chargeable_attack(&self, hand: Hand) -> bool {
        self.slot(hand).is_some_and(AttackSlot::is_chargeable)
    }

    fn check_can_start(&self, hand: Hand) -> Result<&AttackSlot, ActionRejected> {
        if !self.equipped {
            return Err(ActionRejected::Unequipped);
        }
        if self.state != WeaponState::Ready {
            return Err(ActionRejected::NotReady(self.state));
        }
        let Some(slot) = self.slot(hand) else {
            warn!(weapon = %self.name, %hand, "no attack configured for slot");
            return Err(ActionRejected::MissingConfiguration { hand });
        };
        let remaining = self.cooldown(hand);
        if remaining > TIMER_EPSILON {
            return Err(ActionRejected::OnCooldown { hand, remaining });
        }
        Ok(slot)
    }

    // ---------------------------------------------------------------
    // Instant attacks
    // ---------------------------------------------------------------

    /// Begin the windup of an instant attack aimed at `aim`.
    pub fn attack(&mut self, hand: Hand, aim: Vec2) -> Result<(), ActionRejected> {
        let slot = self.check_can_start(hand)?;
        let behavior = match slot {
            AttackSlot::Instant(behavior) => behavior.clone(),
            AttackSlot::Charged(_) => return Err(ActionRejected::ChargeRequired { hand }),
        };
        let timing = *behavior.timing();

        *self.cooldown_mut(hand) = timing.cooldown.max(0.0);
        self.begin(hand, aim);
        self.state = WeaponState::Windup;
        self.pending = Some(PendingAttack { hand, behavior });

        debug!(weapon = %self.name, %hand, windup = timing.windup, "attack started");
        self.events.push(WeaponEvent::AttackStarted { hand });

        if timing.windup <= TIMER_EPSILON {
            self.activate();
        } else {
            self.scheduler
                .schedule(TimerKind::WindupExpiry(hand), timing.windup, self.generation);
        }
        Ok(())
    }

    pub fn attack_light(&mut self, aim: Vec2) -> Result<(), ActionRejected> {
        self.attack(Hand::Light, aim)
    }

    pub fn attack_heavy(&mut self, aim: Vec2) -> Result<(), ActionRejected> {
        self.attack(Hand::Heavy, aim)
    }

    /// Capture aim and facing and start a fresh generation.
    fn begin(&mut self, hand: Hand, aim: Vec2) {
        self.bump_generation();
        self.current_hand = Some(hand);
        self.pending_aim = Some(aim);
        self.attack_facing_left = self.facing_left;
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
        let dropped = self.scheduler.purge_stale(self.generation);
        if dropped > 0 {
            trace!(weapon = %self.name, dropped, generation = self.generation, "dropped superseded timers");
        }
    }

    // ---------------------------------------------------------------
    // Hit window
    // ---------------------------------------------------------------

    /// Open the hit window of the attack winding up in `hand` (animation-driven).
    ///
    /// The windup timer becomes a no-op afterwards.
    pub fn open_hit_window(&mut self, hand: Hand) -> Result<(), ActionRejected> {
        match self.state {
            WeaponState::Windup => {}
            WeaponState::Active => return Err(ActionRejected::WindowAlreadyOpen),
            _ => return Err(ActionRejected::NoPendingAttack),
        }
        if let Some(current) = self.current_hand.filter(|&c| c != hand) {
            return Err(ActionRejected::HandMismatch {
                current,
                requested: hand,
            });
        }
        self.activate();
        Ok(())
    }

    /// Close the open window of `hand` (animation-driven).
    ///
    /// A close tagged with the generation of a superseded window is dropped
    /// without touching the current attack. `None` targets whatever window is open.
    pub fn close_hit_window(
        &mut self,
        hand: Hand,
        generation: Option<u64>,
    ) -> Result<(), ActionRejected> {
        if let Some(requested) = generation {
            let open = self.hit_window.as_ref().map(HitWindow::generation);
            if open != Some(requested) {
                trace!(
                    weapon = %self.name,
                    %hand,
                    requested,
                    current = ?open,
                    "stale close ignored"
                );
                return Ok(());
            }
        }
        let Some(window) = self.hit_window.as_ref() else {
            return Err(ActionRejected::WindowNotOpen);
        };
        if window.hand() != hand {
            return Err(ActionRejected::HandMismatch {
                current: window.hand(),
                requested: hand,
            });
        }
        self.close_window();
        Ok(())
    }

    fn activate(&mut self) {
        let Some(PendingAttack { hand, behavior }) = self.pending.take() else {
            return;
        };
        let Some(aim) = self.pending_aim else {
            return;
        };
        let timing = *behavior.timing();

        self.bump_generation();
        self.state = WeaponState::Active;
        self.current_hand = Some(hand);
        self.hit_window = Some(HitWindow::open(
            self.generation,
            hand,
            self.scheduler.now(),
            timing.damage,
        ));
        debug!(weapon = %self.name, %hand, generation = self.generation, kind = behavior.kind(), "hit window opened");
        self.events.push(WeaponEvent::HitWindowOpened {
            hand,
            generation: self.generation,
        });

        let ctx = AimContext {
            origin: self.origin,
            aim,
            facing_left: self.attack_facing_left,
            owner: self.owner,
        };
        match behavior.activate(&ctx) {
            Activation::Hitbox(polygon) => self.hitbox = Some(polygon),
            Activation::Sweep { sweep, step_delay } => {
                self.sweep = Some(ActiveSweep { sweep, step_delay });
                self.step_sweep(self.scheduler.now());
            }
            Activation::Volley(spawns) => {
                debug!(weapon = %self.name, %hand, count = spawns.len(), "volley launched");
                self.events
                    .extend(spawns.into_iter().map(WeaponEvent::ProjectileLaunched));
            }
            Activation::Skipped => {}
        }

        self.scheduler
            .schedule(TimerKind::AutoClose(hand), timing.active, self.generation);
    }

    fn step_sweep(&mut self, due_at: f64) {
        let Some(active) = self.sweep.as_mut() else {
            return;
        };
        let step = active.sweep.advance();
        let steps = active.sweep.iterations();
        let delay = active.step_delay;

        match step {
            SweepStep::Partial(polygon) => {
                self.hitbox = Some(polygon);
                self.scheduler
                    .schedule_at(TimerKind::SweepStep, due_at + delay as f64, self.generation);
            }
            SweepStep::Complete(polygon) => {
                self.sweep = None;
                if let Some(hand) = self.current_hand {
                    self.events.push(WeaponEvent::SweepFinished {
                        hand,
                        steps,
                        early: false,
                        final_polygon: polygon.clone(),
                    });
                }
                self.hitbox = Some(polygon);
            }
        }
    }

    fn close_window(&mut self) {
        let hand = self.current_hand.take();

        if let Some(mut active) = self.sweep.take() {
            // Full sector is applied once, through the event, before the hitbox goes away
            let final_polygon = active.sweep.finish();
            if let Some(hand) = hand {
                self.events.push(WeaponEvent::SweepFinished {
                    hand,
                    steps: active.sweep.iterations(),
                    early: true,
                    final_polygon,
                });
            }
        }

        self.bump_generation();
        self.state = WeaponState::Ready;
        self.hit_window = None;
        self.hitbox = None;
        self.pending = None;
        self.pending_aim = None;

        if let Some(hand) = hand {
            debug!(weapon = %self.name, %hand, "attack ended");
            self.events.push(WeaponEvent::AttackEnded { hand });
        }
    }

    /// Abort whatever the weapon is doing (stagger, dodge, unequip).
    ///
    /// Cooldowns already set stay set. Returns false when the weapon was idle.
    pub fn interrupt(&mut self) -> bool {
        match self.state {
            WeaponState::Ready => false,
            WeaponState::Charging => {
                self.abort_charge();
                true
            }
            WeaponState::Windup | WeaponState::Active => {
                debug!(weapon = %self.name, state = ?self.state, "attack interrupted");
                self.close_window();
                true
            }
        }
    }

    /// A body entered the weapon's hit area.
    ///
    /// Returns the damage report, or `None` when no window is open, the body
    /// is the wielder, or it was already struck in this window.
    pub fn report_contact(&mut self, target: TargetId) -> Option<HitReport> {
        if self.state != WeaponState::Active || Some(target) == self.owner {
            return None;
        }
        let window = self.hit_window.as_mut()?;
        if !window.register(target) {
            trace!(weapon = %self.name, %target, "duplicate contact ignored");
            return None;
        }

        let report = HitReport {
            target,
            damage: window.damage(),
            hand: window.hand(),
            generation: window.generation(),
        };
        debug!(weapon = %self.name, %target, damage = report.damage, "entity hit");
        self.events.push(WeaponEvent::EntityHit(report));
        Some(report)
    }

    // ---------------------------------------------------------------
    // Charging
    // ---------------------------------------------------------------

    pub fn start_charge(&mut self, hand: Hand, aim: Vec2) -> Result<(), ActionRejected> {
        let slot = self.check_can_start(hand)?;
        let Some(charged) = slot.as_charged() else {
            return Err(ActionRejected::NotChargeable { hand });
        };
        let max = charged.charge.max_charge_time;

        self.begin(hand, aim);
        self.state = WeaponState::Charging;
        self.charge = Some(ActiveCharge {
            hand,
            session: ChargeSession::new(max),
        });

        debug!(weapon = %self.name, %hand, session = self.generation, "charge started");
        self.events.push(WeaponEvent::ChargeStarted { hand });
        Ok(())
    }

    /// Feed charge time from the caller. Only valid under `ChargeClock::External`.
    pub fn update_charge(&mut self, dt: f32) -> Result<f32, ActionRejected> {
        if self.state != WeaponState::Charging {
            return Err(ActionRejected::NotCharging);
        }
        if self.charge_clock != ChargeClock::External {
            return Err(ActionRejected::ChargeClockMismatch);
        }
        self.accumulate_charge(dt);
        Ok(self.charge_ratio().unwrap_or(0.0))
    }

    fn accumulate_charge(&mut self, dt: f32) {
        let Some(charge) = self.charge.as_mut() else {
            return;
        };
        let before = charge.session.elapsed();
        let after = charge.session.accumulate(dt);
        let hand = charge.hand;
        if after <= before {
            return;
        }
        if let (Some(ratio), Some(level)) = (self.charge_ratio(), self.charge_level()) {
            self.events
                .push(WeaponEvent::ChargeUpdated { hand, ratio, level });
        }
    }

    /// Release the charge held in `hand`, re-aiming at `aim`.
    ///
    /// A release short of the minimum charge cancels the charge and returns
    /// `InsufficientCharge`.
    pub fn execute_charged(&mut self, hand: Hand, aim: Vec2) -> Result<(), ActionRejected> {
        if self.state != WeaponState::Charging {
            return Err(ActionRejected::NotCharging);
        }
        let Some(charge) = self.charge.as_ref() else {
            return Err(ActionRejected::NotCharging);
        };
        if charge.hand != hand {
            return Err(ActionRejected::HandMismatch {
                current: charge.hand,
                requested: hand,
            });
        }
        let charge_time = charge.session.elapsed();

        let Some(charged) = self.slot(hand).and_then(AttackSlot::as_charged) else {
            self.abort_charge();
            return Err(ActionRejected::NotChargeable { hand });
        };
        let required = charged.charge.min_charge_time;

        let Some(release) = charged.release(charge_time) else {
            debug!(weapon = %self.name, %hand, charge_time, required, "charge released too early");
            self.abort_charge();
            return Err(ActionRejected::InsufficientCharge {
                charge_time,
                required,
            });
        };

        self.charge = None;
        *self.cooldown_mut(hand) = release.behavior.timing().cooldown.max(0.0);
        self.pending_aim = Some(aim);
        self.attack_facing_left = self.facing_left;
        self.pending = Some(PendingAttack {
            hand,
            behavior: release.behavior,
        });

        debug!(weapon = %self.name, %hand, ratio = release.ratio, damage = release.damage, "charge released");
        self.events.push(WeaponEvent::ChargeReleased {
            hand,
            ratio: release.ratio,
            damage: release.damage,
        });
        self.events.push(WeaponEvent::AttackStarted { hand });
        self.activate();
        Ok(())
    }

    pub fn execute_charged_light(&mut self, aim: Vec2) -> Result<(), ActionRejected> {
        self.execute_charged(Hand::Light, aim)
    }

    pub fn execute_charged_heavy(&mut self, aim: Vec2) -> Result<(), ActionRejected> {
        self.execute_charged(Hand::Heavy, aim)
    }

    pub fn cancel_charge(&mut self) -> Result<(), ActionRejected> {
        if self.state != WeaponState::Charging {
            return Err(ActionRejected::NotCharging);
        }
        self.abort_charge();
        Ok(())
    }

    fn abort_charge(&mut self) {
        let hand = self.charge.take().map(|c| c.hand).or(self.current_hand);
        self.bump_generation();
        self.state = WeaponState::Ready;
        self.current_hand = None;
        self.pending = None;
        self.pending_aim = None;

        if let Some(hand) = hand {
            debug!(weapon = %self.name, %hand, "charge cancelled");
            self.events.push(WeaponEvent::ChargeCancelled { hand });
        }
    }

    // ---------------------------------------------------------------
    // Simulation step
    // ---------------------------------------------------------------

    /// Advance cooldowns, charge and timers by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        for hand in [Hand::Light, Hand::Heavy] {
            let cooldown = self.cooldown_mut(hand);
            *cooldown = (*cooldown - dt).max(0.0);
            if *cooldown <= TIMER_EPSILON {
                *cooldown = 0.0;
            }
        }

        if self.state == WeaponState::Charging && self.charge_clock == ChargeClock::Simulation {
            self.accumulate_charge(dt);
        }

        self.scheduler.advance(dt);
        self.run_timers();
    }

    fn run_timers(&mut self) {
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due() {
            if timer.generation != self.generation {
                trace!(weapon = %self.name, kind = ?timer.kind, tagged = timer.generation, current = self.generation, "stale timer discarded");
                continue;
            }

            match timer.kind {
                TimerKind::WindupExpiry(hand) => {
                    if self.state == WeaponState::Windup && self.current_hand == Some(hand) {
                        self.activate();
                    }
                }
                TimerKind::AutoClose(hand) => {
                    if self.state == WeaponState::Active && self.current_hand == Some(hand) {
                        self.close_window();
                    }
                }
                TimerKind::SweepStep => self.step_sweep(timer.due_at),
            }

            fired += 1;
            if fired >= MAX_TIMER_FIRES_PER_TICK {
                warn!(weapon = %self.name, fired, "timer budget exhausted for this tick");
                break;
            }
        }
    }
}
