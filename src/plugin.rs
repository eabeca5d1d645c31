//! Bevy integration.
//!
//! Weapons live on their own entities as `WeaponMount` components; the
//! wielder entity is the weapon's owner. The host feeds requests through
//! `WeaponCommand` and collision reports through `HitAreaContact` /
//! `ProjectileContact`; the plugin answers with `CombatEvent` and
//! `ProjectileReport`, and applies damage to `Health` when asked to.
//!
//! Systems run chained in `Update`, so inside one frame input is applied
//! before weapons tick, before projectiles move, before contacts resolve,
//! before damage lands.

use bevy::prelude::*;
use tracing::{debug, trace};

use crate::config::WeaponLoadout;
use crate::projectile::{ObstacleKind, Projectile, ProjectileEvent, ProjectileSpawn};
use crate::replay::{apply_input, WeaponInput};
use crate::target::TargetId;
use crate::weapon::{WeaponController, WeaponEvent};

pub struct ArsenalPlugin;

impl Plugin for ArsenalPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WeaponCommand>()
            .add_event::<HitAreaContact>()
            .add_event::<ProjectileContact>()
            .add_event::<CombatEvent>()
            .add_event::<ProjectileReport>()
            .add_systems(
                Update,
                (
                    apply_weapon_commands,
                    tick_weapons,
                    advance_projectiles,
                    route_hit_area_contacts,
                    route_projectile_contacts,
                    deliver_damage,
                )
                    .chain(),
            );
    }
}

// ============================================================================
// Components
// ============================================================================

#[derive(Component, Debug)]
pub struct WeaponMount {
    pub controller: WeaponController,
    pub auto_apply_damage: bool,
}

impl WeaponMount {
    pub fn new(controller: WeaponController, auto_apply_damage: bool) -> Self {
        Self {
            controller,
            auto_apply_damage,
        }
    }

    pub fn from_loadout(loadout: &WeaponLoadout) -> Self {
        Self::new(loadout.controller(), loadout.auto_apply_damage)
    }
}

/// A live projectile and the weapon that fired it
#[derive(Component, Debug)]
pub struct ProjectileBody {
    pub projectile: Projectile,
    pub weapon: Entity,
    pub auto_apply_damage: bool,
}

/// Reference damage receiver
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Subtract `amount`, never below zero. Returns the damage actually taken.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }
}

/// Spawn a weapon entity for `loadout`, equipped by `wielder`.
pub fn spawn_weapon(commands: &mut Commands, loadout: &WeaponLoadout, wielder: Entity) -> Entity {
    let mut mount = WeaponMount::from_loadout(loadout);
    mount.controller.equip(TargetId::from(wielder));
    commands.spawn(mount).id()
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponAction {
    Input(WeaponInput),
    Equip { wielder: Entity },
    Unequip,
}

/// Request for the weapon on `weapon`
#[derive(Event, Debug, Clone, Copy)]
pub struct WeaponCommand {
    pub weapon: Entity,
    pub action: WeaponAction,
}

impl WeaponCommand {
    pub fn input(weapon: Entity, input: WeaponInput) -> Self {
        Self {
            weapon,
            action: WeaponAction::Input(input),
        }
    }
}

/// `body` entered the hit area of `weapon`
#[derive(Event, Debug, Clone, Copy)]
pub struct HitAreaContact {
    pub weapon: Entity,
    pub body: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// A hittable body entered the projectile's hit area
    Target,
    /// The projectile's body touched terrain or another collider
    Obstacle(ObstacleKind),
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileContact {
    pub projectile: Entity,
    pub body: Entity,
    pub kind: ContactKind,
}

/// Everything a weapon reports, tagged with its entity
#[derive(Event, Debug, Clone)]
pub struct CombatEvent {
    pub weapon: Entity,
    pub event: WeaponEvent,
}

#[derive(Event, Debug, Clone)]
pub struct ProjectileReport {
    pub projectile: Entity,
    pub weapon: Entity,
    pub event: ProjectileEvent,
    pub auto_apply_damage: bool,
}

// ============================================================================
// Systems
// ============================================================================

fn apply_weapon_commands(
    mut requests: EventReader<WeaponCommand>,
    mut mounts: Query<&mut WeaponMount>,
) {
    for request in requests.read() {
        let Ok(mut mount) = mounts.get_mut(request.weapon) else {
            debug!(weapon = ?request.weapon, "command for an entity without a weapon");
            continue;
        };
        match request.action {
            WeaponAction::Input(input) => {
                if let Err(reason) = apply_input(&mut mount.controller, &input) {
                    debug!(weapon = ?request.weapon, ?input, %reason, "weapon command rejected");
                }
            }
            WeaponAction::Equip { wielder } => mount.controller.equip(TargetId::from(wielder)),
            WeaponAction::Unequip => mount.controller.unequip(),
        }
    }
}

/// Forward drained weapon events and spawn the projectiles they launch.
fn flush_weapon_events(
    weapon: Entity,
    mount: &mut WeaponMount,
    commands: &mut Commands,
    out: &mut EventWriter<CombatEvent>,
) {
    for event in mount.controller.drain_events() {
        if let WeaponEvent::ProjectileLaunched(spawn) = &event {
            spawn_projectile(commands, weapon, spawn.clone(), mount.auto_apply_damage);
        }
        out.send(CombatEvent { weapon, event });
    }
}

fn spawn_projectile(
    commands: &mut Commands,
    weapon: Entity,
    spawn: ProjectileSpawn,
    auto_apply_damage: bool,
) {
    let template = spawn.template.clone();
    let entity = commands
        .spawn(ProjectileBody {
            projectile: Projectile::new(spawn),
            weapon,
            auto_apply_damage,
        })
        .id();
    trace!(?weapon, projectile = ?entity, %template, "projectile spawned");
}

fn tick_weapons(
    time: Res<Time>,
    mut commands: Commands,
    mut mounts: Query<(Entity, &mut WeaponMount)>,
    mut out: EventWriter<CombatEvent>,
) {
    let dt = time.delta_secs();
    for (weapon, mut mount) in &mut mounts {
        mount.controller.tick(dt);
        flush_weapon_events(weapon, &mut mount, &mut commands, &mut out);
    }
}

fn advance_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut bodies: Query<(Entity, &mut ProjectileBody)>,
    mut reports: EventWriter<ProjectileReport>,
) {
    let dt = time.delta_secs();
    for (entity, mut body) in &mut bodies {
        if let Some(event) = body.projectile.tick(dt) {
            commands.entity(entity).despawn();
            reports.send(ProjectileReport {
                projectile: entity,
                weapon: body.weapon,
                event,
                auto_apply_damage: body.auto_apply_damage,
            });
        }
    }
}

fn route_hit_area_contacts(
    mut contacts: EventReader<HitAreaContact>,
    mut commands: Commands,
    mut mounts: Query<&mut WeaponMount>,
    mut out: EventWriter<CombatEvent>,
) {
    for contact in contacts.read() {
        let Ok(mut mount) = mounts.get_mut(contact.weapon) else {
            continue;
        };
        mount.controller.report_contact(TargetId::from(contact.body));
        flush_weapon_events(contact.weapon, &mut mount, &mut commands, &mut out);
    }
}

fn route_projectile_contacts(
    mut contacts: EventReader<ProjectileContact>,
    mut commands: Commands,
    mut bodies: Query<&mut ProjectileBody>,
    mut reports: EventWriter<ProjectileReport>,
) {
    for contact in contacts.read() {
        let Ok(mut body) = bodies.get_mut(contact.projectile) else {
            continue;
        };
        let target = TargetId::from(contact.body);
        let events = match contact.kind {
            ContactKind::Target => body.projectile.on_target_contact(target),
            ContactKind::Obstacle(kind) => body
                .projectile
                .on_obstacle_contact(target, kind)
                .into_iter()
                .collect(),
        };
        for event in events {
            if matches!(event, ProjectileEvent::Despawned(_)) {
                commands.entity(contact.projectile).despawn();
            }
            reports.send(ProjectileReport {
                projectile: contact.projectile,
                weapon: body.weapon,
                event,
                auto_apply_damage: body.auto_apply_damage,
            });
        }
    }
}

fn deliver_damage(
    mut combat: EventReader<CombatEvent>,
    mut projectile_reports: EventReader<ProjectileReport>,
    mounts: Query<&WeaponMount>,
    mut health: Query<&mut Health>,
) {
    let weapon_hits = combat.read().filter_map(|e| match &e.event {
        WeaponEvent::EntityHit(report) => {
            let auto = mounts
                .get(e.weapon)
                .map(|m| m.auto_apply_damage)
                .unwrap_or(false);
            auto.then_some((report.target, report.damage))
        }
        _ => None,
    });
    let hits: Vec<_> = weapon_hits
        .chain(projectile_reports.read().filter_map(|r| match r.event {
            ProjectileEvent::Hit { target, damage } if r.auto_apply_damage => {
                Some((target, damage))
            }
            _ => None,
        }))
        .collect();

    for (target, damage) in hits {
        let found = match target.entity() {
            Some(entity) => health.get_mut(entity).ok(),
            None => None,
        };
        let Some(mut hp) = found else {
            debug!(%target, damage, "hit target has no Health, damage not applied");
            continue;
        };
        let taken = hp.apply_damage(damage);
        trace!(%target, damage, taken, remaining = hp.current, "damage applied");
    }
}
