//! arsenal-duel: headless demo of the attack core.
//!
//! Usage: `arsenal-duel [config.ron|config.json] [save-to.ron|save-to.json]`
//!
//! Without a config file the built-in presets are used. `ARSENAL_COMBAT_LOG`
//! (trace, debug, info, warn, error) sets the weapon and attack log level. Every weapon runs a
//! scripted duel (replayed twice to check the digest) and then a short
//! arena match inside a Bevy app against a training dummy.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use bevy::prelude::*;
use tracing::info;

use arsenal_core::config::{ArsenalConfig, WeaponLoadout};
use arsenal_core::logging::{init_tracing, LogLevel, TracingConfig};
use arsenal_core::plugin::{
    ArsenalPlugin, ContactKind, Health, HitAreaContact, ProjectileBody, ProjectileContact,
    WeaponCommand, WeaponMount,
};
use arsenal_core::replay::{run_script, InputScript, WeaponInput};
use arsenal_core::target::TargetId;
use arsenal_core::weapon::Hand;

const TICK_RATE: u32 = 60;
const DUMMY_HEALTH: f32 = 500.0;
const COMBAT_LOG_ENV: &str = "ARSENAL_COMBAT_LOG";

fn main() -> Result<()> {
    init_tracing(&tracing_config()?);

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            ArsenalConfig::load(&path).with_context(|| format!("failed to load {path}"))?
        }
        None => ArsenalConfig::default(),
    };
    if let Some(out) = args.next() {
        config
            .save(&out)
            .with_context(|| format!("failed to save {out}"))?;
        info!(path = %out, "config written");
    }

    for loadout in &config.weapons {
        scripted_duel(loadout)?;
        arena_match(loadout)?;
    }
    Ok(())
}

fn tracing_config() -> Result<TracingConfig> {
    let config = TracingConfig::default();
    let Ok(name) = std::env::var(COMBAT_LOG_ENV) else {
        return Ok(config);
    };
    let level = LogLevel::parse(&name)
        .with_context(|| format!("{COMBAT_LOG_ENV}: unknown log level '{name}'"))?;
    Ok(config.with_combat_level(level))
}

/// Light attack into two targets, then the heavy attack (charged if possible).
fn duel_script(loadout: &WeaponLoadout) -> InputScript {
    let mut script = InputScript::new(TICK_RATE, 0);
    let at = |seconds: f32| script.tick_at(seconds);
    let (hit_light, heavy_start, heavy_release, hit_heavy, end) =
        (at(0.2), at(1.5), at(2.75), at(2.8), at(4.0));

    script
        .push(0, WeaponInput::Attack { hand: Hand::Light, aim: [40.0, 0.0] })
        .push(hit_light, WeaponInput::Contact { target: TargetId(10) })
        .push(hit_light, WeaponInput::Contact { target: TargetId(11) })
        .push(hit_light, WeaponInput::Contact { target: TargetId(10) });

    if loadout.controller().has_chargeable_attack(Hand::Heavy) {
        script
            .push(heavy_start, WeaponInput::StartCharge { hand: Hand::Heavy, aim: [40.0, 10.0] })
            .push(heavy_release, WeaponInput::ReleaseCharge { hand: Hand::Heavy, aim: [40.0, 10.0] });
    } else {
        script.push(heavy_start, WeaponInput::Attack { hand: Hand::Heavy, aim: [40.0, 10.0] });
    }
    script
        .push(hit_heavy, WeaponInput::Contact { target: TargetId(10) })
        .push(end, WeaponInput::Face { left: false });
    script
}

fn scripted_duel(loadout: &WeaponLoadout) -> Result<()> {
    let script = duel_script(loadout);
    let first = run_script(&mut loadout.controller(), &script);
    let second = run_script(&mut loadout.controller(), &script);
    if first.digest != second.digest {
        bail!("replay of '{}' is not deterministic", loadout.name);
    }

    info!(
        weapon = %loadout.name,
        attacks = first.count("attack_started"),
        hits = first.count("entity_hit"),
        projectiles = first.count("projectile_launched"),
        rejected = first.rejections.len(),
        digest = %format!("{:016x}", first.digest),
        "scripted duel"
    );
    Ok(())
}

fn arena_match(loadout: &WeaponLoadout) -> Result<()> {
    let mut app = App::new();
    app.add_plugins(ArsenalPlugin).init_resource::<Time>();

    let wielder = app.world_mut().spawn_empty().id();
    let dummy = app.world_mut().spawn(Health::new(DUMMY_HEALTH)).id();
    let mut mount = WeaponMount::from_loadout(loadout);
    mount.controller.equip(TargetId::from(wielder));
    let weapon = app.world_mut().spawn(mount).id();

    let script = duel_script(loadout);
    let frame = Duration::from_secs_f32(script.dt());
    let mut frames = script.frames.iter().peekable();

    for tick in 0..script.ticks {
        while let Some(input) = frames.next_if(|f| f.tick <= tick) {
            // Scripted contacts stand in for the physics layer hitting the dummy
            if let WeaponInput::Contact { .. } = input.input {
                app.world_mut().send_event(HitAreaContact {
                    weapon,
                    body: dummy,
                });
            } else {
                app.world_mut()
                    .send_event(WeaponCommand::input(weapon, input.input));
            }
        }

        let mut projectiles = app.world_mut().query_filtered::<Entity, With<ProjectileBody>>();
        let live: Vec<Entity> = projectiles.iter(app.world()).collect();
        for projectile in live {
            app.world_mut().send_event(ProjectileContact {
                projectile,
                body: dummy,
                kind: ContactKind::Target,
            });
        }

        app.world_mut().resource_mut::<Time>().advance_by(frame);
        app.update();
    }

    let health = app
        .world()
        .get::<Health>(dummy)
        .copied()
        .context("training dummy lost its Health")?;
    info!(
        weapon = %loadout.name,
        damage_dealt = DUMMY_HEALTH - health.current,
        "arena match"
    );
    Ok(())
}
