//! Loadout files on disk: format by extension, validation on load.

use arsenal_core::config::ArsenalConfig;
use arsenal_core::error::ConfigError;
use arsenal_core::presets;
use arsenal_core::weapon::Hand;

#[test]
fn ron_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arsenal.ron");

    let config = ArsenalConfig::default();
    config.save(&path).unwrap();
    let loaded = ArsenalConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arsenal.json");

    let config = ArsenalConfig {
        weapons: vec![presets::arcane_staff(), presets::war_hammer()],
    };
    config.save(&path).unwrap();
    let loaded = ArsenalConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded
        .find("Arcane Staff")
        .unwrap()
        .controller()
        .has_chargeable_attack(Hand::Heavy));
}

#[test]
fn unknown_extension_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arsenal.toml");

    let err = ArsenalConfig::default().save(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    assert!(!path.exists());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArsenalConfig::load(dir.path().join("nope.ron")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn invalid_loadout_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");

    let mut sword = presets::crescent_sword();
    sword.name = "Broken Sword".into();
    let mut config = ArsenalConfig {
        weapons: vec![sword],
    };
    // serialize first, then corrupt the radii in the written text
    config.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
    value["weapons"][0]["light"]["Instant"]["Crescent"]["arc"]["inner_radius"] =
        serde_json::json!(99.0);
    std::fs::write(&path, value.to_string()).unwrap();

    match ArsenalConfig::load(&path) {
        Err(ConfigError::Invalid { weapon, reason }) => {
            assert_eq!(weapon, "Broken Sword");
            assert!(reason.starts_with("light"), "{reason}");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    config.weapons.clear();
    config.save(&path).unwrap();
    assert!(ArsenalConfig::load(&path).unwrap().weapons.is_empty());
}

#[test]
fn malformed_ron_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ron");
    std::fs::write(&path, "(weapons: [(name: \"Half\"").unwrap();
    assert!(matches!(
        ArsenalConfig::load(&path),
        Err(ConfigError::RonParse(_))
    ));
}

#[test]
fn minimal_ron_uses_defaults() {
    let text = r#"(
        weapons: [
            (
                name: "Stick",
                light: Some(Instant(Crescent((
                    timing: (damage: 3.0, cooldown: 0.2, windup: 0.0, active: 0.1),
                    arc: (inner_radius: 5.0, outer_radius: 12.0, arc_width_deg: 60.0, arc_center_offset_deg: 0.0),
                )))),
            ),
        ],
    )"#;
    let config = ArsenalConfig::from_ron_str(text).unwrap();
    let stick = config.find("Stick").unwrap();
    assert!(stick.auto_apply_damage);
    assert!(stick.heavy.is_none());
    assert!(stick.description.is_empty());

    let mut weapon = stick.controller();
    weapon.attack(Hand::Light, bevy::math::Vec2::X).unwrap();
    assert!(weapon.hit_window().is_some());
}
