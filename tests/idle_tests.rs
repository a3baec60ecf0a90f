//! Headless tests for [`IdlePlugin`].
//!
//! The plugin runs against [`MinimalPlugins`] with a keyboard resource the
//! test presses directly and a save path under the system temp directory.

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use wynisbuff::config::GameConfig;
use wynisbuff::events::LedgerEvent;
use wynisbuff::idle::systems::IdleSavePath;
use wynisbuff::idle::{load_ledger, IdleLedger, IdlePlugin};

#[derive(Resource, Default)]
struct Collected(Vec<LedgerEvent>);

fn collect_events(mut reader: MessageReader<LedgerEvent>, mut collected: ResMut<Collected>) {
    collected.0.extend(reader.read().cloned());
}

fn temp_save_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("wynisbuff_{name}_{}", std::process::id()))
        .join("idle_ledger.toml")
}

fn idle_app(save_path: PathBuf, step: Duration) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .insert_resource(GameConfig::default())
        .insert_resource(IdleSavePath(save_path))
        .init_resource::<ButtonInput<KeyCode>>()
        .init_resource::<Collected>()
        .add_plugins(IdlePlugin)
        .add_systems(PostUpdate, collect_events);
    app
}

/// Press `key` for exactly one frame.
fn tap(app: &mut App, key: KeyCode) {
    {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.clear();
        keys.press(key);
    }
    app.update();
    let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
    keys.release(key);
    keys.clear();
}

#[test]
fn debug_keys_drive_the_ledger() {
    let path = temp_save_path("keys");
    let mut app = idle_app(path.clone(), Duration::from_millis(16));
    app.update();
    assert_eq!(app.world().resource::<IdleLedger>().lane_count(), 0);

    tap(&mut app, KeyCode::KeyF);
    tap(&mut app, KeyCode::KeyF);
    tap(&mut app, KeyCode::KeyB);
    tap(&mut app, KeyCode::KeyR);

    let ledger = app.world().resource::<IdleLedger>();
    assert_eq!(ledger.lane_count(), 2);
    assert_eq!(ledger.boosts().count(), 1);
    let config = app.world().resource::<GameConfig>();
    for lane in ledger.lanes() {
        assert!(lane.base_rate >= config.forge_base_rate_min);
        assert!(lane.base_rate <= config.forge_base_rate_max);
        assert_eq!(lane.current_rate, lane.base_rate);
    }

    let events = &app.world().resource::<Collected>().0;
    let forged = events
        .iter()
        .filter(|e| matches!(e, LedgerEvent::LaneForged { .. }))
        .count();
    let refreshed = events
        .iter()
        .filter(|e| matches!(e, LedgerEvent::LaneRefreshed { .. }))
        .count();
    assert_eq!(forged, 2);
    assert_eq!(refreshed, 2);
    assert!(events.iter().any(|e| matches!(
        e,
        LedgerEvent::BoostApplied {
            multiplier,
            lane: None,
            ..
        } if *multiplier == 2.0
    )));

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn autosave_writes_a_restorable_snapshot() {
    let path = temp_save_path("autosave");
    let autosave = GameConfig::default().autosave_secs;
    let mut app = idle_app(path.clone(), Duration::from_secs_f32(autosave / 2.0 + 1.0));
    app.update();
    tap(&mut app, KeyCode::KeyF);

    for _ in 0..3 {
        app.update();
    }

    let snapshot = load_ledger(&path)
        .expect("autosave file should parse")
        .expect("autosave file should exist");
    assert_eq!(snapshot.lanes.len(), 1);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
