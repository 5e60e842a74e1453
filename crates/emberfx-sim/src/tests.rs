//! Tests for the engine, sub-emitter routing, scenes and determinism.

use glam::Vec2;

use emberfx_core::commands::{EmitParams, SystemCommand};
use emberfx_core::constants::SUB_EMITTER_DEPTH;
use emberfx_core::curves::MinMaxCurve;
use emberfx_core::enums::*;
use emberfx_core::error::ConfigIssue;
use emberfx_core::events::ParticleEvent;
use emberfx_core::modules::{BurstEntry, SubEmitterEntry, SystemModules};
use emberfx_core::types::SystemId;

use crate::engine::{EngineConfig, EngineError, ParticleEngine};
use crate::scene::{Preset, SceneConfig, SceneError, SceneSubEmitter, SceneSystem};

const DT: f32 = 1.0 / 60.0;

/// Modules that emit nothing unless told to.
fn quiet() -> SystemModules {
    let mut modules = SystemModules::default();
    modules.main.play_on_start = false;
    modules.main.looping = false;
    modules.main.duration = 10.0;
    modules.main.start_lifetime = MinMaxCurve::constant(1.0);
    modules.emission.enabled = false;
    modules
}

fn with_sub(mut modules: SystemModules, kind: SubEmitterKind, target: SystemId) -> SystemModules {
    modules.sub_emitters.enabled = true;
    modules
        .sub_emitters
        .entries
        .push(SubEmitterEntry::new(kind, target));
    modules
}

fn still_particle(position: Vec2, lifetime: f32) -> SystemCommand {
    SystemCommand::Emit {
        params: EmitParams {
            position,
            lifetime,
            ..Default::default()
        },
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let scene = SceneConfig::preset(Preset::Fireworks);
    let (mut engine_a, _) = scene.build().unwrap();
    let (mut engine_b, _) = scene.build().unwrap();

    for _ in 0..300 {
        let snap_a = engine_a.tick(DT);
        let snap_b = engine_b.tick(DT);

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut scene_a = SceneConfig::preset(Preset::Fireworks);
    let mut scene_b = scene_a.clone();
    scene_a.seed = 111;
    scene_b.seed = 222;
    let (mut engine_a, _) = scene_a.build().unwrap();
    let (mut engine_b, _) = scene_b.build().unwrap();

    let mut diverged = false;
    for _ in 0..60 {
        let json_a = serde_json::to_string(&engine_a.tick(DT)).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick(DT)).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent output");
}

#[test]
fn test_simulate_restart_reproduces_frame() {
    let (mut engine, ids) = SceneConfig::preset(Preset::Fireworks).build().unwrap();
    let rockets = ids[0];

    let frame = |engine: &mut ParticleEngine| -> Vec<(Vec2, f32)> {
        engine
            .snapshot()
            .system("rockets")
            .unwrap()
            .particles
            .iter()
            .map(|p| (p.position, p.size))
            .collect()
    };

    let simulate = |time| SystemCommand::Simulate {
        time,
        restart: true,
    };

    engine.apply(rockets, simulate(1.0)).unwrap();
    let first = frame(&mut engine);
    assert!(!first.is_empty());

    engine
        .apply(
            rockets,
            SystemCommand::Simulate {
                time: 0.5,
                restart: false,
            },
        )
        .unwrap();
    engine.apply(rockets, simulate(1.0)).unwrap();
    assert_eq!(first, frame(&mut engine));
}

// ---- Emission ----

#[test]
fn test_burst_cycles_emit_exact_count() {
    let mut modules = quiet();
    modules.main.duration = 3.0;
    modules.main.start_lifetime = MinMaxCurve::constant(10.0);
    modules.emission.bursts = vec![BurstEntry::new(1.0, 5.0, 2, 0.5)];

    let mut engine = ParticleEngine::new(EngineConfig::default());
    let id = engine.add_system("burst", modules, 64);
    engine.apply(id, SystemCommand::Play).unwrap();

    let mut snap = engine.tick(DT);
    for _ in 0..240 {
        snap = engine.tick(DT);
    }
    let system = snap.system("burst").unwrap();
    assert_eq!(system.active_count, 10);
    // The timeline ended at 3s but its particles are still alive.
    assert_eq!(system.playback, PlaybackState::Playing);
}

#[test]
fn test_play_on_start() {
    let mut modules = quiet();
    modules.main.play_on_start = true;
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let id = engine.add_system("auto", modules, 8);
    assert!(engine.system(id).unwrap().is_playing());
}

#[test]
fn test_queued_commands_apply_at_tick() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let id = engine.add_system("queued", quiet(), 16);

    engine.queue_command(id, SystemCommand::EmitBurst { count: 5 });
    assert_eq!(engine.system(id).unwrap().active_count(), 0);

    let snap = engine.tick(DT);
    assert_eq!(snap.system("queued").unwrap().active_count, 5);
}

#[test]
fn test_tick_clamps_delta() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    engine.add_system("any", quiet(), 4);
    let snap = engine.tick(5.0);
    assert!((snap.time.elapsed_secs - 0.1).abs() < 1e-6);
    assert_eq!(snap.time.tick, 1);
}

#[test]
fn test_emit_sprite_with_interval() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let id = engine.add_system("sprites", quiet(), 16);
    engine
        .apply(
            id,
            SystemCommand::EmitSprite {
                sprite_slot: 7,
                uv_rect: glam::Vec4::new(0.0, 0.0, 0.5, 0.5),
                count: 3,
                interval: 0.25,
            },
        )
        .unwrap();

    let snap = engine.tick(DT);
    assert_eq!(snap.system("sprites").unwrap().active_count, 1);

    let mut snap = snap;
    for _ in 0..45 {
        snap = engine.tick(DT);
    }
    let system = snap.system("sprites").unwrap();
    assert_eq!(system.active_count, 3);
    assert!(system.particles.iter().all(|p| p.sprite_slot == 7));
}

#[test]
fn test_idempotent_clear() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let id = engine.add_system("clear", quiet(), 32);
    engine.apply(id, SystemCommand::EmitBurst { count: 20 }).unwrap();

    engine.apply(id, SystemCommand::Clear).unwrap();
    assert_eq!(engine.system(id).unwrap().active_count(), 0);
    engine.apply(id, SystemCommand::Clear).unwrap();
    assert_eq!(engine.system(id).unwrap().active_count(), 0);
}

#[test]
fn test_set_max_particles() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let id = engine.add_system("resize", quiet(), 8);
    engine.apply(id, SystemCommand::EmitBurst { count: 8 }).unwrap();
    engine
        .apply(id, SystemCommand::SetMaxParticles { max_particles: 3 })
        .unwrap();

    let snap = engine.snapshot();
    let system = snap.system("resize").unwrap();
    assert_eq!(system.capacity, 3);
    assert_eq!(system.active_count, 0);
    assert!(system
        .events
        .contains(&ParticleEvent::StoreRebuilt { capacity: 3 }));
}

#[test]
fn test_attraction_target_command() {
    let mut modules = quiet();
    modules.attraction.enabled = true;
    modules.attraction.amount = MinMaxCurve::constant(1.0);

    let mut engine = ParticleEngine::new(EngineConfig::default());
    let id = engine.add_system("attract", modules, 4);
    let target = Vec2::new(-40.0, 15.0);
    engine
        .apply(
            id,
            SystemCommand::SetAttractionTarget {
                target: Some(target),
            },
        )
        .unwrap();
    engine.apply(id, SystemCommand::EmitSingle).unwrap();

    let snap = engine.tick(DT);
    let particle = snap.system("attract").unwrap().particles[0];
    assert!(particle.position.abs_diff_eq(target, 1e-3));
}

// ---- Errors ----

#[test]
fn test_unknown_system() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let id = engine.add_system("gone", quiet(), 4);
    engine.remove_system(id).unwrap();

    assert_eq!(
        engine.apply(id, SystemCommand::Play),
        Err(EngineError::UnknownSystem(id))
    );
    assert!(engine.system(id).is_err());
    assert_eq!(engine.remove_system(id), Err(EngineError::UnknownSystem(id)));

    // A recycled slot does not resolve to the old id.
    let new_id = engine.add_system("new", quiet(), 4);
    assert_ne!(new_id, id);
    assert!(engine.system(id).is_err());
}

#[test]
fn test_missing_target_is_skipped() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let child = engine.add_system("child", quiet(), 4);
    let parent = engine.add_system("parent", with_sub(quiet(), SubEmitterKind::Birth, child), 4);
    engine.remove_system(child).unwrap();

    engine.apply(parent, SystemCommand::EmitSingle).unwrap();
    assert_eq!(engine.system(parent).unwrap().active_count(), 1);
}

// ---- Sub-emitters ----

#[test]
fn test_depth_cap_bounds_two_cycle() {
    let mut modules = quiet();
    modules.main.play_on_start = true;
    modules.main.looping = true;
    modules.main.start_lifetime = MinMaxCurve::constant(0.5);
    modules.emission.enabled = true;
    modules.emission.rate_over_time = 50.0;

    let mut engine = ParticleEngine::new(EngineConfig::default());
    let a = engine.add_system("a", modules.clone(), 50);
    let b = engine.add_system("b", modules.clone(), 50);
    engine
        .reconfigure(a, with_sub(modules.clone(), SubEmitterKind::Birth, b))
        .unwrap();
    engine
        .reconfigure(b, with_sub(modules, SubEmitterKind::Birth, a))
        .unwrap();

    for _ in 0..300 {
        let snap = engine.tick(DT);
        let sa = snap.system("a").unwrap();
        let sb = snap.system("b").unwrap();

        assert_eq!(sa.depth, 0);
        assert_eq!(sa.session_count, 0, "b never fires back into a");
        assert_eq!(sb.depth, SUB_EMITTER_DEPTH);
        assert!(sb.session_count <= sa.capacity);
        assert!(sb.active_count <= sb.capacity);
    }
}

#[test]
fn test_death_session_freezes_position() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let child = engine.add_system("child", quiet(), 16);
    let parent = engine.add_system("parent", with_sub(quiet(), SubEmitterKind::Death, child), 1);

    engine
        .apply(parent, still_particle(Vec2::new(10.0, 20.0), 0.05))
        .unwrap();
    for _ in 0..5 {
        engine.tick(0.02);
    }

    let death_position = |engine: &ParticleEngine| {
        let system = engine.system(child).unwrap();
        assert_eq!(system.sessions().len(), 1);
        let position = system.sessions()[0]
            .link
            .as_ref()
            .map(|link| link.base_position);
        position
    };
    assert_eq!(death_position(&engine), Some(Vec2::new(10.0, 20.0)));

    // The parent's only slot is reused by an unrelated particle.
    engine
        .apply(parent, still_particle(Vec2::new(-5.0, -5.0), 5.0))
        .unwrap();
    for _ in 0..10 {
        engine.tick(0.02);
    }
    assert_eq!(death_position(&engine), Some(Vec2::new(10.0, 20.0)));
}

#[test]
fn test_birth_session_tracks_and_ends_with_parent() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let child = engine.add_system("child", quiet(), 16);
    let parent = engine.add_system("parent", with_sub(quiet(), SubEmitterKind::Birth, child), 4);

    engine
        .apply(
            parent,
            SystemCommand::Emit {
                params: EmitParams {
                    velocity: Vec2::new(100.0, 0.0),
                    lifetime: 0.1,
                    ..Default::default()
                },
            },
        )
        .unwrap();
    assert_eq!(engine.system(child).unwrap().sessions().len(), 1);
    assert_eq!(engine.system(child).unwrap().depth(), 1);

    for _ in 0..3 {
        engine.tick(0.02);
    }
    {
        let child_system = engine.system(child).unwrap();
        let base = child_system.sessions()[0].link.as_ref().unwrap().base_position;
        let parent_x = engine.system(parent).unwrap().position(0).unwrap().x;
        assert!(base.x > 0.0);
        assert!(base.x <= parent_x);
    }

    let mut reasons = Vec::new();
    for _ in 0..10 {
        let snap = engine.tick(0.02);
        for event in &snap.system("child").unwrap().events {
            if let ParticleEvent::SessionEnded { reason, .. } = event {
                reasons.push(*reason);
            }
        }
    }
    assert_eq!(reasons, vec![SessionEndReason::ParentLost]);

    let child_system = engine.system(child).unwrap();
    assert!(child_system.sessions().is_empty());
    assert_eq!(child_system.depth(), 0);
}

#[test]
fn test_stop_drops_hosted_sessions() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let child = engine.add_system("child", quiet(), 16);
    let parent = engine.add_system("parent", with_sub(quiet(), SubEmitterKind::Birth, child), 4);

    engine
        .apply(parent, still_particle(Vec2::ZERO, 5.0))
        .unwrap();
    engine.tick(DT);
    assert_eq!(engine.system(child).unwrap().sessions().len(), 1);

    engine
        .apply(
            child,
            SystemCommand::Stop {
                clear_particles: false,
            },
        )
        .unwrap();
    let child_system = engine.system(child).unwrap();
    assert!(child_system.sessions().is_empty());
    assert_eq!(child_system.depth(), 0);
    drop(child_system);

    // Stopping the child leaves the parent alone.
    assert_eq!(engine.system(parent).unwrap().active_count(), 1);
}

#[test]
fn test_pause_cascades_to_targets() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let child = engine.add_system("child", quiet(), 4);
    let parent = engine.add_system("parent", with_sub(quiet(), SubEmitterKind::Death, child), 4);
    // Close the loop so the cascade has to stop on its own.
    engine
        .reconfigure(child, with_sub(quiet(), SubEmitterKind::Death, parent))
        .unwrap();
    let other = engine.add_system("other", quiet(), 4);

    engine.apply(parent, SystemCommand::Pause).unwrap();
    assert!(engine.system(parent).unwrap().is_paused());
    assert!(engine.system(child).unwrap().is_paused());
    assert!(!engine.system(other).unwrap().is_paused());

    engine.apply(parent, SystemCommand::Resume).unwrap();
    assert!(!engine.system(parent).unwrap().is_paused());
    assert!(!engine.system(child).unwrap().is_paused());
}

#[test]
fn test_diagnose_reports_cycle() {
    let mut engine = ParticleEngine::new(EngineConfig::default());
    let a = engine.add_system("a", quiet(), 4);
    let b = engine.add_system("b", quiet(), 4);
    engine
        .reconfigure(a, with_sub(quiet(), SubEmitterKind::Birth, b))
        .unwrap();
    engine
        .reconfigure(b, with_sub(quiet(), SubEmitterKind::Death, a))
        .unwrap();

    assert_eq!(
        engine.diagnose(a).unwrap(),
        vec![ConfigIssue::Cycle { entry: 0, target: b }]
    );

    engine
        .reconfigure(b, with_sub(quiet(), SubEmitterKind::Death, b))
        .unwrap();
    assert!(engine.diagnose(a).unwrap().is_empty());
    assert_eq!(
        engine.diagnose(b).unwrap(),
        vec![ConfigIssue::SelfReference { entry: 0 }]
    );
}

// ---- Scenes ----

#[test]
fn test_fireworks_spark_on_rocket_death() {
    let (mut engine, _) = SceneConfig::preset(Preset::Fireworks).build().unwrap();

    let mut max_sparks = 0;
    for _ in 0..240 {
        let snap = engine.tick(DT);
        let rockets = snap.system("rockets").unwrap();
        assert_eq!(rockets.depth, 0);
        max_sparks = max_sparks.max(snap.system("sparks").unwrap().active_count);
    }
    assert!(max_sparks >= 40, "expected at least one full spark burst");
}

#[test]
fn test_comet_tail_follows_head() {
    let (mut engine, _) = SceneConfig::preset(Preset::Comet).build().unwrap();

    let mut snap = engine.tick(DT);
    for _ in 0..60 {
        snap = engine.tick(DT);
    }
    let head = snap.system("head").unwrap();
    let tail = snap.system("tail").unwrap();
    assert_eq!(head.active_count, 1);
    assert_eq!(tail.session_count, 1);
    assert_eq!(tail.depth, 1);
    assert!(tail.active_count > 0);
}

#[test]
fn test_scene_json_round_trip() {
    for preset in Preset::ALL {
        let scene = SceneConfig::preset(preset);
        let json = scene.to_json().unwrap();
        assert_eq!(SceneConfig::from_json(&json).unwrap(), scene);
        assert_eq!(Preset::from_name(preset.name()), Some(preset));
    }
    assert_eq!(Preset::from_name("nope"), None);
}

#[test]
fn test_scene_rejects_unknown_target() {
    let scene = SceneConfig {
        systems: vec![SceneSystem {
            name: "lonely".into(),
            sub_emitters: vec![SceneSubEmitter {
                target: "missing".into(),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    };
    assert!(matches!(
        scene.build(),
        Err(SceneError::UnknownTarget { target, .. }) if target == "missing"
    ));
}

#[test]
fn test_scene_rejects_duplicate_names() {
    let twin = SceneSystem {
        name: "twin".into(),
        ..Default::default()
    };
    let scene = SceneConfig {
        systems: vec![twin.clone(), twin],
        ..Default::default()
    };
    assert!(matches!(scene.build(), Err(SceneError::DuplicateName(name)) if name == "twin"));
}

#[test]
fn test_scene_minimal_json() {
    let scene = SceneConfig::from_json(
        r#"{ "systems": [ { "name": "dust", "modules": { "emission": { "enabled": true } } } ] }"#,
    )
    .unwrap();
    let (mut engine, ids) = scene.build().unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(engine.find("dust"), Some(ids[0]));

    let snap = engine.tick(DT);
    assert!(snap.total_active() > 0);
}
