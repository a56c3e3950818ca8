//! Crowd Enemy - headless demo.
//!
//! A target walks up to a single crowd grunt, trades blows with it and
//! watches it die. Time advances by a fixed step per update, so every run
//! logs the same sequence.

use std::collections::HashMap;
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crowd_enemy::core::{AnimationCue, AnimationCueEvent, AnimationTriggerEvent, DamageEvent, DeathEvent};
use crowd_enemy::enemies::data::load_enemy_definitions;
use crowd_enemy::enemies::{
    spawn_crowd_enemy, AnimFlag, CrowdEnemy, CrowdEnemySystems, CrowdTarget, EnemyRegistry,
    EnemyState, PatrolBounds,
};

const STEP: Duration = Duration::from_nanos(16_666_667);
const DEMO_STEPS: u32 = 1200;

const TARGET_SPEED: f32 = 1.0;
const STRIKE_RANGE: f32 = 2.0;
const STRIKE_COOLDOWN: Duration = Duration::from_millis(1500);

/// Cue timeline of one swing, measured from the first attacking tick.
const SWING: [(Duration, AnimationCue); 4] = [
    (Duration::from_millis(100), AnimationCue::AttackStarted),
    (Duration::from_millis(200), AnimationCue::ParryWindowOpened),
    (Duration::from_millis(400), AnimationCue::AttackDamageEnded),
    (Duration::from_millis(600), AnimationCue::AttackFinished),
];

fn main() {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        LogPlugin {
            filter: "info,crowd_enemy=debug".to_string(),
            ..default()
        },
    ))
    .insert_resource(Time::<Fixed>::from_duration(STEP))
    .insert_resource(TimeUpdateStrategy::ManualDuration(STEP))
    .add_plugins(crowd_enemy::CrowdEnemyPlugin)
    .add_systems(Startup, spawn_demo.after(load_enemy_definitions))
    .add_systems(
        FixedUpdate,
        (walk_target, strike_enemies, play_swings)
            .chain()
            .before(CrowdEnemySystems),
    )
    .add_systems(FixedUpdate, report_events.after(CrowdEnemySystems));

    app.finish();
    app.cleanup();

    for _ in 0..DEMO_STEPS {
        app.update();
    }
    info!("Demo finished");
}

fn spawn_demo(mut commands: Commands, registry: Res<EnemyRegistry>) {
    commands.spawn((CrowdTarget, Transform::from_xyz(12.0, 0.0, 0.0)));

    let bounds = PatrolBounds {
        min_x: -5.0,
        max_x: 5.0,
        lookahead: 0.5,
    };
    let mut rng = rand::thread_rng();
    if let Err(e) = spawn_crowd_enemy(
        &mut commands,
        &registry,
        "crowd_grunt",
        Vec2::ZERO,
        Some(bounds),
        &mut rng,
    ) {
        error!("Demo enemy not spawned: {}", e);
    }
}

/// Walk the target toward the first enemy and stop just short of it.
fn walk_target(
    time: Res<Time<Fixed>>,
    mut targets: Query<&mut Transform, (With<CrowdTarget>, Without<CrowdEnemy>)>,
    enemies: Query<&Transform, With<CrowdEnemy>>,
) {
    let Some(enemy) = enemies.iter().next() else {
        return;
    };

    for mut target in targets.iter_mut() {
        let dx = enemy.translation.x - target.translation.x;
        if dx.abs() > 1.0 {
            target.translation.x += dx.signum() * TARGET_SPEED * time.timestep().as_secs_f32();
        }
    }
}

/// The target hits every enemy in reach, then waits out its cooldown.
fn strike_enemies(
    time: Res<Time<Fixed>>,
    mut cooldown: Local<Duration>,
    targets: Query<&Transform, (With<CrowdTarget>, Without<CrowdEnemy>)>,
    enemies: Query<(Entity, &Transform), With<CrowdEnemy>>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    *cooldown = cooldown.saturating_sub(time.timestep());
    if !cooldown.is_zero() {
        return;
    }
    let Ok(target) = targets.get_single() else {
        return;
    };

    for (entity, transform) in enemies.iter() {
        if transform.translation.distance(target.translation) <= STRIKE_RANGE {
            damage_events.send(DamageEvent {
                target: entity,
                source: None,
                amount: 8.0,
                stun: 4.0,
            });
            *cooldown = STRIKE_COOLDOWN;
        }
    }
}

/// Stand-in for an animation layer: plays every swing on the same timeline.
fn play_swings(
    time: Res<Time<Fixed>>,
    mut swings: Local<HashMap<Entity, Duration>>,
    enemies: Query<(Entity, &CrowdEnemy)>,
    mut cues: EventWriter<AnimationCueEvent>,
) {
    for (entity, enemy) in enemies.iter() {
        let swinging =
            enemy.state() == EnemyState::Attack && enemy.animator().get(AnimFlag::BasicAttack);
        if !swinging {
            swings.remove(&entity);
            continue;
        }

        let elapsed = swings.entry(entity).or_default();
        let before = *elapsed;
        *elapsed += time.timestep();
        for (at, cue) in SWING {
            if before < at && *elapsed >= at {
                cues.send(AnimationCueEvent { entity, cue });
            }
        }
    }
}

fn report_events(
    mut deaths: EventReader<DeathEvent>,
    mut triggers: EventReader<AnimationTriggerEvent>,
) {
    for event in triggers.read() {
        info!("{:?} plays {:?}", event.entity, event.trigger);
    }
    for event in deaths.read() {
        info!("{:?} died", event.entity);
    }
}
