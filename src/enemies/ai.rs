//! Systems that drive crowd enemies from the ECS.
//!
//! Events are fed into the state machines first, then every enemy ticks once
//! per fixed step and its recorded effects are applied to the world.

use std::time::Duration;

use bevy::prelude::*;

use super::components::{CollisionLayer, CrowdTarget, DespawnTimer, PatrolBounds};
use super::machine::CrowdEnemy;
use super::ports::{BoundsSensor, Effect, EffectBuffer, RangeSensor, Senses};
use crate::core::{
    AnimationCue, AnimationCueEvent, AnimationTriggerEvent, DamageEvent, DeathEvent, StunEvent,
};

type TargetQuery<'w, 's> = Query<'w, 's, &'static Transform, (With<CrowdTarget>, Without<CrowdEnemy>)>;

/// Closest target to `origin`, in the side-view plane.
fn nearest_target(origin: Vec2, targets: &TargetQuery<'_, '_>) -> Option<Vec2> {
    targets
        .iter()
        .map(|transform| transform.translation.truncate())
        .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
}

/// Start or shorten the removal countdown. The earliest request wins.
fn schedule_removal(
    commands: &mut Commands,
    entity: Entity,
    existing: Option<Mut<DespawnTimer>>,
    delay: Duration,
) {
    match existing {
        Some(mut timer) => {
            if timer.0.remaining() > delay {
                *timer = DespawnTimer::new(delay);
            }
        }
        None => {
            commands.entity(entity).insert(DespawnTimer::new(delay));
        }
    }
}

/// Route damage events to the enemies they hit.
pub fn apply_damage_events(
    mut damage_events: EventReader<DamageEvent>,
    mut enemies: Query<&mut CrowdEnemy>,
) {
    for event in damage_events.read() {
        if let Ok(mut enemy) = enemies.get_mut(event.target) {
            enemy.on_damaged(event.amount, event.stun);
        }
    }
}

pub fn apply_stun_events(mut stun_events: EventReader<StunEvent>, mut enemies: Query<&mut CrowdEnemy>) {
    for event in stun_events.read() {
        if let Ok(mut enemy) = enemies.get_mut(event.target) {
            enemy.on_stun_threshold_reached();
        }
    }
}

/// Route animation cues to the state machines.
pub fn apply_animation_cues(
    mut commands: Commands,
    mut cues: EventReader<AnimationCueEvent>,
    targets: TargetQuery,
    mut enemies: Query<(&mut CrowdEnemy, &Transform, Option<&PatrolBounds>, Option<&mut DespawnTimer>)>,
) {
    for event in cues.read() {
        let Ok((mut enemy, transform, bounds, despawn)) = enemies.get_mut(event.entity) else {
            continue;
        };

        match event.cue {
            AnimationCue::AttackStarted => enemy.on_attack_started(),
            AnimationCue::ParryWindowOpened => enemy.on_parry_window_opened(),
            AnimationCue::AttackDamageEnded => enemy.on_attack_damage_ended(),
            AnimationCue::AttackFinished => {
                let origin = transform.translation.truncate();
                let sensor = RangeSensor::new(enemy.config(), origin, nearest_target(origin, &targets));
                let walls = BoundsSensor {
                    x: origin.x,
                    bounds: bounds.copied(),
                };
                enemy.on_attack_finished(Senses {
                    perception: &sensor,
                    combat: &sensor,
                    walls: &walls,
                });
            }
            AnimationCue::DespawnRequested => {
                let mut effects = EffectBuffer::default();
                enemy.on_despawn_requested(&mut effects);
                let requested = effects.drain().next();
                if let Some(Effect::DestroyAfter(delay)) = requested {
                    schedule_removal(&mut commands, event.entity, despawn, delay);
                }
            }
        }
    }
}

/// Tick every crowd enemy once and apply what it asked for.
pub fn tick_crowd_enemies(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    targets: TargetQuery,
    mut enemies: Query<(
        Entity,
        &mut CrowdEnemy,
        &mut Transform,
        Option<&PatrolBounds>,
        Option<&mut DespawnTimer>,
    )>,
    mut death_events: EventWriter<DeathEvent>,
    mut trigger_events: EventWriter<AnimationTriggerEvent>,
) {
    let dt = time.timestep();
    let mut effects = EffectBuffer::default();

    for (entity, mut enemy, mut transform, bounds, mut despawn) in enemies.iter_mut() {
        let origin = transform.translation.truncate();
        let sensor = RangeSensor::new(enemy.config(), origin, nearest_target(origin, &targets));
        let walls = BoundsSensor {
            x: origin.x,
            bounds: bounds.copied(),
        };
        let senses = Senses {
            perception: &sensor,
            combat: &sensor,
            walls: &walls,
        };

        if let Err(e) = enemy.tick(dt, senses, &mut effects) {
            error!("Crowd enemy {:?} stalled: {}", entity, e);
        }

        for effect in effects.drain() {
            match effect {
                Effect::Move(velocity) => {
                    transform.translation += (velocity * dt.as_secs_f32()).extend(0.0);
                }
                Effect::Faced(facing) => {
                    transform.scale.x = transform.scale.x.abs() * facing.sign();
                }
                Effect::CollisionLayer(layer) => {
                    commands.entity(entity).insert(CollisionLayer(layer));
                }
                Effect::Died => {
                    death_events.send(DeathEvent { entity });
                }
                Effect::DestroyAfter(delay) => {
                    schedule_removal(&mut commands, entity, despawn.take(), delay);
                }
            }
        }

        for trigger in enemy.animator_mut().drain_triggers() {
            trigger_events.send(AnimationTriggerEvent { entity, trigger });
        }
    }
}

/// Despawn entities whose removal countdown ran out.
pub fn despawn_expired(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut DespawnTimer)>,
) {
    for (entity, mut despawn_timer) in query.iter_mut() {
        despawn_timer.0.tick(time.timestep());

        if despawn_timer.0.finished() {
            debug!("Despawning {:?}", entity);
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CorePlugin;
    use crate::enemies::animator::{AnimFlag, AnimTrigger};
    use crate::enemies::attack::BasicAttack;
    use crate::enemies::components::{EnemyState, Facing};
    use crate::enemies::data::EnemyConfig;

    fn test_app() -> App {
        let mut app = App::new();
        // 100 ms per step
        app.insert_resource(Time::<Fixed>::from_hz(10.0))
            .add_plugins(CorePlugin)
            .add_systems(
                FixedUpdate,
                (
                    apply_damage_events,
                    apply_stun_events,
                    apply_animation_cues,
                    tick_crowd_enemies,
                    despawn_expired,
                )
                    .chain(),
            );
        app
    }

    fn step(app: &mut App) {
        app.world_mut().run_schedule(FixedUpdate);
    }

    fn spawn_enemy(app: &mut App, x: f32) -> Entity {
        let config = EnemyConfig {
            destroy_delay: Duration::from_secs(1),
            ..Default::default()
        };
        let enemy = CrowdEnemy::new(config, Facing::Right)
            .unwrap()
            .with_attack_pattern(BasicAttack);
        app.world_mut()
            .spawn((enemy, Transform::from_xyz(x, 0.0, 0.0)))
            .id()
    }

    fn state(app: &App, entity: Entity) -> EnemyState {
        app.world().get::<CrowdEnemy>(entity).unwrap().state()
    }

    fn x(app: &App, entity: Entity) -> f32 {
        app.world().get::<Transform>(entity).unwrap().translation.x
    }

    #[test]
    fn patrol_moves_by_speed_times_step() {
        let mut app = test_app();
        let enemy = spawn_enemy(&mut app, 0.0);

        step(&mut app);

        assert_eq!(state(&app, enemy), EnemyState::Patrol);
        assert!((x(&app, enemy) - 0.2).abs() < 1e-5);
    }

    #[test]
    fn chases_nearest_target_and_turns_around() {
        let mut app = test_app();
        let enemy = spawn_enemy(&mut app, 0.0);
        app.world_mut()
            .spawn((CrowdTarget, Transform::from_xyz(-3.0, 0.0, 0.0)));
        app.world_mut()
            .spawn((CrowdTarget, Transform::from_xyz(30.0, 0.0, 0.0)));

        step(&mut app);
        assert_eq!(state(&app, enemy), EnemyState::Chase);

        step(&mut app);
        let transform = app.world().get::<Transform>(enemy).unwrap();
        assert!(transform.scale.x < 0.0);
        assert!(transform.translation.x < 0.0);
        assert_eq!(
            app.world().get::<CrowdEnemy>(enemy).unwrap().facing(),
            Facing::Left
        );
    }

    #[test]
    fn lethal_damage_reports_death_once_and_despawns() {
        let mut app = test_app();
        let enemy = spawn_enemy(&mut app, 0.0);

        app.world_mut().send_event(DamageEvent {
            target: enemy,
            source: None,
            amount: 500.0,
            stun: 0.0,
        });
        for _ in 0..5 {
            step(&mut app);
        }

        assert_eq!(state(&app, enemy), EnemyState::Dying);
        assert_eq!(app.world().resource::<Events<DeathEvent>>().len(), 1);
        assert_eq!(
            app.world().get::<CollisionLayer>(enemy),
            Some(&CollisionLayer(16))
        );
        assert!(app.world().get::<DespawnTimer>(enemy).is_some());

        for _ in 0..20 {
            step(&mut app);
        }
        assert!(!app.world().entities().contains(enemy));
        assert_eq!(app.world().resource::<Events<DeathEvent>>().len(), 1);
    }

    #[test]
    fn damage_emits_hurt_trigger() {
        let mut app = test_app();
        let enemy = spawn_enemy(&mut app, 0.0);

        app.world_mut().send_event(DamageEvent {
            target: enemy,
            source: None,
            amount: 1.0,
            stun: 0.0,
        });
        step(&mut app);

        let events = app.world().resource::<Events<AnimationTriggerEvent>>();
        let mut cursor = events.get_cursor();
        let triggers: Vec<_> = cursor.read(events).map(|e| (e.entity, e.trigger)).collect();
        assert_eq!(triggers, vec![(enemy, AnimTrigger::Hurt)]);
    }

    #[test]
    fn stun_event_breaks_guard() {
        let mut app = test_app();
        let enemy = spawn_enemy(&mut app, 0.0);

        app.world_mut().send_event(StunEvent { target: enemy });
        step(&mut app);

        assert_eq!(state(&app, enemy), EnemyState::Stunned);
        let machine = app.world().get::<CrowdEnemy>(enemy).unwrap();
        assert!(machine.animator().get(AnimFlag::Stun));
    }

    #[test]
    fn animation_cues_drive_the_swing() {
        let mut app = test_app();
        let enemy = spawn_enemy(&mut app, 0.0);
        app.world_mut()
            .spawn((CrowdTarget, Transform::from_xyz(1.0, 0.0, 0.0)));

        // Patrol -> Chase -> Attack
        step(&mut app);
        step(&mut app);
        assert_eq!(state(&app, enemy), EnemyState::Attack);

        app.world_mut().send_event(AnimationCueEvent {
            entity: enemy,
            cue: AnimationCue::AttackStarted,
        });
        step(&mut app);
        assert!(!app.world().get::<CrowdEnemy>(enemy).unwrap().gate().attackable());

        for cue in [AnimationCue::AttackDamageEnded, AnimationCue::AttackFinished] {
            app.world_mut().send_event(AnimationCueEvent { entity: enemy, cue });
        }
        step(&mut app);
        assert_eq!(state(&app, enemy), EnemyState::Chase);
    }

    #[test]
    fn despawn_cue_keeps_the_earliest_removal() {
        let mut app = test_app();
        let enemy = spawn_enemy(&mut app, 0.0);

        app.world_mut().send_event(AnimationCueEvent {
            entity: enemy,
            cue: AnimationCue::DespawnRequested,
        });
        step(&mut app);

        let timer = app.world().get::<DespawnTimer>(enemy).unwrap();
        assert_eq!(timer.0.duration(), Duration::from_secs(1));
    }
}
