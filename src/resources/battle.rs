//! Battle session bookkeeping.
//!
//! Combat is a stand-in: the session only owns the enemy unit entities of
//! the running level and the pause state. Victory is decided by the battle
//! panel's timer.

use crate::components::unit::{Enemy, Unit};
use crate::resources::worldtime::WorldTime;
use bevy_ecs::prelude::*;
use log::{info, warn};

#[derive(Resource, Debug, Default)]
pub struct BattleSession {
    level_id: Option<u32>,
    units: Vec<Entity>,
    paused: bool,
}

impl BattleSession {
    /// Spawn the level's enemy units and enter the battle. A battle already
    /// running is ended first.
    pub fn start(&mut self, level_id: u32, enemies: Vec<Unit>, commands: &mut Commands, time: &mut WorldTime) {
        if self.in_battle() {
            warn!("[BattleSession] Battle already running, ending it first");
            self.end(false, commands, time);
        }
        for unit in enemies {
            let entity = commands.spawn((unit, Enemy)).id();
            self.units.push(entity);
        }
        self.level_id = Some(level_id);
        info!(
            "[BattleSession] Battle started: level {} with {} enemies",
            level_id,
            self.units.len()
        );
    }

    /// Leave the battle and despawn its units. No-op when idle.
    pub fn end(&mut self, victory: bool, commands: &mut Commands, time: &mut WorldTime) {
        let Some(level_id) = self.level_id.take() else {
            return;
        };
        for entity in self.units.drain(..) {
            commands.entity(entity).despawn();
        }
        if self.paused {
            self.paused = false;
            time.resume();
        }
        info!(
            "[BattleSession] Battle ended: level {} victory={}",
            level_id, victory
        );
    }

    pub fn pause(&mut self, time: &mut WorldTime) {
        if self.in_battle() && !self.paused {
            self.paused = true;
            time.pause();
            info!("[BattleSession] Paused");
        }
    }

    pub fn resume(&mut self, time: &mut WorldTime) {
        if self.paused {
            self.paused = false;
            time.resume();
            info!("[BattleSession] Resumed");
        }
    }

    pub fn in_battle(&self) -> bool {
        self.level_id.is_some()
    }

    pub fn level_id(&self) -> Option<u32> {
        self.level_id
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn units(&self) -> &[Entity] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::system::RunSystemOnce;

    fn world() -> World {
        let mut world = World::new();
        world.insert_resource(BattleSession::default());
        world.insert_resource(WorldTime::default());
        world
    }

    fn goblins(n: usize) -> Vec<Unit> {
        (0..n).map(|i| Unit::new(i as u32, "Goblin", 1, 0, 10, 2, 1)).collect()
    }

    fn enemy_count(world: &mut World) -> usize {
        world.query::<(&Unit, &Enemy)>().iter(world).count()
    }

    #[test]
    fn start_spawns_and_end_despawns() {
        let mut world = world();
        world
            .run_system_once(
                |mut commands: Commands, mut battle: ResMut<BattleSession>, mut time: ResMut<WorldTime>| {
                    battle.start(1, goblins(3), &mut commands, &mut time);
                },
            )
            .unwrap();
        assert_eq!(enemy_count(&mut world), 3);
        assert_eq!(world.resource::<BattleSession>().level_id(), Some(1));

        world
            .run_system_once(
                |mut commands: Commands, mut battle: ResMut<BattleSession>, mut time: ResMut<WorldTime>| {
                    battle.end(true, &mut commands, &mut time);
                },
            )
            .unwrap();
        assert_eq!(enemy_count(&mut world), 0);
        assert!(!world.resource::<BattleSession>().in_battle());
    }

    #[test]
    fn pause_only_inside_battle_and_end_resumes() {
        let mut world = world();
        world
            .run_system_once(
                |mut commands: Commands, mut battle: ResMut<BattleSession>, mut time: ResMut<WorldTime>| {
                    battle.pause(&mut time);
                    assert!(!time.is_paused());
                    battle.start(2, goblins(1), &mut commands, &mut time);
                    battle.pause(&mut time);
                    assert!(time.is_paused());
                    battle.end(true, &mut commands, &mut time);
                    assert!(!time.is_paused());
                },
            )
            .unwrap();
        assert_eq!(world.resource::<WorldTime>().time_scale, 1.0);
    }
}
