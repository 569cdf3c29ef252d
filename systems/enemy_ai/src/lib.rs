#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour system driving the Patrol, Chase and Return state machine.
//!
//! Pursuit is a straight line towards the player. The system does not consult
//! the maze: the world rejects any step that would push an enemy into a wall,
//! so an enemy separated from the player by a wall presses against it until
//! the player comes around.

use std::{collections::BTreeSet, time::Duration};

use glam::Vec3;
use log::debug;
use maze_escape_core::{
    planar_distance, Command, EnemyId, EnemySnapshot, EnemyState, EnemyView, PlayerSnapshot,
};

/// Configuration parameters required to construct the enemy AI system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    chase_distance: f32,
    capture_distance: f32,
    waypoint_epsilon: f32,
    give_up_distance: Option<f32>,
}

impl Config {
    /// Creates a new configuration from the proximity thresholds.
    ///
    /// `give_up_distance` enables the Return state: a chasing enemy whose
    /// target is farther away than this walks back to its spawn point.
    #[must_use]
    pub const fn new(
        chase_distance: f32,
        capture_distance: f32,
        waypoint_epsilon: f32,
        give_up_distance: Option<f32>,
    ) -> Self {
        Self {
            chase_distance,
            capture_distance,
            waypoint_epsilon,
            give_up_distance,
        }
    }
}

/// Pure system that proposes enemy moves and state transitions.
#[derive(Debug)]
pub struct EnemyAi {
    config: Config,
    within_capture: BTreeSet<EnemyId>,
}

impl EnemyAi {
    /// Creates a new enemy AI system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            within_capture: BTreeSet::new(),
        }
    }

    /// Advances every enemy controller by `dt`.
    ///
    /// Movement and state proposals are pushed onto `out`. Enemies that entered
    /// the capture radius during this tick are pushed onto `captures`; an enemy
    /// is reported again only after the player has left its capture radius.
    pub fn handle(
        &mut self,
        dt: Duration,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
        captures: &mut Vec<EnemyId>,
    ) {
        let travel = dt.as_secs_f32();
        for enemy in enemies.iter() {
            let distance = planar_distance(enemy.position, player.position);
            match enemy.state {
                EnemyState::Patrol => self.patrol(enemy, distance, travel, out),
                EnemyState::Chase => {
                    self.chase(enemy, player.position, distance, travel, out, captures)
                }
                EnemyState::Return => self.return_home(enemy, distance, travel, out),
            }
        }
    }

    fn patrol(&self, enemy: &EnemySnapshot, distance: f32, travel: f32, out: &mut Vec<Command>) {
        if distance < self.config.chase_distance {
            transition(enemy, EnemyState::Chase, out);
            return;
        }

        if planar_distance(enemy.position, enemy.waypoint) < self.config.waypoint_epsilon {
            out.push(Command::AdvanceWaypoint { enemy: enemy.id });
            return;
        }

        advance_towards(enemy, enemy.waypoint, travel, out);
    }

    fn chase(
        &mut self,
        enemy: &EnemySnapshot,
        target: Vec3,
        distance: f32,
        travel: f32,
        out: &mut Vec<Command>,
        captures: &mut Vec<EnemyId>,
    ) {
        if let Some(give_up) = self.config.give_up_distance {
            if distance > give_up {
                let _ = self.within_capture.remove(&enemy.id);
                transition(enemy, EnemyState::Return, out);
                return;
            }
        }

        if distance < self.config.capture_distance {
            if self.within_capture.insert(enemy.id) {
                debug!("enemy {} captured the player at {distance:.3}", enemy.id.get());
                captures.push(enemy.id);
            }
            return;
        }

        let _ = self.within_capture.remove(&enemy.id);
        advance_towards(enemy, target, travel, out);
    }

    fn return_home(
        &self,
        enemy: &EnemySnapshot,
        distance: f32,
        travel: f32,
        out: &mut Vec<Command>,
    ) {
        if distance < self.config.chase_distance {
            transition(enemy, EnemyState::Chase, out);
            return;
        }

        if planar_distance(enemy.position, enemy.home) < self.config.waypoint_epsilon {
            transition(enemy, EnemyState::Patrol, out);
            return;
        }

        advance_towards(enemy, enemy.home, travel, out);
    }
}

fn transition(enemy: &EnemySnapshot, state: EnemyState, out: &mut Vec<Command>) {
    out.push(Command::SetEnemyState {
        enemy: enemy.id,
        state,
    });
}

fn advance_towards(enemy: &EnemySnapshot, target: Vec3, seconds: f32, out: &mut Vec<Command>) {
    let reach = enemy.speed * seconds;
    if !(reach.is_finite() && reach > 0.0) {
        return;
    }

    out.push(Command::MoveEnemy {
        enemy: enemy.id,
        to: step_towards(enemy.position, target, reach),
    });
}

/// Moves `from` towards `to` on the x/z plane by at most `reach`, keeping the
/// height of `from`. Lands exactly on the target instead of overshooting it.
#[must_use]
pub fn step_towards(from: Vec3, to: Vec3, reach: f32) -> Vec3 {
    let remaining = planar_distance(from, to);
    if remaining <= reach {
        return Vec3::new(to.x, from.y, to.z);
    }

    let scale = reach / remaining;
    Vec3::new(
        from.x + (to.x - from.x) * scale,
        from.y,
        from.z + (to.z - from.z) * scale,
    )
}
