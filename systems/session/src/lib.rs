#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game loop coordinator that owns the session and drives every system.
//!
//! [`Simulation`] is the aggregate the adapters talk to. Input is queued with
//! [`Simulation::queue_motion`] and consumed by [`Simulation::advance`], which
//! runs one tick in a fixed order: pending player motion, enemy AI, camera,
//! then the exit and contact checks. Terminal results are returned in the
//! [`TickReport`]; the coordinator never blocks on presentation.

use std::{
    collections::{BTreeSet, VecDeque},
    time::Duration,
};

use glam::Vec3;
use log::{debug, info};
use maze_escape_core::{planar_distance, CellCoord, Command, EnemyId, Event, Motion, Outcome};
use maze_escape_system_camera::{self as camera, CameraTracker};
use maze_escape_system_enemy_ai::{self as enemy_ai, EnemyAi};
use maze_escape_system_motion::{self as motion, PlayerMotion};
use maze_escape_world::{self as world, query, ConfigError, SimulationConfig, World};
use serde::{Deserialize, Serialize};

/// Read-only telemetry describing the session, suitable for a HUD.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Lives the player has left.
    pub lives: u32,
    /// Simulated time accumulated across every non-terminal tick.
    pub elapsed: Duration,
    /// Whether the session reached a terminal state.
    pub game_over: bool,
    /// Terminal result, present once `game_over` is set.
    pub outcome: Option<Outcome>,
    /// Cell the player must reach to escape.
    pub exit: CellCoord,
    /// Whether any enemy is currently chasing the player.
    pub any_chasing: bool,
}

/// Everything that happened during a single call to [`Simulation::advance`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// World events in the order they were produced.
    pub events: Vec<Event>,
    /// Enemies that reported a capture during the tick.
    pub captures: Vec<EnemyId>,
    /// Remaining lives if the player lost one during the tick.
    pub life_lost: Option<u32>,
    /// Terminal result if the session ended during the tick.
    pub outcome: Option<Outcome>,
}

#[derive(Debug)]
struct SessionState {
    lives: u32,
    elapsed: Duration,
    game_over: bool,
    outcome: Option<Outcome>,
    exit: CellCoord,
}

impl SessionState {
    fn finish(&mut self, outcome: Outcome) {
        self.game_over = true;
        self.outcome = Some(outcome);
    }
}

/// Simulation aggregate owning the world, the systems and the session state.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    motion: PlayerMotion,
    enemy_ai: EnemyAi,
    camera: CameraTracker,
    session: SessionState,
    exit_position: Vec3,
    exit_distance: f32,
    pending: VecDeque<Motion>,
    contacts: BTreeSet<EnemyId>,
}

impl Simulation {
    /// Builds a ready-to-run simulation from configuration.
    ///
    /// The camera is resolved once before returning so the first frame never
    /// shows an unplaced rig.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let world = World::new(config)?;
        let grid = query::grid(&world);
        let exit = config.session.exit_cell(grid)?;
        let exit_position = grid.cell_center(exit);

        let player = &config.player;
        let ai = &config.ai;
        let rig = &config.camera;
        let mut simulation = Self {
            world,
            motion: PlayerMotion::new(motion::Config::new(player.step, player.roll_radius)),
            enemy_ai: EnemyAi::new(enemy_ai::Config::new(
                ai.chase_distance,
                ai.capture_distance,
                ai.waypoint_epsilon,
                ai.give_up_distance,
            )),
            camera: CameraTracker::new(camera::Config::new(
                rig.offset,
                rig.radius,
                rig.sample_step,
            )),
            session: SessionState {
                lives: config.session.lives,
                elapsed: Duration::ZERO,
                game_over: false,
                outcome: None,
                exit,
            },
            exit_position,
            exit_distance: config.session.exit_distance,
            pending: VecDeque::new(),
            contacts: BTreeSet::new(),
        };

        let mut events = Vec::new();
        simulation.place_camera(&mut events);
        info!(
            "{} {} lives, exit at column {} row {}",
            query::welcome_banner(&simulation.world),
            simulation.session.lives,
            exit.column(),
            exit.row()
        );
        Ok(simulation)
    }

    /// Queues a player motion for the next tick. Ignored once the game is over.
    pub fn queue_motion(&mut self, motion: Motion) {
        if self.session.game_over {
            debug!("ignoring {motion:?} after the session ended");
            return;
        }
        self.pending.push_back(motion);
    }

    /// Advances the simulation by `dt`.
    ///
    /// Once the session is over this is a no-op that discards queued input.
    pub fn advance(&mut self, dt: Duration) -> TickReport {
        let mut report = TickReport::default();
        if self.session.game_over {
            self.pending.clear();
            return report;
        }

        self.session.elapsed = self.session.elapsed.saturating_add(dt);
        world::apply(&mut self.world, Command::Tick { dt }, &mut report.events);
        debug!("tick {} advanced by {dt:?}", query::tick_index(&self.world));

        let mut commands = Vec::new();
        while let Some(motion) = self.pending.pop_front() {
            self.motion
                .handle(motion, &query::player(&self.world), &mut commands);
            self.flush(&mut commands, &mut report.events);
        }

        self.enemy_ai.handle(
            dt,
            &query::player(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
            &mut report.captures,
        );
        self.flush(&mut commands, &mut report.events);

        self.place_camera(&mut report.events);

        let player = query::player(&self.world);
        if planar_distance(player.position, self.exit_position) < self.exit_distance {
            info!(
                "player escaped after {:.2}s",
                self.session.elapsed.as_secs_f32()
            );
            self.session.finish(Outcome::Escaped);
            report.outcome = Some(Outcome::Escaped);
            return report;
        }

        let touching: BTreeSet<EnemyId> = query::enemy_view(&self.world)
            .iter()
            .filter(|enemy| {
                planar_distance(player.position, enemy.position) < player.radius + enemy.radius
            })
            .map(|enemy| enemy.id)
            .collect();
        let new_contact = touching.difference(&self.contacts).next().is_some();
        self.contacts = touching;

        if new_contact || !report.captures.is_empty() {
            self.lose_life(&mut report);
        }

        report
    }

    /// Captures the current session telemetry.
    #[must_use]
    pub fn session(&self) -> SessionSnapshot {
        SessionSnapshot {
            lives: self.session.lives,
            elapsed: self.session.elapsed,
            game_over: self.session.game_over,
            outcome: self.session.outcome,
            exit: self.session.exit,
            any_chasing: query::enemy_view(&self.world).any_chasing(),
        }
    }

    /// Read-only access to the authoritative world for renderers.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn lose_life(&mut self, report: &mut TickReport) {
        self.session.lives = self.session.lives.saturating_sub(1);
        report.life_lost = Some(self.session.lives);

        if self.session.lives == 0 {
            info!("player captured, no lives left");
            self.session.finish(Outcome::Captured);
            report.outcome = Some(Outcome::Captured);
            return;
        }

        info!(
            "player caught, {} lives left; returning to the start",
            self.session.lives
        );
        world::apply(&mut self.world, Command::ResetPlayer, &mut report.events);
        self.place_camera(&mut report.events);
    }

    fn place_camera(&mut self, events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        self.camera.handle(
            &query::player(&self.world),
            query::grid(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, events);
    }

    fn flush(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_snapshot_round_trips_through_bincode() {
        let snapshot = SessionSnapshot {
            lives: 2,
            elapsed: Duration::from_millis(1_250),
            game_over: true,
            outcome: Some(Outcome::Captured),
            exit: CellCoord::new(9, 9),
            any_chasing: true,
        };

        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: SessionSnapshot = bincode::deserialize(&bytes).expect("deserialize");

        assert_eq!(restored, snapshot);
    }

    #[test]
    fn default_session_starts_with_resolved_camera() {
        let simulation = Simulation::new(&SimulationConfig::default()).expect("default config");
        let camera = query::camera(simulation.world());
        let grid = query::grid(simulation.world());

        assert!(!camera.fallback);
        assert!(!grid.collides(camera.position.x, camera.position.z, 0.1));

        let session = simulation.session();
        assert_eq!(session.lives, 3);
        assert_eq!(session.exit, CellCoord::new(9, 9));
        assert!(!session.game_over);
        assert!(!session.any_chasing);
    }
}
