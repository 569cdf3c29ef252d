#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Escape.
//!
//! The world owns the static [`MazeGrid`], the player and enemy bodies and the
//! resolved camera rig. Systems never mutate it directly: they submit
//! [`Command`] values through [`apply`], which validates every body move
//! against the grid before accepting it and reports the result as [`Event`]s.

pub mod collision;
pub mod config;
pub mod grid;

use glam::Vec3;
use log::debug;
use maze_escape_core::{Command, EnemyId, EnemyState, Event, WELCOME_BANNER};

pub use config::{ConfigError, SimulationConfig};
pub use grid::{Cell, MazeGrid};

use config::{EnemyConfig, PlayerConfig};

/// Represents the authoritative Maze Escape world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: MazeGrid,
    player: Player,
    enemies: Vec<Enemy>,
    camera: CameraRig,
    tick_index: u64,
}

impl World {
    /// Builds a world from validated configuration.
    ///
    /// Fails fast if the layout is malformed or if the player start cell or
    /// any enemy waypoint overlaps a wall.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.maze.build_grid()?;
        let player = Player::spawn(&grid, &config.player)?;
        let enemies = config
            .enemies
            .iter()
            .enumerate()
            .map(|(index, enemy)| {
                let id = EnemyId::new(u32::try_from(index).unwrap_or(u32::MAX));
                Enemy::spawn(id, &grid, enemy)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let camera = CameraRig::anchored_on(player.position);

        Ok(Self {
            banner: WELCOME_BANNER,
            grid,
            player,
            enemies,
            camera,
            tick_index: 0,
        })
    }

    fn enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|candidate| candidate.id == enemy)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MovePlayer { to, roll_delta } => {
            let player = &mut world.player;
            if collision::footprint_clear(&world.grid, to, player.radius) {
                let from = player.position;
                player.position = to;
                player.roll += roll_delta;
                out_events.push(Event::PlayerMoved { from, to });
            } else {
                debug!("player move to {to} rejected by wall collision");
                out_events.push(Event::PlayerMoveRejected { attempted: to });
            }
        }
        Command::TurnPlayer { turns } => {
            let player = &mut world.player;
            player.turns = player.turns.saturating_add(turns);
            out_events.push(Event::PlayerTurned {
                heading: player.heading(),
            });
        }
        Command::ResetPlayer => {
            let player = &mut world.player;
            player.position = player.start;
            player.turns = 0;
            player.roll = 0.0;
            out_events.push(Event::PlayerReset {
                position: player.start,
            });
        }
        Command::MoveEnemy { enemy, to } => {
            let grid = &world.grid;
            let Some(body) = world.enemies.iter_mut().find(|body| body.id == enemy) else {
                return;
            };
            if collision::footprint_clear(grid, to, body.radius) {
                let from = body.position;
                body.position = to;
                out_events.push(Event::EnemyMoved { enemy, from, to });
            } else {
                debug!("enemy {} move to {to} rejected by wall collision", enemy.get());
                out_events.push(Event::EnemyMoveRejected {
                    enemy,
                    attempted: to,
                });
            }
        }
        Command::SetEnemyState { enemy, state } => {
            let Some(body) = world.enemy_mut(enemy) else {
                return;
            };
            if body.state != state {
                let from = body.state;
                body.state = state;
                debug!("enemy {} transitioned {from:?} -> {state:?}", enemy.get());
                out_events.push(Event::EnemyStateChanged {
                    enemy,
                    from,
                    to: state,
                });
            }
        }
        Command::AdvanceWaypoint { enemy } => {
            let Some(body) = world.enemy_mut(enemy) else {
                return;
            };
            body.waypoint_index = (body.waypoint_index + 1) % body.waypoints.len();
            out_events.push(Event::WaypointAdvanced {
                enemy,
                index: body.waypoint_index,
            });
        }
        Command::PlaceCamera {
            position,
            look_at,
            fallback,
        } => {
            world.camera = CameraRig {
                position,
                look_at,
                fallback,
            };
            out_events.push(Event::CameraPlaced { position, fallback });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec3;
    use maze_escape_core::{CameraSnapshot, EnemySnapshot, EnemyView, PlayerSnapshot};

    use super::{MazeGrid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the static maze grid.
    #[must_use]
    pub fn grid(world: &World) -> &MazeGrid {
        &world.grid
    }

    /// World-space centres of every wall cell, for renderers.
    #[must_use]
    pub fn wall_positions(world: &World) -> Vec<Vec3> {
        world.grid.wall_positions()
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            position: player.position,
            heading: player.heading(),
            radius: player.radius,
            roll: player.roll,
        }
    }

    /// Position the player occupies at session start and after every reset.
    #[must_use]
    pub fn player_start(world: &World) -> Vec3 {
        world.player.start
    }

    /// Captures a read-only view of the enemies inhabiting the maze.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.position,
                home: enemy.home,
                radius: enemy.radius,
                speed: enemy.speed,
                state: enemy.state,
                waypoint_index: enemy.waypoint_index,
                waypoint: enemy.waypoints[enemy.waypoint_index],
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures the last resolved camera placement.
    #[must_use]
    pub fn camera(world: &World) -> CameraSnapshot {
        CameraSnapshot {
            position: world.camera.position,
            look_at: world.camera.look_at,
            fallback: world.camera.fallback,
        }
    }
}

#[derive(Clone, Debug)]
struct Player {
    start: Vec3,
    position: Vec3,
    start_heading: f32,
    turn_increment: f32,
    // Heading is kept as whole turn increments so opposite turns cancel exactly.
    turns: i32,
    radius: f32,
    roll: f32,
}

impl Player {
    fn spawn(grid: &MazeGrid, config: &PlayerConfig) -> Result<Self, ConfigError> {
        let cell = config.start;
        if !grid.contains(cell) {
            return Err(ConfigError::OutOfBounds {
                what: "player start",
                cell,
                columns: grid.columns(),
                rows: grid.rows(),
            });
        }

        let mut start = grid.cell_center(cell);
        start.y = config.elevation;
        if !collision::footprint_clear(grid, start, config.radius) {
            return Err(ConfigError::Blocked {
                what: "player start",
                cell,
            });
        }

        Ok(Self {
            start,
            position: start,
            start_heading: config.heading,
            turn_increment: config.turn_increment,
            turns: 0,
            radius: config.radius,
            roll: 0.0,
        })
    }

    fn heading(&self) -> f32 {
        self.start_heading + self.turns as f32 * self.turn_increment
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    position: Vec3,
    home: Vec3,
    radius: f32,
    speed: f32,
    state: EnemyState,
    waypoints: Vec<Vec3>,
    waypoint_index: usize,
}

impl Enemy {
    fn spawn(id: EnemyId, grid: &MazeGrid, config: &EnemyConfig) -> Result<Self, ConfigError> {
        let mut waypoints = Vec::with_capacity(config.waypoints.len());
        for &cell in &config.waypoints {
            if !grid.contains(cell) {
                return Err(ConfigError::OutOfBounds {
                    what: "enemy waypoint",
                    cell,
                    columns: grid.columns(),
                    rows: grid.rows(),
                });
            }

            let mut point = grid.cell_center(cell);
            point.y = config.elevation;
            if !collision::footprint_clear(grid, point, config.radius) {
                return Err(ConfigError::Blocked {
                    what: "enemy waypoint",
                    cell,
                });
            }
            waypoints.push(point);
        }

        let Some(&home) = waypoints.first() else {
            return Err(ConfigError::EmptyRoute {
                index: id.get() as usize,
            });
        };

        Ok(Self {
            id,
            position: home,
            home,
            radius: config.radius,
            speed: config.speed,
            state: EnemyState::Patrol,
            waypoints,
            waypoint_index: 0,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct CameraRig {
    position: Vec3,
    look_at: Vec3,
    fallback: bool,
}

impl CameraRig {
    fn anchored_on(position: Vec3) -> Self {
        Self {
            position,
            look_at: position,
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::CellCoord;

    fn sealed_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.maze.layout = vec![
            "#####".to_owned(),
            "#...#".to_owned(),
            "#...#".to_owned(),
            "#####".to_owned(),
        ];
        config.player.start = CellCoord::new(1, 1);
        config.enemies = vec![EnemyConfig {
            waypoints: vec![CellCoord::new(3, 2), CellCoord::new(1, 2)],
            ..EnemyConfig::default()
        }];
        config.session.exit = Some(CellCoord::new(3, 1));
        config
    }

    #[test]
    fn new_world_places_bodies_on_configured_cells() {
        let world = World::new(&sealed_config()).expect("valid configuration");

        let player = query::player(&world);
        assert_eq!(player.position, Vec3::new(1.0, -0.15, 1.0));
        assert!((player.heading - std::f32::consts::PI).abs() < f32::EPSILON);

        let enemies = query::enemy_view(&world).into_vec();
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].position, Vec3::new(3.0, 0.0, 2.0));
        assert_eq!(enemies[0].state, EnemyState::Patrol);
        assert_eq!(enemies[0].waypoint, enemies[0].position);
        assert!(query::camera(&world).fallback);
    }

    #[test]
    fn blocked_start_cell_fails_fast() {
        let mut config = sealed_config();
        config.player.start = CellCoord::new(0, 0);

        assert!(matches!(
            World::new(&config),
            Err(ConfigError::Blocked {
                what: "player start",
                ..
            })
        ));
    }

    #[test]
    fn waypoint_outside_grid_fails_fast() {
        let mut config = sealed_config();
        config.enemies[0].waypoints.push(CellCoord::new(9, 9));

        assert!(matches!(
            World::new(&config),
            Err(ConfigError::OutOfBounds {
                what: "enemy waypoint",
                ..
            })
        ));
    }

    #[test]
    fn move_into_wall_leaves_player_in_place() {
        let mut world = World::new(&sealed_config()).expect("valid configuration");
        let before = query::player(&world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                to: Vec3::new(1.0, -0.15, 0.4),
                roll_delta: 0.2,
            },
            &mut events,
        );

        assert_eq!(query::player(&world), before);
        assert_eq!(
            events,
            vec![Event::PlayerMoveRejected {
                attempted: Vec3::new(1.0, -0.15, 0.4)
            }]
        );
    }

    #[test]
    fn accepted_move_updates_position_and_roll() {
        let mut world = World::new(&sealed_config()).expect("valid configuration");
        let mut events = Vec::new();
        let to = Vec3::new(1.5, -0.15, 1.0);

        apply(
            &mut world,
            Command::MovePlayer {
                to,
                roll_delta: 0.2,
            },
            &mut events,
        );

        let player = query::player(&world);
        assert_eq!(player.position, to);
        assert!((player.roll - 0.2).abs() < f32::EPSILON);
        assert_eq!(
            events,
            vec![Event::PlayerMoved {
                from: Vec3::new(1.0, -0.15, 1.0),
                to
            }]
        );
    }

    #[test]
    fn opposite_turns_restore_heading_exactly() {
        let mut world = World::new(&sealed_config()).expect("valid configuration");
        let original = query::player(&world).heading;
        let mut events = Vec::new();

        apply(&mut world, Command::TurnPlayer { turns: 1 }, &mut events);
        assert_ne!(query::player(&world).heading, original);
        apply(&mut world, Command::TurnPlayer { turns: -1 }, &mut events);

        assert_eq!(query::player(&world).heading.to_bits(), original.to_bits());
    }

    #[test]
    fn waypoint_index_wraps_around_route() {
        let mut world = World::new(&sealed_config()).expect("valid configuration");
        let enemy = EnemyId::new(0);
        let mut events = Vec::new();

        for _ in 0..5 {
            apply(&mut world, Command::AdvanceWaypoint { enemy }, &mut events);
        }

        let indices: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                Event::WaypointAdvanced { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![1, 0, 1, 0, 1]);
    }

    #[test]
    fn reset_restores_start_pose() {
        let mut world = World::new(&sealed_config()).expect("valid configuration");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                to: Vec3::new(2.0, -0.15, 1.5),
                roll_delta: 1.0,
            },
            &mut events,
        );
        apply(&mut world, Command::TurnPlayer { turns: 3 }, &mut events);

        apply(&mut world, Command::ResetPlayer, &mut events);

        let player = query::player(&world);
        assert_eq!(player.position, query::player_start(&world));
        assert_eq!(player.roll, 0.0);
        assert!((player.heading - std::f32::consts::PI).abs() < f32::EPSILON);
    }

    #[test]
    fn repeated_state_request_is_silent() {
        let mut world = World::new(&sealed_config()).expect("valid configuration");
        let enemy = EnemyId::new(0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetEnemyState {
                enemy,
                state: EnemyState::Chase,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetEnemyState {
                enemy,
                state: EnemyState::Chase,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::EnemyStateChanged {
                enemy,
                from: EnemyState::Patrol,
                to: EnemyState::Chase,
            }]
        );
    }
}
