#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Escape adapters.
//!
//! Renderers never touch the simulation. They receive a [`Scene`] captured
//! from world queries and decide on their own how to draw it.

use anyhow::Result as AnyResult;
use glam::{Quat, Vec3};
use maze_escape_core::{CellCoord, EnemyId, EnemyState, Outcome};
use maze_escape_world::{query, World};
use std::{fmt, ops::ControlFlow, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

const WALL_COLOR: Color = Color::from_rgb_u8(0x44, 0x44, 0x44);
const PLAYER_COLOR: Color = Color::from_rgb_u8(0x29, 0x79, 0xff);
const ENEMY_COLOR: Color = Color::from_rgb_u8(0xff, 0x00, 0x00);
const RETURNING_ENEMY_COLOR: Color = Color::from_rgb_u8(0xff, 0x8a, 0x65);

/// Static maze geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct MazePresentation {
    /// Number of cell columns.
    pub columns: u32,
    /// Number of cell rows.
    pub rows: u32,
    /// Side length of a cell in world units.
    pub cell_size: f32,
    /// World-space centres of every wall cell in row-major order.
    pub walls: Vec<Vec3>,
    /// Cell the player must reach.
    pub exit: CellCoord,
    /// Color used for wall blocks.
    pub wall_color: Color,
}

impl MazePresentation {
    /// Grid cell containing the provided world-space position, if any.
    #[must_use]
    pub fn cell_at(&self, position: Vec3) -> Option<CellCoord> {
        let column = (position.x / self.cell_size).round();
        let row = (position.z / self.cell_size).round();
        if !(column >= 0.0 && row >= 0.0) {
            return None;
        }
        let (column, row) = (column as u32, row as u32);
        (column < self.columns && row < self.rows).then_some(CellCoord::new(column, row))
    }
}

/// Transform of the rolling player body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// World-space position.
    pub position: Vec3,
    /// Heading combined with the cosmetic roll.
    pub orientation: Quat,
    /// Body radius.
    pub radius: f32,
    /// Body color.
    pub color: Color,
}

/// Transform and status of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// World-space position.
    pub position: Vec3,
    /// Body radius.
    pub radius: f32,
    /// Behavioural state, for renderers that tint or animate by state.
    pub state: EnemyState,
    /// Body color.
    pub color: Color,
}

/// Resolved follow camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPresentation {
    /// Camera position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// Whether the camera sits on the player because every follow position collided.
    pub fallback: bool,
}

/// Heads-up display contents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    /// Simulated time since the session started.
    pub elapsed: Duration,
    /// Lives the player has left.
    pub lives: u32,
    /// Whether any enemy is chasing the player.
    pub chased: bool,
    /// Terminal result, if the session ended.
    pub outcome: Option<Outcome>,
}

impl fmt::Display for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match (self.outcome, self.chased) {
            (Some(Outcome::Escaped), _) => "Escaped!",
            (Some(Outcome::Captured), _) => "Captured",
            (None, true) => "Chased!",
            (None, false) => "Free",
        };
        write!(
            f,
            "Time: {}s  Lives: {}  Status: {status}",
            self.elapsed.as_secs(),
            self.lives
        )
    }
}

/// Scene description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Static maze geometry.
    pub maze: MazePresentation,
    /// Player body.
    pub player: PlayerPresentation,
    /// Enemy bodies ordered by identifier.
    pub enemies: Vec<EnemyPresentation>,
    /// Follow camera.
    pub camera: CameraPresentation,
    /// Heads-up display.
    pub hud: Hud,
}

impl Scene {
    /// Captures a scene from the current world state.
    #[must_use]
    pub fn capture(world: &World, exit: CellCoord, hud: Hud) -> Self {
        let grid = query::grid(world);
        let player = query::player(world);
        let camera = query::camera(world);

        Self {
            maze: MazePresentation {
                columns: grid.columns(),
                rows: grid.rows(),
                cell_size: grid.cell_size(),
                walls: grid.wall_positions(),
                exit,
                wall_color: WALL_COLOR,
            },
            player: PlayerPresentation {
                position: player.position,
                // Rolling forward spins the ball about its local x axis.
                orientation: Quat::from_rotation_y(player.heading)
                    * Quat::from_rotation_x(-player.roll),
                radius: player.radius,
                color: PLAYER_COLOR,
            },
            enemies: query::enemy_view(world)
                .iter()
                .map(|enemy| EnemyPresentation {
                    id: enemy.id,
                    position: enemy.position,
                    radius: enemy.radius,
                    state: enemy.state,
                    color: match enemy.state {
                        EnemyState::Return => RETURNING_ENEMY_COLOR,
                        EnemyState::Patrol | EnemyState::Chase => ENEMY_COLOR,
                    },
                })
                .collect(),
            camera: CameraPresentation {
                position: camera.position,
                look_at: camera.look_at,
                fallback: camera.fallback,
            },
            hud,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Maze Escape scenes.
pub trait RenderingBackend {
    /// Runs the backend until `update_scene` asks it to stop.
    ///
    /// The closure receives the frame delta and refreshes the scene before it
    /// is drawn. Returning [`ControlFlow::Break`] draws that frame one last time
    /// and ends the loop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> ControlFlow<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_system_session::Simulation;
    use maze_escape_world::SimulationConfig;

    fn hud() -> Hud {
        Hud {
            elapsed: Duration::from_millis(12_900),
            lives: 2,
            chased: false,
            outcome: None,
        }
    }

    #[test]
    fn captured_scene_mirrors_world_queries() {
        let world = World::new(&SimulationConfig::default()).expect("default config");

        let scene = Scene::capture(&world, CellCoord::new(9, 9), hud());

        assert_eq!(scene.maze.columns, 11);
        assert_eq!(scene.maze.rows, 11);
        assert_eq!(scene.maze.walls, query::wall_positions(&world));
        assert_eq!(scene.player.position, query::player(&world).position);
        assert_eq!(scene.enemies.len(), 1);
        assert_eq!(scene.enemies[0].state, EnemyState::Patrol);
        assert_eq!(scene.camera.position, query::camera(&world).position);
    }

    #[test]
    fn resolved_camera_is_captured_off_the_player() {
        let simulation = Simulation::new(&SimulationConfig::default()).expect("default config");

        let scene = Scene::capture(simulation.world(), simulation.session().exit, hud());

        assert!(!scene.camera.fallback);
        assert_ne!(scene.camera.position, scene.player.position);
        assert_eq!(scene.camera.look_at, scene.player.position);
    }

    #[test]
    fn cell_lookup_rounds_to_nearest_centre() {
        let world = World::new(&SimulationConfig::default()).expect("default config");
        let scene = Scene::capture(&world, CellCoord::new(9, 9), hud());

        assert_eq!(
            scene.maze.cell_at(Vec3::new(1.2, -0.15, 0.4)),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(scene.maze.cell_at(Vec3::new(-0.8, 0.0, 0.0)), None);
        assert_eq!(scene.maze.cell_at(Vec3::new(0.0, 0.0, 11.0)), None);
    }

    #[test]
    fn hud_reports_chase_status_and_whole_seconds() {
        let mut hud = hud();
        assert_eq!(hud.to_string(), "Time: 12s  Lives: 2  Status: Free");

        hud.chased = true;
        assert_eq!(hud.to_string(), "Time: 12s  Lives: 2  Status: Chased!");

        hud.outcome = Some(Outcome::Escaped);
        assert_eq!(hud.to_string(), "Time: 12s  Lives: 2  Status: Escaped!");
    }
}
