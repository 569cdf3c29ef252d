//! Simulation configuration and the errors raised while validating it.
//!
//! Every section falls back to the classic 11x11 escape maze so a TOML file
//! only needs to mention the values it overrides.

use std::f32::consts::PI;

use glam::Vec3;
use maze_escape_core::CellCoord;
use serde::Deserialize;
use thiserror::Error;

use crate::grid::MazeGrid;

const DEFAULT_LAYOUT: [&str; 11] = [
    "#.#########",
    "#...#.....#",
    "###.#.###.#",
    "#.......#.#",
    "#.#####.#.#",
    "#.#...#.#.#",
    "#.#.#.#.#.#",
    "#...#...#.#",
    "###.###.#.#",
    "#.........#",
    "#########.#",
];

/// Errors raised while building a simulation from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The maze layout contained no cells.
    #[error("maze layout must contain at least one row and one column")]
    EmptyLayout,
    /// A layout row had a different width than the first row.
    #[error("maze row {row} has {found} columns, expected {expected}")]
    RaggedLayout {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A layout row contained a glyph that is neither wall nor open.
    #[error("unknown layout glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        /// Glyph that could not be interpreted.
        glyph: char,
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
    },
    /// Explicit cell storage did not match the declared dimensions.
    #[error("maze declares {expected} cells but {found} were supplied")]
    DimensionMismatch {
        /// Number of cells implied by the dimensions.
        expected: usize,
        /// Number of cells supplied.
        found: usize,
    },
    /// A value that must be strictly positive was not.
    #[error("`{name}` must be finite and positive (received {value})")]
    NonPositive {
        /// Dotted configuration key.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A value that must be finite was infinite or NaN.
    #[error("`{name}` must be finite (received {value})")]
    NonFinite {
        /// Dotted configuration key.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A value that must be non-negative was not.
    #[error("`{name}` must be finite and non-negative (received {value})")]
    Negative {
        /// Dotted configuration key.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A configured cell lies outside the maze.
    #[error("{what} cell {cell:?} lies outside the {columns}x{rows} maze")]
    OutOfBounds {
        /// What the cell was configured for.
        what: &'static str,
        /// Offending cell.
        cell: CellCoord,
        /// Number of maze columns.
        columns: u32,
        /// Number of maze rows.
        rows: u32,
    },
    /// A configured position overlaps a wall.
    #[error("{what} at cell {cell:?} overlaps a wall")]
    Blocked {
        /// What the cell was configured for.
        what: &'static str,
        /// Offending cell.
        cell: CellCoord,
    },
    /// An enemy was configured without a patrol route.
    #[error("enemy {index} has no waypoints")]
    EmptyRoute {
        /// Index of the enemy in the configuration.
        index: usize,
    },
    /// The session was configured without lives.
    #[error("session must start with at least one life")]
    NoLives,
}

/// Complete description of a simulation session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Maze layout and scale.
    pub maze: MazeConfig,
    /// Player body and motion tuning.
    pub player: PlayerConfig,
    /// Pursuing enemies and their patrol routes.
    pub enemies: Vec<EnemyConfig>,
    /// Enemy state machine thresholds.
    pub ai: AiConfig,
    /// Camera follow rig.
    pub camera: CameraConfig,
    /// Lives and exit condition.
    pub session: SessionConfig,
}

impl SimulationConfig {
    /// Parses a configuration from TOML, filling omitted values with defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every scalar tuning value.
    ///
    /// Geometric checks that need the grid (start cell, waypoints, exit) run
    /// when the world is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("maze.cell_size", self.maze.cell_size)?;

        non_negative("player.radius", self.player.radius)?;
        positive("player.step", self.player.step)?;
        positive("player.turn_increment", self.player.turn_increment)?;
        positive("player.roll_radius", self.player.roll_radius)?;
        finite("player.heading", self.player.heading)?;
        finite("player.elevation", self.player.elevation)?;

        for (index, enemy) in self.enemies.iter().enumerate() {
            if enemy.waypoints.is_empty() {
                return Err(ConfigError::EmptyRoute { index });
            }
            non_negative("enemies.radius", enemy.radius)?;
            non_negative("enemies.speed", enemy.speed)?;
            finite("enemies.elevation", enemy.elevation)?;
        }

        positive("ai.chase_distance", self.ai.chase_distance)?;
        non_negative("ai.capture_distance", self.ai.capture_distance)?;
        positive("ai.waypoint_epsilon", self.ai.waypoint_epsilon)?;
        if let Some(give_up) = self.ai.give_up_distance {
            positive("ai.give_up_distance", give_up)?;
        }

        finite("camera.offset.x", self.camera.offset.x)?;
        finite("camera.offset.y", self.camera.offset.y)?;
        finite("camera.offset.z", self.camera.offset.z)?;
        non_negative("camera.radius", self.camera.radius)?;
        positive("camera.sample_step", self.camera.sample_step)?;

        if self.session.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        positive("session.exit_distance", self.session.exit_distance)?;
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            maze: MazeConfig::default(),
            player: PlayerConfig::default(),
            enemies: vec![EnemyConfig::default()],
            ai: AiConfig::default(),
            camera: CameraConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Maze layout and scale.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MazeConfig {
    /// Side length of a cell in world units.
    pub cell_size: f32,
    /// Rows of `#` (wall) and `.` (open) glyphs, top row first.
    pub layout: Vec<String>,
}

impl MazeConfig {
    /// Builds the occupancy grid described by this section.
    pub fn build_grid(&self) -> Result<MazeGrid, ConfigError> {
        MazeGrid::from_layout(&self.layout, self.cell_size)
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            layout: DEFAULT_LAYOUT.iter().map(|row| (*row).to_owned()).collect(),
        }
    }
}

/// Player body and motion tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Cell the player starts in and returns to after losing a life.
    pub start: CellCoord,
    /// Starting heading in radians.
    pub heading: f32,
    /// Height of the player body above the floor.
    pub elevation: f32,
    /// Collision radius.
    pub radius: f32,
    /// Distance covered by a single forward or backward command.
    pub step: f32,
    /// Angle turned by a single left or right command, in radians.
    pub turn_increment: f32,
    /// Radius used to convert travelled distance into cosmetic roll.
    pub roll_radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: CellCoord::new(1, 0),
            heading: PI,
            elevation: -0.15,
            radius: 0.15,
            step: 0.1,
            turn_increment: 0.1,
            roll_radius: 0.5,
        }
    }
}

/// A pursuing enemy and its cyclic patrol route.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyConfig {
    /// Cells visited in order, looping back to the first. The enemy spawns on the first.
    pub waypoints: Vec<CellCoord>,
    /// Collision radius.
    pub radius: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Height of the enemy body above the floor.
    pub elevation: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            waypoints: vec![
                CellCoord::new(1, 3),
                CellCoord::new(7, 3),
                CellCoord::new(7, 9),
                CellCoord::new(7, 3),
            ],
            radius: 0.3,
            speed: 0.6,
            elevation: 0.0,
        }
    }
}

/// Enemy state machine thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiConfig {
    /// Patrolling enemies start chasing below this distance.
    pub chase_distance: f32,
    /// Chasing enemies capture the player below this distance.
    pub capture_distance: f32,
    /// Distance at which a waypoint or the spawn point counts as reached.
    pub waypoint_epsilon: f32,
    /// Chasing enemies give up beyond this distance and return home. `None` chases forever.
    pub give_up_distance: Option<f32>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            chase_distance: 3.0,
            capture_distance: 0.5,
            waypoint_epsilon: 0.1,
            give_up_distance: None,
        }
    }
}

/// Camera follow rig.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Ideal offset from the player, rotated by the player heading.
    pub offset: Vec3,
    /// Clearance the camera keeps from walls.
    pub radius: f32,
    /// Decrement of the segment parameter between back-off samples.
    pub sample_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 2.0, 5.0),
            radius: 0.1,
            sample_step: 0.05,
        }
    }
}

/// Lives and exit condition.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Lives the player starts with.
    pub lives: u32,
    /// Exit cell. Defaults to the cell diagonally inside the far corner.
    pub exit: Option<CellCoord>,
    /// The player escapes once within this distance of the exit centre.
    pub exit_distance: f32,
}

impl SessionConfig {
    /// Resolves and validates the exit cell against the grid.
    pub fn exit_cell(&self, grid: &MazeGrid) -> Result<CellCoord, ConfigError> {
        let cell = self.exit.unwrap_or_else(|| {
            CellCoord::new(
                grid.columns().saturating_sub(2),
                grid.rows().saturating_sub(2),
            )
        });

        if !grid.contains(cell) {
            return Err(ConfigError::OutOfBounds {
                what: "exit",
                cell,
                columns: grid.columns(),
                rows: grid.rows(),
            });
        }
        if grid.is_wall_cell(cell) {
            return Err(ConfigError::Blocked { what: "exit", cell });
        }
        Ok(cell)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            exit: None,
            exit_distance: 0.5,
        }
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_classic_maze() {
        let config = SimulationConfig::default();
        config.validate().expect("defaults are valid");

        let grid = config.maze.build_grid().expect("default layout");
        assert_eq!((grid.columns(), grid.rows()), (11, 11));
        assert!(!grid.is_wall_cell(config.player.start));
        assert_eq!(
            config.session.exit_cell(&grid).expect("default exit"),
            CellCoord::new(9, 9)
        );
    }

    #[test]
    fn toml_overrides_only_named_values() {
        let config = SimulationConfig::from_toml_str(
            r######"
            [maze]
            layout = ["#####", "#...#", "#####"]

            [player]
            start = { column = 1, row = 1 }

            [[enemies]]
            waypoints = [{ column = 3, row = 1 }]

            [ai]
            give_up_distance = 6.0

            [session]
            lives = 1
            exit = { column = 3, row = 1 }
            "######,
        )
        .expect("valid configuration");

        assert_eq!(config.maze.layout.len(), 3);
        assert!((config.maze.cell_size - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.enemies.len(), 1);
        assert_eq!(config.ai.give_up_distance, Some(6.0));
        assert_eq!(config.session.lives, 1);
        assert!((config.camera.sample_step - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            SimulationConfig::from_toml_str("[session]\nlives = 0"),
            Err(ConfigError::NoLives)
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[player]\nstep = -1.0"),
            Err(ConfigError::NonPositive {
                name: "player.step",
                ..
            })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[[enemies]]\nwaypoints = []"),
            Err(ConfigError::EmptyRoute { index: 0 })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[maze]\nunknown = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn exit_must_be_an_open_cell_inside_the_grid() {
        let grid = MazeGrid::from_layout(&["###", "#.#", "###"], 1.0).expect("valid layout");
        let mut session = SessionConfig::default();

        session.exit = Some(CellCoord::new(5, 5));
        assert!(matches!(
            session.exit_cell(&grid),
            Err(ConfigError::OutOfBounds { what: "exit", .. })
        ));

        session.exit = Some(CellCoord::new(0, 0));
        assert!(matches!(
            session.exit_cell(&grid),
            Err(ConfigError::Blocked { what: "exit", .. })
        ));

        session.exit = None;
        assert_eq!(
            session.exit_cell(&grid).expect("centre cell"),
            CellCoord::new(1, 1)
        );
    }
}
