#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable snapshots and
//! propose [`Command`] values, the world validates and executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values describing
//! what actually changed. Rejected proposals are reported as events rather than
//! errors so callers can observe them without special casing.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Escape.";

/// Discrete directional commands delivered by an input source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Motion {
    /// Roll one step along the current heading.
    Forward,
    /// Roll one step against the current heading.
    Backward,
    /// Rotate counter-clockwise by one turn increment.
    TurnLeft,
    /// Rotate clockwise by one turn increment.
    TurnRight,
}

/// Behavioural state of a pursuing enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Walking the cyclic waypoint route.
    Patrol,
    /// Pursuing the player in a straight line.
    Chase,
    /// Walking back to the spawn point after losing the player.
    Return,
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player reached the exit cell.
    Escaped,
    /// The player ran out of lives.
    Captured,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player body move to a new position.
    MovePlayer {
        /// Candidate position the player wants to occupy.
        to: Vec3,
        /// Cosmetic roll applied if the move is accepted.
        roll_delta: f32,
    },
    /// Rotates the player by a signed number of turn increments.
    TurnPlayer {
        /// Positive values turn left, negative values turn right.
        turns: i32,
    },
    /// Restores the player to its start cell, heading and roll.
    ResetPlayer,
    /// Requests that an enemy body move to a new position.
    MoveEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Candidate position the enemy wants to occupy.
        to: Vec3,
    },
    /// Transitions an enemy controller into a new behavioural state.
    SetEnemyState {
        /// Identifier of the enemy whose controller transitions.
        enemy: EnemyId,
        /// State the controller should enter.
        state: EnemyState,
    },
    /// Advances the enemy to the next waypoint of its cyclic route.
    AdvanceWaypoint {
        /// Identifier of the enemy that reached its waypoint.
        enemy: EnemyId,
    },
    /// Stores a resolved camera placement.
    PlaceCamera {
        /// Camera position that was found clear of walls.
        position: Vec3,
        /// Point the camera should look at.
        look_at: Vec3,
        /// Whether the placement fell back to the player position.
        fallback: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: Vec3,
        /// Position after the move.
        to: Vec3,
    },
    /// Reports that a player move would have entered a wall.
    PlayerMoveRejected {
        /// Position that was refused.
        attempted: Vec3,
    },
    /// Confirms that the player heading changed.
    PlayerTurned {
        /// Heading in radians after the turn.
        heading: f32,
    },
    /// Confirms that the player was returned to the start cell.
    PlayerReset {
        /// Start position the player now occupies.
        position: Vec3,
    },
    /// Confirms that an enemy moved.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Position before the move.
        from: Vec3,
        /// Position after the move.
        to: Vec3,
    },
    /// Reports that an enemy move would have entered a wall.
    EnemyMoveRejected {
        /// Identifier of the enemy whose move was refused.
        enemy: EnemyId,
        /// Position that was refused.
        attempted: Vec3,
    },
    /// Announces that an enemy controller changed state.
    EnemyStateChanged {
        /// Identifier of the enemy whose controller transitioned.
        enemy: EnemyId,
        /// State the controller left.
        from: EnemyState,
        /// State the controller entered.
        to: EnemyState,
    },
    /// Announces that an enemy targets the next waypoint of its route.
    WaypointAdvanced {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Index of the waypoint now targeted.
        index: usize,
    },
    /// Confirms that the camera was repositioned.
    CameraPlaced {
        /// Position the camera occupies.
        position: Vec3,
        /// Whether the placement fell back to the player position.
        fallback: bool,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Distance between two points measured on the horizontal x/z plane.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// World-space position of the player body.
    pub position: Vec3,
    /// Heading in radians around the vertical axis.
    pub heading: f32,
    /// Collision radius of the player body.
    pub radius: f32,
    /// Cosmetic rolling angle accumulated by forward and backward steps.
    pub roll: f32,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// World-space position of the enemy body.
    pub position: Vec3,
    /// Spawn position the enemy returns to.
    pub home: Vec3,
    /// Collision radius of the enemy body.
    pub radius: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Current behavioural state.
    pub state: EnemyState,
    /// Index of the waypoint currently targeted.
    pub waypoint_index: usize,
    /// World-space position of the waypoint currently targeted.
    pub waypoint: Vec3,
}

/// Read-only snapshot describing all enemies within the maze.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Reports whether any enemy is currently chasing the player.
    #[must_use]
    pub fn any_chasing(&self) -> bool {
        self.snapshots
            .iter()
            .any(|snapshot| snapshot.state == EnemyState::Chase)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the resolved camera rig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSnapshot {
    /// Last placement found clear of walls.
    pub position: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// Whether the placement is the last-resort player position.
    pub fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::{planar_distance, CellCoord, EnemyId, EnemyState, Motion, Outcome};
    use glam::Vec3;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn motion_script_round_trips_through_bincode() {
        let script = vec![
            Motion::Forward,
            Motion::TurnLeft,
            Motion::Backward,
            Motion::TurnRight,
        ];
        assert_round_trip(&script);
    }

    #[test]
    fn session_contracts_round_trip_through_bincode() {
        assert_round_trip(&(EnemyId::new(7), EnemyState::Return, Outcome::Escaped));
        assert_round_trip(&CellCoord::new(9, 9));
    }

    #[test]
    fn planar_distance_ignores_height() {
        let a = Vec3::new(1.0, -0.15, 0.0);
        let b = Vec3::new(4.0, 3.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < f32::EPSILON);
    }
}
