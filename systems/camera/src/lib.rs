#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Third-person camera tracker that keeps the follow camera out of walls.
//!
//! Every tick the tracker rotates its offset by the player heading to find the
//! ideal follow position, then walks the segment back towards the player until
//! it finds a sample whose footprint is clear of the maze.

use glam::{Quat, Vec3};
use log::info;
use maze_escape_core::{CameraSnapshot, Command, PlayerSnapshot};
use maze_escape_world::{collision, MazeGrid};

/// Configuration parameters required to construct the camera tracker.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    offset: Vec3,
    radius: f32,
    sample_step: f32,
}

impl Config {
    /// Creates a new configuration using the follow offset, the camera's
    /// collision radius and the back-off sampling step.
    #[must_use]
    pub const fn new(offset: Vec3, radius: f32, sample_step: f32) -> Self {
        Self {
            offset,
            radius,
            sample_step,
        }
    }
}

/// Pure system that proposes collision-free camera placements.
#[derive(Debug)]
pub struct CameraTracker {
    offset: Vec3,
    radius: f32,
    sample_step: f32,
    falling_back: bool,
}

impl CameraTracker {
    /// Creates a new tracker using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            offset: config.offset,
            radius: config.radius,
            sample_step: config.sample_step,
            falling_back: false,
        }
    }

    /// Ideal follow position for the player, ignoring walls.
    #[must_use]
    pub fn desired_position(&self, player: &PlayerSnapshot) -> Vec3 {
        player.position + Quat::from_rotation_y(player.heading) * self.offset
    }

    /// Resolves the camera placement for the provided player.
    ///
    /// Returns the largest-`t` clear sample on the segment from the player to
    /// the desired position. When nothing clears, the camera sits on the player
    /// and the snapshot is flagged as a fallback.
    #[must_use]
    pub fn resolve(&self, player: &PlayerSnapshot, grid: &MazeGrid) -> CameraSnapshot {
        let desired = self.desired_position(player);
        match collision::back_off(
            grid,
            player.position,
            desired,
            self.radius,
            self.sample_step,
        ) {
            Some(sample) => CameraSnapshot {
                position: sample.point,
                look_at: player.position,
                fallback: false,
            },
            None => CameraSnapshot {
                position: player.position,
                look_at: player.position,
                fallback: true,
            },
        }
    }

    /// Proposes a camera placement for the current player state.
    pub fn handle(&mut self, player: &PlayerSnapshot, grid: &MazeGrid, out: &mut Vec<Command>) {
        let resolved = self.resolve(player, grid);
        if resolved.fallback != self.falling_back {
            if resolved.fallback {
                info!("camera fell back to the player position at {}", player.position);
            } else {
                info!("camera found a clear follow position again");
            }
            self.falling_back = resolved.fallback;
        }

        out.push(Command::PlaceCamera {
            position: resolved.position,
            look_at: resolved.look_at,
            fallback: resolved.fallback,
        });
    }
}
