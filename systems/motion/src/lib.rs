#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player motion system that turns discrete input into movement proposals.
//!
//! The system never checks walls itself. It proposes a candidate position and
//! the world accepts or rejects it against the maze grid.

use glam::{Quat, Vec3};
use maze_escape_core::{Command, Motion, PlayerSnapshot};

/// Configuration parameters required to construct the motion system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    step: f32,
    roll_radius: f32,
}

impl Config {
    /// Creates a new configuration from the step length and the rolling radius
    /// used to derive the cosmetic roll angle.
    #[must_use]
    pub const fn new(step: f32, roll_radius: f32) -> Self {
        Self { step, roll_radius }
    }
}

/// Pure system that maps [`Motion`] values onto player commands.
#[derive(Debug)]
pub struct PlayerMotion {
    step: f32,
    roll_per_step: f32,
}

impl PlayerMotion {
    /// Creates a new motion system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let roll_per_step = if config.roll_radius > 0.0 {
            config.step / config.roll_radius
        } else {
            0.0
        };
        Self {
            step: config.step,
            roll_per_step,
        }
    }

    /// Proposes the command that realises `motion` for the provided player.
    pub fn handle(&self, motion: Motion, player: &PlayerSnapshot, out: &mut Vec<Command>) {
        match motion {
            Motion::Forward => out.push(Command::MovePlayer {
                to: player.position + forward(player.heading) * self.step,
                roll_delta: self.roll_per_step,
            }),
            Motion::Backward => out.push(Command::MovePlayer {
                to: player.position - forward(player.heading) * self.step,
                roll_delta: -self.roll_per_step,
            }),
            Motion::TurnLeft => out.push(Command::TurnPlayer { turns: 1 }),
            Motion::TurnRight => out.push(Command::TurnPlayer { turns: -1 }),
        }
    }
}

/// Unit vector the player faces for the provided heading.
///
/// A heading of zero looks down the negative z axis.
#[must_use]
pub fn forward(heading: f32) -> Vec3 {
    Quat::from_rotation_y(heading) * Vec3::NEG_Z
}
