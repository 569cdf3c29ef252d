//! Keyboard-style input scripts.
//!
//! Each non-whitespace character drives one tick: `w`/`s` roll forward and
//! backward, `a`/`d` turn left and right, and `.` waits a tick without input.

use anyhow::{bail, Result};
use maze_escape_core::Motion;

/// Parses a script into one optional motion per tick.
pub(crate) fn parse(source: &str) -> Result<Vec<Option<Motion>>> {
    let mut ticks = Vec::new();
    for (position, key) in source
        .chars()
        .filter(|key| !key.is_whitespace())
        .enumerate()
    {
        let motion = match key.to_ascii_lowercase() {
            'w' => Some(Motion::Forward),
            's' => Some(Motion::Backward),
            'a' => Some(Motion::TurnLeft),
            'd' => Some(Motion::TurnRight),
            '.' => None,
            _ => bail!("unsupported key {key:?} at position {position}"),
        };
        ticks.push(motion);
    }
    Ok(ticks)
}
