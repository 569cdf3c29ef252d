//! Headless backend that logs scenes as ASCII frames.

use std::{collections::BTreeMap, ops::ControlFlow, time::Duration};

use anyhow::Result;
use log::info;
use maze_escape_core::{CellCoord, EnemyState};
use maze_escape_rendering::{Presentation, RenderingBackend, Scene};

/// Rendering backend that draws the maze from above as text.
#[derive(Debug)]
pub(crate) struct TextBackend {
    frame_time: Duration,
    frame_every: u64,
}

impl TextBackend {
    /// Creates a backend stepping `frame_time` per frame and logging every
    /// `frame_every`th frame. Zero logs only the final frame.
    pub(crate) fn new(frame_time: Duration, frame_every: u64) -> Self {
        Self {
            frame_time,
            frame_every,
        }
    }
}

impl RenderingBackend for TextBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> ControlFlow<()>,
    {
        let Presentation {
            title, mut scene, ..
        } = presentation;
        info!("{title}\n{}", draw(&scene));

        let mut frame: u64 = 0;
        loop {
            let flow = update_scene(self.frame_time, &mut scene);
            frame += 1;

            let last = flow.is_break();
            if last || (self.frame_every > 0 && frame % self.frame_every == 0) {
                info!("frame {frame}\n{}", draw(&scene));
            }
            if last {
                return Ok(());
            }
        }
    }
}

/// Renders the scene as a top-down character grid followed by the HUD line.
///
/// `#` wall, `X` exit, `P` player, and enemies as `e` (patrol), `E` (chase)
/// or `r` (return).
pub(crate) fn draw(scene: &Scene) -> String {
    let maze = &scene.maze;
    let mut overlay = BTreeMap::new();
    for wall in &maze.walls {
        if let Some(cell) = maze.cell_at(*wall) {
            let _ = overlay.insert(cell, '#');
        }
    }
    let _ = overlay.insert(maze.exit, 'X');
    for enemy in &scene.enemies {
        if let Some(cell) = maze.cell_at(enemy.position) {
            let glyph = match enemy.state {
                EnemyState::Patrol => 'e',
                EnemyState::Chase => 'E',
                EnemyState::Return => 'r',
            };
            let _ = overlay.insert(cell, glyph);
        }
    }
    if let Some(cell) = maze.cell_at(scene.player.position) {
        let _ = overlay.insert(cell, 'P');
    }

    let width = maze.columns as usize + 1;
    let mut frame = String::with_capacity(width * maze.rows as usize + 64);
    for row in 0..maze.rows {
        for column in 0..maze.columns {
            let cell = CellCoord::new(column, row);
            frame.push(overlay.get(&cell).copied().unwrap_or('.'));
        }
        frame.push('\n');
    }
    frame.push_str(&scene.hud.to_string());
    if scene.camera.fallback {
        frame.push_str("  [camera on player]");
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_rendering::Hud;
    use maze_escape_system_session::Simulation;
    use maze_escape_world::SimulationConfig;

    #[test]
    fn default_maze_draws_player_enemy_and_exit() {
        let simulation = Simulation::new(&SimulationConfig::default()).expect("default config");
        let scene = Scene::capture(
            simulation.world(),
            simulation.session().exit,
            Hud {
                elapsed: Duration::ZERO,
                lives: 3,
                chased: false,
                outcome: None,
            },
        );

        let frame = draw(&scene);
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "#P#########");
        assert_eq!(lines[3], "#e......#.#");
        assert_eq!(lines[9], "#........X#");
        assert_eq!(lines[11], "Time: 0s  Lives: 3  Status: Free");
    }
}
