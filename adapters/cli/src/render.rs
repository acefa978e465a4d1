//! Plain-text rendering of the maze for terminals.

use maze_escape_core::{AgentSnapshot, CellCoord};
use maze_escape_world::{query, World};

const WALL: char = '#';
const PATH: char = '.';
const SPAWN: char = 'S';
const PLAYER: char = '@';
const RELIC: char = 'R';
const AGENT: char = 'M';
const CLOSED_OBSTACLE: char = 'D';
const OPEN_OBSTACLE: char = '_';

/// Draws one character per cell, rows top to bottom.
pub(crate) fn render_ascii(world: &World, agent: Option<&AgentSnapshot>) -> String {
    let grid = query::grid(world);
    let layout = grid.layout();
    let obstacles = query::obstacle_view(world);
    let player = grid.cell_at(query::player_position(world));
    let agent = agent.and_then(|snapshot| grid.cell_at(snapshot.position));
    let relic = query::relic_cell(world);
    let spawn = query::spawn_cell(world);

    let mut output = String::new();
    for row in 0..layout.rows() {
        for column in 0..layout.columns() {
            let cell = CellCoord::new(column, row);
            let obstacle = obstacles.iter().find(|obstacle| obstacle.cell == cell);
            let glyph = if agent == Some(cell) {
                AGENT
            } else if player == Some(cell) {
                PLAYER
            } else if relic == Some(cell) {
                RELIC
            } else if let Some(obstacle) = obstacle {
                if obstacle.blocking {
                    CLOSED_OBSTACLE
                } else {
                    OPEN_OBSTACLE
                }
            } else if cell == spawn {
                SPAWN
            } else if layout.is_wall(cell) {
                WALL
            } else {
                PATH
            };
            output.push(glyph);
        }
        output.push('\n');
    }
    output
}
