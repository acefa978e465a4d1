#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates mazes and runs headless Maze Escape sessions.

mod config;
mod layout_transfer;
mod render;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use maze_escape_core::{CellCoord, MazeLayout, SessionOutcome, WallGrid};
use maze_escape_system_maze_generation::{Config as MazeConfig, MazeGenerator};
use maze_escape_world::{query, NavigationField};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    layout_transfer::MazeSnapshot,
    render::render_ascii,
    session::{Session, SessionReport},
};

/// Generates mazes and runs headless pursuit sessions.
#[derive(Debug, Parser)]
#[command(name = "maze-escape", version)]
struct Cli {
    /// Configuration file; defaults to `maze-escape.toml` when present.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Overrides the maze seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the maze side length in cells.
    #[arg(long)]
    size: Option<u32>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Runs a session with a scripted player walking to the relic.
    Simulate {
        /// Layout transfer string to play instead of a generated maze.
        #[arg(long)]
        layout: Option<String>,
        /// Overrides the session time limit in seconds.
        #[arg(long)]
        time_limit: Option<f32>,
        /// Prints the maze after the session ends.
        #[arg(long)]
        show: bool,
    },
    /// Prints the generated maze with spawn, relic and obstacles.
    Render {
        /// Layout transfer string to render instead of a generated maze.
        #[arg(long)]
        layout: Option<String>,
    },
    /// Prints the generated maze as a layout transfer string.
    Export,
    /// Decodes a layout transfer string and reports on its structure.
    Inspect {
        /// Layout transfer string to inspect.
        layout: String,
    },
}

/// Entry point for the Maze Escape command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::resolve(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.maze.seed = seed;
    }
    if let Some(size) = cli.size {
        config.maze.size = size;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        CliCommand::Simulate {
            layout,
            time_limit,
            show,
        } => {
            if let Some(limit) = time_limit {
                config.simulation.time_limit_secs = limit;
            }
            simulate(&config, layout.as_deref(), show)
        }
        CliCommand::Render { layout } => {
            let (layout, cell_length) = resolve_layout(&config, layout.as_deref())?;
            let session = Session::new(layout, cell_length, &config)?;
            let agent = session.agent();
            print!("{}", render_ascii(session.world(), Some(&agent)));
            Ok(())
        }
        CliCommand::Export => {
            let (layout, cell_length) = resolve_layout(&config, None)?;
            println!("{}", MazeSnapshot { layout, cell_length }.encode());
            Ok(())
        }
        CliCommand::Inspect { layout } => inspect(&layout),
    }
}

fn resolve_layout(config: &AppConfig, encoded: Option<&str>) -> Result<(MazeLayout, f32)> {
    if let Some(encoded) = encoded {
        let snapshot = MazeSnapshot::decode(encoded).context("invalid layout string")?;
        return Ok((snapshot.layout, snapshot.cell_length));
    }

    let mut generator = MazeGenerator::new(MazeConfig::new(config.maze.seed));
    let layout = generator
        .generate(config.maze.size, config.maze.size)
        .with_context(|| format!("cannot generate a maze of size {}", config.maze.size))?;
    info!(seed = config.maze.seed, size = config.maze.size, "maze generated");
    Ok((layout, config.maze.cell_length))
}

fn simulate(config: &AppConfig, encoded: Option<&str>, show: bool) -> Result<()> {
    let (layout, cell_length) = resolve_layout(config, encoded)?;
    let mut session = Session::new(layout, cell_length, config)?;
    println!("{}", query::welcome_banner(session.world()));

    let time_limit = Duration::try_from_secs_f32(config.simulation.time_limit_secs)
        .context("time limit must be a non-negative number of seconds")?;
    let report = session.run(time_limit);
    print_report(&report);
    if show {
        let agent = session.agent();
        print!("{}", render_ascii(session.world(), Some(&agent)));
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    let outcome = match report.outcome {
        Some(SessionOutcome::Escaped) => "escaped with the relic",
        Some(SessionOutcome::Caught) => "caught by the monster",
        None => "time ran out",
    };
    println!("outcome: {outcome}");
    println!(
        "elapsed: {:.2}s over {} ticks",
        report.elapsed.as_secs_f32(),
        report.ticks
    );
    println!("obstacles: {}", report.obstacles);
    println!("charm uses: {}", report.charm_uses);
    for (at, state) in &report.state_changes {
        println!("  {:>7.2}s agent {}", at.as_secs_f32(), state.label());
    }
    println!(
        "final: player ({:.1}, {:.1}), agent ({:.1}, {:.1}) {}",
        report.player.x(),
        report.player.z(),
        report.agent.position.x(),
        report.agent.position.z(),
        report.agent.state.label()
    );
}

fn inspect(encoded: &str) -> Result<()> {
    let snapshot = MazeSnapshot::decode(encoded).context("invalid layout string")?;
    let layout = &snapshot.layout;
    let open = layout.open_cells().count();
    let spawn = CellCoord::new(layout.columns() / 2, layout.rows() / 2);

    let grid = WallGrid::new(snapshot.layout.clone(), snapshot.cell_length)
        .context("layout string carries an invalid cell length")?;
    let mut field = NavigationField::default();
    let sources: Vec<CellCoord> = layout.open_cells().take(1).collect();
    field.rebuild(&grid, &sources);
    let reachable = field.reachable_cells().count();

    println!("dimensions: {}x{}", layout.columns(), layout.rows());
    println!("cell length: {}", snapshot.cell_length);
    println!("open cells: {open}");
    println!("connected: {}", reachable == open);
    println!(
        "spawn {}x{} is {}",
        spawn.column(),
        spawn.row(),
        if layout.is_wall(spawn) {
            "walled (cleared on install)"
        } else {
            "open"
        }
    );
    Ok(())
}
