// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorkit CLI - normalize and inspect floor plan files.
//!
//! # Commands
//!
//! - `normalize <plan>` - clean up the wall graph and write the plan back out
//! - `rooms <plan>` - list the rooms a plan encloses
//! - `check <plan>` - fail if the stored plan is not already normalized
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use floorkit_editor::{EditSession, EditorConfig};
use floorkit_topology::{PlanFile, WallGraph};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "floorkit", version, about = "Normalize and inspect floor plan files")]
struct Cli {
    /// Editor or kernel configuration as a JSON file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a plan and detect its rooms
    Normalize {
        /// Plan JSON file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the rooms of a plan
    Rooms {
        /// Plan JSON file
        input: PathBuf,

        /// Print the rooms as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that a plan is stored in normalized form
    Check {
        /// Plan JSON file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns `false` when a check did not pass.
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Normalize { input, output } => {
            let session = open(&input, config)?;
            let json = session.save()?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "plan written");
                }
                None => println!("{json}"),
            }
            Ok(true)
        }
        Command::Rooms { input, json } => {
            let session = open(&input, config)?;
            if json {
                let rooms: Vec<_> = session
                    .rooms()
                    .iter()
                    .map(|room| {
                        serde_json::json!({
                            "name": room.name,
                            "area": room.area,
                            "center": { "x": room.center.x, "y": room.center.y },
                            "corners": room.polygon.len(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rooms)?);
            } else {
                for (i, room) in session.rooms().iter().enumerate() {
                    println!(
                        "{i:>3}  {:<20} {:>10.2}  ({:.1}, {:.1})",
                        room.name, room.area, room.center.x, room.center.y
                    );
                }
                println!("total area: {:.2}", session.plan().total_area());
            }
            Ok(true)
        }
        Command::Check { input } => {
            let text = read(&input)?;
            let file = PlanFile::from_json(&text)
                .with_context(|| format!("failed to parse {}", input.display()))?;
            let mut graph = WallGraph::from_plan(&file, &config.plan.topology)?;
            let report = graph.normalize(&config.plan);
            if report.is_noop() {
                tracing::info!(
                    nodes = graph.node_count(),
                    walls = graph.wall_count(),
                    "plan is normalized"
                );
                Ok(true)
            } else {
                tracing::warn!(?report, "plan is not normalized");
                Ok(false)
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let text = read(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    // A bare kernel configuration is accepted as the `plan` section.
    let is_editor = ["plan", "snap", "history_limit"]
        .iter()
        .any(|key| value.get(key).is_some());
    let config = if is_editor {
        EditorConfig::from_json(&text)?
    } else {
        EditorConfig {
            plan: floorkit_topology::PlanConfig::from_json(&text)?,
            ..EditorConfig::default()
        }
    };
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn open(path: &Path, config: EditorConfig) -> Result<EditSession> {
    let text = read(path)?;
    let mut session = EditSession::new(config);
    session
        .load(&text)
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(session)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
