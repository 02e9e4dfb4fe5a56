// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dungeon Editor - headless host for the room node graph editor.
//!
//! Creates and checks graph documents and replays recorded edit scripts
//! through the same command entry point an interactive editor uses.

mod session;

use clap::{Parser, Subcommand};
use session::{EditSession, SessionConfig};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "dungeon_editor")]
#[command(about = "Build and validate dungeon room layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Editor settings file (RON)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Room type definitions (RON)
    #[arg(long, global = true)]
    room_types: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a graph holding only the entrance
    New {
        /// Where to write the document (.ron or .json)
        output: PathBuf,

        /// Graph name
        #[arg(short, long, default_value = "Dungeon")]
        name: String,
    },
    /// Load a document, validate it and print its counts
    Check {
        /// Document to check
        document: PathBuf,

        /// Print counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay an edit script against a document
    Apply {
        /// Document to edit
        document: PathBuf,

        /// Script of edit steps (.ron or .json)
        script: PathBuf,

        /// Write the result here instead of over the document
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the room types offered to users
    Types,
    /// Write default settings and room types for editing
    InitConfig {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "dungeon_editor={log_level},dungeon_editor_graph={log_level}"
        ))
    });
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Dungeon Editor v{}", env!("CARGO_PKG_VERSION"));

    let config = SessionConfig::load(cli.settings.as_deref(), cli.room_types.as_deref())?;

    match cli.command {
        Commands::New { output, name } => {
            let session = EditSession::create(&config, name)?;
            session.save(&output)
        }
        Commands::Check { document, json } => {
            let session = EditSession::open(&config, &document)?;
            let stats = session.stats();
            tracing::debug!("Checked graph {}", session.graph().id);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!(
                    "{}: {} nodes, {} edges ({} corridors, {} boss rooms, {} unassigned)",
                    stats.name,
                    stats.nodes,
                    stats.edges,
                    stats.corridors,
                    stats.boss_rooms,
                    stats.unassigned
                );
            }
            Ok(())
        }
        Commands::Apply { document, script, output } => {
            let mut session = EditSession::open(&config, &document)?;
            let steps = session::load_script(&script)?;
            let report = session.replay(steps)?;
            session.save(output.as_deref().unwrap_or(&document))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Types => {
            for room_type in config.room_types.displayable() {
                println!("{:<16} {}", room_type.id.as_str(), room_type.name);
            }
            Ok(())
        }
        Commands::InitConfig { dir } => config.write_to(&dir),
    }
}
