//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::commands::{execute, handle_message, Command, CommandContext};
use crate::config::Settings;

#[derive(Parser)]
#[command(name = "liftboard")]
#[command(author, version, about = "Query powerlifting results spreadsheets", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./liftboard.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workbook path or spreadsheet URL, overrides config and environment
    #[arg(short, long, global = true)]
    source: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sheets and their row counts
    Sheets,

    /// Show the first rows of a sheet
    Data {
        /// Number of rows to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Sheet name (defaults to the first sheet)
        sheet: Option<String>,
    },

    /// Search all cells for a term (case-insensitive)
    Search {
        /// Search term
        query: String,

        /// Sheet name (defaults to the first sheet)
        sheet: Option<String>,
    },

    /// Sheet overview or column statistics
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },

    /// Print the rankings announcement
    Announce,

    /// Read prefixed commands such as `!search smith` from stdin
    Repl,
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Row, column and sheet counts
    Overview {
        /// Sheet name (defaults to the first sheet)
        sheet: Option<String>,
    },

    /// Count, sum, average, min, max and median of a column
    Column {
        /// Column name
        name: String,

        /// Sheet name (defaults to the first sheet)
        sheet: Option<String>,
    },
}

impl Commands {
    /// The command-layer equivalent; `None` for the interactive loop
    fn into_command(self) -> Option<Command> {
        let command = match self {
            Commands::Sheets => Command::Sheets,
            Commands::Data { limit, sheet } => Command::Data { limit, sheet },
            Commands::Search { query, sheet } => Command::Search { query, sheet },
            Commands::Stats {
                command: StatsCommands::Overview { sheet },
            } => Command::StatsOverview { sheet },
            Commands::Stats {
                command: StatsCommands::Column { name, sheet },
            } => Command::StatsColumn { name, sheet },
            Commands::Announce => Command::Announce,
            Commands::Repl => return None,
        };
        Some(command)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI application
///
/// Parses arguments, resolves settings and dispatches to the command layer.
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(source) = cli.source {
        settings.source = source;
    }
    info!(source = %settings.source, "Using data source");

    let ctx = CommandContext::from_settings(settings)?;

    match cli.command.into_command() {
        Some(command) => println!("{}", execute(&ctx, &command).await),
        None => repl_command(&ctx).await?,
    }

    Ok(())
}

/// Answer prefixed commands read line by line from stdin until EOF
pub async fn repl_command(ctx: &CommandContext) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if let Some(reply) = handle_message(ctx, &line).await {
            println!("{}", reply);
        }
    }

    Ok(())
}
