//! liftboard CLI - Command layer library
//!
//! This library provides the commands that answer questions about a
//! powerlifting results spreadsheet:
//! - Sheets: list sheets with row counts
//! - Data / Search: browse and search rows
//! - Stats: sheet overview and numeric column statistics
//! - Announce: rankings by Total Dots
//!
//! # Library Usage
//!
//! ```ignore
//! use liftboard_cli::{handle_message, CommandContext, Settings};
//!
//! let ctx = CommandContext::from_settings(Settings::load(None)?)?;
//! if let Some(reply) = handle_message(&ctx, "!search smith").await {
//!     println!("{reply}");
//! }
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # List sheets of a local workbook
//! liftboard --source results.xlsx sheets
//!
//! # Column statistics from a published Google Sheet
//! GOOGLE_SHEETS_URL=https://docs.google.com/spreadsheets/d/<id>/edit liftboard stats column "Total Dots"
//!
//! # Answer chat-style commands from stdin
//! echo '!announce-rankings' | liftboard repl
//! ```

pub mod app;
pub mod commands;
pub mod config;
pub mod rankings;

pub use app::{repl_command, run_cli};
pub use commands::{execute, handle_message, Command, CommandContext};
pub use config::Settings;
pub use rankings::{RankedLifter, Rankings};
