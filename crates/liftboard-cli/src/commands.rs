//! Command handlers.
//!
//! Each handler loads the configured source through the shared
//! [`CommandContext`], runs one query and renders the reply as plain text.
//! Text messages such as `!search smith` are parsed into the same
//! [`Command`] values the CLI subcommands produce.

use std::fmt::Write;
use std::sync::Arc;

use anyhow::Result;
use liftboard_data::{ColumnSummary, DataError, Row, SheetReader};
use tracing::{debug, error};

use crate::config::Settings;
use crate::rankings::Rankings;

pub const LOAD_FAILED: &str = "Failed to load data source. Please check the configuration.";
pub const NO_DATA: &str = "No data found in the sheet.";
pub const NO_LIFTERS: &str = "No lifter data found in the sheet.";

/// Process-scoped state shared by every command handler
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub reader: Arc<SheetReader>,
    pub settings: Settings,
}

impl CommandContext {
    /// Build the reader for the configured source
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let reader = SheetReader::new(settings.source.clone())?
            .with_cache_timeout(settings.cache_timeout());
        Ok(Self::new(reader, settings))
    }

    pub fn new(reader: SheetReader, settings: Settings) -> Self {
        Self {
            reader: Arc::new(reader),
            settings,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List sheets with row counts
    Sheets,
    /// Show the first rows of a sheet
    Data {
        limit: Option<usize>,
        sheet: Option<String>,
    },
    /// Search every cell for a term
    Search { query: String, sheet: Option<String> },
    /// Row, column and sheet counts
    StatsOverview { sheet: Option<String> },
    /// Numeric statistics for one column
    StatsColumn { name: String, sheet: Option<String> },
    /// Rankings announcement
    Announce,
}

impl Command {
    /// Parse a prefixed text message.
    ///
    /// Returns `None` when the message does not start with `prefix` or names an
    /// unknown command, `Some(Err(usage))` when the arguments are invalid.
    pub fn parse_message(prefix: &str, message: &str) -> Option<Result<Command, String>> {
        let body = message.strip_prefix(prefix)?;
        let mut args = body.split_whitespace();
        let name = args.next()?.to_lowercase();
        let args: Vec<&str> = args.collect();
        let arg = |idx: usize| args.get(idx).map(|s| s.to_string());

        let command = match name.as_str() {
            "sheets" => Ok(Command::Sheets),
            "data" => Ok(Command::Data {
                limit: args.first().and_then(|s| s.parse().ok()).filter(|&n| n > 0),
                sheet: arg(1),
            }),
            "search" => match arg(0) {
                Some(query) => Ok(Command::Search {
                    query,
                    sheet: arg(1),
                }),
                None => Err(format!(
                    "Please provide a search term. Usage: `{prefix}search <term> [sheet]`"
                )),
            },
            "stats" => match args.first().copied() {
                None | Some("overview") => Ok(Command::StatsOverview { sheet: arg(1) }),
                Some("column") if args.len() >= 2 => Ok(Command::StatsColumn {
                    name: args[1].to_string(),
                    sheet: arg(2),
                }),
                _ => Err(format!(
                    "Invalid usage. Examples:\n`{prefix}stats overview [sheet]`\n`{prefix}stats column <name> [sheet]`"
                )),
            },
            "announce-rankings" | "announce" => Ok(Command::Announce),
            _ => return None,
        };

        Some(command)
    }
}

/// Run a command and render the reply. Failures become user-facing text.
pub async fn execute(ctx: &CommandContext, command: &Command) -> String {
    debug!(?command, "Executing command");

    if !ctx.reader.load().await {
        return LOAD_FAILED.to_string();
    }

    let result = match command {
        Command::Sheets => sheets(ctx).await,
        Command::Data { limit, sheet } => {
            data(ctx, limit.unwrap_or(ctx.settings.page_size), sheet.as_deref()).await
        }
        Command::Search { query, sheet } => search(ctx, query, sheet.as_deref()).await,
        Command::StatsOverview { sheet } => stats_overview(ctx, sheet.as_deref()).await,
        Command::StatsColumn { name, sheet } => stats_column(ctx, name, sheet.as_deref()).await,
        Command::Announce => announce(ctx).await,
    };

    match result {
        Ok(reply) => reply,
        Err(err) => render_error(ctx, err).await,
    }
}

/// Handle one prefixed text message; `None` when it is not a command
pub async fn handle_message(ctx: &CommandContext, message: &str) -> Option<String> {
    match Command::parse_message(&ctx.settings.prefix, message.trim())? {
        Ok(command) => Some(execute(ctx, &command).await),
        Err(usage) => Some(usage),
    }
}

async fn render_error(ctx: &CommandContext, err: DataError) -> String {
    match err {
        DataError::SheetNotFound(name) => {
            let available = ctx.reader.sheet_names().await.unwrap_or_default();
            format!(
                "Sheet \"{}\" not found. Available sheets: {}",
                name,
                available.join(", ")
            )
        }
        other => {
            error!(error = %other, "Command failed");
            format!("Error: {}", other)
        }
    }
}

fn render_row(out: &mut String, title: &str, row: &Row) {
    let _ = writeln!(out, "{}", title);
    if row.values().iter().all(String::is_empty) {
        let _ = writeln!(out, "  Empty row");
        return;
    }
    for (key, value) in row.iter() {
        let _ = writeln!(out, "  {}: {}", key, value);
    }
}

async fn sheets(ctx: &CommandContext) -> Result<String, DataError> {
    let names = ctx.reader.sheet_names().await?;
    if names.is_empty() {
        return Ok("No sheets found in the data source.".to_string());
    }

    let mut out = String::new();
    let _ = writeln!(out, "Available Sheets");
    let _ = writeln!(out, "Found {} sheet(s):", names.len());
    for (idx, name) in names.iter().enumerate() {
        let count = ctx.reader.row_count(Some(name)).await?;
        let _ = writeln!(out, "{}. {} (Rows: {})", idx + 1, name, count);
    }
    Ok(out)
}

async fn data(ctx: &CommandContext, limit: usize, sheet: Option<&str>) -> Result<String, DataError> {
    let page = ctx.reader.page(sheet, 0, limit).await?;
    if page.total == 0 {
        return Ok(NO_DATA.to_string());
    }

    let mut out = String::new();
    let _ = writeln!(out, "Data from \"{}\"", page.sheet);
    let _ = writeln!(out, "Showing {} of {} rows", page.rows.len(), page.total);
    for (idx, row) in page.rows.iter().enumerate() {
        render_row(&mut out, &format!("Row {}", page.offset + idx + 1), row);
    }
    let names = ctx.reader.sheet_names().await?;
    let _ = writeln!(out, "Available sheets: {}", names.join(", "));
    Ok(out)
}

async fn search(ctx: &CommandContext, query: &str, sheet: Option<&str>) -> Result<String, DataError> {
    let results = ctx.reader.search(query, sheet).await?;
    if results.is_empty() {
        return Ok(format!("No results found for \"{}\"", query));
    }

    let target = ctx.reader.resolve_sheet(sheet).await?;
    let shown = results.len().min(ctx.settings.search_limit);

    let mut out = String::new();
    let _ = writeln!(out, "Search Results for \"{}\"", query);
    let _ = writeln!(
        out,
        "Found {} result(s) in \"{}\" (showing first {})",
        results.len(),
        target,
        shown
    );
    for (idx, row) in results.iter().take(shown).enumerate() {
        render_row(&mut out, &format!("Result {}", idx + 1), row);
    }
    Ok(out)
}

async fn stats_overview(ctx: &CommandContext, sheet: Option<&str>) -> Result<String, DataError> {
    let target = ctx.reader.resolve_sheet(sheet).await?;
    let names = ctx.reader.sheet_names().await?;
    let rows = ctx.reader.row_count(sheet).await?;
    let columns = ctx.reader.columns(sheet).await?;

    let column_list = if columns.is_empty() {
        "None".to_string()
    } else {
        columns.join(", ")
    };

    let mut out = String::new();
    let _ = writeln!(out, "Overview Statistics - \"{}\"", target);
    let _ = writeln!(out, "Total Rows: {}", rows);
    let _ = writeln!(out, "Total Columns: {}", columns.len());
    let _ = writeln!(out, "Total Sheets: {}", names.len());
    let _ = writeln!(out, "Column Names: {}", column_list);
    let _ = writeln!(out, "Available Sheets: {}", names.join(", "));
    Ok(out)
}

async fn stats_column(
    ctx: &CommandContext,
    column: &str,
    sheet: Option<&str>,
) -> Result<String, DataError> {
    let target = ctx.reader.resolve_sheet(sheet).await?;

    let stats = match ctx.reader.column_stats(column, sheet).await? {
        ColumnSummary::Numeric(stats) => stats,
        ColumnSummary::NoNumericData(missing) => return Ok(missing.to_string()),
    };

    let mut out = String::new();
    let _ = writeln!(out, "Column Statistics - \"{}\"", column);
    let _ = writeln!(out, "From sheet: \"{}\"", target);
    let _ = writeln!(out, "Count: {}", stats.count);
    let _ = writeln!(out, "Sum: {:.2}", stats.sum);
    let _ = writeln!(out, "Average: {:.2}", stats.average);
    let _ = writeln!(out, "Minimum: {}", stats.min);
    let _ = writeln!(out, "Maximum: {}", stats.max);
    let _ = writeln!(out, "Median: {}", stats.median);
    Ok(out)
}

async fn announce(ctx: &CommandContext) -> Result<String, DataError> {
    let rows = ctx.reader.rows(None).await?;
    Ok(Rankings::from_rows(&rows)
        .map(|rankings| rankings.render())
        .unwrap_or_else(|| NO_LIFTERS.to_string()))
}
