//! Rankings announcement built from the results sheet.

use std::fmt::Write;

use liftboard_data::Row;

pub const LIFTER: &str = "Lifter";
pub const BODYWEIGHT: &str = "Bodyweight(Pounds)";
pub const TOTAL_DOTS: &str = "Total Dots";
pub const SQUAT_MAX: &str = "Squat - Single Max";
pub const BENCH_MAX: &str = "Bench - Single Max";
pub const DEADLIFT_MAX: &str = "Deadlift - Single Max";

/// One ranked lifter
#[derive(Debug, Clone, PartialEq)]
pub struct RankedLifter {
    pub rank: usize,
    pub name: String,
    pub bodyweight: String,
    pub total_dots: String,
    pub squat: String,
    pub bench: String,
    pub deadlift: String,
}

impl RankedLifter {
    /// Medal for the podium, the rank number otherwise
    pub fn badge(&self) -> String {
        match self.rank {
            1 => "🥇".to_string(),
            2 => "🥈".to_string(),
            3 => "🥉".to_string(),
            n => format!("{}.", n),
        }
    }
}

/// Overview numbers and the ranked list
#[derive(Debug, Clone, PartialEq)]
pub struct Rankings {
    pub participants: usize,
    pub average_dots: f64,
    pub max_squat: f64,
    pub max_bench: f64,
    pub max_deadlift: f64,
    pub lifters: Vec<RankedLifter>,
}

/// Numeric cell value; missing or unparseable cells count as zero
fn number(row: &Row, column: &str) -> f64 {
    row.get(column)
        .and_then(liftboard_data::stats::coerce_number)
        .unwrap_or(0.0)
}

/// Cell text, or `fallback` when the cell is missing or empty
fn text_or(row: &Row, column: &str, fallback: &str) -> String {
    row.get(column)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn column_max(rows: &[Row], column: &str) -> f64 {
    rows.iter()
        .map(|row| number(row, column))
        .fold(0.0, f64::max)
}

impl Rankings {
    /// Rank rows by Total Dots, highest first. `None` when there are no rows.
    pub fn from_rows(rows: &[Row]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let mut sorted: Vec<&Row> = rows.iter().collect();
        // Stable sort keeps sheet order for ties
        sorted.sort_by(|a, b| number(b, TOTAL_DOTS).total_cmp(&number(a, TOTAL_DOTS)));

        let total: f64 = rows.iter().map(|row| number(row, TOTAL_DOTS)).sum();

        let lifters = sorted
            .into_iter()
            .enumerate()
            .map(|(idx, row)| RankedLifter {
                rank: idx + 1,
                name: text_or(row, LIFTER, "Unknown"),
                bodyweight: text_or(row, BODYWEIGHT, "N/A"),
                total_dots: text_or(row, TOTAL_DOTS, "0"),
                squat: text_or(row, SQUAT_MAX, "0"),
                bench: text_or(row, BENCH_MAX, "0"),
                deadlift: text_or(row, DEADLIFT_MAX, "0"),
            })
            .collect();

        Some(Self {
            participants: rows.len(),
            average_dots: total / rows.len() as f64,
            max_squat: column_max(rows, SQUAT_MAX),
            max_bench: column_max(rows, BENCH_MAX),
            max_deadlift: column_max(rows, DEADLIFT_MAX),
            lifters,
        })
    }

    /// Plain-text announcement
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "🏆 RANKINGS ARE COMPLETE! 🏆");
        let _ = writeln!(out, "The latest powerlifting rankings are now available!");
        let _ = writeln!(out);
        let _ = writeln!(out, "Total Participants: {}", self.participants);
        let _ = writeln!(out, "Average Total Dots: {:.2}", self.average_dots);
        let _ = writeln!(out, "Highest Squat: {} lbs", self.max_squat);
        let _ = writeln!(out, "Highest Bench: {} lbs", self.max_bench);
        let _ = writeln!(out, "Highest Deadlift: {} lbs", self.max_deadlift);
        let _ = writeln!(out);
        let _ = writeln!(out, "Final Rankings (sorted by Total Dots)");

        for lifter in &self.lifters {
            let _ = writeln!(out, "{} {}", lifter.badge(), lifter.name);
            let _ = writeln!(out, "   Total Dots: {}", lifter.total_dots);
            let _ = writeln!(out, "   Bodyweight: {} lbs", lifter.bodyweight);
            let _ = writeln!(
                out,
                "   S/B/D: {}/{}/{} lbs",
                lifter.squat, lifter.bench, lifter.deadlift
            );
        }

        out
    }
}
