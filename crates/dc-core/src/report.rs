//! Drift report rows and their fixed-width rendering.
//!
//! One line per verified name: the qualified name padded to the widest
//! recorded name, then mean, max, and sum of absolute difference in a
//! `%g`-style significant-digit format. This is an observability surface,
//! not a machine-readable contract; the retained [`DiffRow`]s are the
//! programmatic view.

use serde::{Deserialize, Serialize};

use crate::diff::DiffStats;

/// One verified name with its drift summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRow {
    /// Qualified name of the checked output.
    pub name: String,
    /// Drift summary against the recorded value.
    pub stats: DiffStats,
}

/// Render one aligned drift row.
pub fn render_row(row: &DiffRow, name_width: usize, sig: usize) -> String {
    format!(
        "{:<width$} {:>9} {:>9} {:>9}",
        row.name,
        format_sig(row.stats.mean, sig),
        format_sig(row.stats.max, sig),
        format_sig(row.stats.sum, sig),
        width = name_width,
    )
}

/// Print one aligned drift row to stdout.
pub fn print_row(row: &DiffRow, name_width: usize, sig: usize) {
    println!("{}", render_row(row, name_width, sig));
}

/// Format a number with `sig` significant digits, `%g`-style: plain decimal
/// in a readable range, scientific notation outside it, trailing zeros
/// trimmed.
pub fn format_sig(x: f64, sig: usize) -> String {
    let sig = sig.max(1);
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return format!("{x}");
    }
    let exp = x.abs().log10().floor() as i32;
    if exp < -4 || exp >= sig as i32 {
        format!("{:.*e}", sig - 1, x)
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        let rendered = format!("{:.*}", decimals, x);
        if rendered.contains('.') {
            rendered
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        } else {
            rendered
        }
    }
}
