//! Display formats for KPI cards, tables and chart axes.

use campaign_core::types::OptimizationResult;
use serde::Serialize;

/// `1.2B`, `3.4M`, `5.6k`; values under a thousand are printed as-is.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        value.to_string()
    }
}

pub fn format_euro_compact(value: f64) -> String {
    format!("€{}", format_compact(value))
}

/// Fixed two-decimal percentage, e.g. `33.33%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Rounded to a whole number with comma thousands separators.
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// KPI card values of one result, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiDisplay {
    pub projected_reach: String,
    pub users_lost_to_overlap: String,
    pub target_population: String,
    pub total_media_budget: String,
    /// Projected reach as a share of the target population.
    pub population_share: String,
}

impl KpiDisplay {
    pub fn from_result(result: &OptimizationResult) -> Self {
        let share = if result.target_population == 0 {
            0.0
        } else {
            result.total_projected_reach as f64 / result.target_population as f64 * 100.0
        };
        Self {
            projected_reach: format_compact(result.total_projected_reach as f64),
            users_lost_to_overlap: format_grouped(result.users_lost_to_overlap as f64),
            target_population: format_compact(result.target_population as f64),
            total_media_budget: format_euro_compact(result.total_media_budget),
            population_share: format_percent(share),
        }
    }
}
