//! Which chart series the user has hidden by clicking their legend entries.

use campaign_core::types::{OptimizationResult, Strategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The two charts with toggleable legends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Strategy lines on the scenario comparison chart.
    Candidates,
    /// Per-channel reach-vs-budget curves.
    Channels,
}

impl FromStr for SeriesKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidates" | "strategies" => Ok(SeriesKind::Candidates),
            "channels" => Ok(SeriesKind::Channels),
            other => Err(format!("unknown series kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesVisibility {
    hidden: Vec<String>,
}

impl SeriesVisibility {
    /// Hide a visible series or show a hidden one. Returns whether the
    /// series is visible afterwards.
    pub fn toggle(&mut self, key: &str) -> bool {
        if let Some(pos) = self.hidden.iter().position(|k| k == key) {
            self.hidden.remove(pos);
            true
        } else {
            self.hidden.push(key.to_string());
            false
        }
    }

    pub fn is_visible(&self, key: &str) -> bool {
        !self.hidden.iter().any(|k| k == key)
    }

    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartVisibility {
    pub candidates: SeriesVisibility,
    pub channels: SeriesVisibility,
}

impl ChartVisibility {
    pub fn toggle(&mut self, kind: SeriesKind, key: &str) -> bool {
        match kind {
            SeriesKind::Candidates => self.candidates.toggle(key),
            SeriesKind::Channels => self.channels.toggle(key),
        }
    }

    pub fn is_visible(&self, kind: SeriesKind, key: &str) -> bool {
        match kind {
            SeriesKind::Candidates => self.candidates.is_visible(key),
            SeriesKind::Channels => self.channels.is_visible(key),
        }
    }

    pub fn visible_strategies(&self) -> Vec<Strategy> {
        Strategy::ALL
            .into_iter()
            .filter(|s| self.candidates.is_visible(s.label()))
            .collect()
    }

    /// Channel curves still drawn, in curve order.
    pub fn visible_channels<'a>(&self, result: &'a OptimizationResult) -> Vec<&'a str> {
        result
            .channel_curves
            .keys()
            .map(String::as_str)
            .filter(|c| self.channels.is_visible(c))
            .collect()
    }
}
