//! Campaign input form: the parameters a planner run is computed from, and
//! the edits a user can make to them.

use crate::channels::{self, ChannelPreset};
use crate::error::{CampaignError, CampaignResult};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub const MSG_NO_CHANNELS: &str = "Please select at least one channel.";
pub const MSG_MISSING_BUDGET_OR_REACH: &str = "Please fill in the Total Budget and Target Reach.";

// ─── Enumerations ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalType {
    #[default]
    Budget,
    Reach,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Country {
    #[default]
    NL,
    BE,
    UK,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    #[default]
    All,
    Men,
    #[serde(alias = "Women")]
    Woman,
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── Blank-tolerant numeric fields ──────────────────────────────────────────

/// Form fields arrive either as numbers or as text; an empty text field
/// means "not filled in".
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

fn parse_blank<T, E>(value: Option<NumberOrText<T>>) -> Result<Option<T>, E>
where
    T: FromStr,
    E: serde::de::Error,
{
    match value {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| E::custom(format!("expected a number, got '{s}'"))),
    }
}

/// `""`, `null` and a missing field all deserialize to `None`.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    let raw = Option::<NumberOrText<T>>::deserialize(deserializer)?;
    parse_blank(raw)
}

/// Patch semantics: absent leaves the value alone (`None`), `null` or `""`
/// clears it (`Some(None)`), a number sets it.
fn blank_as_clear<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    let raw = Option::<NumberOrText<T>>::deserialize(deserializer)?;
    parse_blank(raw).map(Some)
}

// ─── Channel configuration ──────────────────────────────────────────────────

/// Per-channel constraints the user attaches to a selected channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChannelConfig {
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub fixed_budget: Option<f64>,
    #[serde(default)]
    pub always_include: bool,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub cpm: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub tv_factor: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,
    #[serde(default)]
    pub frequency_capping: bool,
}

fn non_zero(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x != 0.0)
}

impl ChannelConfig {
    /// Settings a channel starts with the first time it is selected.
    pub fn seeded(name: &str) -> Self {
        let defaults = channels::defaults_for(name);
        Self {
            cpm: Some(defaults.cpm),
            tv_factor: Some(defaults.tv_factor),
            ..Self::default()
        }
    }

    // A zero in any of these fields means "not set".
    pub fn effective_fixed_budget(&self) -> Option<f64> {
        non_zero(self.fixed_budget)
    }
    pub fn effective_cpm(&self) -> Option<f64> {
        non_zero(self.cpm)
    }
    pub fn effective_tv_factor(&self) -> Option<f64> {
        non_zero(self.tv_factor)
    }
    pub fn effective_scale_factor(&self) -> Option<f64> {
        non_zero(self.scale_factor)
    }

    pub fn apply(&mut self, patch: &ChannelConfigPatch) {
        if let Some(v) = patch.fixed_budget {
            self.fixed_budget = v;
        }
        if let Some(v) = patch.cpm {
            self.cpm = v;
        }
        if let Some(v) = patch.tv_factor {
            self.tv_factor = v;
        }
        if let Some(v) = patch.scale_factor {
            self.scale_factor = v;
        }
        if let Some(v) = patch.always_include {
            self.always_include = v;
        }
        if let Some(v) = patch.frequency_capping {
            self.frequency_capping = v;
        }
    }
}

/// Partial update of a [`ChannelConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelConfigPatch {
    #[serde(default, deserialize_with = "blank_as_clear")]
    pub fixed_budget: Option<Option<f64>>,
    #[serde(default, deserialize_with = "blank_as_clear")]
    pub cpm: Option<Option<f64>>,
    #[serde(default, deserialize_with = "blank_as_clear")]
    pub tv_factor: Option<Option<f64>>,
    #[serde(default, deserialize_with = "blank_as_clear")]
    pub scale_factor: Option<Option<f64>>,
    #[serde(default)]
    pub always_include: Option<bool>,
    #[serde(default)]
    pub frequency_capping: Option<bool>,
}

// ─── Campaign inputs ────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
fn next_week() -> NaiveDate {
    today() + Duration::days(7)
}
fn default_duration() -> u32 {
    1
}
fn default_contact_frequency() -> u32 {
    1
}
fn default_max_channels() -> u32 {
    2
}

/// Everything the user enters before running the planner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignInputs {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub total_budget: Option<f64>,
    #[serde(default)]
    pub goal_type: GoalType,
    #[serde(default = "today")]
    pub campaign_start_date: NaiveDate,
    #[serde(default = "next_week")]
    pub campaign_end_date: NaiveDate,
    /// Whole weeks between start and end, never below one.
    #[serde(default = "default_duration")]
    pub campaign_duration: u32,
    #[serde(default)]
    pub country: Country,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub age_min: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub age_max: Option<u32>,
    #[serde(default = "default_contact_frequency")]
    pub minimal_contact_frequency: u32,
    #[serde(default)]
    pub channel_selection: Vec<String>,
    #[serde(default)]
    pub channel_settings: BTreeMap<String, ChannelConfig>,
    #[serde(default = "default_max_channels")]
    pub max_channels: u32,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub target_reach: Option<f64>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub campaign_name: String,
}

/// `max(1, floor(max(1, days) / 7))`.
pub fn duration_weeks(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days().max(1);
    (days / 7).max(1) as u32
}

impl CampaignInputs {
    /// Blank form for a campaign starting on `start` and lasting one week.
    pub fn defaults_on(start: NaiveDate) -> Self {
        Self {
            total_budget: None,
            goal_type: GoalType::Budget,
            campaign_start_date: start,
            campaign_end_date: start + Duration::days(7),
            campaign_duration: 1,
            country: Country::NL,
            age_min: None,
            age_max: None,
            minimal_contact_frequency: 1,
            channel_selection: Vec::new(),
            channel_settings: BTreeMap::new(),
            max_channels: 2,
            target_reach: None,
            gender: Gender::All,
            customer_name: String::new(),
            campaign_name: String::new(),
        }
    }

    /// Budget with a blank field read as zero.
    pub fn budget_or_zero(&self) -> f64 {
        self.total_budget.unwrap_or(0.0)
    }

    /// Target reach with a blank field read as zero.
    pub fn reach_or_zero(&self) -> f64 {
        self.target_reach.unwrap_or(0.0)
    }

    pub fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        self.campaign_start_date = start;
        self.campaign_end_date = end;
        self.campaign_duration = duration_weeks(start, end);
    }

    pub fn is_selected(&self, channel: &str) -> bool {
        self.channel_selection.iter().any(|c| c == channel)
    }

    /// Replace the selection, creating settings for channels seen for the
    /// first time. Settings of dropped channels are kept.
    pub fn set_selection(&mut self, selection: Vec<String>) {
        let mut seen = HashSet::new();
        self.channel_selection = selection
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        for name in &self.channel_selection {
            if !self.channel_settings.contains_key(name) {
                self.channel_settings
                    .insert(name.clone(), ChannelConfig::seeded(name));
            }
        }
    }

    /// Select an unselected channel or deselect a selected one. Returns
    /// whether the channel is selected afterwards.
    pub fn toggle_channel(&mut self, channel: &str) -> bool {
        let mut next = self.channel_selection.clone();
        let selected = if self.is_selected(channel) {
            next.retain(|c| c != channel);
            false
        } else {
            next.push(channel.to_string());
            true
        };
        self.set_selection(next);
        selected
    }

    pub fn apply_preset(&mut self, preset: ChannelPreset) {
        self.set_selection(preset.channels());
    }

    /// Update the settings of a channel. Unknown channels get seeded
    /// settings first, which keeps the map a superset of the selection.
    pub fn update_channel_settings(&mut self, channel: &str, patch: &ChannelConfigPatch) {
        self.channel_settings
            .entry(channel.to_string())
            .or_insert_with(|| ChannelConfig::seeded(channel))
            .apply(patch);
    }

    /// Settings for a channel, falling back to a blank config.
    pub fn settings_for(&self, channel: &str) -> ChannelConfig {
        self.channel_settings.get(channel).cloned().unwrap_or_default()
    }

    /// The customer picker's "All Customers" entry clears the name.
    pub fn select_customer(&mut self, name: &str) {
        self.customer_name = if name == crate::ALL_CUSTOMERS {
            String::new()
        } else {
            name.to_string()
        };
    }

    /// Re-establish derived fields after a wholesale replacement.
    pub fn normalize(&mut self) {
        self.campaign_duration = duration_weeks(self.campaign_start_date, self.campaign_end_date);
        let selection = std::mem::take(&mut self.channel_selection);
        self.set_selection(selection);
    }

    /// Checks that must pass before a run may start.
    pub fn validate_for_run(&self) -> CampaignResult<()> {
        if self.channel_selection.is_empty() {
            return Err(CampaignError::Validation(MSG_NO_CHANNELS.to_string()));
        }
        let mut seen = HashSet::new();
        for name in &self.channel_selection {
            if !seen.insert(name.as_str()) {
                return Err(CampaignError::Validation(format!(
                    "Channel '{name}' is selected more than once."
                )));
            }
        }
        if self.total_budget.is_none() || self.target_reach.is_none() {
            return Err(CampaignError::Validation(
                MSG_MISSING_BUDGET_OR_REACH.to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CampaignInputs {
    fn default() -> Self {
        Self::defaults_on(today())
    }
}
