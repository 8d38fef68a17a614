use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::inputs::GoalType;

// ─── Run Status ─────────────────────────────────────────────────────────────

/// Progress of a planner run as shown to the user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    #[default]
    Idle,
    Analyzing,
    Optimizing,
    Simulating,
    Finalizing,
    Completed,
}

/// Labels of the four progress stages, in order.
pub const STAGE_LABELS: [&str; 4] = [
    "Analyzing Target Audience",
    "Optimizing Channel Mix",
    "Running Scenario Simulations",
    "Finalizing Recommendations",
];

impl RunStatus {
    /// Status that corresponds to progress stage `index`.
    pub fn for_stage(index: usize) -> Option<Self> {
        match index {
            0 => Some(RunStatus::Analyzing),
            1 => Some(RunStatus::Optimizing),
            2 => Some(RunStatus::Simulating),
            3 => Some(RunStatus::Finalizing),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self,
            RunStatus::Analyzing
                | RunStatus::Optimizing
                | RunStatus::Simulating
                | RunStatus::Finalizing
        )
    }

    /// A new run may be started from here.
    pub fn accepts_start(&self) -> bool {
        matches!(self, RunStatus::Idle | RunStatus::Completed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Idle => "IDLE",
            RunStatus::Analyzing => "ANALYZING",
            RunStatus::Optimizing => "OPTIMIZING",
            RunStatus::Simulating => "SIMULATING",
            RunStatus::Finalizing => "FINALIZING",
            RunStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

// ─── Strategies ─────────────────────────────────────────────────────────────

/// The three synthetic strategies compared on the scenario chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Strategy {
    Default,
    MaxReach,
    CostEfficient,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Default, Strategy::MaxReach, Strategy::CostEfficient];

    /// Series label, also the key used to toggle the series on the chart.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Default => "Strategy A (Default)",
            Strategy::MaxReach => "Strategy B (Max Reach)",
            Strategy::CostEfficient => "Strategy C (Cost Efficient)",
        }
    }

    /// Half-open multiplier band applied to the linear reach target.
    pub fn multiplier_band(&self) -> (f64, f64) {
        match self {
            Strategy::Default => (0.9, 1.0),
            Strategy::MaxReach => (1.1, 1.2),
            Strategy::CostEfficient => (0.8, 0.85),
        }
    }
}

// ─── Result rows ────────────────────────────────────────────────────────────

/// KPI forecast for one selected channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelData {
    pub run_id: Uuid,
    pub customer_name: String,
    pub campaign_name: String,
    pub goal_type: GoalType,
    pub run_ts: String,
    pub channel: String,
    pub media_budget: f64,
    pub budget_share_pct: f64,
    pub cpm: f64,
    pub tv_factor: f64,
    pub tv_reach_num: u64,
    pub tv_reach_pct: f64,
    pub digital_impressions: f64,
    pub digital_reach_num: u64,
    pub digital_reach_pct: f64,
    pub contact_freq: f64,
    pub budget: f64,
    pub reach: u64,
    pub roi: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReachPoint {
    pub iteration: u32,
    pub reach: u64,
    pub budget: f64,
}

/// One budget step of the strategy comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CandidatePoint {
    pub step: u32,
    pub budget: f64,
    #[serde(rename = "Strategy A (Default)")]
    pub strategy_a: u64,
    #[serde(rename = "Strategy B (Max Reach)")]
    pub strategy_b: u64,
    #[serde(rename = "Strategy C (Cost Efficient)")]
    pub strategy_c: u64,
}

impl CandidatePoint {
    pub fn reach_for(&self, strategy: Strategy) -> u64 {
        match strategy {
            Strategy::Default => self.strategy_a,
            Strategy::MaxReach => self.strategy_b,
            Strategy::CostEfficient => self.strategy_c,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    pub budget: f64,
    pub reach: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgeBucketData {
    pub bucket: String,
    pub reach: u64,
    pub budget: u64,
    pub total_users: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OverlapPoint {
    pub step: u32,
    pub budget: f64,
    pub gross_reach: u64,
    pub net_reach: u64,
    pub overlap: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserActivityData {
    pub label: String,
    pub dau: u64,
    pub mau: u64,
}

/// A set of channels and the share of their audience they have in common.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlapIntersection {
    pub channels: Vec<String>,
    pub overlap_pct: f64,
    pub size: u64,
}

/// Everything a completed run produces. Replaced wholesale on every run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationResult {
    pub summary: String,
    pub run_id: Uuid,
    pub run_ts: String,
    pub channels: Vec<ChannelData>,
    pub reach_over_time: Vec<ReachPoint>,
    pub candidate_comparison: Vec<CandidatePoint>,
    /// Budget-to-reach curve per channel, in selection order.
    pub channel_curves: IndexMap<String, Vec<CurvePoint>>,
    pub age_demographics: Vec<AgeBucketData>,
    pub overlap_data: Vec<OverlapPoint>,
    pub user_activity: Vec<UserActivityData>,
    pub intersections: Vec<OverlapIntersection>,
    pub total_projected_reach: u64,
    pub users_lost_to_overlap: u64,
    pub target_population: u64,
    pub total_media_budget: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_statuses() {
        assert_eq!(RunStatus::for_stage(0), Some(RunStatus::Analyzing));
        assert_eq!(RunStatus::for_stage(3), Some(RunStatus::Finalizing));
        assert_eq!(RunStatus::for_stage(4), None);
        assert!(RunStatus::Simulating.is_running());
        assert!(!RunStatus::Completed.is_running());
        assert!(RunStatus::Completed.accepts_start());
        assert!(!RunStatus::Optimizing.accepts_start());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&RunStatus::Finalizing).unwrap();
        assert_eq!(json, "\"FINALIZING\"");
        assert_eq!(RunStatus::Idle.to_string(), "IDLE");
    }

    #[test]
    fn test_candidate_point_uses_series_labels() {
        let point = CandidatePoint {
            step: 1,
            budget: 100.0,
            strategy_a: 10,
            strategy_b: 12,
            strategy_c: 8,
        };
        let value = serde_json::to_value(point).unwrap();
        assert_eq!(value[Strategy::MaxReach.label()], 12);
        assert_eq!(point.reach_for(Strategy::CostEfficient), 8);
    }
}
