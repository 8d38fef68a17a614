//! Scenario generator.
//!
//! Produces the numeric side of an [`OptimizationResult`] from campaign
//! inputs. This is a placeholder for a real media-mix optimizer: every
//! figure is drawn from a seedable RNG and scaled by fixed formulas. There
//! is no constraint solving and no reach-overlap model behind it, and the
//! per-channel shares and per-bucket fractions are illustrative only (they
//! are not normalized to 100%).

use campaign_core::config::PlannerConfig;
use campaign_core::inputs::CampaignInputs;
use campaign_core::types::{
    AgeBucketData, CandidatePoint, ChannelData, CurvePoint, OptimizationResult,
    OverlapIntersection, OverlapPoint, ReachPoint, Strategy, UserActivityData,
};
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use uuid::{Builder, Uuid};

/// Number of budget steps in every stepped series.
pub const STEPS: u32 = 10;

/// Age buckets reported in demographic output, in display order.
pub const AGE_BUCKETS: [&str; 10] = [
    "15-19", "20-24", "25-29", "30-34", "35-39", "40-44", "45-49", "50-54", "55-59", "60-64",
];

/// Overlap fraction reached at the final budget step.
const MAX_OVERLAP_FRACTION: f64 = 0.15;

/// At most this many channels take part in the intersection breakdown.
const MAX_INTERSECTION_CHANNELS: usize = 4;

pub struct ScenarioGenerator {
    rng: StdRng,
    total_population: u64,
}

impl ScenarioGenerator {
    /// Reproducible generator: the same seed, inputs and timestamp always
    /// give the same result, run id included.
    pub fn seeded(seed: u64, total_population: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            total_population,
        }
    }

    pub fn from_entropy(total_population: u64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            total_population,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed, config.total_population),
            None => Self::from_entropy(config.total_population),
        }
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }

    /// Build a full result bundle. The summary is left empty for the
    /// caller to fill in.
    pub fn generate(&mut self, inputs: &CampaignInputs, now: DateTime<Utc>) -> OptimizationResult {
        let run_id = Builder::from_random_bytes(self.rng.gen()).into_uuid();
        let run_ts = now.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string();
        let budget = inputs.budget_or_zero();
        let reach = inputs.reach_or_zero();

        let channels = self.channel_rows(inputs, run_id, &run_ts, budget, reach);
        let candidate_comparison = self.candidate_comparison(budget, reach);
        let channel_curves = self.channel_curves(inputs, budget);
        let age_demographics = self.age_demographics(budget, reach);
        let overlap_data = overlap_series(budget, reach);
        let user_activity = self.user_activity(now);
        let intersections = self.intersections(&inputs.channel_selection);

        let reach_over_time = overlap_data
            .iter()
            .map(|p| ReachPoint {
                iteration: p.step,
                reach: p.net_reach,
                budget: p.budget,
            })
            .collect();
        let total_media_budget = channels.iter().map(|c| c.media_budget).sum();

        debug!(
            run_id = %run_id,
            channels = channels.len(),
            budget,
            reach,
            "Generated scenario results"
        );

        OptimizationResult {
            summary: String::new(),
            run_id,
            run_ts,
            channels,
            reach_over_time,
            candidate_comparison,
            channel_curves,
            age_demographics,
            overlap_data,
            user_activity,
            intersections,
            total_projected_reach: round_u64(reach * 1.05),
            users_lost_to_overlap: round_u64(reach * 0.12),
            target_population: self.total_population,
            total_media_budget,
        }
    }

    fn channel_rows(
        &mut self,
        inputs: &CampaignInputs,
        run_id: Uuid,
        run_ts: &str,
        budget: f64,
        reach: f64,
    ) -> Vec<ChannelData> {
        let share = 100.0 / inputs.channel_selection.len().max(1) as f64;
        let population = self.total_population.max(1) as f64;

        inputs
            .channel_selection
            .iter()
            .map(|name| {
                let config = inputs.settings_for(name);
                let media_budget = config
                    .effective_fixed_budget()
                    .unwrap_or_else(|| (budget * share / 100.0).round());
                let digital_reach_num = round_u64(reach * self.uniform(0.2, 0.6));
                let cpm = match config.effective_cpm() {
                    Some(cpm) => cpm,
                    None => self.uniform(5.0, 10.0),
                };

                ChannelData {
                    run_id,
                    customer_name: inputs.customer_name.clone(),
                    campaign_name: inputs.campaign_name.clone(),
                    goal_type: inputs.goal_type,
                    run_ts: run_ts.to_string(),
                    channel: name.clone(),
                    media_budget,
                    budget_share_pct: share,
                    cpm,
                    tv_factor: config.effective_tv_factor().unwrap_or(0.0),
                    tv_reach_num: 0,
                    tv_reach_pct: 0.0,
                    digital_impressions: media_budget * 100.0,
                    digital_reach_num,
                    digital_reach_pct: digital_reach_num as f64 / population * 100.0,
                    contact_freq: self.uniform(2.5, 3.5),
                    budget: media_budget,
                    reach: digital_reach_num,
                    roi: self.uniform(2.0, 5.0),
                }
            })
            .collect()
    }

    fn candidate_comparison(&mut self, budget: f64, reach: f64) -> Vec<CandidatePoint> {
        (1..=STEPS)
            .map(|step| {
                let linear = reach * f64::from(step) / f64::from(STEPS);
                let [a, b, c] = Strategy::ALL.map(|s| {
                    let (low, high) = s.multiplier_band();
                    round_u64(linear * self.uniform(low, high))
                });
                CandidatePoint {
                    step,
                    budget: step_budget(budget, step),
                    strategy_a: a,
                    strategy_b: b,
                    strategy_c: c,
                }
            })
            .collect()
    }

    /// One efficiency draw per channel keeps each curve monotonic.
    fn channel_curves(
        &mut self,
        inputs: &CampaignInputs,
        budget: f64,
    ) -> IndexMap<String, Vec<CurvePoint>> {
        let mut curves = IndexMap::with_capacity(inputs.channel_selection.len());
        for name in &inputs.channel_selection {
            let efficiency = self.uniform(0.5, 1.5);
            let points = (1..=STEPS)
                .map(|step| {
                    let spend = step_budget(budget, step);
                    CurvePoint {
                        budget: spend,
                        reach: round_u64(efficiency * 100_000.0 * (spend / 100.0 + 1.0).ln()),
                    }
                })
                .collect();
            curves.insert(name.clone(), points);
        }
        curves
    }

    fn age_demographics(&mut self, budget: f64, reach: f64) -> Vec<AgeBucketData> {
        let population = self.total_population as f64;
        AGE_BUCKETS
            .iter()
            .map(|bucket| AgeBucketData {
                bucket: bucket.to_string(),
                reach: round_u64(reach * self.uniform(0.05, 0.15)),
                budget: round_u64(budget * self.uniform(0.05, 0.15)),
                total_users: round_u64(population * self.uniform(0.08, 0.12)),
            })
            .collect()
    }

    /// Daily and monthly active users for the seven days ending `now`.
    fn user_activity(&mut self, now: DateTime<Utc>) -> Vec<UserActivityData> {
        let population = self.total_population as f64;
        (0..7i64)
            .map(|i| {
                let day = now - Duration::days(6 - i);
                UserActivityData {
                    label: day.format("%a").to_string(),
                    dau: round_u64(population * 0.15 * self.uniform(0.8, 1.2)),
                    mau: round_u64(population * 0.45 * self.uniform(0.9, 1.1)),
                }
            })
            .collect()
    }

    fn intersections(&self, selection: &[String]) -> Vec<OverlapIntersection> {
        let population = self.total_population as f64;
        let active: Vec<&String> = selection.iter().take(MAX_INTERSECTION_CHANNELS).collect();
        let row = |members: &[&String], overlap_pct: f64, size_fraction: f64| OverlapIntersection {
            channels: members.iter().map(|c| c.to_string()).collect(),
            overlap_pct,
            size: round_u64(population * size_fraction),
        };

        let mut rows: Vec<OverlapIntersection> =
            active.iter().map(|c| row(&[*c], 100.0, 0.10)).collect();
        if active.len() >= 2 {
            rows.push(row(&[active[0], active[1]], 22.0, 0.04));
        }
        if active.len() >= 3 {
            rows.push(row(&[active[0], active[2]], 15.0, 0.02));
            rows.push(row(&[active[0], active[1], active[2]], 8.0, 0.01));
        }
        rows
    }
}

/// Gross, overlapping and net reach over the ten budget steps. The overlap
/// fraction grows linearly to [`MAX_OVERLAP_FRACTION`] at the last step.
pub fn overlap_series(budget: f64, reach: f64) -> Vec<OverlapPoint> {
    (1..=STEPS)
        .map(|step| {
            let fraction = f64::from(step) / f64::from(STEPS);
            let gross = round_u64(reach * fraction);
            let overlap = round_u64(gross as f64 * MAX_OVERLAP_FRACTION * fraction);
            OverlapPoint {
                step,
                budget: step_budget(budget, step),
                gross_reach: gross,
                net_reach: gross - overlap,
                overlap,
            }
        })
        .collect()
}

/// `(total / 10) × step`.
pub fn step_budget(total: f64, step: u32) -> f64 {
    (total / f64::from(STEPS)) * f64::from(step)
}

/// Round half away from zero; negative and NaN values clamp to zero.
fn round_u64(value: f64) -> u64 {
    value.round() as u64
}
