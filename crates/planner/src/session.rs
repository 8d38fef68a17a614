//! Planner session: owns the dashboard state and drives runs through their
//! progress stages.

use crate::generator::ScenarioGenerator;
use crate::state_machine::{reduce, PlannerEvent, PlannerState, RunTicket};
use campaign_core::config::PlannerConfig;
use campaign_core::inputs::CampaignInputs;
use campaign_core::types::{OptimizationResult, STAGE_LABELS};
use campaign_core::{CampaignError, CampaignResult};
use campaign_insights::{summarize, SummaryProvider};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct PlannerSession {
    state: Mutex<PlannerState>,
    summaries: Arc<dyn SummaryProvider>,
    config: PlannerConfig,
}

impl PlannerSession {
    pub fn new(config: PlannerConfig, summaries: Arc<dyn SummaryProvider>) -> Self {
        Self {
            state: Mutex::new(PlannerState::new(Utc::now().date_naive())),
            summaries,
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> PlannerState {
        self.state.lock().clone()
    }

    /// Apply one event. The stored state only changes when the reducer
    /// accepts the event.
    pub fn dispatch(&self, event: PlannerEvent) -> CampaignResult<PlannerState> {
        let mut state = self.state.lock();
        let next = reduce(&state, event)?;
        *state = next.clone();
        Ok(next)
    }

    pub fn results(&self) -> CampaignResult<Arc<OptimizationResult>> {
        self.state.lock().results.clone().ok_or(CampaignError::NoResults)
    }

    pub fn reset(&self) -> CampaignResult<PlannerState> {
        self.dispatch(PlannerEvent::Reset {
            today: Utc::now().date_naive(),
        })
    }

    fn begin(&self) -> CampaignResult<(RunTicket, CampaignInputs)> {
        let state = self.dispatch(PlannerEvent::Start)?;
        let inputs = state
            .run_inputs
            .clone()
            .ok_or_else(|| CampaignError::Transition("run started without inputs".to_string()))?;
        metrics::counter!("planner.runs.started").increment(1);
        info!(
            ticket = state.ticket,
            channels = inputs.channel_selection.len(),
            "Optimization run started"
        );
        Ok((state.current_ticket(), inputs))
    }

    /// Start a run in the background and return its ticket right away.
    pub fn start_run(self: &Arc<Self>) -> CampaignResult<RunTicket> {
        let (ticket, inputs) = self.begin()?;
        let session = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = session.drive(ticket, inputs).await {
                debug!(ticket = ticket.0, error = %e, "Run abandoned");
            }
        });
        Ok(ticket)
    }

    /// Start a run and wait for it to finish.
    pub async fn run_to_completion(&self) -> CampaignResult<Arc<OptimizationResult>> {
        let (ticket, inputs) = self.begin()?;
        self.drive(ticket, inputs).await
    }

    async fn drive(
        &self,
        ticket: RunTicket,
        inputs: CampaignInputs,
    ) -> CampaignResult<Arc<OptimizationResult>> {
        let delay = Duration::from_millis(self.config.stage_delay_ms);
        for (stage, label) in STAGE_LABELS.iter().enumerate() {
            if stage > 0 {
                self.dispatch(PlannerEvent::Advance(ticket))?;
            }
            debug!(ticket = ticket.0, stage = *label, "Run stage reached");
            tokio::time::sleep(delay).await;
        }

        let summary = summarize(self.summaries.as_ref(), &inputs).await;
        let mut result = ScenarioGenerator::from_config(&self.config).generate(&inputs, Utc::now());
        result.summary = summary;

        let next = self.dispatch(PlannerEvent::Complete(ticket, Box::new(result)))?;
        metrics::counter!("planner.runs.completed").increment(1);
        info!(ticket = ticket.0, "Optimization run completed");
        next.results.ok_or(CampaignError::NoResults)
    }
}

/// Validate, summarize and generate in one go, without session state or
/// stage delays. An explicit `seed` overrides the configured one.
pub async fn plan_once(
    inputs: &CampaignInputs,
    config: &PlannerConfig,
    summaries: &dyn SummaryProvider,
    seed: Option<u64>,
) -> CampaignResult<OptimizationResult> {
    let mut inputs = inputs.clone();
    inputs.normalize();
    inputs.validate_for_run()?;

    let summary = summarize(summaries, &inputs).await;
    let mut generator = match seed.or(config.seed) {
        Some(seed) => ScenarioGenerator::seeded(seed, config.total_population),
        None => ScenarioGenerator::from_entropy(config.total_population),
    };
    let mut result = generator.generate(&inputs, Utc::now());
    result.summary = summary;
    Ok(result)
}
