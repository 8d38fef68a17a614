//! Planner session state and its pure reducer.
//!
//! All session changes go through [`reduce`], which returns the next state
//! or an error and never touches the previous one. Run lifecycle moves are
//! checked against [`TRANSITIONS`].

use crate::visibility::{ChartVisibility, SeriesKind};
use campaign_core::channels::ChannelPreset;
use campaign_core::inputs::{CampaignInputs, ChannelConfigPatch};
use campaign_core::types::{OptimizationResult, RunStatus, STAGE_LABELS};
use campaign_core::{CampaignError, CampaignResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifies one started run. Events carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunTicket(pub u64);

/// Describes a single valid run-status transition.
#[derive(Debug, Clone, Copy)]
pub struct StateTransition {
    pub from: RunStatus,
    pub to: RunStatus,
    pub trigger: &'static str,
}

const fn t(from: RunStatus, to: RunStatus, trigger: &'static str) -> StateTransition {
    StateTransition { from, to, trigger }
}

pub const TRANSITIONS: [StateTransition; 12] = [
    t(RunStatus::Idle, RunStatus::Analyzing, "start"),
    t(RunStatus::Completed, RunStatus::Analyzing, "rerun"),
    t(RunStatus::Analyzing, RunStatus::Optimizing, "advance"),
    t(RunStatus::Optimizing, RunStatus::Simulating, "advance"),
    t(RunStatus::Simulating, RunStatus::Finalizing, "advance"),
    t(RunStatus::Finalizing, RunStatus::Completed, "complete"),
    t(RunStatus::Idle, RunStatus::Idle, "reset"),
    t(RunStatus::Analyzing, RunStatus::Idle, "reset"),
    t(RunStatus::Optimizing, RunStatus::Idle, "reset"),
    t(RunStatus::Simulating, RunStatus::Idle, "reset"),
    t(RunStatus::Finalizing, RunStatus::Idle, "reset"),
    t(RunStatus::Completed, RunStatus::Idle, "reset"),
];

/// Trigger name of the `from -> to` move, if the move is allowed.
pub fn transition_trigger(from: RunStatus, to: RunStatus) -> Option<&'static str> {
    TRANSITIONS
        .iter()
        .find(|tr| tr.from == from && tr.to == to)
        .map(|tr| tr.trigger)
}

pub fn can_transition(from: RunStatus, to: RunStatus) -> bool {
    transition_trigger(from, to).is_some()
}

fn check_transition(from: RunStatus, to: RunStatus, trigger: &str) -> CampaignResult<()> {
    match transition_trigger(from, to) {
        Some(t) if t == trigger => Ok(()),
        _ => Err(CampaignError::Transition(format!("{trigger}: {from} -> {to}"))),
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct PlannerState {
    pub inputs: CampaignInputs,
    pub status: RunStatus,
    /// Index into [`STAGE_LABELS`]; `None` before the first run.
    pub current_step: Option<usize>,
    /// Ticket of the most recently started run.
    pub ticket: u64,
    /// Inputs as they were when the current run started.
    pub run_inputs: Option<CampaignInputs>,
    pub results: Option<Arc<OptimizationResult>>,
    pub visibility: ChartVisibility,
}

impl PlannerState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            inputs: CampaignInputs::defaults_on(today),
            status: RunStatus::Idle,
            current_step: None,
            ticket: 0,
            run_inputs: None,
            results: None,
            visibility: ChartVisibility::default(),
        }
    }

    pub fn current_ticket(&self) -> RunTicket {
        RunTicket(self.ticket)
    }

    /// Width of the progress bar, in percent.
    pub fn progress_pct(&self) -> f64 {
        match (self.status, self.current_step) {
            (RunStatus::Completed, _) => 100.0,
            (_, Some(step)) => (step as f64 + 0.5) * (100.0 / STAGE_LABELS.len() as f64),
            (_, None) => 0.0,
        }
    }

    pub fn stage_label(&self) -> Option<&'static str> {
        self.current_step.and_then(|i| STAGE_LABELS.get(i).copied())
    }
}

#[derive(Debug, Clone)]
pub enum PlannerEvent {
    ReplaceInputs(Box<CampaignInputs>),
    SetDates { start: NaiveDate, end: NaiveDate },
    ToggleChannel(String),
    ApplyPreset(ChannelPreset),
    UpdateChannelSettings { channel: String, patch: ChannelConfigPatch },
    SelectCustomer(String),
    Start,
    Advance(RunTicket),
    Complete(RunTicket, Box<OptimizationResult>),
    Reset { today: NaiveDate },
    ToggleSeries { kind: SeriesKind, key: String },
}

fn check_ticket(state: &PlannerState, ticket: RunTicket) -> CampaignResult<()> {
    if ticket.0 == state.ticket && state.status.is_running() {
        Ok(())
    } else {
        Err(CampaignError::StaleRun(ticket.0))
    }
}

/// Compute the state that follows `event`.
pub fn reduce(state: &PlannerState, event: PlannerEvent) -> CampaignResult<PlannerState> {
    let mut next = state.clone();
    match event {
        PlannerEvent::ReplaceInputs(inputs) => {
            next.inputs = *inputs;
            next.inputs.normalize();
        }
        PlannerEvent::SetDates { start, end } => next.inputs.set_dates(start, end),
        PlannerEvent::ToggleChannel(channel) => {
            next.inputs.toggle_channel(&channel);
        }
        PlannerEvent::ApplyPreset(preset) => next.inputs.apply_preset(preset),
        PlannerEvent::UpdateChannelSettings { channel, patch } => {
            next.inputs.update_channel_settings(&channel, &patch)
        }
        PlannerEvent::SelectCustomer(name) => next.inputs.select_customer(&name),
        PlannerEvent::Start => {
            if !state.status.accepts_start() {
                return Err(CampaignError::RunInProgress);
            }
            let trigger = if state.status == RunStatus::Completed {
                "rerun"
            } else {
                "start"
            };
            check_transition(state.status, RunStatus::Analyzing, trigger)?;
            state.inputs.validate_for_run()?;
            next.status = RunStatus::Analyzing;
            next.current_step = Some(0);
            next.ticket = state.ticket + 1;
            next.run_inputs = Some(state.inputs.clone());
            next.results = None;
            next.visibility = ChartVisibility::default();
        }
        PlannerEvent::Advance(ticket) => {
            check_ticket(state, ticket)?;
            let step = state.current_step.map_or(0, |s| s + 1);
            let status = RunStatus::for_stage(step).ok_or_else(|| {
                CampaignError::Transition(format!("{} has no stage after it", state.status))
            })?;
            check_transition(state.status, status, "advance")?;
            next.status = status;
            next.current_step = Some(step);
        }
        PlannerEvent::Complete(ticket, result) => {
            check_ticket(state, ticket)?;
            check_transition(state.status, RunStatus::Completed, "complete")?;
            next.status = RunStatus::Completed;
            next.results = Some(Arc::new(*result));
        }
        PlannerEvent::Reset { today } => {
            check_transition(state.status, RunStatus::Idle, "reset")?;
            next = PlannerState::new(today);
            // Keep counting so in-flight runs see their ticket as stale.
            next.ticket = state.ticket;
        }
        PlannerEvent::ToggleSeries { kind, key } => {
            next.visibility.toggle(kind, &key);
        }
    }
    Ok(next)
}
