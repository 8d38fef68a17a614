use async_trait::async_trait;
use campaign_core::config::PlannerConfig;
use campaign_core::types::RunStatus;
use campaign_core::{CampaignError, CampaignResult};
use campaign_insights::{SummaryProvider, FAILED_SUMMARY_TEXT};
use campaign_planner::{plan_once, PlannerEvent, PlannerSession};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts requests and answers with a fixed text.
#[derive(Default)]
struct CannedSummaries {
    calls: AtomicUsize,
}

#[async_trait]
impl SummaryProvider for CannedSummaries {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn generate(&self, _prompt: &str) -> CampaignResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("Shift budget towards Youtube.".to_string())
    }
}

struct FailingSummaries;

#[async_trait]
impl SummaryProvider for FailingSummaries {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> CampaignResult<String> {
        Err(CampaignError::Summary("quota exceeded".into()))
    }
}

fn config(stage_delay_ms: u64) -> PlannerConfig {
    PlannerConfig {
        stage_delay_ms,
        seed: Some(42),
        ..PlannerConfig::default()
    }
}

fn ready_session(
    stage_delay_ms: u64,
    summaries: Arc<dyn SummaryProvider>,
) -> Arc<PlannerSession> {
    let session = Arc::new(PlannerSession::new(config(stage_delay_ms), summaries));
    let mut inputs = session.snapshot().inputs;
    inputs.total_budget = Some(30_000.0);
    inputs.target_reach = Some(400_000.0);
    inputs.set_selection(vec!["Youtube".into(), "Snapchat".into()]);
    session
        .dispatch(PlannerEvent::ReplaceInputs(Box::new(inputs)))
        .unwrap();
    session
}

async fn wait_for_completion(session: &PlannerSession) {
    for _ in 0..200 {
        if session.snapshot().status == RunStatus::Completed {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run did not complete");
}

#[tokio::test]
async fn test_run_to_completion_fills_results() {
    let summaries = Arc::new(CannedSummaries::default());
    let session = ready_session(0, summaries.clone());

    let result = session.run_to_completion().await.unwrap();
    assert_eq!(result.summary, "Shift budget towards Youtube.");
    assert_eq!(result.channels.len(), 2);
    assert_eq!(summaries.calls.load(Ordering::SeqCst), 1);

    let state = session.snapshot();
    assert_eq!(state.status, RunStatus::Completed);
    assert_eq!(state.progress_pct(), 100.0);
    assert!(session.results().is_ok());
}

#[tokio::test]
async fn test_completed_result_survives_later_reset() {
    let session = ready_session(0, Arc::new(CannedSummaries::default()));

    let result = session.run_to_completion().await.unwrap();
    let stored = session.results().unwrap();
    assert!(Arc::ptr_eq(&result, &stored));

    session.reset().unwrap();
    assert!(matches!(session.results(), Err(CampaignError::NoResults)));
    assert_eq!(result.channels.len(), 2);
}

#[tokio::test]
async fn test_background_run_reports_progress() {
    let session = ready_session(30, Arc::new(CannedSummaries::default()));

    let ticket = session.start_run().unwrap();
    assert_eq!(ticket.0, 1);
    let state = session.snapshot();
    assert_eq!(state.status, RunStatus::Analyzing);
    assert!(state.results.is_none());

    wait_for_completion(&session).await;
    assert_eq!(session.results().unwrap().channels.len(), 2);
}

#[tokio::test]
async fn test_second_start_rejected_while_running() {
    let session = ready_session(50, Arc::new(CannedSummaries::default()));
    session.start_run().unwrap();
    let err = session.start_run().unwrap_err();
    assert!(matches!(err, CampaignError::RunInProgress));
}

#[tokio::test]
async fn test_invalid_inputs_never_generate() {
    let summaries = Arc::new(CannedSummaries::default());
    let session = Arc::new(PlannerSession::new(config(0), summaries.clone()));

    let err = session.start_run().unwrap_err();
    assert_eq!(err.to_string(), "Please select at least one channel.");
    assert_eq!(session.snapshot().status, RunStatus::Idle);
    assert!(matches!(session.results(), Err(CampaignError::NoResults)));
    assert_eq!(summaries.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_reset_discards_inflight_run() {
    let session = ready_session(40, Arc::new(CannedSummaries::default()));
    session.start_run().unwrap();
    session.reset().unwrap();

    tokio::time::sleep(Duration::from_millis(250)).await;
    let state = session.snapshot();
    assert_eq!(state.status, RunStatus::Idle);
    assert!(state.results.is_none());
    assert!(state.inputs.channel_selection.is_empty());
}

#[tokio::test]
async fn test_summary_failure_still_completes() {
    let session = ready_session(0, Arc::new(FailingSummaries));
    let result = session.run_to_completion().await.unwrap();
    assert_eq!(result.summary, FAILED_SUMMARY_TEXT);
}

#[tokio::test]
async fn test_plan_once_is_reproducible_with_seed() {
    let session = ready_session(0, Arc::new(CannedSummaries::default()));
    let inputs = session.snapshot().inputs;
    let summaries = CannedSummaries::default();

    let a = plan_once(&inputs, &config(0), &summaries, Some(7)).await.unwrap();
    let b = plan_once(&inputs, &config(0), &summaries, Some(7)).await.unwrap();
    assert_eq!(a.run_id, b.run_id);
    assert_eq!(a.channels[0].digital_reach_num, b.channels[0].digital_reach_num);
    assert_eq!(summaries.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_plan_once_validates() {
    let session = ready_session(0, Arc::new(CannedSummaries::default()));
    let mut inputs = session.snapshot().inputs;
    inputs.total_budget = None;

    let err = plan_once(&inputs, &config(0), &CannedSummaries::default(), None)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please fill in the Total Budget and Target Reach."
    );
}
