//! REST API handlers for the planner session, one-shot planning and
//! operational endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use campaign_core::channels::{CatalogChannel, ChannelPreset, CHANNEL_CATALOG};
use campaign_core::config::AppConfig;
use campaign_core::inputs::{CampaignInputs, ChannelConfigPatch};
use campaign_core::types::{OptimizationResult, RunStatus};
use campaign_core::CampaignError;
use campaign_insights::SummaryProvider;
use campaign_planner::{
    plan_once, CustomerDirectory, PlannerEvent, PlannerSession, PlannerState, SeriesKind,
};
use campaign_reporting::workbook::SHEET_KPI;
use campaign_reporting::{export_filename, CampaignWorkbook, KpiDisplay};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<PlannerSession>,
    pub customers: Arc<CustomerDirectory>,
    pub summaries: Arc<dyn SummaryProvider>,
    pub export_prefix: String,
    pub node_id: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: &AppConfig, summaries: Arc<dyn SummaryProvider>) -> Self {
        Self {
            session: Arc::new(PlannerSession::new(
                config.planner.clone(),
                summaries.clone(),
            )),
            customers: Arc::new(CustomerDirectory::new(config.planner.customers.clone())),
            summaries,
            export_prefix: config.export.file_prefix.clone(),
            node_id: config.node_id.clone(),
            start_time: Instant::now(),
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Handler error carrying the domain error it maps from.
#[derive(Debug)]
pub struct ApiError(pub CampaignError);

impl From<CampaignError> for ApiError {
    fn from(e: CampaignError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self(CampaignError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            CampaignError::Validation(_) | CampaignError::Serialization(_) => {
                (StatusCode::BAD_REQUEST, "validation_failed")
            }
            CampaignError::RunInProgress => (StatusCode::CONFLICT, "run_in_progress"),
            CampaignError::Transition(_) | CampaignError::StaleRun(_) => {
                (StatusCode::CONFLICT, "invalid_transition")
            }
            CampaignError::NoResults => (StatusCode::NOT_FOUND, "no_results"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = if status.is_server_error() {
            error!(error = %self.0, "Request failed");
            metrics::counter!("api.errors").increment(1);
            "Internal processing error".to_string()
        } else {
            if status == StatusCode::BAD_REQUEST {
                warn!(error = %self.0, "Request validation failed");
                metrics::counter!("api.validation_errors").increment(1);
            }
            self.0.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

// ─── Views ──────────────────────────────────────────────────────────────────

/// Session state plus the progress bar figures derived from it.
#[derive(Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub state: PlannerState,
    pub progress_pct: f64,
    pub stage_label: Option<&'static str>,
}

impl From<PlannerState> for SessionView {
    fn from(state: PlannerState) -> Self {
        Self {
            progress_pct: state.progress_pct(),
            stage_label: state.stage_label(),
            state,
        }
    }
}

/// Latest result with the series that are currently drawn.
#[derive(Serialize)]
pub struct ResultsView {
    #[serde(flatten)]
    pub result: Arc<OptimizationResult>,
    pub kpis: KpiDisplay,
    pub visible_strategies: Vec<&'static str>,
    pub visible_channels: Vec<String>,
}

#[derive(Serialize)]
pub struct RunAccepted {
    pub ticket: u64,
    pub status: RunStatus,
}

#[derive(Serialize)]
pub struct VisibilityView {
    pub series: SeriesKind,
    pub key: String,
    pub visible: bool,
}

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectCustomerRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub sheet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub inputs: CampaignInputs,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

// ─── Catalog ────────────────────────────────────────────────────────────────

/// GET /v1/channels: Channel catalog with starting CPM and TV factor.
pub async fn list_channels() -> Json<&'static [CatalogChannel]> {
    Json(&CHANNEL_CATALOG[..])
}

/// GET /v1/customers: Customer picker entries, optionally filtered.
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> Json<Vec<String>> {
    Json(
        state
            .customers
            .search(&query.search)
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

// ─── Session ────────────────────────────────────────────────────────────────

fn apply(state: &AppState, event: PlannerEvent) -> ApiResult<Json<SessionView>> {
    let next = state.session.dispatch(event)?;
    Ok(Json(next.into()))
}

/// GET /v1/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.snapshot().into())
}

/// PUT /v1/session/inputs: Replace the whole input form.
pub async fn replace_inputs(
    State(state): State<AppState>,
    ApiJson(inputs): ApiJson<CampaignInputs>,
) -> ApiResult<Json<SessionView>> {
    apply(&state, PlannerEvent::ReplaceInputs(Box::new(inputs)))
}

/// POST /v1/session/channels/:name/toggle
pub async fn toggle_channel(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<SessionView>> {
    apply(&state, PlannerEvent::ToggleChannel(name))
}

/// PATCH /v1/session/channels/:name/settings
pub async fn update_channel_settings(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    ApiJson(patch): ApiJson<ChannelConfigPatch>,
) -> ApiResult<Json<SessionView>> {
    apply(&state, PlannerEvent::UpdateChannelSettings { channel, patch })
}

/// POST /v1/session/presets/:preset: all, digital, tv or clear.
pub async fn apply_preset(
    State(state): State<AppState>,
    Path(preset): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let preset = preset.parse::<ChannelPreset>().map_err(ApiError::bad_request)?;
    apply(&state, PlannerEvent::ApplyPreset(preset))
}

/// POST /v1/session/customer
pub async fn select_customer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SelectCustomerRequest>,
) -> ApiResult<Json<SessionView>> {
    apply(&state, PlannerEvent::SelectCustomer(request.name))
}

/// POST /v1/session/run: Start a run; progress is polled via GET /v1/session.
pub async fn start_run(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<RunAccepted>)> {
    let ticket = state.session.start_run()?;
    Ok((
        StatusCode::ACCEPTED,
        Json(RunAccepted {
            ticket: ticket.0,
            status: state.session.snapshot().status,
        }),
    ))
}

/// POST /v1/session/reset
pub async fn reset_session(State(state): State<AppState>) -> ApiResult<Json<SessionView>> {
    let next = state.session.reset()?;
    info!("Session reset");
    Ok(Json(next.into()))
}

/// GET /v1/session/results
pub async fn get_results(State(state): State<AppState>) -> ApiResult<Json<ResultsView>> {
    let snapshot = state.session.snapshot();
    let result = snapshot.results.clone().ok_or(CampaignError::NoResults)?;
    let visibility = &snapshot.visibility;
    Ok(Json(ResultsView {
        kpis: KpiDisplay::from_result(&result),
        visible_strategies: visibility
            .visible_strategies()
            .iter()
            .map(|s| s.label())
            .collect(),
        visible_channels: visibility
            .visible_channels(&result)
            .into_iter()
            .map(String::from)
            .collect(),
        result,
    }))
}

/// POST /v1/session/visibility/:series/:key/toggle: Show or hide one chart
/// series. `series` is `candidates` or `channels`.
pub async fn toggle_series(
    State(state): State<AppState>,
    Path((series, key)): Path<(String, String)>,
) -> ApiResult<Json<VisibilityView>> {
    let kind = series.parse::<SeriesKind>().map_err(ApiError::bad_request)?;
    let next = state.session.dispatch(PlannerEvent::ToggleSeries {
        kind,
        key: key.clone(),
    })?;
    Ok(Json(VisibilityView {
        series: kind,
        visible: next.visibility.is_visible(kind, &key),
        key,
    }))
}

/// GET /v1/session/export: Workbook for the latest result. `format=csv`
/// returns a single sheet (`sheet=`, KPI Forecast by default) instead.
pub async fn export_workbook(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let snapshot = state.session.snapshot();
    let result = snapshot.results.clone().ok_or(CampaignError::NoResults)?;
    let inputs = snapshot.run_inputs.as_ref().unwrap_or(&snapshot.inputs);
    let workbook = CampaignWorkbook::build(inputs, &result);
    let filename = export_filename(
        &state.export_prefix,
        &inputs.customer_name,
        Utc::now().date_naive(),
    );

    match query.format.as_deref().unwrap_or("xlsx") {
        "xlsx" => {
            let bytes = workbook.to_xlsx()?;
            Ok((
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                bytes,
            )
                .into_response())
        }
        "csv" => {
            let sheet = query.sheet.as_deref().unwrap_or(SHEET_KPI);
            let csv = workbook
                .sheet_csv(sheet)
                .ok_or_else(|| ApiError::bad_request(format!("unknown sheet '{sheet}'")))?;
            let filename = format!(
                "{}_{}.csv",
                filename.trim_end_matches(".xlsx"),
                sheet.replace(' ', "_")
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                csv,
            )
                .into_response())
        }
        other => Err(ApiError::bad_request(format!(
            "unknown export format '{other}'"
        ))),
    }
}

// ─── Stateless planning ─────────────────────────────────────────────────────

/// POST /v1/plans: Validate and plan in one call, without touching the
/// session.
pub async fn plan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlanRequest>,
) -> ApiResult<Json<OptimizationResult>> {
    let result = plan_once(
        &request.inputs,
        state.session.config(),
        state.summaries.as_ref(),
        request.seed,
    )
    .await?;
    Ok(Json(result))
}

// ─── Operational ────────────────────────────────────────────────────────────

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
