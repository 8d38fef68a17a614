//! Campaign Planner: media-mix planning service and command-line planner.
//!
//! `serve` runs the REST API and metrics exporter; `plan` runs a single plan
//! from a JSON inputs file and prints the result.

use anyhow::Context;
use campaign_api::ApiServer;
use campaign_core::config::AppConfig;
use campaign_core::inputs::CampaignInputs;
use campaign_insights::{provider_from_config, DisabledSummaries, SummaryProvider};
use campaign_planner::plan_once;
use campaign_reporting::{export_filename, CampaignWorkbook, KpiDisplay};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

const DEFAULT_LOG_FILTER: &str = "campaign_planner=info,campaign_core=info,campaign_insights=info,\
                                  campaign_reporting=info,campaign_api=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "campaign-planner")]
#[command(about = "Media-mix campaign planner")]
#[command(version)]
struct Cli {
    /// API key for the summary service (overrides config)
    #[arg(long, env = "API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Summary model name (overrides config)
    #[arg(long, env = "CAMPAIGN_PLANNER__INSIGHTS__MODEL", global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the REST API
    Serve {
        /// Node identifier (overrides config)
        #[arg(long, env = "CAMPAIGN_PLANNER__NODE_ID")]
        node_id: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long, env = "CAMPAIGN_PLANNER__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Metrics port (overrides config)
        #[arg(long, env = "CAMPAIGN_PLANNER__METRICS__PORT")]
        metrics_port: Option<u16>,

        /// Pause before each run stage, in milliseconds (overrides config)
        #[arg(long)]
        stage_delay_ms: Option<u64>,
    },

    /// Plan once from a JSON inputs file and print the result as JSON
    Plan {
        /// Path to the campaign inputs JSON
        #[arg(short, long)]
        inputs: PathBuf,

        /// Write the workbook here; a directory gets the default file name
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// RNG seed for reproducible figures
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the summary request
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `plan` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(key) = cli.api_key {
        config.insights.api_key = key;
    }
    if let Some(model) = cli.model {
        config.insights.model = model;
    }

    match cli.command {
        Commands::Serve {
            node_id,
            http_port,
            metrics_port,
            stage_delay_ms,
        } => {
            if let Some(node_id) = node_id {
                config.node_id = node_id;
            }
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            if let Some(port) = metrics_port {
                config.metrics.port = port;
            }
            if let Some(delay) = stage_delay_ms {
                config.planner.stage_delay_ms = delay;
            }
            serve(config).await
        }
        Commands::Plan {
            inputs,
            export,
            seed,
            offline,
        } => plan(config, inputs, export, seed, offline).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        summaries_enabled = config.insights.enabled,
        model = %config.insights.model,
        "Configuration loaded"
    );

    let summaries = provider_from_config(&config.insights);
    let api_server = ApiServer::new(config, summaries);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Campaign Planner is ready to serve traffic");

    // Blocks until shutdown.
    api_server.start_http().await?;

    Ok(())
}

async fn plan(
    config: AppConfig,
    inputs_path: PathBuf,
    export: Option<PathBuf>,
    seed: Option<u64>,
    offline: bool,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&inputs_path)
        .with_context(|| format!("reading {}", inputs_path.display()))?;
    let mut inputs: CampaignInputs = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", inputs_path.display()))?;
    inputs.normalize();

    let summaries: Arc<dyn SummaryProvider> = if offline {
        Arc::new(DisabledSummaries)
    } else {
        provider_from_config(&config.insights)
    };

    let result = plan_once(&inputs, &config.planner, summaries.as_ref(), seed).await?;
    let kpis = KpiDisplay::from_result(&result);
    info!(
        run_id = %result.run_id,
        channels = result.channels.len(),
        reach = %kpis.projected_reach,
        budget = %kpis.total_media_budget,
        population_share = %kpis.population_share,
        "Plan ready"
    );

    if let Some(path) = export {
        let path = if path.is_dir() {
            path.join(export_filename(
                &config.export.file_prefix,
                &inputs.customer_name,
                Utc::now().date_naive(),
            ))
        } else {
            path
        };
        CampaignWorkbook::build(&inputs, &result).save_xlsx(&path)?;
        info!(path = %path.display(), "Workbook written");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_default_filter_covers_workspace_crates() {
        let subscriber = tracing_subscriber::registry().with(EnvFilter::new(DEFAULT_LOG_FILTER));
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "campaign_insights", Level::WARN));
            assert!(tracing::enabled!(target: "campaign_api::rest", Level::WARN));
            assert!(tracing::enabled!(target: "campaign_reporting::workbook", Level::INFO));
            assert!(tracing::enabled!(target: "campaign_planner::session", Level::INFO));
            assert!(!tracing::enabled!(target: "campaign_planner::session", Level::DEBUG));
        });
    }
}
