use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("An optimization run is already in progress")]
    RunInProgress,

    #[error("Invalid run transition: {0}")]
    Transition(String),

    #[error("Run {0} is no longer current")]
    StaleRun(u64),

    #[error("No optimization results available")]
    NoResults,

    #[error("Summary service error: {0}")]
    Summary(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
