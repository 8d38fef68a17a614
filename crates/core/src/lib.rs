pub mod channels;
pub mod config;
pub mod error;
pub mod inputs;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use inputs::{CampaignInputs, ChannelConfig, ChannelConfigPatch};

/// Customer picker entry that stands for "no particular customer".
pub const ALL_CUSTOMERS: &str = "All Customers";
