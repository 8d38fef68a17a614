//! Media channel catalog.
//!
//! The catalog lists every channel the planner knows about, the group it
//! belongs to (digital vs. TV/offline), and the CPM and TV factor a channel
//! starts with when a user first selects it. Channels outside the catalog
//! are still accepted; they start from [`UNKNOWN_CHANNEL_DEFAULTS`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Catalog ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChannelGroup {
    Digital,
    TvOffline,
}

/// Starting CPM and TV factor for a newly selected channel.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ChannelDefaults {
    pub cpm: f64,
    pub tv_factor: f64,
}

/// Defaults for a channel that is not in the catalog.
pub const UNKNOWN_CHANNEL_DEFAULTS: ChannelDefaults = ChannelDefaults {
    cpm: 0.0,
    tv_factor: 1.0,
};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogChannel {
    pub name: &'static str,
    pub group: ChannelGroup,
    pub defaults: ChannelDefaults,
}

const fn entry(
    name: &'static str,
    group: ChannelGroup,
    cpm: f64,
    tv_factor: f64,
) -> CatalogChannel {
    CatalogChannel {
        name,
        group,
        defaults: ChannelDefaults { cpm, tv_factor },
    }
}

/// Known channels in display order.
pub const CHANNEL_CATALOG: [CatalogChannel; 16] = [
    entry("Facebook", ChannelGroup::Digital, 2.85, 7.0),
    entry("LinkedIn", ChannelGroup::Digital, 9.00, 5.0),
    entry("Youtube", ChannelGroup::Digital, 4.24, 2.0),
    entry("X (Twitter)", ChannelGroup::Digital, 1.77, 9.0),
    entry("TikTok", ChannelGroup::Digital, 2.50, 5.0),
    entry("Pinterest", ChannelGroup::Digital, 3.39, 7.0),
    entry("Instagram", ChannelGroup::Digital, 2.85, 6.0),
    entry("Snapchat", ChannelGroup::Digital, 5.00, 6.0),
    entry("Twitch", ChannelGroup::Digital, 11.44, 7.0),
    entry("Reddit", ChannelGroup::Digital, 3.00, 7.0),
    entry("DPG Media", ChannelGroup::TvOffline, 5.00, 5.0),
    entry("Teads", ChannelGroup::Digital, 17.00, 2.0),
    entry("Opt Out", ChannelGroup::TvOffline, 20.00, 1.0),
    entry("Spotify", ChannelGroup::Digital, 3.20, 2.0),
    entry("BNR", ChannelGroup::TvOffline, 42.00, 2.0),
    entry("FD Mediagroep", ChannelGroup::TvOffline, 20.00, 1.0),
];

/// Look up a catalog entry by exact channel name.
pub fn lookup(name: &str) -> Option<&'static CatalogChannel> {
    CHANNEL_CATALOG.iter().find(|c| c.name == name)
}

/// Defaults used when a channel is selected for the first time.
pub fn defaults_for(name: &str) -> ChannelDefaults {
    lookup(name)
        .map(|c| c.defaults)
        .unwrap_or(UNKNOWN_CHANNEL_DEFAULTS)
}

// ─── Presets ────────────────────────────────────────────────────────────────

/// Bulk selection shortcuts offered next to the channel grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPreset {
    All,
    Digital,
    TvOffline,
    Clear,
}

impl ChannelPreset {
    /// Channel names the preset selects, in catalog order.
    pub fn channels(&self) -> Vec<String> {
        let keep = |c: &&CatalogChannel| match self {
            ChannelPreset::All => true,
            ChannelPreset::Digital => c.group == ChannelGroup::Digital,
            ChannelPreset::TvOffline => c.group == ChannelGroup::TvOffline,
            ChannelPreset::Clear => false,
        };
        CHANNEL_CATALOG
            .iter()
            .filter(keep)
            .map(|c| c.name.to_string())
            .collect()
    }
}

impl fmt::Display for ChannelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelPreset::All => "all",
            ChannelPreset::Digital => "digital",
            ChannelPreset::TvOffline => "tv_offline",
            ChannelPreset::Clear => "clear",
        };
        f.write_str(s)
    }
}

impl FromStr for ChannelPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ChannelPreset::All),
            "digital" => Ok(ChannelPreset::Digital),
            "tv" | "tv_offline" => Ok(ChannelPreset::TvOffline),
            "clear" | "none" => Ok(ChannelPreset::Clear),
            other => Err(format!("unknown channel preset '{other}'")),
        }
    }
}
