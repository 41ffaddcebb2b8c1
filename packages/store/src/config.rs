//! # Client configuration: `snapfeed.toml`
//!
//! ```toml
//! [feed]
//! collection = "posts"      # collection holding post documents
//! order_by = "timestamp"    # field the feed is sorted on, newest first
//!
//! [sync]
//! poll_interval_secs = 5    # REST adapter only; minimum 1
//! ```
//!
//! Every section and key has a default, so a missing or empty file is the
//! production configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::TIMESTAMP_FIELD;
use crate::provider::{Direction, Query};

/// Top-level configuration stored in `snapfeed.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapfeedConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_order_by")]
    pub order_by: String,
}

fn default_collection() -> String {
    "posts".to_string()
}

fn default_order_by() -> String {
    TIMESTAMP_FIELD.to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            order_by: default_order_by(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How often a polling adapter re-runs the feed query.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u32,
}

fn default_poll_interval() -> u32 {
    5
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_interval_secs.max(1)))
    }
}

impl SnapfeedConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "snapfeed.toml"
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The live query backing the feed: newest first.
    pub fn feed_query(&self) -> Query {
        Query::collection(&self.feed.collection).order_by(&self.feed.order_by, Direction::Descending)
    }
}
