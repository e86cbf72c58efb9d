// std
use std::time::Duration;
// crates
use serde::{Deserialize, Serialize};
// internal
use crate::status::DEFAULT_STATUS_POLL_INTERVAL;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispersalSettings {
    /// Time between two status queries.
    #[serde(with = "humantime_serde", default = "default_status_poll_interval")]
    pub status_poll_interval: Duration,
    /// Upper bound for a whole dispersal, on top of the caller's cancellation token.
    #[serde(with = "humantime_serde", default)]
    pub timeout: Option<Duration>,
    /// Quorums to disperse to besides the disperser's required ones.
    #[serde(default)]
    pub custom_quorum_numbers: Vec<u32>,
}

impl Default for DispersalSettings {
    fn default() -> Self {
        Self {
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
            timeout: None,
            custom_quorum_numbers: Vec::new(),
        }
    }
}

const fn default_status_poll_interval() -> Duration {
    DEFAULT_STATUS_POLL_INTERVAL
}
