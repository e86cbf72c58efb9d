// std
use std::collections::BTreeMap;
// crates
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
// internal
use crate::DynError;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnvFilterConfig {
    /// Map where the key is the crate/module name, and the value is the desired log level.
    /// More: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives
    pub filters: BTreeMap<String, String>,
}

pub fn create_envfilter_layer(config: EnvFilterConfig) -> Result<EnvFilter, DynError> {
    EnvFilter::try_new(directives(config)).map_err(Into::into)
}

fn directives(config: EnvFilterConfig) -> String {
    config
        .filters
        .into_iter()
        .map(|(target, level)| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
