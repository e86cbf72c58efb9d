// std
use std::{io::Write, path::PathBuf};
// crates
use serde::{Deserialize, Serialize};
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::fmt::{
    format::{DefaultFields, Format},
    Layer,
};
// internal

const DEFAULT_LOG_FILE: &str = "disperser.log";

pub type FmtLayer<S> = Layer<S, DefaultFields, Format, NonBlocking>;

/// How often a new log file is started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<FileRotation> for Rotation {
    fn from(rotation: FileRotation) -> Self {
        match rotation {
            FileRotation::Hourly => Self::HOURLY,
            FileRotation::Daily => Self::DAILY,
            FileRotation::Never => Self::NEVER,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileConfig {
    pub directory: PathBuf,
    /// File name, or the prefix of the dated file names when rotating.
    #[serde(default)]
    pub prefix: Option<PathBuf>,
    #[serde(default)]
    pub rotation: FileRotation,
}

pub fn create_file_layer<S>(config: FileConfig) -> (FmtLayer<S>, WorkerGuard) {
    let appender = RollingFileAppender::new(
        config.rotation.into(),
        config.directory,
        config
            .prefix
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
    );
    create_writer_layer(appender)
}

/// Plain text records with level and target, written by a background worker. Records
/// still buffered are flushed when the returned guard is dropped.
pub fn create_writer_layer<S, W>(writer: W) -> (FmtLayer<S>, WorkerGuard)
where
    W: Write + Send + 'static,
{
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    let layer = Layer::new()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_writer(non_blocking);
    (layer, guard)
}
