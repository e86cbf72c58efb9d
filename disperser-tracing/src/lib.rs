//! Subscriber setup for binaries and tests that embed the disperser client.
//!
//! The client only emits `tracing` events; installing a subscriber is left to whoever
//! runs it, through [`init`].

pub mod filter {
    pub mod envfilter;
}
pub mod logging {
    pub mod local;
}
pub mod panic;

use std::{
    fmt::{Debug, Formatter},
    io::Write,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    filter::envfilter::{create_envfilter_layer, EnvFilterConfig},
    logging::local::{create_file_layer, create_writer_layer, FileConfig},
};

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// This is a wrapper around a writer to allow cloning which is
/// required for a configuration struct
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<dyn Write + Send + Sync>>,
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| std::io::Error::other("shared writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner
            .lock()
            .map_err(|_| std::io::Error::other("shared writer poisoned"))?
            .flush()
    }
}

impl SharedWriter {
    pub fn new<W: Write + Send + Sync + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    #[must_use]
    pub fn into_inner(&self) -> Arc<Mutex<dyn Write + Send + Sync>> {
        self.inner.clone()
    }

    pub fn from_inner(inner: Arc<Mutex<dyn Write + Send + Sync>>) -> Self {
        Self { inner }
    }
}

impl Debug for SharedWriter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWriter").finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LoggerLayer {
    File(FileConfig),
    Stdout,
    Stderr,
    #[serde(skip)]
    Writer(SharedWriter),
    // do not collect logs
    None,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FilterLayer {
    EnvFilter(EnvFilterConfig),
    None,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TracingSettings {
    pub logger: LoggerLayer,
    pub filter: FilterLayer,
    #[serde(with = "serde_level")]
    pub level: Level,
}

impl Default for TracingSettings {
    fn default() -> Self {
        Self {
            logger: LoggerLayer::Stdout,
            filter: FilterLayer::None,
            level: Level::INFO,
        }
    }
}

impl TracingSettings {
    #[inline]
    #[must_use]
    pub const fn new(logger: LoggerLayer, filter: FilterLayer, level: Level) -> Self {
        Self {
            logger,
            filter,
            level,
        }
    }
}

/// Installs the global subscriber described by `settings`.
///
/// The returned guard flushes buffered records when dropped, keep it alive for as long
/// as logs are expected. Fails if a global subscriber is already set.
pub fn init(settings: TracingSettings) -> Result<Option<WorkerGuard>, DynError> {
    let mut layers: Vec<Box<dyn tracing_subscriber::Layer<_> + Send + Sync>> = vec![];

    let logger_guard = match settings.logger {
        LoggerLayer::File(config) => {
            let (layer, guard) = create_file_layer(config);
            layers.push(Box::new(layer));
            Some(guard)
        }
        LoggerLayer::Stdout => {
            let (layer, guard) = create_writer_layer(std::io::stdout());
            layers.push(Box::new(layer));
            Some(guard)
        }
        LoggerLayer::Stderr => {
            let (layer, guard) = create_writer_layer(std::io::stderr());
            layers.push(Box::new(layer));
            Some(guard)
        }
        LoggerLayer::Writer(writer) => {
            let (layer, guard) = create_writer_layer(writer);
            layers.push(Box::new(layer));
            Some(guard)
        }
        LoggerLayer::None => None,
    };

    // If no logger is configured, a subscriber is not required.
    if layers.is_empty() {
        return Ok(None);
    }

    if let FilterLayer::EnvFilter(config) = settings.filter {
        let filter_layer = create_envfilter_layer(config)?;
        layers.push(Box::new(filter_layer));
    }

    tracing_subscriber::registry()
        .with(LevelFilter::from(settings.level))
        .with(layers)
        .try_init()?;

    std::panic::set_hook(Box::new(panic::panic_hook));

    Ok(logger_guard)
}

mod serde_level {
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    use super::Level;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        <String>::deserialize(deserializer).and_then(|v| {
            v.parse()
                .map_err(|e| D::Error::custom(format!("invalid log level {e}")))
        })
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(value: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.as_str().serialize(serializer)
    }
}
