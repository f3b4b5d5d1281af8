//! Sink layers on top of `tracing-subscriber`.
//!
//! # Layers
//! - console: human-readable, ANSI colours (default when nothing else is on)
//! - JSON: one JSON object per line on stdout
//! - file: JSON lines into a rolling file, written off-thread
//!
//! The level filter sits behind a reload handle so it can change at runtime.
//! The file layer writes through a [`FileSlot`]; every `init` reopens or
//! closes the file, so a re-initialized logger never writes into a writer
//! whose worker has already shut down.

use std::io;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::EitherWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer, Registry};

use crate::config::LogConfig;
use crate::logger::error::LoggerError;
use crate::logger::json::JsonLayer;
use crate::logger::level::Level;

type SinkLayers = Vec<Box<dyn Layer<Registry> + Send + Sync>>;
type FilterHandle = reload::Handle<EnvFilter, Layered<SinkLayers, Registry>>;

/// Runtime control over the installed level filter.
#[derive(Clone)]
pub struct LevelHandle {
    handle: FilterHandle,
}

impl std::fmt::Debug for LevelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelHandle").finish_non_exhaustive()
    }
}

impl LevelHandle {
    pub fn set_level(&self, level: Level) -> Result<(), LoggerError> {
        self.handle
            .reload(filter_for(level))
            .map_err(|e| LoggerError::Reload(e.to_string()))
    }
}

/// Current destination of the file layer. Empty means file output is off.
#[derive(Clone, Default)]
pub(crate) struct FileSlot {
    current: Arc<ArcSwapOption<NonBlocking>>,
}

impl FileSlot {
    /// Open the configured file and route the layer to it.
    ///
    /// The returned guard owns the background writer: dropping it flushes
    /// and stops that writer.
    fn open(&self, config: &LogConfig) -> Result<WorkerGuard, LoggerError> {
        let path = Path::new(&config.file_path);
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let prefix = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");

        let appender = RollingFileAppender::builder()
            .rotation(rotation_for(&config.rotation))
            .filename_prefix(prefix)
            .max_log_files(config.max_backups.max(1))
            .build(directory)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        self.current.store(Some(Arc::new(writer)));
        Ok(guard)
    }

    fn close(&self) {
        self.current.store(None);
    }

    pub(crate) fn is_open(&self) -> bool {
        self.current.load().is_some()
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = EitherWriter<NonBlocking, io::Sink>;

    fn make_writer(&'a self) -> Self::Writer {
        match self.current.load_full() {
            Some(writer) => EitherWriter::A(NonBlocking::clone(&writer)),
            None => EitherWriter::B(io::sink()),
        }
    }
}

/// What stays alive after installation.
pub(crate) struct Installed {
    pub(crate) level: LevelHandle,
    pub(crate) file: FileSlot,
    pub(crate) guard: Option<WorkerGuard>,
}

impl Installed {
    /// Point the file layer at the file `config` asks for, or switch it off.
    pub(crate) fn apply_file(&mut self, config: &LogConfig) -> Result<(), LoggerError> {
        if config.file_enabled {
            let guard = self.file.open(config)?;
            // The old worker flushes once its guard is gone.
            self.guard = Some(guard);
        } else {
            self.close_file();
        }
        Ok(())
    }

    pub(crate) fn close_file(&mut self) {
        self.file.close();
        self.guard = None;
    }
}

fn filter_for(level: Level) -> EnvFilter {
    EnvFilter::new(level.as_str())
}

/// Map a configured rotation name to the appender's rotation.
pub fn rotation_for(name: &str) -> Rotation {
    match name.to_ascii_lowercase().as_str() {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// Build the sink layers for `config` and install them as the global
/// subscriber. Fails if a global subscriber already exists.
pub(crate) fn install(config: &LogConfig) -> Result<Installed, LoggerError> {
    let level = config.level.parse().unwrap_or(Level::Info);
    let file = FileSlot::default();

    let mut layers: SinkLayers = vec![JsonLayer::new(file.clone()).boxed()];

    if config.use_json {
        layers.push(JsonLayer::new(io::stdout).boxed());
    } else if !config.file_enabled {
        layers.push(fmt::layer().with_target(true).with_ansi(true).compact().boxed());
    }

    let (filter, handle) = reload::Layer::new(filter_for(level));

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggerError::Subscriber(e.to_string()))?;

    let mut installed = Installed {
        level: LevelHandle { handle },
        file,
        guard: None,
    };
    installed.apply_file(config)?;
    Ok(installed)
}
