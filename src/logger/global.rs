//! Process-wide logger lifecycle.
//!
//! `init` is serialized by a mutex and may be called repeatedly: the last
//! call wins. The handle lives in an `ArcSwapOption`, so readers always see
//! either the previous or the new logger, never a partial one. The tracing
//! subscriber itself can only be installed once per process; later calls
//! reuse it, adjust its level and reopen (or close) the log file.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;

use crate::canonical::redaction::RedactionPolicy;
use crate::canonical::template::CanonicalTemplate;
use crate::config::{validate_config, LogConfig};
use crate::logger::error::LoggerError;
use crate::logger::handle::{Identity, Logger};
use crate::logger::level::Level;
use crate::logger::subscriber::{self, Installed, LevelHandle};

static INIT_LOCK: Mutex<()> = Mutex::new(());
static GLOBAL: ArcSwapOption<Logger> = ArcSwapOption::const_empty();
static INSTALLED: Mutex<Option<Installed>> = Mutex::new(None);

/// Build the global logger from `config` and install the sinks.
pub fn init(config: &LogConfig) -> Result<Arc<Logger>, LoggerError> {
    let _init = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    validate_config(config).map_err(LoggerError::InvalidConfig)?;
    let level = config.level.parse().unwrap_or(Level::Info);
    let template = CanonicalTemplate::compile(&config.canonical.template)?;
    let level_handle = install_or_adjust(config, level)?;

    let logger = Arc::new(
        Logger::builder()
            .identity(Identity::resolve(config))
            .redaction(RedactionPolicy::with_extra(&config.redaction.extra_patterns))
            .template(template)
            .max_body_bytes(config.http.max_body_bytes)
            .level_handle(level_handle)
            .build(),
    );
    GLOBAL.store(Some(logger.clone()));

    tracing::info!(
        env = %logger.identity().env,
        service = %logger.identity().service,
        version = %logger.identity().version,
        level = %level,
        "Logger initialized"
    );
    Ok(logger)
}

fn install_or_adjust(config: &LogConfig, level: Level) -> Result<Option<LevelHandle>, LoggerError> {
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(existing) = installed.as_mut() {
        existing.level.set_level(level)?;
        existing.apply_file(config)?;
        return Ok(Some(existing.level.clone()));
    }

    match subscriber::install(config) {
        Ok(new) => {
            let handle = new.level.clone();
            *installed = Some(new);
            Ok(Some(handle))
        }
        Err(LoggerError::Subscriber(reason)) => {
            // Someone else owns the global subscriber; emit through it as is.
            tracing::warn!(%reason, "Tracing subscriber already installed, sinks left unchanged");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// The current global logger, if `init` has run.
pub fn global() -> Option<Arc<Logger>> {
    GLOBAL.load_full()
}

/// Install an already-built handle as the global logger.
pub fn set_global(logger: Arc<Logger>) {
    let _init = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    GLOBAL.store(Some(logger));
}

/// Clear the global handle and flush/close the file sink.
///
/// The layers stay installed; a later `init` reuses them and reopens the
/// file when configured.
pub fn teardown() {
    let _init = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    GLOBAL.store(None);
    if let Some(installed) = INSTALLED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_mut()
    {
        installed.close_file();
    }
}
