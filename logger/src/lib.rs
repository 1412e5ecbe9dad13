//! Healthchain's logging utilities.

use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

use color_eyre::{eyre::eyre, Report, Result};
pub use healthchain_config::logger::{Config, Format, Level};
use tracing::subscriber::set_global_default;
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, instrument as log, trace, trace_span,
    warn, warn_span, Instrument,
};
pub use tracing_subscriber::reload::Error as ReloadError;
use tracing_subscriber::{
    filter::LevelFilter,
    layer::{Layered, SubscriberExt},
    registry::Registry,
    reload,
};

type LevelLayer = reload::Layer<LevelFilter, Registry>;
type Base = Layered<LevelLayer, Registry>;

static LOGGER_SET: AtomicBool = AtomicBool::new(false);

fn try_set_logger() -> Result<()> {
    if LOGGER_SET
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(eyre!("Logger is already set."));
    }
    Ok(())
}

/// Handle to the installed global logger.
#[derive(Debug, Clone)]
pub struct LoggerHandle {
    level: reload::Handle<LevelFilter, Registry>,
}

impl LoggerHandle {
    /// Change the maximum level of the running logger.
    ///
    /// # Errors
    /// If the subscriber was dropped or its lock poisoned.
    pub fn reload_level(&self, level: Level) -> Result<(), ReloadError> {
        self.level.reload(LevelFilter::from_level(level.into()))
    }

    /// Current maximum level.
    pub fn level(&self) -> Option<LevelFilter> {
        self.level.clone_current()
    }
}

/// Initializes the logger globally with given [`Config`].
///
/// Returns [`LoggerHandle`] to interact with the logger instance
///
/// Works only once per process, all subsequent invocations will fail.
///
/// For usage in tests consider [`test_logger`].
///
/// # Errors
/// If the logger is already set, raises a generic error.
pub fn init_global(configuration: &Config, terminal_colors: bool) -> Result<LoggerHandle> {
    try_set_logger()?;

    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(terminal_colors)
        .with_test_writer();

    match configuration.format {
        Format::Full => step2(configuration, layer),
        Format::Compact => step2(configuration, layer.compact()),
        Format::Pretty => step2(configuration, layer.pretty()),
        Format::Json => step2(configuration, layer.json()),
    }
}

/// Returns once lazily initialised global logger for testing purposes.
///
/// # Panics
/// If [`init_global`] or [`disable_global`] were called first.
pub fn test_logger() -> LoggerHandle {
    static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

    LOGGER
        .get_or_init(|| {
            // NOTE: tests that need another level should run in their own process
            // and reload it through the returned handle.
            let config = Config {
                level: Level::DEBUG,
                format: Format::Pretty,
            };

            init_global(&config, true).expect(
                "`init_global()` or `disable_global()` should not be called before `test_logger()`",
            )
        })
        .clone()
}

/// Disables the logger globally, so that subsequent calls to [`init_global`] will fail.
///
/// # Errors
/// If global logger was already initialised/disabled.
pub fn disable_global() -> Result<()> {
    try_set_logger()
}

fn step2<L>(configuration: &Config, layer: L) -> Result<LoggerHandle>
where
    L: tracing_subscriber::Layer<Base> + Debug + Send + Sync + 'static,
{
    let level: tracing::Level = configuration.level.into();
    let level_filter = LevelFilter::from_level(level);
    let (level_filter, level_filter_handle) = reload::Layer::new(level_filter);
    let subscriber = Registry::default()
        .with(level_filter)
        .with(layer)
        .with(tracing_error::ErrorLayer::default());

    set_global_default(subscriber)?;

    Ok(LoggerHandle {
        level: level_filter_handle,
    })
}

/// Installs the panic hook with [`color_eyre::install`] if it isn't installed yet
///
/// # Errors
/// Fails if [`color_eyre::install`] fails
pub fn install_panic_hook() -> Result<(), Report> {
    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        color_eyre::install()
    } else {
        Ok(())
    }
}

pub mod prelude {
    //! Module with most used items. Needs to be imported when using `log` macro to avoid `tracing` crate dependency

    pub use tracing::{self, debug, error, info, instrument as log, span, trace, warn, Span};
}
