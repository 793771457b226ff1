//! Client-wide configuration handed to every source at configure time.

use std::fmt;
use tracing::{Dispatch, Subscriber};

/// A logger instance carried by value instead of a process-wide global.
///
/// Components emit `tracing` events inside [`Logger::in_scope`], so the events reach the
/// subscriber this logger was built from even when the process default differs.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self::new(Dispatch::new(subscriber))
    }

    /// The dispatcher that is current on this thread right now.
    pub fn current() -> Self {
        Self::new(tracing::dispatcher::get_default(Dispatch::clone))
    }

    /// A logger that drops every event.
    pub fn disabled() -> Self {
        Self::new(Dispatch::none())
    }

    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

impl From<Dispatch> for Logger {
    fn from(dispatch: Dispatch) -> Self {
        Self::new(dispatch)
    }
}

/// Settings applied before a source is configured.
#[derive(Clone, Debug, Default)]
pub struct Config {
    logger: Logger,
}

/// A single mutation of [`Config`], applied in order by the client builder.
pub type ConfigOption = Box<dyn FnOnce(&mut Config) + Send>;

impl Config {
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }

    pub fn apply<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        for opt in options {
            opt(&mut self);
        }
        self
    }
}

/// Option that replaces the configured logger.
pub fn with_logger(logger: Logger) -> ConfigOption {
    Box::new(move |cfg: &mut Config| cfg.set_logger(logger))
}
