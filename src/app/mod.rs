//! Binary-side wiring: settings, tracing, progress display and the run loop.

pub(crate) mod config_runtime;
pub(crate) mod progress_manager;
pub(crate) mod runtime;
pub(crate) mod terminal;
