//! Progress reporting hook for long-running steps.

/// Receives per-item progress from pipeline steps.
///
/// The binary renders this as a progress bar; library callers that do not
/// care pass [`NoProgress`].
pub trait Progress: Send + Sync {
    /// A step is about to process `total` items.
    fn start(&self, step: &str, total: u64);
    /// One item (named by `item`) finished, successfully or not.
    fn advance(&self, item: &str);
    /// The step is done.
    fn finish(&self);
}

/// Discards all progress events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&self, _step: &str, _total: u64) {}
    fn advance(&self, _item: &str) {}
    fn finish(&self) {}
}
