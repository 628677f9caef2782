//! Change notification seams between the editor and the rest of the app.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives "timeline content changed" notifications.
///
/// Called from the poller thread; implementations must marshal any UI work
/// onto the UI thread themselves.
pub trait TimelineSink: Send + Sync {
    fn timeline_changed(&self);
}

/// Sink that ignores notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TimelineSink for NullSink {
    fn timeline_changed(&self) {}
}

/// Process-wide "filter values changed since last save" flag.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ChangeFlag(Arc<AtomicBool>);

impl ChangeFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}
