//! Background detection of filter property writes that bypass the editor.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use fxstack_core::{PropertyMap, Result, SharedFilter};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::events::{ChangeFlag, TimelineSink};

/// Polls the properties of a fixed filter list once per interval.
///
/// Stops when `shutdown` is called or the poller is dropped; shutdown waits
/// for the thread to exit, at most one interval.
pub struct PropertyPoller {
    filters: Vec<SharedFilter>,
    /// Last seen properties, held locked while a poll compares.
    baseline: Arc<Mutex<Vec<PropertyMap>>>,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

fn snapshot(filters: &[SharedFilter]) -> Vec<PropertyMap> {
    filters.iter().map(|f| f.read().properties.clone()).collect()
}

impl PropertyPoller {
    /// Start polling `filters`.
    ///
    /// The first snapshot is taken before this returns, so a write made right
    /// after `start` is seen by the first poll.
    pub fn start(
        filters: Vec<SharedFilter>,
        interval: Duration,
        sink: Arc<dyn TimelineSink>,
        changes: ChangeFlag,
    ) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let baseline = Arc::new(Mutex::new(snapshot(&filters)));
        let polled = filters.clone();
        let shared_baseline = baseline.clone();

        let handle = thread::Builder::new()
            .name("fxstack-poller".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    // Stop requested or controller gone.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                let mut previous = shared_baseline.lock();
                let current = snapshot(&polled);
                if current != *previous {
                    debug!("filter properties changed outside the editor");
                    changes.mark();
                    sink.timeline_changed();
                    *previous = current;
                }
            })?;

        debug!(filters = filters.len(), ?interval, "property poller started");
        Ok(Self {
            filters,
            baseline,
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Run `write` on the filter at `index` without the poller reporting it.
    ///
    /// For writes whose change was already announced. The baseline lock is
    /// taken before the filter lock, in the same order as a poll.
    pub fn write_through<T>(
        &self,
        index: usize,
        write: impl FnOnce(&SharedFilter) -> T,
    ) -> Option<T> {
        let filter = self.filters.get(index)?;
        let mut baseline = self.baseline.lock();
        let result = write(filter);
        if let Some(slot) = baseline.get_mut(index) {
            *slot = filter.read().properties.clone();
        }
        Some(result)
    }

    /// Stop polling and wait for the thread to exit.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.stop_tx.try_send(());
        if handle.join().is_err() {
            warn!("property poller panicked");
        } else {
            debug!("property poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for PropertyPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
