use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::options::Callbacks;
use crate::domain::{Blob, SaveError};
use crate::host::Host;

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const FAILED: u8 = 2;

/// Delivers the callbacks of one save call. `on_start` fires once, and
/// exactly one of `on_complete`/`on_error` fires for the terminal state.
pub(crate) struct Lifecycle {
    callbacks: Callbacks,
    started: AtomicBool,
    state: AtomicU8,
}

impl Lifecycle {
    pub(crate) fn new(callbacks: Callbacks) -> Self {
        Self {
            callbacks,
            started: AtomicBool::new(false),
            state: AtomicU8::new(PENDING),
        }
    }

    pub(crate) fn start(&self) {
        if !self.started.swap(true, Ordering::AcqRel) {
            if let Some(on_start) = &self.callbacks.on_start {
                on_start();
            }
        }
    }

    pub(crate) fn progress(&self, loaded: u64, total: u64) {
        if self.is_terminal() {
            return;
        }
        if let Some(on_progress) = &self.callbacks.on_progress {
            on_progress(loaded, total);
        }
    }

    /// Returns false if the call had already reached a terminal state.
    pub(crate) fn complete(&self) -> bool {
        if self
            .state
            .compare_exchange(PENDING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        if let Some(on_complete) = &self.callbacks.on_complete {
            on_complete();
        }
        true
    }

    /// Records the failure and returns whether an error handler consumed it.
    pub(crate) fn fail(&self, err: &SaveError) -> bool {
        let first = self
            .state
            .compare_exchange(PENDING, FAILED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        match &self.callbacks.on_error {
            Some(on_error) => {
                if first {
                    on_error(err);
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.state.load(Ordering::Acquire) != PENDING
    }

    pub(crate) fn tracks_progress(&self) -> bool {
        self.callbacks.on_progress.is_some()
    }
}

/// A temporary object reference that is released `revoke_after` once the
/// lease is dropped, whichever way the strategy exits.
pub(crate) struct ObjectUrlLease {
    host: Arc<dyn Host>,
    url: String,
    revoke_after: Duration,
}

impl ObjectUrlLease {
    pub(crate) fn acquire(
        host: &Arc<dyn Host>,
        blob: &Blob,
        revoke_after: Duration,
    ) -> Result<Self, SaveError> {
        let url = host.create_object_url(blob)?;
        Ok(Self {
            host: Arc::clone(host),
            url,
            revoke_after,
        })
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrlLease {
    fn drop(&mut self) {
        let url = std::mem::take(&mut self.url);
        let host = Arc::clone(&self.host);
        let delay = self.revoke_after;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    host.revoke_object_url(&url);
                });
            }
            // No runtime left to wait on; release now.
            Err(_) => host.revoke_object_url(&url),
        }
    }
}
