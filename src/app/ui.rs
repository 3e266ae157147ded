//! Marshalling work onto the UI-owning thread.

use std::fmt;
use std::thread::{self, ThreadId};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::log::{trace, warn};

type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// Queue of callbacks that run on the thread that created it.
///
/// Other threads post through a [`UiHandle`]; the owner thread runs the
/// queued callbacks with [`UiDispatcher::pump`].
pub struct UiDispatcher {
    tx: Sender<UiJob>,
    rx: Receiver<UiJob>,
    owner: ThreadId,
}

impl Default for UiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UiDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiDispatcher")
            .field("owner", &self.owner)
            .field("pending", &self.rx.len())
            .finish()
    }
}

impl UiDispatcher {
    /// A dispatcher owned by the calling thread.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            owner: thread::current().id(),
        }
    }

    pub fn handle(&self) -> UiHandle {
        UiHandle {
            tx: self.tx.clone(),
            owner: self.owner,
        }
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Run the callbacks queued so far. Callbacks they post in turn wait for
    /// the next pump. Refused off the owner thread.
    pub fn pump(&self) -> usize {
        if !self.is_ui_thread() {
            warn!("ui pump refused off the owning thread");
            return 0;
        }
        let queued = self.rx.len();
        let mut ran = 0;
        for _ in 0..queued {
            let Ok(job) = self.rx.try_recv() else {
                break;
            };
            job();
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "ui callbacks ran");
        }
        ran
    }

    /// Wait up to `timeout` for a callback, then pump.
    pub fn pump_timeout(&self, timeout: Duration) -> usize {
        if !self.is_ui_thread() {
            warn!("ui pump refused off the owning thread");
            return 0;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(job) => {
                job();
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Drop everything still queued; returns how many callbacks were dropped.
    pub(crate) fn discard(&self) -> usize {
        self.rx.try_iter().count()
    }
}

/// Cloneable, `Send` handle for posting to a [`UiDispatcher`].
#[derive(Clone)]
pub struct UiHandle {
    tx: Sender<UiJob>,
    owner: ThreadId,
}

impl fmt::Debug for UiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiHandle").field("owner", &self.owner).finish()
    }
}

impl UiHandle {
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Queue `f` for the next pump. Returns `false` if the dispatcher is gone.
    pub fn post(&self, f: impl FnOnce() + Send + 'static) -> bool {
        if self.tx.send(Box::new(f)).is_err() {
            trace!("ui dispatcher gone, callback dropped");
            return false;
        }
        true
    }

    /// Run `f` now when called on the UI thread, otherwise queue it.
    pub fn run_or_post(&self, f: impl FnOnce() + Send + 'static) -> bool {
        if self.is_ui_thread() {
            f();
            true
        } else {
            self.post(f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn posted_callbacks_run_only_in_pump() {
        let ui = UiDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handle = ui.handle();

        let h = Arc::clone(&hits);
        std::thread::spawn(move || {
            handle.post(move || {
                h.fetch_add(1, Ordering::SeqCst);
            })
        })
        .join()
        .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(ui.pending(), 1);
        assert_eq!(ui.pump(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn run_or_post_is_inline_on_ui_thread() {
        let ui = UiDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        ui.handle().run_or_post(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(ui.pending(), 0);
    }

    #[test]
    fn run_or_post_queues_from_other_threads() {
        let ui = UiDispatcher::new();
        let handle = ui.handle();
        std::thread::spawn(move || {
            assert!(!handle.is_ui_thread());
            handle.run_or_post(|| {})
        })
        .join()
        .unwrap();
        assert_eq!(ui.pending(), 1);
    }

    #[test]
    fn pump_refused_off_owner_thread() {
        let ui = UiDispatcher::new();
        ui.handle().post(|| {});
        let ran = std::thread::scope(|s| s.spawn(|| ui.pump()).join().unwrap());
        assert_eq!(ran, 0);
        assert_eq!(ui.pump(), 1);
    }

    #[test]
    fn callbacks_posted_during_pump_wait_for_next_pump() {
        let ui = UiDispatcher::new();
        let handle = ui.handle();
        let inner = handle.clone();
        handle.post(move || {
            inner.post(|| {});
        });
        assert_eq!(ui.pump(), 1);
        assert_eq!(ui.pending(), 1);
    }
}
