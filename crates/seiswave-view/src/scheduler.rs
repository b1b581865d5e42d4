//! Frame-coalesced work scheduling.
//!
//! Zoom and pan fire continuously while the user drags; recomputing
//! amplitude boundaries for every intermediate state is wasted work and
//! can race with the final state. The scheduler holds at most one
//! pending work item and runs it on the next frame tick: scheduling
//! again before the tick replaces the pending item, so only the
//! trailing edge executes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

type WorkSlot = Arc<Mutex<Option<BoxFuture<'static, ()>>>>;

/// Single-slot scheduler driven by a frame-interval task.
pub struct FrameScheduler {
    slot: WorkSlot,
    ticker: JoinHandle<()>,
}

impl FrameScheduler {
    /// Start a scheduler ticking every `frame_duration`.
    #[must_use]
    pub fn new(frame_duration: Duration) -> Self {
        let slot: WorkSlot = Arc::new(Mutex::new(None));
        let ticker = tokio::spawn(tick_loop(Arc::clone(&slot), frame_duration));
        Self { slot, ticker }
    }

    /// Schedule work for the next frame tick, replacing any work already
    /// pending.
    pub fn schedule<F>(&self, work: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot.lock().expect("scheduler slot lock poisoned");
        if slot.is_some() {
            debug!("coalescing scheduled work");
        }
        *slot = Some(work.boxed());
    }

    /// Whether work is waiting for the next tick.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.slot
            .lock()
            .expect("scheduler slot lock poisoned")
            .is_some()
    }

    /// Stop ticking. Pending work is dropped.
    pub fn shutdown(self) {
        self.ticker.abort();
    }
}

async fn tick_loop(slot: WorkSlot, frame_duration: Duration) {
    let mut interval = tokio::time::interval(frame_duration);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let work = slot.lock().expect("scheduler slot lock poisoned").take();
        if let Some(work) = work {
            work.await;
        }
    }
}
