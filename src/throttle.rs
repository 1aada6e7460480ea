//! Trailing-edge throttle backed by a tokio timer.
//!
//! The first submission opens a window; when it closes, the most recent
//! submission is delivered to the sink. Nothing fires on the leading edge.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Sink<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Pending<T> {
    value: Option<T>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every spawn and cancel; a timer whose generation is stale does nothing
    generation: u64,
}

struct Shared<T> {
    pending: Mutex<Pending<T>>,
    sink: Sink<T>,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Pending<T>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Throttle<T> {
    window: Duration,
    runtime: Handle,
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Throttle<T> {
    /// `sink` runs with the throttle's internal lock held, both from the
    /// timer task and from [`cancel_and_send`](Self::cancel_and_send). It
    /// must not call back into this throttle (or into whatever owns it,
    /// such as a `BadgeIngester`), or it will deadlock.
    pub fn new(window: Duration, runtime: Handle, sink: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            window,
            runtime,
            shared: Arc::new(Shared {
                pending: Mutex::new(Pending {
                    value: None,
                    timer: None,
                    generation: 0,
                }),
                sink: Arc::new(sink),
            }),
        }
    }

    /// Queue `value` for delivery at the end of the current window,
    /// replacing whatever was queued before.
    pub fn submit(&self, value: T) {
        let mut pending = self.shared.lock();
        pending.value = Some(value);
        if pending.timer.is_some() {
            return;
        }

        pending.generation = pending.generation.wrapping_add(1);
        let generation = pending.generation;
        let shared = Arc::clone(&self.shared);
        let window = self.window;
        pending.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            // Deliver under the lock so a concurrent cancel cannot interleave
            let mut pending = shared.lock();
            if pending.generation != generation {
                return;
            }
            pending.timer = None;
            if let Some(value) = pending.value.take() {
                (shared.sink)(value);
            }
        }));
    }

    /// Drop anything queued and deliver `value` right now.
    ///
    /// Cancel and delivery happen under one lock, so there is no moment
    /// where the queued value is gone and `value` has not been sent.
    pub fn cancel_and_send(&self, value: T) {
        let mut pending = self.shared.lock();
        Self::cancel_locked(&mut pending);
        (self.shared.sink)(value);
    }

    pub fn cancel(&self) {
        let mut pending = self.shared.lock();
        Self::cancel_locked(&mut pending);
    }

    pub fn is_pending(&self) -> bool {
        self.shared.lock().value.is_some()
    }

    fn cancel_locked(pending: &mut Pending<T>) {
        pending.value = None;
        pending.generation = pending.generation.wrapping_add(1);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
    }
}

impl<T> Drop for Throttle<T> {
    fn drop(&mut self) {
        let mut pending = self.shared.lock();
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
    }
}
