use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use hyflow_api::RequestResult;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::state::SyncState;

type ProducerFuture<T> = Pin<Box<dyn Future<Output = RequestResult<T>> + Send>>;

/// A swappable source of refresh results.
///
/// Wraps the closure in a struct so a [`SyncUnit`] can hold it behind an
/// `ArcSwap` and consumers can replace it at runtime (for example when the
/// fleet view switches decision mode) without tearing the unit down.
pub struct Producer<T> {
    run: Box<dyn Fn() -> ProducerFuture<T> + Send + Sync>,
}

impl<T> Producer<T> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
    {
        Self {
            run: Box::new(move || Box::pin(f())),
        }
    }

    fn call(&self) -> ProducerFuture<T> {
        (self.run)()
    }
}

impl<T> std::fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer").finish_non_exhaustive()
    }
}

/// Keeps one resource synchronized by re-running its producer on demand
/// and, optionally, on a fixed interval.
///
/// Every refresh is tagged with a monotonically increasing token; when two
/// refreshes overlap, only the newest one is allowed to publish, so a slow
/// earlier response can never overwrite a fresher one.
///
/// Dropping the unit cancels the interval task and any in-flight refresh
/// publication.
#[derive(Debug)]
pub struct SyncUnit<T> {
    inner: Arc<SyncInner<T>>,
}

#[derive(Debug)]
struct SyncInner<T> {
    state: watch::Sender<SyncState<T>>,
    producer: ArcSwap<Producer<T>>,
    latest: AtomicU64,
    cancel: CancellationToken,
    timer: Mutex<CancellationToken>,
}

impl<T> SyncUnit<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts a unit, kicks off the initial refresh immediately and, if
    /// `every` is set, schedules periodic refreshes after it.
    #[must_use]
    pub fn spawn(producer: Producer<T>, every: Option<Duration>) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        let cancel = CancellationToken::new();
        let inner = Arc::new(SyncInner {
            state,
            producer: ArcSwap::from_pointee(producer),
            latest: AtomicU64::new(0),
            cancel: cancel.clone(),
            timer: Mutex::new(cancel.child_token()),
        });
        trigger(&inner);
        let unit = Self { inner };
        unit.set_interval(every);
        unit
    }

    /// Requests an immediate refresh. No-op after shutdown.
    pub fn refresh(&self) {
        trigger(&self.inner);
    }

    /// Replaces the producer. Takes effect on the next refresh; an
    /// in-flight refresh still completes against the old one.
    pub fn set_producer(&self, producer: Producer<T>) {
        self.inner.producer.store(Arc::new(producer));
    }

    /// Reschedules (or stops) the periodic refresh. The previous timer is
    /// cancelled before the new one starts, so exactly one timer exists at
    /// any moment.
    pub fn set_interval(&self, every: Option<Duration>) {
        let fresh = self.inner.cancel.child_token();
        {
            let mut timer = match self.inner.timer.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            timer.cancel();
            *timer = fresh.clone();
        }
        if let Some(every) = every {
            tokio::spawn(poll_task(Arc::clone(&self.inner), every, fresh));
        }
    }

    /// A receiver that observes every published state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState<T>> {
        self.inner.state.subscribe()
    }

    /// The current state, cloned.
    #[must_use]
    pub fn state(&self) -> SyncState<T> {
        self.inner.state.borrow().clone()
    }

    /// Stops the timer and suppresses any still-running refresh. Safe to
    /// call more than once.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }
}

impl<T> Drop for SyncUnit<T> {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

/// Issues one refresh: bumps the token, publishes `loading`, and spawns a
/// task that runs the current producer and publishes the outcome unless a
/// newer refresh has been issued meanwhile.
fn trigger<T>(inner: &Arc<SyncInner<T>>)
where
    T: Clone + Send + Sync + 'static,
{
    if inner.cancel.is_cancelled() {
        return;
    }
    let token = inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
    inner.state.send_modify(SyncState::begin);
    let fut = inner.producer.load().call();
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        let result = tokio::select! {
            biased;
            () = inner.cancel.cancelled() => return,
            result = fut => result,
        };
        if inner.latest.load(Ordering::SeqCst) != token {
            debug!(token, "discarding refresh superseded by a newer one");
            return;
        }
        inner.state.send_modify(|state| state.finish(result));
    });
}

async fn poll_task<T>(inner: Arc<SyncInner<T>>, every: Duration, cancel: CancellationToken)
where
    T: Clone + Send + Sync + 'static,
{
    let mut interval = tokio::time::interval(every);
    // the first tick fires immediately; the initial refresh already ran
    interval.tick().await;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => trigger(&inner),
        }
    }
}
