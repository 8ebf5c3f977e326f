use std::future::Future;
use std::pin::Pin;

use hyflow_api::RequestResult;
use tokio::sync::watch;

use super::state::SyncState;

type MutationFuture<T> = Pin<Box<dyn Future<Output = RequestResult<T>> + Send>>;

/// Runs one write operation at a time and publishes its progress through
/// the same [`SyncState`] shape the polling units use.
///
/// Unlike [`SyncUnit`](super::SyncUnit) there is no timer and no retry
/// beyond what the API client already does; each [`execute`](Self::execute)
/// is a single shot whose outcome is also returned to the caller.
pub struct MutationUnit<P, T> {
    run: Box<dyn Fn(P) -> MutationFuture<T> + Send + Sync>,
    state: watch::Sender<SyncState<T>>,
}

impl<P, T> MutationUnit<P, T>
where
    T: Clone,
{
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
    {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            run: Box::new(move |payload| Box::pin(f(payload))),
            state,
        }
    }

    /// Runs the mutation with `payload`, mirroring progress into the state
    /// channel and handing the raw result back.
    pub async fn execute(&self, payload: P) -> RequestResult<T> {
        self.state.send_modify(SyncState::begin);
        let result = (self.run)(payload).await;
        self.state.send_modify(|state| state.finish(result.clone()));
        result
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState<T>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> SyncState<T> {
        self.state.borrow().clone()
    }
}

impl<P, T> std::fmt::Debug for MutationUnit<P, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationUnit").finish_non_exhaustive()
    }
}
