//! Live fleet telemetry.
//!
//! [`TelemetryFeed`] owns one server-sent-event connection (via
//! [`hyflow_api::TelemetryStream`]) and republishes each decoded snapshot
//! through watch channels. Snapshots replace each other wholesale; there
//! is no per-vehicle merging.
//!
//! Known gap: when the connection drops, the feed ends. There is no
//! automatic reconnect yet; callers that need one must watch for the
//! closed state and call [`TelemetryFeed::connect`] again.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures_core::Stream;
use futures_util::StreamExt;
use hyflow_api::{TelemetrySnapshot, TelemetryStream};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::error::CoreError;

/// Where the map looks before the first vehicle arrives (Mumbai).
pub const DEFAULT_MAP_CENTER: (f64, f64) = (19.0760, 72.8777);

/// Broadcasts telemetry snapshots and a derived map viewport.
///
/// [`close`](Self::close) and dropping the feed both end the ingest task
/// and the underlying connection; closing twice is harmless.
#[derive(Debug, Clone)]
pub struct TelemetryFeed {
    inner: Arc<FeedInner>,
}

#[derive(Debug)]
struct FeedInner {
    snapshot: watch::Sender<TelemetrySnapshot>,
    center: watch::Sender<(f64, f64)>,
    last_event: watch::Sender<Option<DateTime<Utc>>>,
    cancel: CancellationToken,
}

impl TelemetryFeed {
    /// Connects to `{base}/stream` and starts ingesting.
    pub async fn connect(base: &Url) -> Result<Self, CoreError> {
        let stream = TelemetryStream::open(base)
            .await
            .map_err(|e| CoreError::StreamUnavailable {
                url: base.to_string(),
                reason: e.to_string(),
            })?;
        info!(%base, "telemetry stream connected");
        Ok(Self::spawn(stream))
    }

    /// Starts a feed over an already-open snapshot source.
    pub fn spawn<S>(stream: S) -> Self
    where
        S: Stream<Item = TelemetrySnapshot> + Send + Unpin + 'static,
    {
        let inner = Arc::new(FeedInner {
            snapshot: watch::channel(TelemetrySnapshot::default()).0,
            center: watch::channel(DEFAULT_MAP_CENTER).0,
            last_event: watch::channel(None).0,
            cancel: CancellationToken::new(),
        });
        tokio::spawn(ingest(Arc::clone(&inner), stream));
        Self { inner }
    }

    /// Observes every published snapshot.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<TelemetrySnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// The snapshots receiver wrapped as a `Stream`, for `select!`-style
    /// consumers.
    #[must_use]
    pub fn snapshot_stream(&self) -> SnapshotStream {
        SnapshotStream {
            inner: WatchStream::new(self.inner.snapshot.subscribe()),
        }
    }

    /// Map viewport center, `(lat, lon)`. Follows the first vehicle of
    /// each snapshot; holds [`DEFAULT_MAP_CENTER`] until one arrives.
    #[must_use]
    pub fn map_center(&self) -> watch::Receiver<(f64, f64)> {
        self.inner.center.subscribe()
    }

    /// Arrival time of the most recent snapshot, if any arrived yet.
    #[must_use]
    pub fn last_event(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_event.borrow()
    }

    /// `true` once the ingest task has stopped, whether by [`close`]
    /// (Self::close) or because the server ended the stream.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Ends the feed. Idempotent.
    pub fn close(&self) {
        self.inner.cancel.cancel();
    }
}

async fn ingest<S>(inner: Arc<FeedInner>, mut stream: S)
where
    S: Stream<Item = TelemetrySnapshot> + Send + Unpin + 'static,
{
    loop {
        tokio::select! {
            biased;
            () = inner.cancel.cancelled() => break,
            event = stream.next() => match event {
                Some(snapshot) => publish(&inner, snapshot),
                None => {
                    debug!("telemetry stream ended");
                    inner.cancel.cancel();
                    break;
                }
            },
        }
    }
    // dropping `stream` here closes the connection
}

fn publish(inner: &FeedInner, snapshot: TelemetrySnapshot) {
    if let Some(first) = snapshot.vehicles.first() {
        inner.center.send_replace((first.lat, first.lon));
    }
    inner.last_event.send_replace(Some(Utc::now()));
    inner.snapshot.send_replace(snapshot);
}

/// `Stream` adapter over the snapshot watch channel.
pub struct SnapshotStream {
    inner: WatchStream<TelemetrySnapshot>,
}

impl Stream for SnapshotStream {
    type Item = TelemetrySnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl std::fmt::Debug for SnapshotStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hyflow_api::TelemetryVehicle;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    fn snapshot_with(vehicles: Vec<TelemetryVehicle>) -> TelemetrySnapshot {
        TelemetrySnapshot {
            vehicles,
            ..TelemetrySnapshot::default()
        }
    }

    fn vehicle(id: &str, lat: f64, lon: f64) -> TelemetryVehicle {
        TelemetryVehicle {
            vehicle_id: id.to_owned(),
            lat,
            lon,
            status: "enroute".to_owned(),
        }
    }

    #[tokio::test]
    async fn snapshots_replace_wholesale_and_center_follows_first_vehicle() {
        let (tx, rx) = mpsc::channel(4);
        let feed = TelemetryFeed::spawn(ReceiverStream::new(rx));
        let mut snapshots = feed.snapshots();
        assert_eq!(*feed.map_center().borrow(), DEFAULT_MAP_CENTER);
        assert_eq!(feed.last_event(), None);

        tx.send(snapshot_with(vec![
            vehicle("V1", 18.9, 72.8),
            vehicle("V2", 19.2, 73.0),
        ]))
        .await
        .unwrap();
        snapshots.changed().await.unwrap();
        assert_eq!(snapshots.borrow_and_update().vehicles.len(), 2);
        assert_eq!(*feed.map_center().borrow(), (18.9, 72.8));
        assert!(feed.last_event().is_some());

        tx.send(snapshot_with(vec![vehicle("V3", 21.1, 79.0)]))
            .await
            .unwrap();
        snapshots.changed().await.unwrap();
        let current = snapshots.borrow_and_update().clone();
        assert_eq!(current.vehicles.len(), 1);
        assert_eq!(current.vehicles[0].vehicle_id, "V3");
        assert_eq!(*feed.map_center().borrow(), (21.1, 79.0));
    }

    #[tokio::test]
    async fn empty_snapshot_keeps_previous_center() {
        let (tx, rx) = mpsc::channel(4);
        let feed = TelemetryFeed::spawn(ReceiverStream::new(rx));
        let mut snapshots = feed.snapshots();

        tx.send(snapshot_with(vec![vehicle("V1", 18.9, 72.8)]))
            .await
            .unwrap();
        snapshots.changed().await.unwrap();
        tx.send(snapshot_with(vec![])).await.unwrap();
        snapshots.changed().await.unwrap();

        assert_eq!(snapshots.borrow_and_update().vehicles.len(), 0);
        assert_eq!(*feed.map_center().borrow(), (18.9, 72.8));
    }

    #[tokio::test]
    async fn close_is_idempotent_and_ends_ingest() {
        let (tx, rx) = mpsc::channel(4);
        let feed = TelemetryFeed::spawn(ReceiverStream::new(rx));
        feed.close();
        feed.close();
        assert!(feed.is_closed());

        // the ingest task is gone, so sends are simply never published
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = tx.send(snapshot_with(vec![vehicle("V1", 1.0, 2.0)])).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(feed.snapshots().borrow().vehicles.len(), 0);
    }

    #[tokio::test]
    async fn stream_end_marks_feed_closed() {
        let (tx, rx) = mpsc::channel::<TelemetrySnapshot>(1);
        let feed = TelemetryFeed::spawn(ReceiverStream::new(rx));
        drop(tx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(feed.is_closed());
    }
}
