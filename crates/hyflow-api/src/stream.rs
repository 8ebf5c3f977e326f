//! Server-push telemetry stream.
//!
//! Opens one long-lived SSE connection to the backend's `/stream`
//! endpoint and yields decoded [`TelemetrySnapshot`] messages. Each
//! snapshot is a full replacement of fleet state, not a delta.
//!
//! Decode policy is fail-open: a malformed event is logged at debug
//! level and skipped, so consumers simply keep their previous snapshot.
//! There is no reconnect logic here — the connection lives until the
//! owner drops the stream.

use std::pin::Pin;
use std::time::Duration;

use async_stream::stream;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::Error;

/// Connect timeout for the stream handshake. The client deliberately
/// carries no total-request timeout: one would sever the open stream.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

// ── Wire types ───────────────────────────────────────────────────────

/// Position report for one vehicle, as sent on the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryVehicle {
    pub vehicle_id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub status: String,
}

/// Full-replace point-in-time state of the fleet plus environmental
/// factors, both in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    #[serde(default)]
    pub vehicles: Vec<TelemetryVehicle>,
    #[serde(default = "default_factor")]
    pub traffic: f64,
    #[serde(default = "default_factor")]
    pub weather: f64,
    /// Producer-side timestamp (epoch millis), when present.
    #[serde(default)]
    pub timestamp: Option<u64>,
}

fn default_factor() -> f64 {
    0.5
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            vehicles: Vec::new(),
            traffic: default_factor(),
            weather: default_factor(),
            timestamp: None,
        }
    }
}

// ── TelemetryStream ──────────────────────────────────────────────────

/// A live connection to the backend telemetry stream.
///
/// Yields one snapshot per well-formed server event until the server
/// closes the connection or the stream is dropped. Dropping the stream
/// closes the underlying connection.
pub struct TelemetryStream {
    events: Pin<Box<dyn Stream<Item = TelemetrySnapshot> + Send>>,
}

impl TelemetryStream {
    /// Open the SSE connection at `{base}/stream`.
    pub async fn open(base: &Url) -> Result<Self, Error> {
        let url: Url = format!("{}/stream", base.as_str().trim_end_matches('/'))
            .parse()
            .map_err(|e: url::ParseError| Error::StreamConnect(e.to_string()))?;

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("hyflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::StreamConnect(e.to_string()))?;

        debug!(%url, "connecting to telemetry stream");

        let response = http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| Error::StreamConnect(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::StreamConnect(e.to_string()))?;

        let mut bytes = response.bytes_stream();
        let events = stream! {
            let mut decoder = EventDecoder::default();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        debug!(error = %e, "telemetry stream ended");
                        break;
                    }
                };
                for payload in decoder.feed(&chunk) {
                    if let Some(snapshot) = decode_snapshot(&payload) {
                        yield snapshot;
                    }
                }
            }
        };

        Ok(Self {
            events: Box::pin(events),
        })
    }

    /// Next decoded snapshot, or `None` once the connection has ended.
    pub async fn next(&mut self) -> Option<TelemetrySnapshot> {
        self.events.next().await
    }
}

impl Stream for TelemetryStream {
    type Item = TelemetrySnapshot;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.events.as_mut().poll_next(cx)
    }
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Parse one event payload. Malformed payloads are discarded silently;
/// the caller keeps its previous snapshot.
pub fn decode_snapshot(payload: &str) -> Option<TelemetrySnapshot> {
    match serde_json::from_str(payload) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            debug!(error = %e, "discarding malformed telemetry event");
            None
        }
    }
}

/// Incremental SSE frame decoder.
///
/// Accumulates raw bytes and emits the `data:` payload of each complete
/// event (events are delimited by a blank line). Multiple `data:` lines
/// within one event are joined with newlines per the SSE spec; other
/// field lines and comments are ignored.
#[derive(Default)]
struct EventDecoder {
    buffer: Vec<u8>,
}

impl EventDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(end) = find_event_boundary(&self.buffer) {
            let event: Vec<u8> = self.buffer.drain(..end.0).collect();
            self.buffer.drain(..end.1);
            let text = String::from_utf8_lossy(&event);
            if let Some(payload) = extract_data(&text) {
                payloads.push(payload);
            }
        }
        payloads
    }
}

/// Locate the first blank-line delimiter, returning (event length,
/// delimiter length). Handles both `\n\n` and `\r\n\r\n`.
fn find_event_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| (i, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (found, None) | (None, found) => found,
    }
}

/// Join the `data:` lines of one raw event, or `None` if it carried no
/// data field (e.g. a keep-alive comment).
fn extract_data(event: &str) -> Option<String> {
    let mut data: Option<String> = None;
    for line in event.lines() {
        let Some(rest) = line.strip_prefix("data:") else {
            continue;
        };
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        match data {
            Some(ref mut joined) => {
                joined.push('\n');
                joined.push_str(rest);
            }
            None => data = Some(rest.to_owned()),
        }
    }
    data
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_full_snapshot() {
        let payload = r#"{
            "vehicles": [{"vehicle_id": "V1", "lat": 10.0, "lon": 20.0, "status": "ok"}],
            "traffic": 0.4,
            "weather": 0.7
        }"#;

        let snapshot = decode_snapshot(payload).unwrap();
        assert_eq!(snapshot.vehicles.len(), 1);
        assert_eq!(snapshot.vehicles[0].vehicle_id, "V1");
        assert!((snapshot.traffic - 0.4).abs() < f64::EPSILON);
        assert!((snapshot.weather - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn decode_malformed_payload_is_discarded() {
        assert!(decode_snapshot("not json at all").is_none());
        assert!(decode_snapshot(r#"{"vehicles": 7}"#).is_none());
    }

    #[test]
    fn decode_missing_fields_use_defaults() {
        let snapshot = decode_snapshot("{}").unwrap();
        assert!(snapshot.vehicles.is_empty());
        assert!((snapshot.traffic - 0.5).abs() < f64::EPSILON);
        assert!((snapshot.weather - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn decoder_emits_complete_events() {
        let mut decoder = EventDecoder::default();

        assert!(decoder.feed(b"data: {\"traffic\":").is_empty());
        let payloads = decoder.feed(b" 0.1}\n\ndata: {\"weather\": 0.9}\n\n");

        assert_eq!(
            payloads,
            vec![
                "{\"traffic\": 0.1}".to_owned(),
                "{\"weather\": 0.9}".to_owned()
            ]
        );
    }

    #[test]
    fn decoder_handles_crlf_delimiters() {
        let mut decoder = EventDecoder::default();
        let payloads = decoder.feed(b"data: {\"traffic\": 0.2}\r\n\r\n");
        assert_eq!(payloads, vec!["{\"traffic\": 0.2}".to_owned()]);
    }

    #[test]
    fn decoder_joins_multiline_data() {
        let mut decoder = EventDecoder::default();
        let payloads = decoder.feed(b"data: line one\ndata: line two\n\n");
        assert_eq!(payloads, vec!["line one\nline two".to_owned()]);
    }

    #[test]
    fn decoder_skips_comments_and_other_fields() {
        let mut decoder = EventDecoder::default();
        let payloads = decoder.feed(b": keep-alive\n\nevent: tick\nid: 4\n\ndata: {}\n\n");
        assert_eq!(payloads, vec!["{}".to_owned()]);
    }
}
