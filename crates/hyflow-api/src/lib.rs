// hyflow-api: Async Rust client for the hyflow backend (REST + SSE telemetry)

pub mod client;
pub mod error;
pub mod result;
pub mod stream;

pub use client::{DecisionMode, HyflowClient, RetryPolicy};
pub use error::Error;
pub use result::RequestResult;
pub use stream::{TelemetrySnapshot, TelemetryStream, TelemetryVehicle};
