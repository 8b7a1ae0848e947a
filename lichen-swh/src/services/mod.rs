//! Agent services
//!
//! The per-file pipeline: batch driver, archive lookup client, rate-limit
//! backoff, result recording, liveness signalling.

pub mod backoff;
pub mod batch;
pub mod heartbeat;
pub mod heritage_client;
pub mod recorder;

pub use backoff::BackoffPolicy;
pub use batch::BatchProcessor;
pub use heartbeat::Heartbeat;
pub use heritage_client::HeritageClient;
pub use recorder::ResultRecorder;
