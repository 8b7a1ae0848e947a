//! Rate-limit backoff control
//!
//! When the archive answers 429 it names an absolute reset timestamp. The
//! sleep until that timestamp is capped at the configured maximum; a capped
//! sleep simply re-queries early and may draw another 429 before the true
//! reset arrives.
//! Rate limiting alone never ends a run (the archive guarantees eventual
//! capacity), so the retry loop is unbounded. It is written as a plain loop:
//! the retry count has no bound, so the call stack must not grow with it.

use crate::error::AgentResult;
use crate::models::{LookupOutcome, ResultStatus, TerminalOutcome};
use crate::services::heartbeat::Heartbeat;
use crate::services::heritage_client::HeritageClient;
use chrono::Utc;
use lichen_common::human_time::format_duration;
use std::time::Duration;
use tracing::info;

/// Caps any single rate-limit sleep
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    max_sleep: Duration,
}

impl BackoffPolicy {
    pub fn new(max_sleep: Duration) -> Self {
        Self { max_sleep }
    }

    /// Sleep duration before the next attempt: `reset_at - now`, clamped
    /// into `[0, max_sleep]`. A reset already in the past means no sleep.
    pub fn wait_for(&self, reset_at: i64, now: i64) -> Duration {
        let wait = reset_at.saturating_sub(now);
        if wait <= 0 {
            return Duration::ZERO;
        }
        Duration::from_secs(wait as u64).min(self.max_sleep)
    }
}

/// Query one content hash, waiting out rate limits until a terminal outcome.
///
/// Each pass through the loop emits a zero-item heartbeat before sleeping,
/// so a supervisor never mistakes a long wait for a hang. Transport errors
/// propagate immediately; they are not retried here.
pub async fn lookup_with_backoff(
    client: &HeritageClient,
    policy: &BackoffPolicy,
    heartbeat: &Heartbeat,
    sha256: &str,
) -> AgentResult<TerminalOutcome> {
    loop {
        match client.lookup(sha256).await? {
            LookupOutcome::RateLimited { reset_at } => {
                heartbeat.tick(0);

                let now = Utc::now().timestamp();
                let until_reset = reset_at.saturating_sub(now);
                let sleep = policy.wait_for(reset_at, now);
                let sleep_secs = sleep.as_secs() as i64;

                heartbeat.rate_limit_wait(sleep_secs);
                info!(
                    "Rate limit reached; next slot unlocks in {}, sleeping {}",
                    format_duration(until_reset),
                    format_duration(sleep_secs)
                );

                tokio::time::sleep(sleep).await;
            }
            LookupOutcome::Found { licenses } => {
                return Ok(TerminalOutcome {
                    status: ResultStatus::Found,
                    licenses,
                })
            }
            LookupOutcome::NotFound => {
                return Ok(TerminalOutcome {
                    status: ResultStatus::NotFound,
                    licenses: Vec::new(),
                })
            }
        }
    }
}
