//! Batch processing of one upload
//!
//! Enumerates the upload's pfiles, subtracts the ones this agent already
//! recorded, and drives the remainder through lookup-with-backoff and
//! recording, strictly one file at a time. Persistence is per-file: a crash
//! between files leaves completed files durable and the rest eligible on the
//! next run. Transport and persistence errors end the run immediately;
//! nothing is written for the in-flight file and later files are not
//! attempted.

use crate::error::AgentResult;
use crate::models::{ResultStatus, RunSummary};
use crate::services::backoff::{lookup_with_backoff, BackoffPolicy};
use crate::services::heartbeat::Heartbeat;
use crate::services::heritage_client::HeritageClient;
use crate::services::recorder::ResultRecorder;
use crate::db::{pfiles, results};
use chrono::Utc;
use lichen_common::events::AgentEvent;
use sqlx::SqlitePool;
use tracing::{debug, info};

pub struct BatchProcessor {
    db: SqlitePool,
    client: HeritageClient,
    backoff: BackoffPolicy,
    recorder: ResultRecorder,
    heartbeat: Heartbeat,
    agent_id: i64,
}

impl BatchProcessor {
    /// Collaborators arrive as explicit parameters; the processor holds no
    /// ambient context.
    pub fn new(
        db: SqlitePool,
        client: HeritageClient,
        backoff: BackoffPolicy,
        heartbeat: Heartbeat,
        agent_id: i64,
    ) -> Self {
        let recorder = ResultRecorder::new(db.clone(), agent_id);
        Self {
            db,
            client,
            backoff,
            recorder,
            heartbeat,
            agent_id,
        }
    }

    /// Process every pfile of the upload that this agent has not yet
    /// recorded. Returns the run counters once all files were attempted.
    pub async fn process_upload(&self, upload_id: i64) -> AgentResult<RunSummary> {
        let pfile_list = pfiles::pfiles_for_upload(&self.db, upload_id).await?;
        let already_done =
            results::processed_pfile_ids(&self.db, upload_id, self.agent_id).await?;

        info!(
            upload_id,
            files = pfile_list.len(),
            already_processed = already_done.len(),
            "Starting heritage license batch"
        );
        self.heartbeat.bus().emit(AgentEvent::RunStarted {
            upload_id,
            timestamp: Utc::now(),
        });

        let mut summary = RunSummary::default();
        for pfile in &pfile_list {
            if already_done.contains(&pfile.pfile_id) {
                debug!(pfile_id = pfile.pfile_id, "Already recorded; skipping");
                summary.files_skipped += 1;
            } else {
                let outcome = lookup_with_backoff(
                    &self.client,
                    &self.backoff,
                    &self.heartbeat,
                    &pfile.sha256,
                )
                .await?;

                self.recorder.record(pfile.pfile_id, &outcome).await?;

                match outcome.status {
                    ResultStatus::Found => summary.files_found += 1,
                    ResultStatus::NotFound => summary.files_not_found += 1,
                }
            }

            // One liveness signal per file, processed or skipped
            self.heartbeat.tick(1);
        }

        info!(
            upload_id,
            found = summary.files_found,
            not_found = summary.files_not_found,
            skipped = summary.files_skipped,
            "Heritage license batch complete"
        );
        self.heartbeat.bus().emit(AgentEvent::RunCompleted {
            upload_id,
            files_found: summary.files_found,
            files_not_found: summary.files_not_found,
            files_skipped: summary.files_skipped,
            timestamp: Utc::now(),
        });

        Ok(summary)
    }
}
