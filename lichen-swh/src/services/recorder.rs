//! Result recording
//!
//! Persists the terminal outcome for one pfile: a single results row with
//! the status code and the comma-joined license string, plus one findings
//! link per license name that resolves in the catalog. The recorder trusts
//! the batch loop's already-processed filter and does not re-check it.

use crate::error::AgentResult;
use crate::models::TerminalOutcome;
use crate::db::{licenses, results};
use sqlx::SqlitePool;
use tracing::debug;

pub struct ResultRecorder {
    db: SqlitePool,
    agent_id: i64,
}

impl ResultRecorder {
    pub fn new(db: SqlitePool, agent_id: i64) -> Self {
        Self { db, agent_id }
    }

    /// Record the outcome for one pfile.
    ///
    /// License names missing from the catalog produce no link; they stay
    /// visible only inside the joined license string. Any persistence
    /// failure propagates and ends the run.
    pub async fn record(&self, pfile_id: i64, outcome: &TerminalOutcome) -> AgentResult<()> {
        let license_string = outcome.licenses.join(", ");
        results::insert_result(
            &self.db,
            pfile_id,
            self.agent_id,
            outcome.status.code(),
            &license_string,
        )
        .await?;

        for name in &outcome.licenses {
            match licenses::find_by_short_name(&self.db, name).await? {
                Some(license_id) => {
                    results::insert_finding(&self.db, self.agent_id, pfile_id, license_id).await?;
                }
                None => {
                    debug!(license = %name, pfile_id, "License name not in catalog; not linked");
                }
            }
        }

        Ok(())
    }
}
