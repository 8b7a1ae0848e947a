//! Data models for the heritage lookup pipeline

use serde::{Deserialize, Serialize};

/// One distinct file content within an upload.
///
/// Produced by package enumeration at upload time; the agent only ever reads
/// these. Multiple paths in the package may share one pfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PFile {
    pub pfile_id: i64,
    pub upload_id: i64,
    /// Lowercase hex sha256 of the file contents, the archive lookup key
    pub sha256: String,
}

/// Classified answer from the heritage archive for one content hash.
///
/// Exactly one variant holds. Transport failures are not a variant: they
/// travel on the `Err` arm of the lookup result, because unlike these three
/// they are never domain-normal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The archive knows this content; license names in archive order.
    /// Empty when the content is known but carries no license facts.
    Found { licenses: Vec<String> },

    /// The archive has never seen this content
    NotFound,

    /// Request throughput cap hit; retry after the reset timestamp
    RateLimited {
        /// Absolute UNIX timestamp at which the quota resets
        reset_at: i64,
    },
}

/// Outcome of a lookup after rate limiting has been waited out.
///
/// The backoff loop narrows [`LookupOutcome`] to this before anything is
/// recorded, so the recorder cannot be handed a rate-limited state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalOutcome {
    pub status: ResultStatus,
    /// License names in archive order; empty for not-found and for known
    /// contents without license facts
    pub licenses: Vec<String>,
}

/// Terminal status persisted for a processed pfile.
///
/// Stored as the HTTP-shaped integer codes the results table has always
/// used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    Found,
    NotFound,
}

impl ResultStatus {
    /// Integer code as persisted in heritage_results.status
    pub fn code(self) -> i64 {
        match self {
            ResultStatus::Found => 200,
            ResultStatus::NotFound => 404,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            200 => Some(ResultStatus::Found),
            404 => Some(ResultStatus::NotFound),
            _ => None,
        }
    }
}

/// Counters accumulated over one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_found: u64,
    pub files_not_found: u64,
    pub files_skipped: u64,
}

impl RunSummary {
    pub fn total(&self) -> u64 {
        self.files_found + self.files_not_found + self.files_skipped
    }
}
