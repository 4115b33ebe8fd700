//! Sync pass results and ledger summaries.

use serde::{Deserialize, Serialize};

/// What a sync pass did with one ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Updated,
    Unchanged,
    Deleted,
    Conflict,
    LocalAhead,
    LocalMissing,
    Error,
}

/// Per-record outcome reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDetail {
    pub event_id: String,
    pub local_entity_id: String,
    pub action: SyncAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Counts returned by the sync executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub synced: u32,
    pub deleted: u32,
    pub conflicts: u32,
    pub errors: u32,
    pub details: Vec<SyncDetail>,
}

impl SyncReport {
    /// Record a detail and bump the matching counter.
    pub fn push(&mut self, detail: SyncDetail) {
        match detail.action {
            SyncAction::Updated | SyncAction::Unchanged => self.synced += 1,
            SyncAction::Deleted => self.deleted += 1,
            SyncAction::Conflict => self.conflicts += 1,
            SyncAction::Error => self.errors += 1,
            SyncAction::LocalAhead | SyncAction::LocalMissing => {}
        }
        self.details.push(detail);
    }
}

/// Ledger counts exposed by the sync status endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLedgerSummary {
    pub linked_time_blocks: u64,
    pub records_needing_check: u64,
}
