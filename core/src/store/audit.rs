use super::LedgerStore;
use crate::{
    document::{format_time, AuditEntry, LedgerDocument},
    error::LedgerResult,
};
use chrono::{DateTime, Utc};

impl LedgerDocument {
    /// Append-only. Called inside the same critical section as the
    /// mutation it describes.
    pub fn append_audit(&mut self, action: &str, admin: &str, target: u64, now: DateTime<Utc>) {
        self.admin_logs.push(AuditEntry {
            action: action.to_string(),
            admin:  admin.to_string(),
            target,
            time:   format_time(now),
        });
    }
}

impl LedgerStore {
    // ── Audit log ──────────────────────────────────────────────────

    /// The most recent `limit` entries, oldest first. Storage is never trimmed.
    pub fn recent_audit(&self, limit: usize) -> LedgerResult<Vec<AuditEntry>> {
        self.read(|doc| {
            let skip = doc.admin_logs.len().saturating_sub(limit);
            doc.admin_logs[skip..].to_vec()
        })
    }

    pub fn audit_len(&self) -> LedgerResult<usize> {
        self.read(|doc| doc.admin_logs.len())
    }
}
