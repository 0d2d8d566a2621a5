use super::LedgerStore;
use crate::{
    document::{format_time, CaseRecord, LedgerDocument},
    error::{LedgerError, LedgerResult},
    types::{CaseId, MemberId},
};
use chrono::{DateTime, Datelike, Duration, Utc};

pub const MAX_REASON_CHARS: usize = 500;

fn validate_reason(reason: &str) -> LedgerResult<&str> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(LedgerError::Validation("reason must not be empty".into()));
    }
    let len = reason.chars().count();
    if len > MAX_REASON_CHARS {
        return Err(LedgerError::Validation(format!(
            "reason is {len} characters; the limit is {MAX_REASON_CHARS}"
        )));
    }
    Ok(reason)
}

impl LedgerStore {
    // ── Case ledger ────────────────────────────────────────────────

    /// Allocate a case id on its own. The counter is persisted before the
    /// id is handed out, so a restart can never issue it again.
    pub fn next_case_id(&self) -> LedgerResult<CaseId> {
        self.mutate(|doc| Ok(doc.allocate_case_id()))
    }

    /// Append a new unpaid case to `member`'s history.
    /// `grace` of `None` records the case without a deadline.
    pub fn record(
        &self,
        member: MemberId,
        reason: &str,
        admin: &str,
        now: DateTime<Utc>,
        grace: Option<Duration>,
    ) -> LedgerResult<CaseRecord> {
        self.record_counted(member, reason, admin, now, grace).map(|(record, _)| record)
    }

    /// Like [`record`](Self::record), also returning the member's case
    /// count as of this write.
    pub fn record_counted(
        &self,
        member: MemberId,
        reason: &str,
        admin: &str,
        now: DateTime<Utc>,
        grace: Option<Duration>,
    ) -> LedgerResult<(CaseRecord, usize)> {
        let reason = validate_reason(reason)?;
        let deadline = grace
            .map(|g| {
                now.checked_add_signed(g).ok_or_else(|| {
                    LedgerError::Validation(format!("grace period of {}h is out of range", g.num_hours()))
                })
            })
            .transpose()?;
        let (record, count) = self.mutate(|doc| {
            let record = CaseRecord {
                case:      doc.allocate_case_id(),
                reason:    reason.to_string(),
                issued_by: admin.to_string(),
                time:      format_time(now),
                week:      now.iso_week().week(),
                paid:      false,
                deadline,
                paid_at:   None,
                note:      None,
            };
            let history = doc.users.entry(member).or_default();
            history.push(record.clone());
            let count = history.len();
            doc.append_audit("record_violation", admin, member, now);
            Ok((record, count))
        })?;
        log::info!("{} recorded against member {member} by {admin}", record.case);
        Ok((record, count))
    }

    /// Remove the most recent case. Its id stays consumed.
    pub fn undo_last(
        &self,
        member: MemberId,
        admin: &str,
        now: DateTime<Utc>,
    ) -> LedgerResult<CaseRecord> {
        self.undo_last_counted(member, admin, now).map(|(record, _)| record)
    }

    /// Like [`undo_last`](Self::undo_last), also returning the cases left.
    pub fn undo_last_counted(
        &self,
        member: MemberId,
        admin: &str,
        now: DateTime<Utc>,
    ) -> LedgerResult<(CaseRecord, usize)> {
        let (removed, remaining) = self.mutate(|doc| {
            let history = doc.users.get_mut(&member).ok_or(LedgerError::EmptyHistory { member })?;
            let removed = history.pop().ok_or(LedgerError::EmptyHistory { member })?;
            let remaining = history.len();
            doc.append_audit("undo_last", admin, member, now);
            Ok((removed, remaining))
        })?;
        log::info!("{} removed from member {member} by {admin}", removed.case);
        Ok((removed, remaining))
    }

    /// Clear a member's whole history. The global counter is untouched.
    /// Returns how many cases were cleared.
    pub fn reset(&self, member: MemberId, admin: &str, now: DateTime<Utc>) -> LedgerResult<usize> {
        let cleared = self.mutate(|doc| {
            let cleared = doc.users.insert(member, Vec::new()).map_or(0, |h| h.len());
            doc.append_audit("reset", admin, member, now);
            Ok(cleared)
        })?;
        log::info!("History of member {member} reset by {admin} ({cleared} cases cleared)");
        Ok(cleared)
    }

    pub fn history(&self, member: MemberId) -> LedgerResult<Vec<CaseRecord>> {
        self.read(|doc| doc.history(member).to_vec())
    }

    pub fn case_count(&self, member: MemberId) -> LedgerResult<usize> {
        self.read(|doc: &LedgerDocument| doc.case_count(member))
    }

    pub fn case_counter(&self) -> LedgerResult<u64> {
        self.read(|doc| doc.case_counter)
    }
}
