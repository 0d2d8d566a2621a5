use super::LedgerStore;
use crate::{
    document::{CaseRecord, LedgerDocument},
    error::{LedgerError, LedgerResult},
    types::{CaseId, MemberId},
};
use chrono::{DateTime, Utc};

impl LedgerDocument {
    /// Every unpaid case across all members, oldest first per member.
    pub fn unpaid_cases(&self) -> impl Iterator<Item = (MemberId, &CaseRecord)> + '_ {
        self.users
            .iter()
            .flat_map(|(member, history)| history.iter().filter(|c| !c.paid).map(move |c| (*member, c)))
    }
}

impl LedgerStore {
    // ── Payment / compliance ───────────────────────────────────────

    /// Flip a case from unpaid to paid. One-way.
    ///
    /// `case = None` confirms the member's oldest unpaid case. A repeat
    /// confirmation fails with `AlreadyPaid` and writes nothing, so the
    /// audit trail never sees it twice.
    pub fn confirm(
        &self,
        member: MemberId,
        case: Option<&CaseId>,
        admin: &str,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> LedgerResult<CaseRecord> {
        let confirmed = self.mutate(|doc| {
            let history = doc.users.get_mut(&member).filter(|h| !h.is_empty());
            let Some(history) = history else {
                return Err(LedgerError::EmptyHistory { member });
            };

            let index = match case {
                Some(id) => history.iter().position(|c| &c.case == id).ok_or_else(|| {
                    LedgerError::NotFound(format!("case {id} for member {member}"))
                })?,
                None => history.iter().position(|c| !c.paid).ok_or_else(|| {
                    let last = history.last().map(|c| c.case.to_string()).unwrap_or_default();
                    LedgerError::AlreadyPaid { case: last }
                })?,
            };

            let record = &mut history[index];
            if record.paid {
                return Err(LedgerError::AlreadyPaid { case: record.case.to_string() });
            }
            record.paid = true;
            record.paid_at = Some(now);
            record.note = note.map(str::trim).filter(|n| !n.is_empty()).map(String::from);
            let confirmed = record.clone();

            doc.append_audit("confirm_payment", admin, member, now);
            Ok(confirmed)
        })?;
        log::info!("{} for member {member} confirmed paid by {admin}", confirmed.case);
        Ok(confirmed)
    }
}
