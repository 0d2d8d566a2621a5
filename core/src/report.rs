//! Read-only views over the ledger: own history, leaderboard, weekly report.

use crate::{
    document::{CaseRecord, LedgerDocument, PaymentStatus},
    escalation::{penalty_for, tier, Penalty},
    types::{MemberId, Tier},
};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseLine {
    pub record: CaseRecord,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub member:  MemberId,
    pub count:   usize,
    pub tier:    Tier,
    pub penalty: Option<Penalty>,
    pub cases:   Vec<CaseLine>,
}

pub fn history_view(doc: &LedgerDocument, member: MemberId, now: DateTime<Utc>) -> HistoryView {
    let cases: Vec<CaseLine> = doc
        .history(member)
        .iter()
        .map(|c| CaseLine {
            record: c.clone(),
            status: c.payment_status(now),
        })
        .collect();
    HistoryView {
        member,
        count: cases.len(),
        tier: tier(cases.len()),
        penalty: penalty_for(cases.len()),
        cases,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub member: MemberId,
    pub cases:  usize,
    pub tier:   Tier,
    pub unpaid: usize,
}

/// Members with at least one case, most cases first, ties by member id.
pub fn leaderboard(doc: &LedgerDocument, limit: usize) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = doc
        .users
        .iter()
        .filter(|(_, h)| !h.is_empty())
        .map(|(member, h)| LeaderboardRow {
            member: *member,
            cases:  h.len(),
            tier:   tier(h.len()),
            unpaid: h.iter().filter(|c| !c.paid).count(),
        })
        .collect();
    rows.sort_by(|a, b| b.cases.cmp(&a.cases).then(a.member.cmp(&b.member)));
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyReport {
    pub year:       i32,
    pub week:       u32,
    pub total:      usize,
    pub unpaid:     usize,
    pub overdue:    usize,
    pub per_member: Vec<(MemberId, usize)>,
}

/// Cases issued in the current ISO week of the current ISO year.
pub fn weekly_report(doc: &LedgerDocument, now: DateTime<Utc>) -> WeeklyReport {
    let current = now.iso_week();
    let mut report = WeeklyReport {
        year: current.year(),
        week: current.week(),
        total: 0,
        unpaid: 0,
        overdue: 0,
        per_member: Vec::new(),
    };
    for (member, history) in &doc.users {
        let this_week: Vec<&CaseRecord> =
            history.iter().filter(|c| c.issued_week() == Some(current)).collect();
        if this_week.is_empty() {
            continue;
        }
        report.total += this_week.len();
        report.unpaid += this_week.iter().filter(|c| !c.paid).count();
        report.overdue += this_week.iter().filter(|c| c.is_overdue(now)).count();
        report.per_member.push((*member, this_week.len()));
    }
    report.per_member.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    report
}
