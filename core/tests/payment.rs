//! Payment / compliance tests: the one-way unpaid → paid transition.

use chrono::{Duration, TimeZone, Utc};
use scar_ledger_core::{document::PaymentStatus, types::CaseId, LedgerError, LedgerStore};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

#[test]
fn confirm_marks_case_paid() {
    let store = LedgerStore::in_memory();
    let rec = store.record(1, "late fee", "mod", now(), Some(Duration::hours(72))).unwrap();

    let paid_at = now() + Duration::hours(5);
    let confirmed = store.confirm(1, Some(&rec.case), "treasurer", Some("paid in cash"), paid_at).unwrap();

    assert!(confirmed.paid);
    assert_eq!(confirmed.paid_at, Some(paid_at));
    assert_eq!(confirmed.note.as_deref(), Some("paid in cash"));
    assert!(store.history(1).unwrap()[0].paid);
}

/// A repeat confirmation fails and writes no second audit entry.
#[test]
fn second_confirm_is_rejected_without_audit() {
    let store = LedgerStore::in_memory();
    let rec = store.record(1, "late fee", "mod", now(), Some(Duration::hours(72))).unwrap();
    store.confirm(1, Some(&rec.case), "mod", None, now()).unwrap();
    let audit_before = store.audit_len().unwrap();

    let err = store.confirm(1, Some(&rec.case), "mod", None, now()).unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyPaid { .. }));
    assert_eq!(store.audit_len().unwrap(), audit_before);
    assert!(store.history(1).unwrap()[0].paid);
}

/// Deadline one second in the past → overdue; once paid, never overdue.
#[test]
fn overdue_is_derived_and_cleared_by_payment() {
    let store = LedgerStore::in_memory();
    let issued = now() - Duration::hours(72) - Duration::seconds(1);
    let rec = store.record(1, "late", "mod", issued, Some(Duration::hours(72))).unwrap();
    assert_eq!(rec.deadline, Some(now() - Duration::seconds(1)));
    assert!(rec.is_overdue(now()));
    assert_eq!(rec.payment_status(now()), PaymentStatus::Overdue);

    let paid = store.confirm(1, None, "mod", None, now()).unwrap();
    assert!(!paid.is_overdue(now()));
    assert!(!paid.is_overdue(now() + Duration::days(365)));
    assert_eq!(paid.payment_status(now()), PaymentStatus::Paid);
}

/// A case id that belongs to someone else is NotFound for this member.
#[test]
fn confirm_requires_the_members_own_case() {
    let store = LedgerStore::in_memory();
    store.record(1, "mine", "mod", now(), None).unwrap();
    let theirs = store.record(2, "theirs", "mod", now(), None).unwrap();

    let err = store.confirm(1, Some(&theirs.case), "mod", None, now()).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));

    let err = store.confirm(1, Some(&CaseId::from_sequence(99)), "mod", None, now()).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
    assert!(!store.history(2).unwrap()[0].paid);
}

/// Without a case id the oldest unpaid case is settled first.
#[test]
fn confirm_without_case_takes_oldest_unpaid() {
    let store = LedgerStore::in_memory();
    let first = store.record(1, "a", "mod", now(), None).unwrap();
    let second = store.record(1, "b", "mod", now(), None).unwrap();

    assert_eq!(store.confirm(1, None, "mod", None, now()).unwrap().case, first.case);
    assert_eq!(store.confirm(1, None, "mod", None, now()).unwrap().case, second.case);
    assert!(matches!(
        store.confirm(1, None, "mod", None, now()),
        Err(LedgerError::AlreadyPaid { .. })
    ));
}

#[test]
fn confirm_on_clean_member_is_informational() {
    let store = LedgerStore::in_memory();
    let err = store.confirm(4, None, "mod", None, now()).unwrap_err();
    assert!(matches!(err, LedgerError::EmptyHistory { member: 4 }));
    assert!(err.is_informational());
}

#[test]
fn unpaid_cases_lists_open_penalties() {
    let store = LedgerStore::in_memory();
    store.record(1, "a", "mod", now(), None).unwrap();
    store.record(2, "b", "mod", now(), None).unwrap();
    store.record(2, "c", "mod", now(), None).unwrap();
    store.confirm(2, None, "mod", None, now()).unwrap();

    let unpaid: Vec<(u64, String)> = store
        .read(|doc| doc.unpaid_cases().map(|(m, c)| (m, c.reason.clone())).collect())
        .unwrap();
    assert_eq!(unpaid, vec![(1, "a".to_string()), (2, "c".to_string())]);
}
