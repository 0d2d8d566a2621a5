//! Audit log tests: append-only trail of admin actions.

use chrono::{TimeZone, Utc};
use scar_ledger_core::LedgerStore;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

/// Every committed admin action leaves exactly one entry.
#[test]
fn each_action_appends_one_entry() {
    let store = LedgerStore::in_memory();
    store.record(1, "a", "alice", now(), None).unwrap();
    store.undo_last(1, "bob", now()).unwrap();
    store.reset(1, "alice", now()).unwrap();
    store.set_log_channel(900, "carol", now()).unwrap();

    let trail = store.recent_audit(10).unwrap();
    let actions: Vec<&str> = trail.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["record_violation", "undo_last", "reset", "set_log_channel"]);
    assert_eq!(trail[1].admin, "bob");
    assert_eq!(trail[1].target, 1);
    assert_eq!(trail[3].target, 900);
    assert_eq!(trail[0].time, "02/03/2026 10:00");
}

/// Failed actions leave no trace.
#[test]
fn failed_actions_are_not_audited() {
    let store = LedgerStore::in_memory();
    assert!(store.undo_last(1, "mod", now()).is_err());
    assert!(store.record(1, "", "mod", now(), None).is_err());
    assert!(store.set_tier_badge(7, "Nope", "mod", now()).is_err());
    assert_eq!(store.audit_len().unwrap(), 0);
}

/// The display limit caps what is shown, never what is stored.
#[test]
fn recent_audit_caps_display_only() {
    let store = LedgerStore::in_memory();
    for i in 0..30u64 {
        store.record(i, "r", &format!("mod-{i}"), now(), None).unwrap();
    }

    let recent = store.recent_audit(5).unwrap();
    let admins: Vec<&str> = recent.iter().map(|e| e.admin.as_str()).collect();
    assert_eq!(admins, vec!["mod-25", "mod-26", "mod-27", "mod-28", "mod-29"]);
    assert_eq!(store.audit_len().unwrap(), 30);
    assert_eq!(store.recent_audit(100).unwrap().len(), 30);
}
