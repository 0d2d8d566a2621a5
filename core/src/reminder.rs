//! Reminder scheduler: periodic sweep over unpaid cases.
//!
//! EACH SWEEP:
//!   1. Snapshot due reminders under the ledger lock, then release it.
//!   2. Send one direct notice per due case, each with its own timeout.
//!   3. A failed delivery is counted and skipped. No retries.
//!
//! RULES:
//!   - Sweeps never overlap. A tick that finds one running is skipped.
//!   - The sweep only reads the ledger; admin mutations are never blocked
//!     for longer than the snapshot takes.

use crate::{
    clock::Clock,
    document::LedgerDocument,
    error::LedgerResult,
    notifier::Notifier,
    platform::Notice,
    store::LedgerStore,
    types::{CaseId, MemberId},
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::{sync::watch, time::MissedTickBehavior};

const REMINDER_COLOR: u32 = 0xE67E22;
const OVERDUE_COLOR: u32 = 0xC0392B;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Countdown {
    Overdue,
    Remaining { days: i64, hours: i64 },
}

impl Countdown {
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let left = (deadline - now).num_seconds();
        if left <= 0 {
            return Self::Overdue;
        }
        Self::Remaining {
            days:  left / 86_400,
            hours: (left % 86_400) / 3_600,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue => f.write_str("overdue"),
            Self::Remaining { days, hours } => write!(f, "{days}d {hours}h left"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueReminder {
    pub member:    MemberId,
    pub case:      CaseId,
    pub reason:    String,
    pub countdown: Countdown,
}

impl DueReminder {
    pub fn notice(&self) -> Notice {
        let (title, color) = match self.countdown {
            Countdown::Overdue => ("Penalty overdue", OVERDUE_COLOR),
            Countdown::Remaining { .. } => ("Penalty due soon", REMINDER_COLOR),
        };
        Notice::new(title, format!("Case {} is still unpaid", self.case), color)
            .field("Case ID", self.case.to_string())
            .field("Reason", self.reason.clone())
            .field("Time left", self.countdown.to_string())
    }
}

/// Every unpaid case whose deadline is within `warn_within` of `now`,
/// overdue ones included. Cases without a deadline never come due.
pub fn due_reminders(doc: &LedgerDocument, now: DateTime<Utc>, warn_within: Duration) -> Vec<DueReminder> {
    doc.unpaid_cases()
        .filter_map(|(member, c)| {
            let deadline = c.deadline?;
            (deadline - now <= warn_within).then(|| DueReminder {
                member,
                case: c.case.clone(),
                reason: c.reason.clone(),
                countdown: Countdown::until(deadline, now),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub due:     usize,
    pub sent:    usize,
    pub failed:  usize,
    pub skipped: bool,
}

/// Clears the in-progress flag however the sweep ends.
struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ReminderScheduler {
    store:       Arc<LedgerStore>,
    notifier:    Notifier,
    clock:       Arc<dyn Clock>,
    warn_within: Duration,
    in_progress: AtomicBool,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<LedgerStore>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
        warn_within: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            warn_within,
            in_progress: AtomicBool::new(false),
        }
    }

    pub async fn sweep(&self) -> LedgerResult<SweepReport> {
        if self.in_progress.swap(true, Ordering::AcqRel) {
            log::debug!("Reminder sweep already running; skipping this tick");
            return Ok(SweepReport { skipped: true, ..Default::default() });
        }
        let _guard = SweepGuard(&self.in_progress);

        let now = self.clock.now();
        let due = self.store.read(|doc| due_reminders(doc, now, self.warn_within))?;
        let mut report = SweepReport { due: due.len(), ..Default::default() };

        for reminder in &due {
            match self.notifier.direct(reminder.member, &reminder.notice()).await {
                Ok(()) => report.sent += 1,
                Err(_) => report.failed += 1,
            }
        }

        if report.due > 0 {
            log::info!(
                "Reminder sweep: due={} sent={} failed={}",
                report.due,
                report.sent,
                report.failed
            );
        }
        Ok(report)
    }

    /// Sweep every `interval` until `shutdown` flips to true.
    pub async fn run(self: Arc<Self>, interval: std::time::Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        log::error!("Reminder sweep failed: {e}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        log::info!("Reminder scheduler stopping");
                        return;
                    }
                }
            }
        }
    }
}
