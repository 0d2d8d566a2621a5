//! The admin desk: where commands become ledger changes.
//!
//! EXECUTION ORDER for every mutating command (fixed):
//!   1. Permission check (admin-only unless the command is open).
//!   2. Ledger mutation + audit entry, one critical section, persisted.
//!   3. Badge reconciliation, outside the lock.
//!   4. Notices (log channel, direct message), outside the lock.
//!
//! RULES:
//!   - Steps 3 and 4 never fail the command. Their errors become warnings.
//!   - A fault inside one command is reported to that invoker only.

use crate::{
    badges::BadgeReconciler,
    clock::Clock,
    command::{AdminCommand, CommandReply, Invoker, ReplyStatus, View},
    config::LedgerConfig,
    error::{LedgerError, LedgerResult},
    escalation::{penalty_for, tier},
    event::LedgerEvent,
    notifier::Notifier,
    platform::ChatPlatform,
    reminder::ReminderScheduler,
    report::{history_view, leaderboard, weekly_report},
    store::LedgerStore,
    types::{CaseId, MemberId},
};
use std::sync::Arc;

pub struct AdminDesk {
    store:    Arc<LedgerStore>,
    platform: Arc<dyn ChatPlatform>,
    clock:    Arc<dyn Clock>,
    config:   LedgerConfig,
    badges:   BadgeReconciler,
    notifier: Notifier,
    /// Serializes badge syncs so two commands can't interleave
    /// their remove/add calls.
    badge_sync: tokio::sync::Mutex<()>,
}

impl AdminDesk {
    pub fn new(
        store: Arc<LedgerStore>,
        platform: Arc<dyn ChatPlatform>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Self {
        let timeout = config.platform_timeout();
        Self {
            badges: BadgeReconciler::new(platform.clone(), timeout),
            notifier: Notifier::new(platform.clone(), timeout),
            badge_sync: tokio::sync::Mutex::new(()),
            store,
            platform,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// A reminder scheduler sharing this desk's store, platform and clock.
    pub fn reminder_scheduler(&self) -> ReminderScheduler {
        ReminderScheduler::new(
            self.store.clone(),
            Notifier::new(self.platform.clone(), self.config.platform_timeout()),
            self.clock.clone(),
            self.config.reminder_warning(),
        )
    }

    pub async fn execute(&self, invoker: &Invoker, command: AdminCommand) -> CommandReply {
        let name = command.name();
        let outcome = match authorize(invoker, &command) {
            Ok(()) => self.dispatch(invoker, command).await,
            Err(e) => Err(e),
        };
        outcome.unwrap_or_else(|e| reply_for_error(name, e))
    }

    /// Run the command on its own task, so a panic inside it reaches
    /// only this invoker.
    pub async fn execute_isolated(self: &Arc<Self>, invoker: Invoker, command: AdminCommand) -> CommandReply {
        let desk = Arc::clone(self);
        let name = command.name();
        match tokio::spawn(async move { desk.execute(&invoker, command).await }).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("Command {name} aborted: {e}");
                CommandReply::internal_error()
            }
        }
    }

    async fn dispatch(&self, invoker: &Invoker, command: AdminCommand) -> LedgerResult<CommandReply> {
        let now = self.clock.now();
        let admin = invoker.name.as_str();

        match command {
            AdminCommand::RecordViolation { member, reason } => {
                let (record, count) =
                    self.store.record_counted(member, &reason, admin, now, self.config.grace_period())?;
                let event = LedgerEvent::CaseRecorded {
                    member,
                    record: record.clone(),
                    count,
                    tier: tier(count),
                    penalty: penalty_for(count),
                };
                let warnings = self.after_commit(Some(member), &event).await;
                Ok(CommandReply::success(format!(
                    "{} recorded for member {member}; total scars: {count}",
                    record.case
                ))
                .with_view(View::Case(record))
                .with_warnings(warnings))
            }

            AdminCommand::UndoLast { member } => {
                let (record, count) = self.store.undo_last_counted(member, admin, now)?;
                let event = LedgerEvent::CaseUndone { member, record: record.clone(), count, tier: tier(count) };
                let warnings = self.after_commit(Some(member), &event).await;
                Ok(CommandReply::success(format!("{} removed from member {member}", record.case))
                    .with_view(View::Case(record))
                    .with_warnings(warnings))
            }

            AdminCommand::Reset { member } => {
                let cleared = self.store.reset(member, admin, now)?;
                let event = LedgerEvent::HistoryReset { member, cleared };
                let warnings = self.after_commit(Some(member), &event).await;
                Ok(CommandReply::success(format!("Record of member {member} cleaned"))
                    .with_warnings(warnings))
            }

            AdminCommand::ConfirmPayment { member, case, note } => {
                let case = case
                    .as_deref()
                    .map(|raw| {
                        CaseId::parse(raw)
                            .ok_or_else(|| LedgerError::Validation(format!("{raw:?} is not a case id")))
                    })
                    .transpose()?;
                let record = self.store.confirm(member, case.as_ref(), admin, note.as_deref(), now)?;
                let event = LedgerEvent::PaymentConfirmed {
                    member,
                    record: record.clone(),
                    admin: admin.to_string(),
                };
                let warnings = self.after_commit(None, &event).await;
                Ok(CommandReply::success(format!("{} confirmed paid", record.case))
                    .with_view(View::Case(record))
                    .with_warnings(warnings))
            }

            AdminCommand::SetLogChannel { channel } => {
                self.store.set_log_channel(channel, admin, now)?;
                let event = LedgerEvent::LogChannelSet { channel, admin: admin.to_string() };
                let warnings = self.after_commit(None, &event).await;
                Ok(CommandReply::success(format!("Log channel set to {channel}")).with_warnings(warnings))
            }

            AdminCommand::SetTierBadge { tier, name } => {
                self.store.set_tier_badge(tier, &name, admin, now)?;
                let event = LedgerEvent::TierBadgeSet {
                    tier,
                    badge: name.trim().to_string(),
                    admin: admin.to_string(),
                };
                let warnings = self.after_commit(None, &event).await;
                Ok(CommandReply::success(format!("Tier {tier} badge updated")).with_warnings(warnings))
            }

            AdminCommand::ViewOwnHistory => {
                let view = self.store.read(|doc| history_view(doc, invoker.id, now))?;
                let message = if view.count == 0 {
                    "Clean record: no scars".to_string()
                } else {
                    format!("{} scar(s) on record", view.count)
                };
                Ok(CommandReply::success(message).with_view(View::History(view)))
            }

            AdminCommand::ViewLeaderboard => {
                let rows = self.store.read(|doc| leaderboard(doc, self.config.leaderboard_limit))?;
                Ok(CommandReply::success(format!("{} member(s) with scars", rows.len()))
                    .with_view(View::Leaderboard(rows)))
            }

            AdminCommand::WeeklyReport => {
                let report = self.store.read(|doc| weekly_report(doc, now))?;
                Ok(CommandReply::success(format!("Week {} of {}: {} scar(s)", report.week, report.year, report.total))
                    .with_view(View::Weekly(report)))
            }

            AdminCommand::AdminActionHistory => {
                let entries = self.store.recent_audit(self.config.audit_display_limit)?;
                Ok(CommandReply::success(format!("{} recent admin action(s)", entries.len()))
                    .with_view(View::AuditTrail(entries)))
            }
        }
    }

    /// Secondary effects of a committed change. Never fails; returns warnings.
    async fn after_commit(&self, reconcile: Option<MemberId>, event: &LedgerEvent) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(member) = reconcile {
            // Count and config are read under the sync lock, so the last
            // sync to run always sees the latest committed count.
            let _sync = self.badge_sync.lock().await;
            let current = self.store.case_count(member).and_then(|count| {
                self.store.guild_config().map(|config| (count, config))
            });
            match current {
                Ok((count, config)) => {
                    warnings.extend(self.badges.reconcile(member, count, &config).await.warnings)
                }
                Err(e) => {
                    log::error!("Badge sync for member {member} skipped: {e}");
                    warnings.push(format!("badge sync skipped: {e}"));
                }
            }
        }

        match self.store.guild_config() {
            Ok(config) => warnings.extend(self.notifier.announce(event, config.log_channel).await),
            Err(e) => {
                log::error!("Notices for {} skipped: {e}", event.kind());
                warnings.push(format!("notices skipped: {e}"));
            }
        }
        log::debug!("{} applied with {} warning(s)", event.kind(), warnings.len());
        warnings
    }
}

/// Admin-only unless the command is open to everyone.
fn authorize(invoker: &Invoker, command: &AdminCommand) -> LedgerResult<()> {
    if command.is_open() || invoker.is_admin {
        return Ok(());
    }
    log::info!("{} ({}) denied {}", invoker.name, invoker.id, command.name());
    Err(LedgerError::PermissionDenied("You do not have permission".into()))
}

fn reply_for_error(command: &str, error: LedgerError) -> CommandReply {
    match error {
        LedgerError::Validation(msg) => CommandReply::new(ReplyStatus::Rejected, msg),
        LedgerError::PermissionDenied(msg) => CommandReply::new(ReplyStatus::Denied, msg),
        LedgerError::EmptyHistory { member } => {
            CommandReply::new(ReplyStatus::Info, format!("Member {member} has no scars"))
        }
        e if e.is_informational() => CommandReply::new(ReplyStatus::Info, e.to_string()),
        e => {
            log::error!("Command {command} failed: {e}");
            CommandReply::internal_error()
        }
    }
}
