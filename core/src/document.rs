//! The ledger document: the single persisted aggregate.
//!
//! RULE: Defaults for fields missing from older files are applied here,
//! once, at the deserialization boundary. Nothing downstream checks for
//! "missing key".
//!
//! Layout on disk:
//!   config      → log channel + tier badge table
//!   case_id     → last case sequence ever issued (never decreases)
//!   users       → member id → chronological case list
//!   admin_logs  → append-only audit trail

use crate::types::{CaseId, ChannelId, MemberId, Tier};
use chrono::{DateTime, Datelike, IsoWeek, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display format for `time` fields, kept compatible with existing files.
pub const TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn format_time(at: DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub config: GuildConfig,
    #[serde(rename = "case_id", default)]
    pub case_counter: u64,
    #[serde(default)]
    pub users: BTreeMap<MemberId, Vec<CaseRecord>>,
    #[serde(default)]
    pub admin_logs: Vec<AuditEntry>,
}

impl LedgerDocument {
    /// Bump the counter and derive the next case id.
    pub fn allocate_case_id(&mut self) -> CaseId {
        self.case_counter += 1;
        CaseId::from_sequence(self.case_counter)
    }

    pub fn history(&self, member: MemberId) -> &[CaseRecord] {
        self.users.get(&member).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn case_count(&self, member: MemberId) -> usize {
        self.history(member).len()
    }

    pub fn find_case(&self, member: MemberId, case: &CaseId) -> Option<&CaseRecord> {
        self.history(member).iter().find(|c| &c.case == case)
    }
}

/// Guild-level settings that admins can change at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildConfig {
    #[serde(default)]
    pub log_channel: Option<ChannelId>,
    #[serde(default = "default_tier_badges", alias = "scar_roles")]
    pub tier_badges: BTreeMap<Tier, String>,
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            log_channel: None,
            tier_badges: default_tier_badges(),
        }
    }
}

impl GuildConfig {
    pub fn badge_for(&self, tier: Tier) -> Option<&str> {
        self.tier_badges.get(&tier).map(String::as_str)
    }
}

fn default_tier_badges() -> BTreeMap<Tier, String> {
    (1..=crate::escalation::MAX_TIER)
        .map(|t| (t, format!("Scar {t}")))
        .collect()
}

/// One recorded violation against a member.
///
/// Immutable once written, except for the one-way unpaid → paid flip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case: CaseId,
    pub reason: String,
    #[serde(rename = "by")]
    pub issued_by: String,
    pub time: String,
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Overdue,
    Paid,
}

impl CaseRecord {
    /// Derived, never stored: past the deadline and still unpaid.
    /// A case without a deadline is never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.paid && self.deadline.is_some_and(|d| now > d)
    }

    /// ISO week (year included) the case was issued in, read back from
    /// `time`. `None` if the stamp does not parse.
    pub fn issued_week(&self) -> Option<IsoWeek> {
        NaiveDateTime::parse_from_str(&self.time, TIME_FORMAT)
            .ok()
            .map(|at| at.iso_week())
    }

    pub fn payment_status(&self, now: DateTime<Utc>) -> PaymentStatus {
        if self.paid {
            PaymentStatus::Paid
        } else if self.is_overdue(now) {
            PaymentStatus::Overdue
        } else {
            PaymentStatus::Unpaid
        }
    }
}

/// One administrative action. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: String,
    pub admin: String,
    /// Member id for ledger actions, channel id for `set_log_channel`,
    /// 0 when the action has no single subject.
    pub target: u64,
    pub time: String,
}
