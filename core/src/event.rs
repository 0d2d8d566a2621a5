//! Ledger events: what happened, for whoever needs to hear about it.
//!
//! RULE: Events are built after the ledger write commits. They carry
//! everything a notice needs, so notifying never reads the ledger again.

use crate::{
    document::CaseRecord,
    escalation::Penalty,
    types::{ChannelId, MemberId, Tier},
};
use serde::{Deserialize, Serialize};

/// Variants are added as commands are added, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    // ── Case ledger ────────────────────────────────
    CaseRecorded {
        member:  MemberId,
        record:  CaseRecord,
        count:   usize,
        tier:    Tier,
        penalty: Option<Penalty>,
    },
    CaseUndone {
        member: MemberId,
        record: CaseRecord,
        count:  usize,
        tier:   Tier,
    },
    HistoryReset {
        member:  MemberId,
        cleared: usize,
    },

    // ── Payment ────────────────────────────────────
    PaymentConfirmed {
        member: MemberId,
        record: CaseRecord,
        admin:  String,
    },

    // ── Configuration ──────────────────────────────
    LogChannelSet {
        channel: ChannelId,
        admin:   String,
    },
    TierBadgeSet {
        tier:  Tier,
        badge: String,
        admin: String,
    },
}

impl LedgerEvent {
    /// Stable name, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CaseRecorded { .. }     => "case_recorded",
            Self::CaseUndone { .. }       => "case_undone",
            Self::HistoryReset { .. }     => "history_reset",
            Self::PaymentConfirmed { .. } => "payment_confirmed",
            Self::LogChannelSet { .. }    => "log_channel_set",
            Self::TierBadgeSet { .. }     => "tier_badge_set",
        }
    }
}
