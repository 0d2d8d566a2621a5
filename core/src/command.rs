use crate::{
    document::{AuditEntry, CaseRecord},
    report::{HistoryView, LeaderboardRow, WeeklyReport},
    types::{ChannelId, MemberId, Tier},
};
use serde::{Deserialize, Serialize};

/// All admin-surface commands.
/// Variants added as the surface grows, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    // ── Case ledger ───────────────────────────────
    RecordViolation { member: MemberId, reason: String },
    UndoLast { member: MemberId },
    Reset { member: MemberId },

    // ── Views ─────────────────────────────────────
    ViewOwnHistory,
    ViewLeaderboard,
    WeeklyReport,
    AdminActionHistory,

    // ── Payment ───────────────────────────────────
    ConfirmPayment {
        member: MemberId,
        #[serde(default)]
        case:   Option<String>,
        #[serde(default)]
        note:   Option<String>,
    },

    // ── Configuration ─────────────────────────────
    SetLogChannel { channel: ChannelId },
    SetTierBadge { tier: Tier, name: String },
}

impl AdminCommand {
    /// Commands anyone may run. Everything else needs admin rights.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::ViewOwnHistory | Self::ViewLeaderboard)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RecordViolation { .. } => "record_violation",
            Self::UndoLast { .. }        => "undo_last",
            Self::Reset { .. }           => "reset",
            Self::ViewOwnHistory         => "view_own_history",
            Self::ViewLeaderboard        => "view_leaderboard",
            Self::WeeklyReport           => "weekly_report",
            Self::AdminActionHistory     => "admin_action_history",
            Self::ConfirmPayment { .. }  => "confirm_payment",
            Self::SetLogChannel { .. }   => "set_log_channel",
            Self::SetTierBadge { .. }    => "set_tier_badge",
        }
    }
}

/// Who issued a command. `is_admin` comes from the platform's permission
/// lookup, which happens before the desk is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoker {
    pub id:       MemberId,
    pub name:     String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Success,
    Info,
    Rejected,
    Denied,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum View {
    Case(CaseRecord),
    History(HistoryView),
    Leaderboard(Vec<LeaderboardRow>),
    Weekly(WeeklyReport),
    AuditTrail(Vec<AuditEntry>),
}

/// What the invoker sees. Warnings describe secondary effects (badges,
/// notices) that failed after the ledger write had already committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReply {
    pub status:   ReplyStatus,
    pub message:  String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view:     Option<View>,
}

impl CommandReply {
    pub fn new(status: ReplyStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            warnings: Vec::new(),
            view: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ReplyStatus::Success, message)
    }

    /// Generic fault text. Details go to the log, never to the invoker.
    pub fn internal_error() -> Self {
        Self::new(ReplyStatus::Failed, "Internal error; an admin should check the logs")
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        if !warnings.is_empty() {
            self.message.push_str(" (but a secondary effect failed)");
        }
        self.warnings = warnings;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ReplyStatus::Success
    }
}
