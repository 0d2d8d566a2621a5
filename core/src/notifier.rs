//! Notifier: turns ledger events into notices and delivers them.
//!
//! Log-channel notices go out for every committed admin action when a log
//! channel is configured. A recorded case is also sent to the member.

use crate::{
    escalation::{banner_for, color_for},
    event::LedgerEvent,
    platform::{bounded, ChatPlatform, Notice},
    types::{ChannelId, MemberId},
};
use std::{sync::Arc, time::Duration};

const AMNESTY_COLOR: u32 = 0xC9A227;
const REDUCTION_COLOR: u32 = 0x1ABC9C;
const PAID_COLOR: u32 = 0x2ECC71;
const CONFIG_COLOR: u32 = 0x7F8C8D;

pub struct Notifier {
    platform: Arc<dyn ChatPlatform>,
    timeout:  Duration,
}

impl Notifier {
    pub fn new(platform: Arc<dyn ChatPlatform>, timeout: Duration) -> Self {
        Self { platform, timeout }
    }

    /// Deliver the notices for `event`. Returns one warning per failed delivery.
    pub async fn announce(&self, event: &LedgerEvent, log_channel: Option<ChannelId>) -> Vec<String> {
        let mut warnings = Vec::new();
        let notice = notice_for(event);

        if let Some(channel) = log_channel {
            let sent = bounded(self.timeout, self.platform.post_to_channel(channel, &notice)).await;
            if let Err(e) = sent {
                log::warn!("Log channel notice for {} failed: {e}", event.kind());
                warnings.push(format!("log channel notice failed: {e}"));
            }
        }

        if let LedgerEvent::CaseRecorded { member, .. } = event {
            if let Err(e) = self.direct(*member, &notice).await {
                warnings.push(format!("direct notice to member failed: {e}"));
            }
        }
        warnings
    }

    /// Direct message to one member, bounded and logged on failure.
    pub async fn direct(&self, member: MemberId, notice: &Notice) -> Result<(), crate::platform::PlatformError> {
        let sent = bounded(self.timeout, self.platform.notify_member(member, notice)).await;
        if let Err(e) = &sent {
            log::warn!("Direct notice to member {member} failed: {e}");
        }
        sent
    }
}

pub fn notice_for(event: &LedgerEvent) -> Notice {
    match event {
        LedgerEvent::CaseRecorded { member, record, count, tier, penalty } => {
            let mut notice = Notice::new(
                "Scar recorded",
                format!("{}: the scar has been written into the record", banner_for(*tier)),
                color_for(*tier),
            )
            .field("Case ID", record.case.to_string())
            .field("Member", member.to_string())
            .field("Reason", record.reason.clone())
            .field("Total scars", count.to_string());
            if let Some(penalty) = penalty {
                notice = notice.field("Penalty", penalty.description());
            }
            if let Some(deadline) = record.deadline {
                notice = notice.field("Deadline", deadline.to_rfc3339());
            }
            notice
        }
        LedgerEvent::CaseUndone { member, record, count, .. } => Notice::new(
            "Scar reduced",
            format!("Member {member} had {} removed", record.case),
            REDUCTION_COLOR,
        )
        .field("Total scars", count.to_string()),
        LedgerEvent::HistoryReset { member, cleared } => Notice::new(
            "Amnesty",
            format!("The record of member {member} has been cleaned"),
            AMNESTY_COLOR,
        )
        .field("Scars cleared", cleared.to_string()),
        LedgerEvent::PaymentConfirmed { member, record, admin } => Notice::new(
            "Penalty settled",
            format!("{} for member {member} confirmed paid by {admin}", record.case),
            PAID_COLOR,
        ),
        LedgerEvent::LogChannelSet { channel, admin } => Notice::new(
            "Log channel set",
            format!("Admin actions will be logged to channel {channel} (set by {admin})"),
            CONFIG_COLOR,
        ),
        LedgerEvent::TierBadgeSet { tier, badge, admin } => Notice::new(
            "Tier badge changed",
            format!("Tier {tier} now maps to badge {badge:?} (set by {admin})"),
            CONFIG_COLOR,
        ),
    }
}
