//! Badge reconciler: makes a member's visible tier badge match their count.
//!
//! RULE: After `reconcile()` the member holds at most one configured tier
//! badge, the one for `tier(count)`. Running it twice changes nothing.
//! It runs after the ledger write has committed and never rolls it back.

use crate::{
    document::GuildConfig,
    escalation::tier,
    platform::{bounded, ChatPlatform},
    types::{MemberId, Tier},
};
use std::{collections::BTreeSet, sync::Arc, time::Duration};

/// What a reconcile pass did, and what went wrong on the side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub tier:     Tier,
    pub removed:  Vec<String>,
    pub added:    Option<String>,
    pub warnings: Vec<String>,
}

pub struct BadgeReconciler {
    platform: Arc<dyn ChatPlatform>,
    timeout:  Duration,
}

impl BadgeReconciler {
    pub fn new(platform: Arc<dyn ChatPlatform>, timeout: Duration) -> Self {
        Self { platform, timeout }
    }

    pub async fn reconcile(
        &self,
        member: MemberId,
        count: usize,
        config: &GuildConfig,
    ) -> ReconcileReport {
        let tier = tier(count);
        let target = config.badge_for(tier).filter(|_| tier > 0);
        let configured: BTreeSet<&str> = config.tier_badges.values().map(String::as_str).collect();
        let mut report = ReconcileReport { tier, ..Default::default() };

        // If the member's badges can't be read, try removing every configured
        // badge. Removing a badge the member doesn't hold is harmless.
        let held: Option<BTreeSet<String>> =
            match bounded(self.timeout, self.platform.member_badges(member)).await {
                Ok(held) => Some(held.into_iter().collect()),
                Err(e) => {
                    log::warn!("Could not read badges of member {member}: {e}");
                    report.warnings.push(format!("could not read badges: {e}"));
                    None
                }
            };
        let holds = |name: &str| held.as_ref().map_or(true, |h| h.contains(name));

        for name in configured.iter().copied() {
            if Some(name) == target || !holds(name) {
                continue;
            }
            match bounded(self.timeout, self.platform.remove_badge(member, name)).await {
                Ok(()) => report.removed.push(name.to_string()),
                Err(e) => {
                    log::warn!("Failed to remove badge {name:?} from member {member}: {e}");
                    report.warnings.push(format!("failed to remove badge {name:?}: {e}"));
                }
            }
        }

        let Some(name) = target else {
            return report;
        };
        if held.as_ref().is_some_and(|h| h.contains(name)) {
            return report;
        }
        match bounded(self.timeout, self.platform.badge_exists(name)).await {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("Badge {name:?} does not exist on the platform; skipping");
                return report;
            }
            Err(e) => {
                log::warn!("Could not look up badge {name:?}: {e}");
                report.warnings.push(format!("could not look up badge {name:?}: {e}"));
                return report;
            }
        }
        match bounded(self.timeout, self.platform.add_badge(member, name)).await {
            Ok(()) => report.added = Some(name.to_string()),
            Err(e) => {
                log::warn!("Failed to add badge {name:?} to member {member}: {e}");
                report.warnings.push(format!("failed to add badge {name:?}: {e}"));
            }
        }
        report
    }
}
