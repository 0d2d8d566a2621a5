use super::LedgerStore;
use crate::{
    document::GuildConfig,
    error::{LedgerError, LedgerResult},
    escalation::MAX_TIER,
    types::{ChannelId, Tier},
};
use chrono::{DateTime, Utc};

impl LedgerStore {
    // ── Guild configuration ────────────────────────────────────────

    pub fn guild_config(&self) -> LedgerResult<GuildConfig> {
        self.read(|doc| doc.config.clone())
    }

    pub fn set_log_channel(
        &self,
        channel: ChannelId,
        admin: &str,
        now: DateTime<Utc>,
    ) -> LedgerResult<()> {
        self.mutate(|doc| {
            doc.config.log_channel = Some(channel);
            doc.append_audit("set_log_channel", admin, channel, now);
            Ok(())
        })?;
        log::info!("Log channel set to {channel} by {admin}");
        Ok(())
    }

    pub fn set_tier_badge(
        &self,
        tier: Tier,
        name: &str,
        admin: &str,
        now: DateTime<Utc>,
    ) -> LedgerResult<()> {
        if tier == 0 || tier > MAX_TIER {
            return Err(LedgerError::Validation(format!(
                "tier must be between 1 and {MAX_TIER}, got {tier}"
            )));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("badge name must not be empty".into()));
        }
        self.mutate(|doc| {
            doc.config.tier_badges.insert(tier, name.to_string());
            doc.append_audit(&format!("set_tier_badge:{tier}"), admin, 0, now);
            Ok(())
        })?;
        log::info!("Tier {tier} badge set to {name:?} by {admin}");
        Ok(())
    }
}
