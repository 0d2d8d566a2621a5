use super::{ChatPlatform, Notice, PlatformError};
use crate::types::{ChannelId, MemberId};
use async_trait::async_trait;
use serde::Serialize;
use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::{Mutex, MutexGuard},
    time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DeliveryTarget {
    Channel(ChannelId),
    Member(MemberId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub target: DeliveryTarget,
    pub notice: Notice,
}

#[derive(Debug, Default)]
struct MemoryState {
    badges:         HashMap<MemberId, BTreeSet<String>>,
    known_badges:   HashSet<String>,
    deliveries:     Vec<Delivery>,
    unreachable:    HashSet<MemberId>,
    failing_badges: HashSet<String>,
    badge_calls:    usize,
}

/// In-process platform: badge sets per member plus a delivery log.
///
/// Stands in for the real chat platform in tests and in the runner's
/// stand-alone mode. Failures can be injected per member or per badge.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    state: Mutex<MemoryState>,
    delay: Option<Duration>,
}

impl MemoryPlatform {
    pub fn new<I, S>(known_badges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let platform = Self::default();
        platform.lock().known_badges = known_badges.into_iter().map(Into::into).collect();
        platform
    }

    /// Every call sleeps this long first. Used to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn grant(&self, member: MemberId, badge: &str) {
        self.lock().badges.entry(member).or_default().insert(badge.to_string());
    }

    pub fn badges_of(&self, member: MemberId) -> BTreeSet<String> {
        self.lock().badges.get(&member).cloned().unwrap_or_default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock().deliveries.clone()
    }

    pub fn deliveries_to(&self, target: DeliveryTarget) -> Vec<Notice> {
        self.lock()
            .deliveries
            .iter()
            .filter(|d| d.target == target)
            .map(|d| d.notice.clone())
            .collect()
    }

    /// Direct messages to this member fail from now on.
    pub fn make_unreachable(&self, member: MemberId) {
        self.lock().unreachable.insert(member);
    }

    /// Adding or removing this badge fails from now on.
    pub fn fail_badge(&self, name: &str) {
        self.lock().failing_badges.insert(name.to_string());
    }

    /// Number of add/remove calls made so far.
    pub fn badge_calls(&self) -> usize {
        self.lock().badge_calls
    }
}

#[async_trait]
impl ChatPlatform for MemoryPlatform {
    async fn member_badges(&self, member: MemberId) -> Result<Vec<String>, PlatformError> {
        self.pause().await;
        Ok(self.badges_of(member).into_iter().collect())
    }

    async fn badge_exists(&self, name: &str) -> Result<bool, PlatformError> {
        self.pause().await;
        Ok(self.lock().known_badges.contains(name))
    }

    async fn add_badge(&self, member: MemberId, name: &str) -> Result<(), PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        state.badge_calls += 1;
        if state.failing_badges.contains(name) {
            return Err(PlatformError::Rejected(format!("cannot add {name}")));
        }
        state.badges.entry(member).or_default().insert(name.to_string());
        Ok(())
    }

    async fn remove_badge(&self, member: MemberId, name: &str) -> Result<(), PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        state.badge_calls += 1;
        if state.failing_badges.contains(name) {
            return Err(PlatformError::Rejected(format!("cannot remove {name}")));
        }
        if let Some(held) = state.badges.get_mut(&member) {
            held.remove(name);
        }
        Ok(())
    }

    async fn post_to_channel(&self, channel: ChannelId, notice: &Notice) -> Result<(), PlatformError> {
        self.pause().await;
        log::debug!("channel {channel} <- {}", notice.title);
        self.lock().deliveries.push(Delivery {
            target: DeliveryTarget::Channel(channel),
            notice: notice.clone(),
        });
        Ok(())
    }

    async fn notify_member(&self, member: MemberId, notice: &Notice) -> Result<(), PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        if state.unreachable.contains(&member) {
            return Err(PlatformError::UnknownMember(member));
        }
        log::debug!("member {member} <- {}", notice.title);
        state.deliveries.push(Delivery {
            target: DeliveryTarget::Member(member),
            notice: notice.clone(),
        });
        Ok(())
    }
}
