//! Badge reconciler tests: one tier badge at most, idempotent, failure-tolerant.

use scar_ledger_core::{
    badges::BadgeReconciler,
    document::GuildConfig,
    platform::{ChatPlatform, MemoryPlatform},
};
use std::{collections::BTreeSet, sync::Arc, time::Duration};

const TIMEOUT: Duration = Duration::from_secs(1);

fn build() -> (BadgeReconciler, Arc<MemoryPlatform>) {
    let platform = Arc::new(MemoryPlatform::new(["Scar 1", "Scar 2", "Scar 3"]));
    let dyn_platform: Arc<dyn ChatPlatform> = platform.clone();
    (BadgeReconciler::new(dyn_platform, TIMEOUT), platform)
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Reconciling twice with the same count leaves the same single badge.
#[tokio::test]
async fn reconcile_is_idempotent() {
    let (reconciler, platform) = build();
    let config = GuildConfig::default();

    let first = reconciler.reconcile(1, 2, &config).await;
    assert_eq!(platform.badges_of(1), set(&["Scar 2"]));
    assert_eq!(first.added.as_deref(), Some("Scar 2"));

    let second = reconciler.reconcile(1, 2, &config).await;
    assert_eq!(platform.badges_of(1), set(&["Scar 2"]));
    assert!(second.removed.is_empty());
    assert!(second.added.is_none());
    assert!(second.warnings.is_empty());
}

/// Stale tier badges go; unrelated badges stay.
#[tokio::test]
async fn stale_badges_are_replaced() {
    let (reconciler, platform) = build();
    platform.grant(1, "Scar 1");
    platform.grant(1, "Scar 2");
    platform.grant(1, "Veteran");

    let report = reconciler.reconcile(1, 5, &GuildConfig::default()).await;

    assert_eq!(report.tier, 3);
    assert_eq!(platform.badges_of(1), set(&["Scar 3", "Veteran"]));
    assert_eq!(report.removed, vec!["Scar 1".to_string(), "Scar 2".to_string()]);
}

/// Tier 0 strips every tier badge and adds nothing.
#[tokio::test]
async fn clean_member_holds_no_tier_badge() {
    let (reconciler, platform) = build();
    platform.grant(1, "Scar 3");

    let report = reconciler.reconcile(1, 0, &GuildConfig::default()).await;
    assert!(platform.badges_of(1).is_empty());
    assert_eq!(report.tier, 0);
    assert!(report.added.is_none());

    let again = reconciler.reconcile(1, 0, &GuildConfig::default()).await;
    assert!(platform.badges_of(1).is_empty());
    assert!(again.removed.is_empty());
}

/// A configured badge missing on the platform is skipped silently.
#[tokio::test]
async fn missing_platform_badge_is_skipped() {
    let platform = Arc::new(MemoryPlatform::new(["Scar 1", "Scar 2"]));
    let reconciler = BadgeReconciler::new(platform.clone(), TIMEOUT);

    let report = reconciler.reconcile(1, 3, &GuildConfig::default()).await;
    assert!(platform.badges_of(1).is_empty());
    assert!(report.warnings.is_empty());
    assert!(report.added.is_none());
}

/// A failing remove is a warning; the pass carries on and adds the new badge.
#[tokio::test]
async fn remove_failure_does_not_stop_the_pass() {
    let (reconciler, platform) = build();
    platform.grant(1, "Scar 1");
    platform.fail_badge("Scar 1");

    let report = reconciler.reconcile(1, 2, &GuildConfig::default()).await;

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.added.as_deref(), Some("Scar 2"));
    assert!(platform.badges_of(1).contains("Scar 2"));
}

/// A platform that never answers in time yields warnings, not a hang.
#[tokio::test(start_paused = true)]
async fn slow_platform_times_out() {
    let platform = Arc::new(
        MemoryPlatform::new(["Scar 1", "Scar 2", "Scar 3"]).with_delay(Duration::from_secs(30)),
    );
    let reconciler = BadgeReconciler::new(platform.clone(), Duration::from_millis(50));

    let report = reconciler.reconcile(1, 1, &GuildConfig::default()).await;

    assert!(!report.warnings.is_empty());
    assert!(report.added.is_none());
}

/// Badge names come from the configured table, so renamed tiers are honored.
#[tokio::test]
async fn custom_badge_table_is_used() {
    let platform = Arc::new(MemoryPlatform::new(["Bronze", "Silver", "Gold"]));
    let reconciler = BadgeReconciler::new(platform.clone(), TIMEOUT);
    let mut config = GuildConfig::default();
    config.tier_badges = [(1, "Bronze"), (2, "Silver"), (3, "Gold")]
        .into_iter()
        .map(|(t, n)| (t, n.to_string()))
        .collect();
    platform.grant(1, "Bronze");

    reconciler.reconcile(1, 2, &config).await;
    assert_eq!(platform.badges_of(1), set(&["Silver"]));
}
