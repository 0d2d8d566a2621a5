//! Shared primitive types used across the entire ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A community member, as identified by the chat platform.
pub type MemberId = u64;

/// A text channel on the chat platform.
pub type ChannelId = u64;

/// Escalation bucket derived from a member's case count. 0 = clean.
pub type Tier = u8;

/// Case identifier, e.g. `#0042`.
///
/// Derived from the persisted case counter. Never reissued, even after the
/// case it named was undone or reset away.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("#{seq:04}"))
    }

    /// Parse user input such as `#0007`, `0007` or `7`.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.trim().trim_start_matches('#');
        let seq: u64 = digits.parse().ok()?;
        Some(Self::from_sequence(seq))
    }

    /// The counter value this id was allocated from.
    pub fn sequence(&self) -> Option<u64> {
        self.0.trim_start_matches('#').parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
