//! Escalation engine: pure functions of a member's case count.
//!
//! RULE: Tier is capped, penalties are not. The penalty table is keyed by the
//! exact raw count and is sparse: a count with no entry mandates nothing new.
//! Never interpolate between thresholds.

use crate::types::Tier;
use serde::{Deserialize, Serialize};

pub const MAX_TIER: Tier = 3;

/// Embed color for a clean record.
pub const CLEAN_COLOR: u32 = 0x2980B9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    Warning,
    FineTier1,
    FineTier2,
    Suspension,
    PermanentBan,
}

impl Penalty {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Warning      => "Formal warning",
            Self::FineTier1    => "Fine, tier 1",
            Self::FineTier2    => "Fine, tier 2",
            Self::Suspension   => "Temporary suspension",
            Self::PermanentBan => "Permanent ban",
        }
    }
}

pub fn tier(count: usize) -> Tier {
    count.min(MAX_TIER as usize) as Tier
}

pub fn penalty_for(count: usize) -> Option<Penalty> {
    match count {
        1 => Some(Penalty::Warning),
        2 => Some(Penalty::FineTier1),
        3 => Some(Penalty::FineTier2),
        5 => Some(Penalty::Suspension),
        7 => Some(Penalty::PermanentBan),
        _ => None,
    }
}

pub fn color_for(tier: Tier) -> u32 {
    match tier {
        0 => CLEAN_COLOR,
        1 => 0x8B0000,
        2 => 0xB30000,
        _ => 0x0F0F0F,
    }
}

pub fn banner_for(tier: Tier) -> &'static str {
    match tier {
        0 => "Clean record",
        1 => "First scar",
        2 => "Second scar",
        _ => "Marked: maximum tier",
    }
}
