use crate::platform::PlatformError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Member {member} has no recorded cases")]
    EmptyHistory { member: u64 },

    #[error("Case {case} is already paid")]
    AlreadyPaid { case: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Ledger file {path} is corrupt: {source}")]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    /// Informational outcomes are surfaced as a no-op, not a fault.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::EmptyHistory { .. } | Self::AlreadyPaid { .. }
        )
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
