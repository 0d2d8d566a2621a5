//! Scar ledger: a discipline record for a role-play community.
//!
//! Admins record cases against members. Each member's case count drives an
//! escalation tier and a visible tier badge; each case carries a payment
//! deadline, and a background sweep reminds members whose deadline is near.

pub mod badges;
pub mod clock;
pub mod command;
pub mod config;
pub mod desk;
pub mod document;
pub mod error;
pub mod escalation;
pub mod event;
pub mod notifier;
pub mod platform;
pub mod reminder;
pub mod report;
pub mod store;
pub mod types;

pub use command::{AdminCommand, CommandReply, Invoker, ReplyStatus, View};
pub use desk::AdminDesk;
pub use error::{LedgerError, LedgerResult};
pub use store::LedgerStore;
