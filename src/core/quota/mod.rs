//! Quota accounting over daily and monthly token windows

pub mod ledger;
pub mod window;

pub use ledger::QuotaLedger;
