#![doc(test(attr(deny(warnings))))]

//! Ledger Core keeps a personal-finance ledger consistent on-device: derived
//! account balances, whole-account transfers, cascading deletes, an offline
//! mutation queue, and migration of legacy category references.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod migration;
pub mod storage;
pub mod sync;
pub mod utils;

pub use crate::core::{LedgerManager, LedgerStore};
pub use errors::{LedgerError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}
