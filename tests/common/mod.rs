#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use ledger_core::{
    config::Config,
    core::{FixedClock, LedgerManager, LedgerStore},
    domain::{Direction, Transaction},
    storage::{JsonFileStore, MemoryStore},
};
use tempfile::TempDir;
use uuid::Uuid;

pub const OWNER: &str = "user-1";

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
    ))
}

pub fn empty_store() -> LedgerStore {
    LedgerStore::new(fixed_clock())
}

pub fn config() -> Config {
    Config {
        owner_id: OWNER.into(),
        ..Config::default()
    }
}

pub fn memory_manager() -> LedgerManager {
    LedgerManager::new(Box::new(MemoryStore::new()), &config(), fixed_clock())
}

/// File-backed store in a fresh directory. Keep the guard alive for the test.
pub fn file_store() -> (TempDir, JsonFileStore) {
    let temp = TempDir::new().expect("create temp dir");
    let store = JsonFileStore::new(temp.path(), Some(3)).expect("create json store");
    (temp, store)
}

pub fn txn(account_id: Uuid, amount: f64, direction: Direction) -> Transaction {
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    Transaction::new(account_id, OWNER, amount, direction, date, now)
}

pub fn income(account_id: Uuid, amount: f64) -> Transaction {
    txn(account_id, amount, Direction::Income)
}

pub fn expense(account_id: Uuid, amount: f64) -> Transaction {
    txn(account_id, amount, Direction::Expense)
}

/// Sum of signed contributions booked on `account_id`.
pub fn derived_balance(store: &LedgerStore, account_id: Uuid) -> f64 {
    store
        .transactions()
        .iter()
        .filter(|txn| txn.account_id == account_id)
        .map(Transaction::signed_amount)
        .sum()
}
