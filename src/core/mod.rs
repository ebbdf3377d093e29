pub mod clock;
pub mod ledger;
pub mod manager;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ledger::{
    BalanceDrift, BalanceStrategy, CascadeOutcome, CascadeReport, LedgerState, LedgerStore,
    TransferOutcome,
};
pub use manager::{
    CommitReceipt, ImportConfirmation, ImportSummary, LedgerManager, LoadReport, MigrationApplied,
    StorageKeys,
};
