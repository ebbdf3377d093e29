//! Entity types shared by the ledger, catalog, migration, and sync layers.

pub mod account;
pub mod budget;
pub mod category;
pub mod common;
pub mod profile;
pub mod sync;
pub mod transaction;

pub use account::{Account, NewAccount};
pub use budget::Budget;
pub use category::{Category, CategoryKind, CATEGORY_NOT_FOUND};
pub use common::{Direction, Displayable, NamedEntity, OwnedEntity, DEFAULT_OWNER};
pub use profile::UserProfile;
pub use sync::{PendingSyncOp, SyncEntityKind, SyncOpKind};
pub use transaction::{Transaction, TransactionPatch};
