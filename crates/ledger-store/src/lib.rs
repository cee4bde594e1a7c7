pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::{FailingStore, InMemoryStore};
pub use postgres::PostgresStore;
pub use store::{TransactionStats, TransactionStore};
