pub mod error;
pub mod types;

pub use error::DomainError;
pub use types::{
    parse_positive_amount, validate_new_transaction, AuditRecord, NewTransaction, QueueMessage,
    Transaction, TransactionStatus,
};
