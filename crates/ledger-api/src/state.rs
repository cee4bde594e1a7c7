use std::sync::Arc;

use ledger_objectstore::ObjectStore;
use ledger_queue::Queue;
use ledger_store::TransactionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub queue: Arc<dyn Queue>,
    pub region: Arc<String>,
}
