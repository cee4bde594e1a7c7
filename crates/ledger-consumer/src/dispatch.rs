use ledger_domain::QueueMessage;
use tracing::warn;

/// Result of dispatching a single message. Both variants are
/// acknowledge-and-delete; the outcome only changes what gets logged.
#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    Unknown,
}

/// The closed action registry. `transaction_created` is the only action the
/// ingest pipeline currently publishes, and handling it is an acknowledge
/// no-op: persistence and auditing already happened synchronously on the
/// HTTP path, so the consumer has nothing further to do. Any other action
/// is logged and still deleted, so an unrecognized message can never wedge
/// the queue.
pub fn dispatch(message: &QueueMessage) -> DispatchOutcome {
    match message.action.as_str() {
        "transaction_created" => DispatchOutcome::Handled,
        other => {
            warn!(action = %other, transaction_id = %message.transaction_id, "unknown queue action");
            DispatchOutcome::Unknown
        }
    }
}
