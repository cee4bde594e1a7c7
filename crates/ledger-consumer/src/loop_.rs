use std::sync::Arc;
use std::time::Duration;

use ledger_queue::Queue;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info};

use crate::dispatch::{dispatch, DispatchOutcome};

const TICK_INTERVAL: Duration = Duration::from_secs(5);
const RECEIVE_BATCH: i32 = 10;
const RECEIVE_WAIT_SECS: i32 = 0;

/// Drain up to one batch from `queue`, dispatching and deleting each message.
/// A delete failure is logged and the message is left for the queue to
/// redeliver after its visibility timeout expires; dispatch is idempotent so
/// redelivery never double-applies anything.
pub async fn run_once(queue: &dyn Queue) -> usize {
    let envelopes = match queue.receive(RECEIVE_BATCH, RECEIVE_WAIT_SECS).await {
        Ok(envelopes) => envelopes,
        Err(e) => {
            error!(error = %e, "failed to poll queue");
            return 0;
        }
    };

    let mut processed = 0;
    for envelope in envelopes {
        match dispatch(&envelope.message) {
            DispatchOutcome::Handled => {}
            DispatchOutcome::Unknown => {}
        }

        if let Err(e) = queue.delete(&envelope.receipt_handle).await {
            error!(error = %e, "failed to delete processed message, leaving for redelivery");
            continue;
        }
        processed += 1;
    }
    processed
}

/// Poll `queue` on a fixed interval until `shutdown` is signalled. The
/// in-flight tick is always allowed to finish; shutdown only stops the next
/// one from starting.
pub async fn run(queue: Arc<dyn Queue>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(TICK_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let processed = run_once(queue.as_ref()).await;
                if processed > 0 {
                    info!(processed, "consumer tick processed messages");
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("consumer loop shutting down");
                    break;
                }
            }
        }
    }
}
