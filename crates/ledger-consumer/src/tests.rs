use chrono::Utc;
use ledger_domain::QueueMessage;
use ledger_queue::{FailingQueue, InMemoryQueue, Queue};
use uuid::Uuid;

use crate::dispatch::{dispatch, DispatchOutcome};
use crate::loop_::run_once;

fn message(action: &str) -> QueueMessage {
    QueueMessage {
        transaction_id: Uuid::new_v4(),
        region: "us-east-1".into(),
        action: action.into(),
        timestamp: Utc::now(),
        data: serde_json::json!({}),
    }
}

#[test]
fn dispatch_handles_transaction_created() {
    assert_eq!(dispatch(&message("transaction_created")), DispatchOutcome::Handled);
}

#[test]
fn dispatch_reports_unknown_action_but_still_handled_by_caller() {
    assert_eq!(dispatch(&message("something_else")), DispatchOutcome::Unknown);
}

#[tokio::test]
async fn run_once_drains_and_deletes_known_action() {
    let queue = InMemoryQueue::new();
    queue.publish(&message("transaction_created")).await.unwrap();

    let processed = run_once(&queue).await;

    assert_eq!(processed, 1);
    assert_eq!(queue.len().await, 0);
}

#[tokio::test]
async fn run_once_deletes_unknown_action_instead_of_wedging_queue() {
    let queue = InMemoryQueue::new();
    queue.publish(&message("unrecognized")).await.unwrap();

    let processed = run_once(&queue).await;

    assert_eq!(processed, 1);
    assert_eq!(queue.len().await, 0);
}

#[tokio::test]
async fn run_once_on_empty_queue_processes_nothing() {
    let queue = InMemoryQueue::new();
    assert_eq!(run_once(&queue).await, 0);
}

#[tokio::test]
async fn run_once_on_receive_failure_processes_nothing() {
    let queue = FailingQueue;
    assert_eq!(run_once(&queue).await, 0);
}
