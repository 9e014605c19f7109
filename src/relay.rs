// ================================
// src/relay.rs - async consumer for channel delivery
// ================================
use tokio::{runtime::Runtime, sync::mpsc};

use crate::gate::{CommandSink, GoalDetectorGate};

/// Hands a notification to the relay without blocking the executor callback.
///
/// The queue is unbounded, so the only failure is a relay that has already shut down.
pub fn forward(notifications: &mpsc::UnboundedSender<String>, text: String) -> bool {
    match notifications.send(text) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Relay is gone, notification not evaluated: {:?}", e.0);
            false
        }
    }
}

/// Runtime hosting the relay task. Only built for channel delivery.
pub fn runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("goal-relay")
        .enable_all()
        .build()
}

/// Evaluates queued notifications in arrival order until every sender is gone.
///
/// Every notification is handed to the gate, none are skipped in favour of the
/// latest one. Returns the number of stop commands published.
pub async fn drain<S: CommandSink>(
    gate: &GoalDetectorGate<S>,
    notifications: &mut mpsc::UnboundedReceiver<String>,
) -> usize {
    let mut emitted = 0;

    while let Some(text) = notifications.recv().await {
        match gate.on_notification(&text) {
            Ok(true) => emitted += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to publish stop command: {:#}", e),
        }
    }

    tracing::debug!(emitted, "notification queue closed");
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MotionCommand;
    use crate::gate::tests::RecordingSink;
    use anyhow::{anyhow, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn every_queued_notification_is_evaluated() {
        let gate = GoalDetectorGate::new("goal", RecordingSink::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        for text in ["ball", "goal", "goalpost", "", "GOAL", "goal"] {
            assert!(forward(&tx, text.to_string()));
        }
        drop(tx);

        let emitted = drain(&gate, &mut rx).await;
        assert_eq!(emitted, 3);
        assert_eq!(gate.sink().published(), vec![MotionCommand::stop(); 3]);
    }

    #[tokio::test]
    async fn returns_when_queue_closes_empty() {
        let gate = GoalDetectorGate::new("goal", RecordingSink::default());
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        drop(tx);

        assert_eq!(drain(&gate, &mut rx).await, 0);
    }

    #[tokio::test]
    async fn consumer_task_follows_a_live_producer() {
        let gate = std::sync::Arc::new(GoalDetectorGate::new("goal", RecordingSink::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let consumer = {
            let gate = gate.clone();
            tokio::spawn(async move { drain(&gate, &mut rx).await })
        };

        for i in 0..10 {
            let text = if i % 5 == 0 { "goal" } else { "cone" };
            assert!(forward(&tx, text.to_string()));
        }
        drop(tx);

        assert_eq!(consumer.await.unwrap(), 2);
        assert_eq!(gate.sink().published().len(), 2);
    }

    struct FlakySink {
        calls: AtomicUsize,
    }

    impl CommandSink for FlakySink {
        fn publish(&self, _command: MotionCommand) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow!("transient"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn sink_error_does_not_stop_the_relay() {
        let gate = GoalDetectorGate::new(
            "goal",
            FlakySink {
                calls: AtomicUsize::new(0),
            },
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        forward(&tx, "goal".to_string());
        forward(&tx, "goal".to_string());
        drop(tx);

        assert_eq!(drain(&gate, &mut rx).await, 1);
        assert_eq!(gate.sink().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn backlog_behind_a_stalled_relay_keeps_every_goal() {
        let gate = GoalDetectorGate::new("goal", RecordingSink::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Nothing drains while the burst arrives.
        let mut goals = 0;
        for i in 0..1_000 {
            let text = if i % 7 == 0 {
                goals += 1;
                format!("goal {i}")
            } else {
                format!("ball {i}")
            };
            assert!(forward(&tx, text));
        }
        drop(tx);

        assert_eq!(drain(&gate, &mut rx).await, goals);
        assert_eq!(gate.sink().published(), vec![MotionCommand::stop(); goals]);
    }

    #[test]
    fn forward_reports_a_closed_relay() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(rx);

        assert!(!forward(&tx, "goal".to_string()));
    }

    #[test]
    fn dedicated_runtime_drains_while_producer_runs_outside_it() {
        let runtime = runtime().unwrap();
        let gate = std::sync::Arc::new(GoalDetectorGate::new("goal", RecordingSink::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let consumer = {
            let gate = gate.clone();
            runtime.spawn(async move { drain(&gate, &mut rx).await })
        };

        // Plain thread, like the executor spinning on main.
        for text in ["goal", "ball", "goalpost"] {
            assert!(forward(&tx, text.to_string()));
        }
        drop(tx);

        assert_eq!(runtime.block_on(consumer).unwrap(), 2);
        assert_eq!(gate.sink().published().len(), 2);
    }
}
