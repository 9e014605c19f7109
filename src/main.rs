// ================================
// src/main.rs
// ================================
use anyhow::{Context as _, Result};
use goal_stop::{relay, GateParams, GoalNode};
use rclrs::*;
use tokio::time::{timeout, Duration};
use tracing_subscriber::EnvFilter;

const RELAY_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Goal Stop Node with Rust");
    let params = GateParams::load()?;

    let context = Context::default_from_env()?;
    let mut executor = context.create_basic_executor();
    let mut node = GoalNode::new(&executor, &params)?;

    let commands = executor.commands().clone();
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown requested");
        commands.halt_spinning();
    })
    .context("failed to install Ctrl-C handler")?;

    // Channel delivery only: notifications are evaluated on a tokio task.
    let relay = match node.take_notifications() {
        Some(mut notifications) => {
            let runtime = relay::runtime().context("failed to start relay runtime")?;
            let gate = node.gate();
            let handle =
                runtime.spawn(async move { relay::drain(&gate, &mut notifications).await });
            Some((runtime, handle))
        }
        None => None,
    };

    tracing::info!(delivery = ?node.delivery(), "Starting ROS2 executor...");
    let spin_result = executor.spin(SpinOptions::default()).first_error();

    // Releases the subscription, which closes the notification queue.
    drop(node);

    if let Some((runtime, handle)) = relay {
        match runtime.block_on(async { timeout(RELAY_SHUTDOWN_TIMEOUT, handle).await }) {
            Ok(Ok(emitted)) => tracing::info!(emitted, "relay finished"),
            Ok(Err(e)) => tracing::warn!("relay task failed: {}", e),
            Err(_) => tracing::warn!("relay did not finish in time"),
        }
    }

    spin_result?;
    tracing::info!("Goal node stopped");
    Ok(())
}
