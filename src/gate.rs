// ================================
// src/gate.rs - detection-to-stop gating
// ================================
use anyhow::Result;

use crate::command::MotionCommand;

/// Outbound motion channel.
pub trait CommandSink {
    fn publish(&self, command: MotionCommand) -> Result<()>;
}

/// Emits a single stop command for every notification that contains the trigger.
///
/// The gate keeps no history between notifications, so it can be shared across
/// threads whenever its sink can.
pub struct GoalDetectorGate<S> {
    trigger: String,
    sink: S,
}

impl<S: CommandSink> GoalDetectorGate<S> {
    pub fn new(trigger: impl Into<String>, sink: S) -> Self {
        Self {
            trigger: trigger.into(),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Case-sensitive, unanchored substring test ("goalpost" matches "goal").
    pub fn detects(&self, text: &str) -> bool {
        text.contains(self.trigger.as_str())
    }

    /// Returns `Ok(true)` when a stop command was published.
    pub fn on_notification(&self, text: &str) -> Result<bool> {
        if !self.detects(text) {
            tracing::debug!(text, "no trigger in notification");
            return Ok(false);
        }

        self.sink.publish(MotionCommand::stop())?;
        tracing::info!("Goal detected! Robot stopping.");
        Ok(true)
    }
}
