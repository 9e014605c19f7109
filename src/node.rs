// ================================
// src/node.rs - ROS2 node wiring
// ================================
use anyhow::Result;
use geometry_msgs::msg::Twist;
use rclrs::*;
use std::sync::Arc;
use std_msgs::msg::String as StringMsg;
use tokio::sync::mpsc;

use crate::{
    command::MotionCommand,
    config::{Delivery, GateParams},
    gate::{CommandSink, GoalDetectorGate},
    relay,
};

impl CommandSink for Publisher<Twist> {
    fn publish(&self, command: MotionCommand) -> Result<()> {
        let twist = Twist::from(command);
        // Deref to the publisher state so this resolves to the rclrs method.
        (**self).publish(&twist)?;
        Ok(())
    }
}

pub type StopGate = GoalDetectorGate<Publisher<Twist>>;

/// Owns the notification subscription and the command publisher for its lifetime.
pub struct GoalNode {
    _notification_subscription: Subscription<StringMsg>,
    gate: Arc<StopGate>,
    notifications: Option<mpsc::UnboundedReceiver<String>>,
    delivery: Delivery,
}

impl GoalNode {
    pub fn new(executor: &Executor, params: &GateParams) -> Result<Self, RclrsError> {
        let node = executor.create_node(params.node_name.as_str())?;

        let command_publisher = node.create_publisher::<Twist>(params.command_topic.as_str())?;
        let gate = Arc::new(GoalDetectorGate::new(
            params.trigger.clone(),
            command_publisher,
        ));

        let (notification_subscription, notifications) = match params.delivery {
            Delivery::Callback => {
                let gate_clone = gate.clone();
                let subscription = node.create_subscription::<StringMsg, _>(
                    params.notification_topic.as_str(),
                    move |msg: StringMsg| {
                        if let Err(e) = gate_clone.on_notification(&msg.data) {
                            tracing::warn!("Failed to publish stop command: {:#}", e);
                        }
                    },
                )?;
                (subscription, None)
            }
            Delivery::Channel => {
                let (tx, rx) = mpsc::unbounded_channel::<String>();
                let subscription = node.create_subscription::<StringMsg, _>(
                    params.notification_topic.as_str(),
                    move |msg: StringMsg| {
                        relay::forward(&tx, msg.data);
                    },
                )?;
                (subscription, Some(rx))
            }
        };

        tracing::info!(
            node = %params.node_name,
            subscribe = %params.notification_topic,
            publish = %params.command_topic,
            trigger = %params.trigger,
            delivery = ?params.delivery,
            "goal node ready"
        );

        Ok(Self {
            _notification_subscription: notification_subscription,
            gate,
            notifications,
            delivery: params.delivery,
        })
    }

    pub fn gate(&self) -> Arc<StopGate> {
        self.gate.clone()
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// Receiver for channel delivery. Handed out once; `None` in callback mode.
    pub fn take_notifications(&mut self) -> Option<mpsc::UnboundedReceiver<String>> {
        self.notifications.take()
    }
}
