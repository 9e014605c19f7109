// ================================
// src/command.rs - outbound motion command
// ================================
use geometry_msgs::msg::{Twist, Vector3};

/// Planar velocity command for a differential-drive base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionCommand {
    pub linear_x: f64,
    pub angular_z: f64,
}

impl MotionCommand {
    /// Zero linear and angular velocity.
    pub const fn stop() -> Self {
        Self {
            linear_x: 0.0,
            angular_z: 0.0,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.linear_x == 0.0 && self.angular_z == 0.0
    }
}

impl From<MotionCommand> for Twist {
    fn from(command: MotionCommand) -> Self {
        let mut twist = Twist::default();
        twist.linear = Vector3 {
            x: command.linear_x,
            ..Vector3::default()
        };
        twist.angular = Vector3 {
            z: command.angular_z,
            ..Vector3::default()
        };
        twist
    }
}
