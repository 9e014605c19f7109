// ================================
// src/lib.rs
// ================================
pub mod command;
pub mod config;
pub mod gate;
pub mod node;
pub mod relay;

pub use command::MotionCommand;
pub use config::{Delivery, GateParams};
pub use gate::{CommandSink, GoalDetectorGate};
pub use node::GoalNode;
