//! Motor driver implementations
//!
//! - Encoder motors: traction wheels with velocity and position loops
//! - H-bridge: signed duty to a two-input bridge
//! - Servo: pulse-width gripper

pub mod encoder;
pub mod hbridge;
pub mod servo;

pub use encoder::{DriveMode, EncoderMotor, EncoderMotorConfig, DUTY_MAX};
pub use hbridge::HBridge;
pub use servo::{ServoConfig, ServoGripper};
