//! Board-agnostic controller for the line-following pickup robot
//!
//! This crate contains all control logic that does not depend on specific
//! hardware:
//!
//! - Hardware boundary traits (actuators, sensors, clock)
//! - Line-follow PID, velocity envelope and control-mode gate
//! - Mission state machine
//! - Hill assist, stair crossing, search and pickup sequencers
//! - Safety: emergency stop and tick monitoring
//! - Configuration types and `robot.toml` parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod maneuver;
pub mod output;
pub mod robot;
pub mod runner;
pub mod safety;
pub mod state;
pub mod traits;

#[cfg(test)]
mod sim;

pub use robot::Robot;
pub use runner::{ControlLoop, StepReport};
