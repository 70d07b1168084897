//! Continuous control
//!
//! The line-follow PID, the velocity envelope, and the gate that decides
//! whether PID output reaches the wheels in the current phase.

pub mod gate;
pub mod line_follow;
pub mod saturation;

pub use gate::{gate_for, Gate};
pub use line_follow::{LineFollower, PidState, WheelSpeeds};
pub use saturation::{saturate, to_speed};
