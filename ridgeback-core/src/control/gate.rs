//! Control-mode gate
//!
//! The PID runs every tick so its derivative memory stays current, but its
//! output only reaches the wheels in continuous phases. During discrete
//! phases the wheels belong to whichever sequencer is active.

use super::line_follow::WheelSpeeds;
use super::saturation::{saturate, to_speed};
use crate::state::RobotPhase;

/// Gate state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gate {
    /// PID output is applied
    Open,
    /// PID output is discarded
    Closed,
}

/// Gate state for a phase
pub fn gate_for(phase: RobotPhase) -> Gate {
    if phase.continuous_control() {
        Gate::Open
    } else {
        Gate::Closed
    }
}

impl Gate {
    /// Saturated wheel commands if the gate is open
    pub fn pass(self, speeds: WheelSpeeds, max_speed: i32) -> Option<(i32, i32)> {
        match self {
            Gate::Open => {
                let (left, right) = saturate(speeds.left, speeds.right, max_speed);
                Some((to_speed(left), to_speed(right)))
            }
            Gate::Closed => None,
        }
    }
}
