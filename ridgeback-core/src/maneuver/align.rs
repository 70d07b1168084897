//! Position-controlled rotation
//!
//! Turn alignment, the search sweep and the approach turn all drive the
//! two wheels to absolute targets and wait for one-sided arrival. The
//! side of each target is fixed when the rotation starts, so a wheel that
//! overshoots still counts as arrived.

use crate::config::Bound;
use crate::output::TickOutput;
use crate::traits::SensorFrame;

/// One-sided arrival condition for both wheels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Arrival {
    pub left: Bound,
    pub right: Bound,
}

impl Arrival {
    /// Build from start positions toward targets
    pub fn toward(start: (i32, i32), target: (i32, i32), tolerance: i32) -> Self {
        Self {
            left: bound_toward(start.0, target.0, tolerance),
            right: bound_toward(start.1, target.1, tolerance),
        }
    }

    pub fn reached(&self, left_pos: i32, right_pos: i32) -> bool {
        self.left.satisfied_by(left_pos) && self.right.satisfied_by(right_pos)
    }
}

fn bound_toward(start: i32, target: i32, tolerance: i32) -> Bound {
    if target < start {
        Bound::Below(target + tolerance)
    } else {
        Bound::Above(target - tolerance)
    }
}

/// Active rotation to absolute wheel targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotateTo {
    left_target: i32,
    right_target: i32,
    speed: u16,
    arrival: Arrival,
}

impl RotateTo {
    /// Start a rotation from the wheel positions in `frame`
    pub fn new(frame: &SensorFrame, target: (i32, i32), speed: u16, tolerance: i32) -> Self {
        Self {
            left_target: target.0,
            right_target: target.1,
            speed,
            arrival: Arrival::toward((frame.left_pos, frame.right_pos), target, tolerance),
        }
    }

    pub fn arrival(&self) -> Arrival {
        self.arrival
    }

    /// Queue the position commands and check arrival
    pub fn step(&self, frame: &SensorFrame, out: &mut TickOutput) -> bool {
        out.drive_to(self.left_target, self.right_target, self.speed);
        self.arrival.reached(frame.left_pos, frame.right_pos)
    }
}
