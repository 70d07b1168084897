//! Reverse-and-grip pickup
//!
//! The approach leaves the robot facing the target with the gripper at
//! the rear. The sequencer reverses until the left wheel has covered the
//! approach distance, closes the gripper once, then stops the wheels and
//! finally hands control back to line following.

use crate::config::{GripperConfig, PickupConfig};
use crate::output::{Telemetry, TickOutput};
use crate::traits::clock::elapsed_ms;
use crate::traits::{Command, MotorId, SensorFrame, StopAction};

/// Result of one pickup tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PickupOutcome {
    /// Still reversing toward the target
    Reversing,
    /// Gripper close issued this tick
    GripperClosed,
    /// Gripper closed, waiting to stop the wheels
    Closing,
    /// Wheels stopped, waiting to resume
    Holding,
    /// Pickup finished
    Complete,
}

/// Pickup progress
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PickupSequencer {
    start_left: i32,
    distance: f32,
    closed_at: Option<u32>,
}

impl PickupSequencer {
    /// Start from the left wheel position at the end of the approach turn
    pub fn begin(start_left: i32, min_range: u16, config: &PickupConfig) -> Self {
        Self {
            start_left,
            distance: approach_distance(min_range, config),
            closed_at: None,
        }
    }

    /// Encoder degrees to reverse before gripping
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Run one tick
    pub fn step(
        &mut self,
        pickup: &PickupConfig,
        gripper: &GripperConfig,
        now_ms: u32,
        frame: &SensorFrame,
        out: &mut TickOutput,
    ) -> PickupOutcome {
        out.report(Telemetry::PickupProgress {
            left_pos: frame.left_pos,
            right_pos: frame.right_pos,
            range_mm: frame.readings.range_mm,
        });

        let Some(closed_at) = self.closed_at else {
            if (frame.left_pos as f32) <= self.start_left as f32 - self.distance {
                out.command(Command::run_to(
                    MotorId::Gripper,
                    gripper.closed_position,
                    gripper.speed,
                    StopAction::Hold,
                ));
                out.report(Telemetry::GripperClosed {
                    left_pos: frame.left_pos,
                });
                self.closed_at = Some(now_ms);
                return PickupOutcome::GripperClosed;
            }
            return PickupOutcome::Reversing;
        };

        let elapsed = elapsed_ms(now_ms, closed_at);
        if elapsed >= pickup.settle_ms {
            out.stop_wheels(StopAction::Hold);
        }

        if elapsed >= pickup.release_ms {
            PickupOutcome::Complete
        } else if elapsed >= pickup.settle_ms {
            PickupOutcome::Holding
        } else {
            PickupOutcome::Closing
        }
    }
}

/// Reverse distance for a target at `min_range`
pub fn approach_distance(min_range: u16, config: &PickupConfig) -> f32 {
    min_range as f32 * config.distance_factor
}
