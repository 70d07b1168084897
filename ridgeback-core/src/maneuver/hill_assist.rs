//! Hill-assist monitor
//!
//! Samples orientation drift at a fixed interval. Tipping onto a slope
//! softens the steering gain; levelling off restores it and counts one
//! slope exit. Enough exits mean the robot has reached the stairs.

use crate::config::HillAssistConfig;
use crate::control::PidState;
use crate::traits::clock::elapsed_ms;

/// Result of one hill-assist update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HillOutcome {
    /// Disabled, between samples, or drift inside the dead band
    Idle,
    /// Drift below the entry threshold; slope gain applied
    Entered { drift: i32 },
    /// Drift above the exit threshold; baseline gain restored
    Exited { drift: i32, count: u8 },
    /// Exit count reached; the counter has been reset
    StairsAhead { drift: i32 },
}

/// Slope detector and steering-gain owner while slopes are possible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HillAssist {
    enabled: bool,
    previous: i32,
    last_sample_ms: u32,
    exits: u8,
}

impl HillAssist {
    /// Create an enabled monitor
    ///
    /// `orientation` is the baseline-corrected reading at startup.
    pub fn new(orientation: i32, now_ms: u32) -> Self {
        Self {
            enabled: true,
            previous: orientation,
            last_sample_ms: now_ms,
            exits: 0,
        }
    }

    /// Check if the monitor is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Slope exits counted so far
    pub fn exits(&self) -> u8 {
        self.exits
    }

    /// Disable permanently
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Sample orientation and adjust the proportional gain
    ///
    /// `orientation` is the gyro reading relative to the startup baseline.
    pub fn update(
        &mut self,
        config: &HillAssistConfig,
        pid: &mut PidState,
        baseline_kp: f32,
        now_ms: u32,
        orientation: i32,
    ) -> HillOutcome {
        if !self.enabled || elapsed_ms(now_ms, self.last_sample_ms) < config.sample_interval_ms {
            return HillOutcome::Idle;
        }

        let drift = self.previous - orientation;
        self.previous = orientation;
        self.last_sample_ms = now_ms;

        if drift < config.enter_drift {
            pid.kp = config.slope_kp;
            HillOutcome::Entered { drift }
        } else if drift > config.exit_drift {
            pid.kp = baseline_kp;
            self.exits = self.exits.saturating_add(1);

            if self.exits >= config.exits_to_stairs {
                self.exits = 0;
                HillOutcome::StairsAhead { drift }
            } else {
                HillOutcome::Exited {
                    drift,
                    count: self.exits,
                }
            }
        } else {
            HillOutcome::Idle
        }
    }
}
