//! Stair crossing
//!
//! While climbing, a [`StallDetector`] watches the reflectance readings.
//! When both stop changing the robot is wedged against the stair edge,
//! and the [`StairSequencer`] checks for a line before walking the
//! chassis across with a fixed zig-zag of wheel position targets.

use crate::config::StairConfig;
use crate::output::TickOutput;
use crate::traits::clock::elapsed_ms;
use crate::traits::SensorFrame;

/// Detects a stall from unchanging reflectance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StallDetector {
    previous: Option<[u8; 2]>,
    last_sample_ms: u32,
}

impl StallDetector {
    /// Drop the baseline and restart the sample timer
    ///
    /// The first sample after arming only records a baseline.
    pub fn arm(&mut self, now_ms: u32) {
        self.previous = None;
        self.last_sample_ms = now_ms;
    }

    /// Sample the readings; returns true when stalled
    pub fn sample(&mut self, config: &StairConfig, now_ms: u32, reflectance: [u8; 2]) -> bool {
        if elapsed_ms(now_ms, self.last_sample_ms) < config.stall_interval_ms {
            return false;
        }
        self.last_sample_ms = now_ms;

        let previous = self.previous.replace(reflectance);
        match previous {
            Some(prev) => {
                prev[0].abs_diff(reflectance[0]) < config.stall_delta
                    && prev[1].abs_diff(reflectance[1]) < config.stall_delta
            }
            None => false,
        }
    }
}

/// Result of one end-of-line check tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StairOutcome {
    /// A line is visible; the ordinal has been reset
    LineDetected,
    /// Current step still moving
    Moving { ordinal: u8 },
    /// Step done; `ordinal` is the new step, `rezero` asks for an encoder reset
    Advanced { ordinal: u8, rezero: bool },
    /// Final step done
    Cleared,
}

/// Ordinal-driven stair maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StairSequencer {
    ordinal: u8,
    end_of_track: bool,
}

impl Default for StairSequencer {
    fn default() -> Self {
        Self {
            ordinal: 0,
            end_of_track: true,
        }
    }
}

impl StairSequencer {
    /// Restart at ordinal 0
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn ordinal(&self) -> u8 {
        self.ordinal
    }

    /// Run one tick of the line check and the current step
    pub fn step(
        &mut self,
        config: &StairConfig,
        frame: &SensorFrame,
        out: &mut TickOutput,
    ) -> StairOutcome {
        let [left, right] = frame.readings.reflectance;
        if left < config.line_threshold || right < config.line_threshold {
            self.end_of_track = false;
        }

        if !self.end_of_track {
            self.reset();
            return StairOutcome::LineDetected;
        }

        let last = config.steps.len().saturating_sub(1);
        let index = (self.ordinal as usize).min(last);
        let step = &config.steps[index];

        out.drive_to(step.left_target, step.right_target, config.move_speed);

        if !step.is_done(frame.left_pos, frame.right_pos) {
            return StairOutcome::Moving {
                ordinal: self.ordinal,
            };
        }

        if index == last {
            StairOutcome::Cleared
        } else {
            self.ordinal += 1;
            StairOutcome::Advanced {
                ordinal: self.ordinal,
                rezero: step.rezero,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SensorReadings;
    use proptest::prelude::*;

    fn frame(reflectance: [u8; 2], left_pos: i32, right_pos: i32) -> SensorFrame {
        SensorFrame {
            readings: SensorReadings {
                reflectance,
                ..Default::default()
            },
            left_pos,
            right_pos,
        }
    }

    #[test]
    fn test_stall_first_sample_is_baseline() {
        let config = StairConfig::default();
        let mut stall = StallDetector::default();
        stall.arm(0);

        assert!(!stall.sample(&config, 500, [30, 30]));
        assert!(!stall.sample(&config, 1000, [30, 30]));
        assert!(stall.sample(&config, 2000, [31, 32]));
    }

    #[test]
    fn test_stall_needs_both_sides_still() {
        let config = StairConfig::default();
        let mut stall = StallDetector::default();
        stall.arm(0);
        stall.sample(&config, 1000, [30, 30]);

        assert!(!stall.sample(&config, 2000, [30, 33]));
        assert!(!stall.sample(&config, 3000, [40, 33]));
        assert!(stall.sample(&config, 4000, [41, 35]));
    }

    #[test]
    fn test_rearm_drops_baseline() {
        let config = StairConfig::default();
        let mut stall = StallDetector::default();
        stall.arm(0);
        stall.sample(&config, 1000, [30, 30]);
        stall.arm(1500);
        assert!(!stall.sample(&config, 2500, [30, 30]));
    }

    #[test]
    fn test_line_resets_ordinal() {
        let config = StairConfig::default();
        let mut stair = StairSequencer::default();
        let mut out = TickOutput::new();

        assert_eq!(
            stair.step(&config, &frame([40, 40], -100, 100), &mut out),
            StairOutcome::Advanced {
                ordinal: 1,
                rezero: false
            }
        );
        assert_eq!(
            stair.step(&config, &frame([40, 8], 0, 0), &mut out),
            StairOutcome::LineDetected
        );
        assert_eq!(stair.ordinal(), 0);
    }

    #[test]
    fn test_full_sequence() {
        let config = StairConfig::default();
        let mut stair = StairSequencer::default();
        let mut out = TickOutput::new();
        let bright = [50, 50];

        // Positions that satisfy each step in turn; step 3 re-zeroes
        let done = [(-96, 96), (196, -196), (4, -4), (-96, -96), (-96, 96)];
        for (i, &(l, r)) in done.iter().enumerate() {
            let outcome = stair.step(&config, &frame(bright, l, r), &mut out);
            assert_eq!(
                outcome,
                StairOutcome::Advanced {
                    ordinal: i as u8 + 1,
                    rezero: i == 3
                }
            );
        }

        assert_eq!(
            stair.step(&config, &frame(bright, 0, 0), &mut out),
            StairOutcome::Moving { ordinal: 5 }
        );
        assert_eq!(
            stair.step(&config, &frame(bright, 196, -196), &mut out),
            StairOutcome::Cleared
        );
        assert_eq!(stair.ordinal(), 5);
    }

    proptest! {
        #[test]
        fn prop_ordinal_monotonic_without_line(
            positions in prop::collection::vec((-400i32..400, -400i32..400), 1..60)
        ) {
            let config = StairConfig::default();
            let mut stair = StairSequencer::default();
            let mut out = TickOutput::new();
            let mut previous = stair.ordinal();

            for (l, r) in positions {
                let outcome = stair.step(&config, &frame([60, 60], l, r), &mut out);
                prop_assert!(stair.ordinal() >= previous);
                prop_assert!(stair.ordinal() - previous <= 1);
                prop_assert!(stair.ordinal() <= 5);
                prop_assert_ne!(outcome, StairOutcome::LineDetected);
                previous = stair.ordinal();
                out = TickOutput::new();
            }
        }
    }
}
