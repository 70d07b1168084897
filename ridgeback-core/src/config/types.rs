//! Configuration type definitions
//!
//! Every tunable of the controller lives here. Defaults are the values
//! tuned on the competition track. A `robot.toml` file can override any
//! scalar value (see [`super::parse`]).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::HARD_SPEED_LIMIT;

/// Number of ordinals in the stair-crossing maneuver
pub const STAIR_STEP_COUNT: usize = 6;

/// One-sided threshold on a wheel position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Bound {
    /// Satisfied when the position is strictly below the value
    Below(i32),
    /// Satisfied when the position is strictly above the value
    Above(i32),
}

impl Bound {
    /// Check a position against this bound
    pub const fn satisfied_by(&self, position: i32) -> bool {
        match *self {
            Bound::Below(v) => position < v,
            Bound::Above(v) => position > v,
        }
    }
}

/// One row of the stair-crossing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StairStep {
    /// Absolute target for the left wheel
    pub left_target: i32,
    /// Absolute target for the right wheel
    pub right_target: i32,
    /// Advance condition on the left wheel
    pub left_done: Bound,
    /// Advance condition on the right wheel
    pub right_done: Bound,
    /// Re-zero the encoders once this step is done
    pub rezero: bool,
}

impl StairStep {
    const fn new(left_target: i32, right_target: i32, left_done: Bound, right_done: Bound) -> Self {
        Self {
            left_target,
            right_target,
            left_done,
            right_done,
            rezero: false,
        }
    }

    const fn rezeroing(mut self) -> Self {
        self.rezero = true;
        self
    }

    /// Check whether both wheels satisfy this step's advance condition
    pub const fn is_done(&self, left_pos: i32, right_pos: i32) -> bool {
        self.left_done.satisfied_by(left_pos) && self.right_done.satisfied_by(right_pos)
    }
}

/// Zig-zag sequence that walks the chassis across the track gap
pub const STAIR_STEPS: [StairStep; STAIR_STEP_COUNT] = [
    StairStep::new(-200, 200, Bound::Below(-95), Bound::Above(95)),
    StairStep::new(200, -200, Bound::Above(195), Bound::Below(-195)),
    StairStep::new(0, 0, Bound::Below(5), Bound::Above(-5)),
    StairStep::new(-200, -200, Bound::Below(-95), Bound::Below(-95)).rezeroing(),
    StairStep::new(-200, 200, Bound::Below(-95), Bound::Above(95)),
    StairStep::new(200, -200, Bound::Above(195), Bound::Below(-195)),
];

/// Line-follow PID configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineFollowConfig {
    /// Baseline proportional gain
    pub kp: f32,
    /// Derivative gain
    pub kd: f32,
    /// Forward speed with zero steering error (deg/s)
    pub base_speed: i32,
    /// Fraction of the startup reading used as the per-side offset
    pub calibration_factor: f32,
}

impl Default for LineFollowConfig {
    fn default() -> Self {
        Self {
            kp: 15.0,
            kd: 1.0,
            base_speed: 200,
            calibration_factor: 0.5,
        }
    }
}

/// Velocity envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LimitsConfig {
    /// Largest speed magnitude the controller will ever command
    pub max_speed: i32,
    /// Speed magnitude at which the actuators fault
    pub hard_speed_limit: i32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_speed: 500,
            hard_speed_limit: HARD_SPEED_LIMIT,
        }
    }
}

/// Slope detection from orientation drift
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HillAssistConfig {
    /// Minimum time between orientation samples
    pub sample_interval_ms: u32,
    /// Drift below this means the robot is tipping onto a slope
    pub enter_drift: i32,
    /// Drift above this means the robot is levelling off
    pub exit_drift: i32,
    /// Proportional gain used while on a slope
    pub slope_kp: f32,
    /// Number of slope exits before the stair phase begins
    pub exits_to_stairs: u8,
}

impl Default for HillAssistConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000,
            enter_drift: -10,
            exit_drift: 12,
            slope_kp: 5.0,
            exits_to_stairs: 2,
        }
    }
}

/// Stall detection and the stair-crossing maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StairConfig {
    /// Minimum time between reflectance samples for stall detection
    pub stall_interval_ms: u32,
    /// Both sides changing by less than this counts as stalled
    pub stall_delta: u8,
    /// Reflectance below this on either side means a line is visible
    pub line_threshold: u8,
    /// Speed magnitude for every stair move
    pub move_speed: u16,
    /// Step table
    pub steps: [StairStep; STAIR_STEP_COUNT],
}

impl Default for StairConfig {
    fn default() -> Self {
        Self {
            stall_interval_ms: 1000,
            stall_delta: 3,
            line_threshold: 10,
            move_speed: 200,
            steps: STAIR_STEPS,
        }
    }
}

/// In-place rotation before the search sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TurnAlignConfig {
    /// Left wheel target
    pub left_target: i32,
    /// Right wheel target
    pub right_target: i32,
    /// Arrival tolerance
    pub tolerance: i32,
}

impl Default for TurnAlignConfig {
    fn default() -> Self {
        Self {
            left_target: -700,
            right_target: 700,
            tolerance: 5,
        }
    }
}

/// Rotational range sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchConfig {
    /// Left wheel sweep end
    pub left_target: i32,
    /// Right wheel sweep end
    pub right_target: i32,
    /// Sweep speed magnitude, also used for the approach turn
    pub speed: u16,
    /// Initial best range; only closer samples become candidates
    pub no_target_range: u16,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            left_target: -1300,
            right_target: 1300,
            speed: 200,
            no_target_range: 2500,
        }
    }
}

/// Gripper positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GripperConfig {
    /// Open position, used while searching
    pub rest_position: i32,
    /// Closed position, used at startup and for pickup
    pub closed_position: i32,
    /// Gripper speed magnitude
    pub speed: u16,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            rest_position: 0,
            closed_position: 1750,
            speed: 1000,
        }
    }
}

/// Approach and pickup
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PickupConfig {
    /// Approach distance = closest range × this factor (encoder degrees per mm)
    pub distance_factor: f32,
    /// Wheels stop this long after the gripper closes
    pub settle_ms: u32,
    /// Line following resumes this long after the gripper closes
    pub release_ms: u32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            distance_factor: 1.7,
            settle_ms: 300,
            release_ms: 2000,
        }
    }
}

/// Control loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Nominal tick period
    pub tick_interval_ms: u32,
    /// Tick periods above this are reported as overruns
    pub max_tick_period_ms: u32,
    /// Delay between the emergency stop and shutdown
    pub settle_delay_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            max_tick_period_ms: 50,
            settle_delay_ms: 1000,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `max_speed` is zero or not below the hard limit
    SpeedEnvelope,
    /// A traction speed exceeds `max_speed`
    SpeedAboveMax,
    /// A traction speed is zero or negative
    ZeroSpeed,
    /// Turn arrival tolerance is negative
    TurnTolerance,
    /// A sample interval or period is zero
    ZeroInterval,
    /// `exits_to_stairs` is zero
    ZeroExitCount,
    /// Pickup release happens before the settle stop
    PickupTiming,
    /// Approach distance factor is not positive
    DistanceFactor,
}

/// Complete robot configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobotConfig {
    pub line_follow: LineFollowConfig,
    pub limits: LimitsConfig,
    pub hill_assist: HillAssistConfig,
    pub stair: StairConfig,
    pub turn_align: TurnAlignConfig,
    pub search: SearchConfig,
    pub gripper: GripperConfig,
    pub pickup: PickupConfig,
    pub timing: TimingConfig,
}

impl RobotConfig {
    /// Check that the configuration keeps every command inside the safe envelope
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = self.limits.max_speed;
        if max <= 0 || max >= self.limits.hard_speed_limit {
            return Err(ConfigError::SpeedEnvelope);
        }

        let traction_speeds = [
            self.line_follow.base_speed,
            self.stair.move_speed as i32,
            self.search.speed as i32,
        ];
        if traction_speeds.iter().any(|s| *s <= 0) {
            return Err(ConfigError::ZeroSpeed);
        }
        if traction_speeds.iter().any(|s| *s > max) {
            return Err(ConfigError::SpeedAboveMax);
        }

        if self.turn_align.tolerance < 0 {
            return Err(ConfigError::TurnTolerance);
        }

        if self.hill_assist.sample_interval_ms == 0
            || self.stair.stall_interval_ms == 0
            || self.timing.tick_interval_ms == 0
            || self.timing.max_tick_period_ms == 0
        {
            return Err(ConfigError::ZeroInterval);
        }

        if self.hill_assist.exits_to_stairs == 0 {
            return Err(ConfigError::ZeroExitCount);
        }

        if self.pickup.release_ms < self.pickup.settle_ms {
            return Err(ConfigError::PickupTiming);
        }

        if !(self.pickup.distance_factor > 0.0) {
            return Err(ConfigError::DistanceFactor);
        }

        Ok(())
    }
}
