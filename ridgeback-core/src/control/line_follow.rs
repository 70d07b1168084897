//! Line-follow PID controller
//!
//! Steers from the difference between two reflectance readings. Each
//! reading is first normalized against a per-side offset captured at
//! startup, so the two sensors need not be matched.
//!
//! ```text
//! error      = (errorLeft - errorRight) / 2
//! derivative = error - lastError
//! turn       = Kp * error + Kd * derivative
//! output     = (base - turn, base + turn)
//! ```

use crate::config::LineFollowConfig;

/// Magnitude bound on the accumulated error
pub const INTEGRAL_LIMIT: f32 = 10_000.0;

/// PID gains and memory
///
/// `kp` is shared: the hill-assist monitor lowers it on slopes and puts
/// the baseline back once the slope is left behind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidState {
    /// Proportional gain
    pub kp: f32,
    /// Derivative gain
    pub kd: f32,
    /// Forward speed with zero error
    pub base_speed: f32,
    /// Error from the previous tick
    pub last_error: f32,
    /// Accumulated error, clamped to `INTEGRAL_LIMIT`; not used in the output
    pub integral: f32,
    /// Most recent derivative term
    pub derivative: f32,
}

impl PidState {
    /// Create from configuration with empty memory
    pub fn new(config: &LineFollowConfig) -> Self {
        Self {
            kp: config.kp,
            kd: config.kd,
            base_speed: config.base_speed as f32,
            last_error: 0.0,
            integral: 0.0,
            derivative: 0.0,
        }
    }
}

/// Requested wheel velocities before saturation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelSpeeds {
    pub left: f32,
    pub right: f32,
}

/// Reflectance-to-steering controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFollower {
    offset_left: f32,
    offset_right: f32,
}

impl LineFollower {
    /// Capture per-side offsets from the startup readings
    pub fn calibrate(startup: [u8; 2], factor: f32) -> Self {
        Self {
            offset_left: startup[0] as f32 * factor,
            offset_right: startup[1] as f32 * factor,
        }
    }

    /// Calibration offsets, left then right
    pub fn offsets(&self) -> (f32, f32) {
        (self.offset_left, self.offset_right)
    }

    /// Run one PID step
    ///
    /// Updates `last_error`, `integral` and `derivative` in `pid`.
    pub fn compute(&self, pid: &mut PidState, reflectance: [u8; 2]) -> WheelSpeeds {
        let error_left = reflectance[0] as f32 - self.offset_left;
        let error_right = reflectance[1] as f32 - self.offset_right;
        let error = (error_left - error_right) / 2.0;

        pid.derivative = error - pid.last_error;
        pid.last_error = error;
        pid.integral = (pid.integral + error).clamp(-INTEGRAL_LIMIT, INTEGRAL_LIMIT);

        let turn = pid.kp * error + pid.kd * pid.derivative;

        WheelSpeeds {
            left: pid.base_speed - turn,
            right: pid.base_speed + turn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> (LineFollower, PidState) {
        // Startup readings of 40 give offsets of 20 on both sides
        let follower = LineFollower::calibrate([40, 40], 0.5);
        let pid = PidState::new(&LineFollowConfig::default());
        (follower, pid)
    }

    #[test]
    fn test_calibration_offsets() {
        let follower = LineFollower::calibrate([30, 50], 0.5);
        assert_eq!(follower.offsets(), (15.0, 25.0));
    }

    #[test]
    fn test_equal_readings_drive_straight() {
        let (follower, mut pid) = controller();
        let out = follower.compute(&mut pid, [35, 35]);
        assert_eq!(out, WheelSpeeds { left: 200.0, right: 200.0 });
        assert_eq!(pid.last_error, 0.0);
        assert_eq!(pid.derivative, 0.0);
    }

    #[test]
    fn test_worked_example() {
        let (follower, mut pid) = controller();
        // errorLeft = 30 - 20 = 10, errorRight = 10 - 20 = -10
        let out = follower.compute(&mut pid, [30, 10]);
        assert_eq!(pid.last_error, 10.0);
        assert_eq!(pid.derivative, 10.0);
        assert_eq!(out, WheelSpeeds { left: 40.0, right: 360.0 });
    }

    #[test]
    fn test_derivative_uses_previous_error() {
        let (follower, mut pid) = controller();
        follower.compute(&mut pid, [30, 10]);
        // Same error again: derivative is zero, turn = 15 * 10
        let out = follower.compute(&mut pid, [30, 10]);
        assert_eq!(pid.derivative, 0.0);
        assert_eq!(out, WheelSpeeds { left: 50.0, right: 350.0 });
    }

    #[test]
    fn test_gain_change_takes_effect() {
        let (follower, mut pid) = controller();
        pid.kp = 5.0;
        let out = follower.compute(&mut pid, [30, 10]);
        // turn = 5 * 10 + 1 * 10
        assert_eq!(out, WheelSpeeds { left: 140.0, right: 260.0 });
    }

    #[test]
    fn test_integral_saturates_without_touching_output() {
        let (follower, mut pid) = controller();
        follower.compute(&mut pid, [30, 10]);
        assert_eq!(pid.integral, 10.0);

        for _ in 0..2_000 {
            follower.compute(&mut pid, [30, 10]);
        }
        assert_eq!(pid.integral, INTEGRAL_LIMIT);
        // Same output as an unsaturated steady tick
        let out = follower.compute(&mut pid, [30, 10]);
        assert_eq!(out, WheelSpeeds { left: 50.0, right: 350.0 });

        for _ in 0..4_000 {
            follower.compute(&mut pid, [10, 30]);
        }
        assert_eq!(pid.integral, -INTEGRAL_LIMIT);
    }
}
