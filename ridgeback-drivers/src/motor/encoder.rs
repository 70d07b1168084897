//! Encoder-feedback traction motor
//!
//! Closes velocity and position loops around a quadrature-encoded DC gear
//! motor, giving it the same command set as a smart servo motor: run at a
//! speed, run to an absolute position, and stop with hold or coast.
//!
//! # Usage
//!
//! The driver is updated by calling `update()` at a fixed period with the
//! latest encoder count. This returns the signed duty (per-mille) to apply
//! to the H-bridge.
//!
//! ```ignore
//! let mut motor = EncoderMotor::new(EncoderMotorConfig::default());
//! motor.run_forever(200)?;
//!
//! // Every 5 ms:
//! let duty = motor.update(encoder.count(), 5);
//! bridge.apply(duty)?;
//! ```

use ridgeback_core::traits::{Actuator, ActuatorError, StopAction, HARD_SPEED_LIMIT};

/// Full-scale duty in per-mille
pub const DUTY_MAX: i16 = 1000;

/// Encoder motor configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderMotorConfig {
    /// Encoder counts per output shaft revolution
    pub counts_per_rev: i32,
    /// Shaft speed at full duty (deg/s)
    pub full_speed_dps: i32,
    /// Duty per-mille added per deg/s of speed error
    pub velocity_kp: f32,
    /// Speed demand (deg/s) per degree of position error
    pub position_kp: f32,
    /// Position error counted as arrived (degrees)
    pub arrival_band: i32,
    /// Speed limit of the correction while holding (deg/s)
    pub hold_speed: u16,
    /// Invert the encoder count direction
    pub reversed: bool,
}

impl Default for EncoderMotorConfig {
    fn default() -> Self {
        Self {
            counts_per_rev: 360,
            full_speed_dps: 1000,
            velocity_kp: 0.5,
            position_kp: 4.0,
            arrival_band: 2,
            hold_speed: 200,
            reversed: false,
        }
    }
}

/// Current control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveMode {
    /// Bridge off, shaft free
    Coasting,
    /// Tracking a speed
    Velocity(i32),
    /// Moving to a target, then applying the stop action
    Position {
        target: i32,
        speed: u16,
        stop: StopAction,
    },
    /// Servoing to a fixed position
    Holding(i32),
}

/// Encoder motor driver state
pub struct EncoderMotor {
    config: EncoderMotorConfig,
    mode: DriveMode,
    /// Raw count at the last reset
    zero_count: i32,
    /// Raw count at the last update
    last_count: i32,
    /// Position in degrees from the last reset
    position: i32,
    /// Measured speed (deg/s)
    speed_dps: i32,
    /// Last position target
    position_sp: i32,
}

impl EncoderMotor {
    pub fn new(config: EncoderMotorConfig) -> Self {
        Self {
            config,
            mode: DriveMode::Coasting,
            zero_count: 0,
            last_count: 0,
            position: 0,
            speed_dps: 0,
            position_sp: 0,
        }
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    /// Measured speed from the last update (deg/s)
    pub fn speed(&self) -> i32 {
        self.speed_dps
    }

    fn counts_to_degrees(&self, counts: i32) -> i32 {
        (counts as i64 * 360 / self.config.counts_per_rev.max(1) as i64) as i32
    }

    /// Update from a new encoder count
    ///
    /// Returns the signed duty in per-mille, 0 when coasting.
    pub fn update(&mut self, count: i32, dt_ms: u32) -> i16 {
        let count = if self.config.reversed { -count } else { count };
        let position = self.counts_to_degrees(count.wrapping_sub(self.zero_count));

        if dt_ms > 0 {
            self.speed_dps = (position - self.position) * 1000 / dt_ms as i32;
        }
        self.position = position;
        self.last_count = count;

        if let DriveMode::Position { target, stop, .. } = self.mode {
            if (target - position).abs() <= self.config.arrival_band {
                self.mode = match stop {
                    StopAction::Hold => DriveMode::Holding(target),
                    StopAction::Coast => DriveMode::Coasting,
                };
            }
        }

        let demand = match self.mode {
            DriveMode::Coasting => return 0,
            DriveMode::Velocity(speed) => speed,
            DriveMode::Position { target, speed, .. } => self.position_demand(target, speed),
            DriveMode::Holding(target) => self.position_demand(target, self.config.hold_speed),
        };

        self.duty_for(demand)
    }

    fn position_demand(&self, target: i32, limit: u16) -> i32 {
        let limit = limit as f32;
        let demand = (target - self.position) as f32 * self.config.position_kp;
        demand.clamp(-limit, limit) as i32
    }

    /// Feed-forward plus proportional speed correction
    fn duty_for(&self, demand: i32) -> i16 {
        let feed_forward = demand as f32 * DUTY_MAX as f32 / self.config.full_speed_dps as f32;
        let correction = self.config.velocity_kp * (demand - self.speed_dps) as f32;
        let duty = (feed_forward + correction).clamp(-(DUTY_MAX as f32), DUTY_MAX as f32);
        duty as i16
    }
}

fn check_speed(speed: i32) -> Result<(), ActuatorError> {
    if speed.abs() > HARD_SPEED_LIMIT {
        Err(ActuatorError::SpeedOutOfRange)
    } else {
        Ok(())
    }
}

impl Actuator for EncoderMotor {
    fn run_forever(&mut self, speed: i32) -> Result<(), ActuatorError> {
        check_speed(speed)?;
        self.mode = DriveMode::Velocity(speed);
        Ok(())
    }

    fn run_to_abs_pos(
        &mut self,
        target: i32,
        speed: u16,
        stop: StopAction,
    ) -> Result<(), ActuatorError> {
        check_speed(speed as i32)?;
        self.position_sp = target;
        self.mode = DriveMode::Position {
            target,
            speed,
            stop,
        };
        Ok(())
    }

    fn stop(&mut self, action: StopAction) -> Result<(), ActuatorError> {
        self.mode = match action {
            StopAction::Hold => DriveMode::Holding(self.position),
            StopAction::Coast => DriveMode::Coasting,
        };
        Ok(())
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn position_sp(&self) -> i32 {
        self.position_sp
    }

    fn reset_position(&mut self) {
        self.zero_count = self.last_count;
        self.position = 0;
        self.position_sp = 0;
        if matches!(self.mode, DriveMode::Position { .. } | DriveMode::Holding(_)) {
            self.mode = DriveMode::Holding(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motor() -> EncoderMotor {
        EncoderMotor::new(EncoderMotorConfig::default())
    }

    #[test]
    fn test_coasting_by_default() {
        let mut m = motor();
        assert_eq!(m.update(100, 10), 0);
        assert_eq!(m.position(), 100);
        assert_eq!(m.mode(), DriveMode::Coasting);
    }

    #[test]
    fn test_velocity_feed_forward_and_correction() {
        let mut m = motor();
        m.run_forever(500).unwrap();
        // At rest: 500 feed-forward + 0.5 * 500 correction
        assert_eq!(m.update(0, 10), 750);
        // At speed: no correction
        assert_eq!(m.update(5, 10), 500);
        assert_eq!(m.speed(), 500);
    }

    #[test]
    fn test_duty_is_clamped() {
        let mut m = motor();
        m.run_forever(-900).unwrap();
        assert_eq!(m.update(0, 10), -DUTY_MAX);
    }

    #[test]
    fn test_hard_limit_rejected() {
        let mut m = motor();
        assert_eq!(m.run_forever(901), Err(ActuatorError::SpeedOutOfRange));
        assert_eq!(
            m.run_to_abs_pos(0, 1000, StopAction::Hold),
            Err(ActuatorError::SpeedOutOfRange)
        );
        assert_eq!(m.mode(), DriveMode::Coasting);
    }

    #[test]
    fn test_position_move_is_speed_limited() {
        let mut m = motor();
        m.run_to_abs_pos(100, 200, StopAction::Coast).unwrap();
        assert_eq!(m.position_sp(), 100);
        // 100 deg error * 4 = 400, capped at 200: 200 + 0.5 * 200
        assert_eq!(m.update(0, 10), 300);
    }

    #[test]
    fn test_arrival_applies_stop_action() {
        let mut m = motor();
        m.run_to_abs_pos(100, 200, StopAction::Coast).unwrap();
        m.update(0, 10);
        assert_eq!(m.update(99, 10), 0);
        assert_eq!(m.mode(), DriveMode::Coasting);

        let mut m = motor();
        m.run_to_abs_pos(-50, 200, StopAction::Hold).unwrap();
        m.update(-49, 10);
        assert_eq!(m.mode(), DriveMode::Holding(-50));
    }

    #[test]
    fn test_reset_moves_zero() {
        let mut m = motor();
        m.update(250, 10);
        m.reset_position();
        assert_eq!(m.position(), 0);
        m.update(260, 10);
        assert_eq!(m.position(), 10);
    }

    #[test]
    fn test_counts_scale_to_degrees() {
        let mut m = EncoderMotor::new(EncoderMotorConfig {
            counts_per_rev: 1440,
            reversed: true,
            ..Default::default()
        });
        m.update(-720, 10);
        assert_eq!(m.position(), 180);
    }

    #[test]
    fn test_stop_hold_keeps_position() {
        let mut m = motor();
        m.run_forever(300).unwrap();
        m.update(40, 10);
        m.stop(StopAction::Hold).unwrap();
        assert_eq!(m.mode(), DriveMode::Holding(40));
    }
}
