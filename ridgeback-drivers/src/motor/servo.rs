//! Hobby-servo gripper
//!
//! Gives a pulse-width servo the position half of the [`Actuator`]
//! interface. Positions are in the same units the gripper was tuned in
//! (0 = open, `travel` = fully closed); the driver slews toward the target
//! at the commanded speed so the gripper closes gently.

use ridgeback_core::traits::{Actuator, ActuatorError, StopAction};

/// Servo configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoConfig {
    /// Pulse width at position 0
    pub min_pulse_us: u16,
    /// Pulse width at full travel
    pub max_pulse_us: u16,
    /// Position units across the full pulse range
    pub travel: i32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 1000,
            max_pulse_us: 2000,
            travel: 1800,
        }
    }
}

/// Servo-driven gripper
pub struct ServoGripper {
    config: ServoConfig,
    /// Physical position, 0..=travel
    current: i32,
    target: i32,
    speed: u16,
    stop: StopAction,
    /// Physical position of logical zero
    zero: i32,
    position_sp: i32,
    released: bool,
}

impl ServoGripper {
    /// Create a released gripper assumed to sit at position 0
    pub fn new(config: ServoConfig) -> Self {
        Self {
            config,
            current: 0,
            target: 0,
            speed: 0,
            stop: StopAction::Hold,
            zero: 0,
            position_sp: 0,
            released: true,
        }
    }

    /// Advance the slew by `dt_ms`
    ///
    /// Returns the pulse width to output, or `None` to turn the signal off.
    pub fn update(&mut self, dt_ms: u32) -> Option<u16> {
        if self.released {
            return None;
        }

        let step = (self.speed as u32 * dt_ms / 1000).max(1) as i32;
        self.current += (self.target - self.current).clamp(-step, step);

        if self.current == self.target && self.stop == StopAction::Coast {
            self.released = true;
            return None;
        }

        Some(self.pulse_us())
    }

    /// Pulse width for the current position
    pub fn pulse_us(&self) -> u16 {
        let span = (self.config.max_pulse_us - self.config.min_pulse_us) as i32;
        let offset = self.current * span / self.config.travel.max(1);
        (self.config.min_pulse_us as i32 + offset) as u16
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Actuator for ServoGripper {
    fn run_forever(&mut self, _speed: i32) -> Result<(), ActuatorError> {
        Err(ActuatorError::Unsupported)
    }

    fn run_to_abs_pos(
        &mut self,
        target: i32,
        speed: u16,
        stop: StopAction,
    ) -> Result<(), ActuatorError> {
        let physical = target + self.zero;
        if !(0..=self.config.travel).contains(&physical) {
            return Err(ActuatorError::PositionOutOfRange);
        }

        self.target = physical;
        self.speed = speed;
        self.stop = stop;
        self.position_sp = target;
        self.released = false;
        Ok(())
    }

    fn stop(&mut self, action: StopAction) -> Result<(), ActuatorError> {
        self.target = self.current;
        match action {
            StopAction::Hold => self.released = false,
            StopAction::Coast => self.released = true,
        }
        Ok(())
    }

    fn position(&self) -> i32 {
        self.current - self.zero
    }

    fn position_sp(&self) -> i32 {
        self.position_sp
    }

    fn reset_position(&mut self) {
        self.zero = self.current;
        self.position_sp = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_released_until_commanded() {
        let mut g = ServoGripper::new(ServoConfig::default());
        assert!(g.is_released());
        assert_eq!(g.update(10), None);
    }

    #[test]
    fn test_slews_at_commanded_speed() {
        let mut g = ServoGripper::new(ServoConfig::default());
        g.run_to_abs_pos(1750, 1000, StopAction::Hold).unwrap();

        assert_eq!(g.update(100), Some(1055));
        assert_eq!(g.position(), 100);

        for _ in 0..20 {
            g.update(100);
        }
        assert_eq!(g.position(), 1750);
        assert!(!g.is_released());
    }

    #[test]
    fn test_pulse_range() {
        let mut g = ServoGripper::new(ServoConfig::default());
        assert_eq!(g.pulse_us(), 1000);
        g.run_to_abs_pos(1800, 900, StopAction::Hold).unwrap();
        for _ in 0..10 {
            g.update(1000);
        }
        assert_eq!(g.pulse_us(), 2000);
    }

    #[test]
    fn test_out_of_travel_rejected() {
        let mut g = ServoGripper::new(ServoConfig::default());
        assert_eq!(
            g.run_to_abs_pos(1801, 100, StopAction::Hold),
            Err(ActuatorError::PositionOutOfRange)
        );
        assert_eq!(
            g.run_to_abs_pos(-1, 100, StopAction::Hold),
            Err(ActuatorError::PositionOutOfRange)
        );
    }

    #[test]
    fn test_velocity_mode_unsupported() {
        let mut g = ServoGripper::new(ServoConfig::default());
        assert_eq!(g.run_forever(100), Err(ActuatorError::Unsupported));
    }

    #[test]
    fn test_coast_releases() {
        let mut g = ServoGripper::new(ServoConfig::default());
        g.run_to_abs_pos(20, 1000, StopAction::Hold).unwrap();
        g.update(10);
        g.stop(StopAction::Coast).unwrap();
        assert_eq!(g.update(10), None);
        assert_eq!(g.position(), 10);
    }

    #[test]
    fn test_reset_moves_zero() {
        let mut g = ServoGripper::new(ServoConfig::default());
        g.run_to_abs_pos(500, 1000, StopAction::Hold).unwrap();
        g.update(1000);
        g.reset_position();
        assert_eq!(g.position(), 0);
        // Physical 600 is within travel
        assert!(g.run_to_abs_pos(100, 1000, StopAction::Hold).is_ok());
        assert_eq!(
            g.run_to_abs_pos(-501, 1000, StopAction::Hold),
            Err(ActuatorError::PositionOutOfRange)
        );
    }
}
