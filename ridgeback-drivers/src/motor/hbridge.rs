//! Two-input H-bridge
//!
//! Drives bridges controlled by two PWM inputs (DRV8837, DRV8833 and
//! similar):
//!
//! | IN1 | IN2 | Motor state |
//! |-----|-----|-------------|
//! | 0   | 0   | Coast       |
//! | PWM | 0   | Forward     |
//! | 0   | PWM | Reverse     |
//! | 1   | 1   | Brake       |

use embedded_hal::pwm::SetDutyCycle;
use ridgeback_core::traits::ActuatorError;

use super::encoder::{DriveMode, DUTY_MAX};

/// H-bridge on two PWM channels
pub struct HBridge<IN1, IN2> {
    in1: IN1,
    in2: IN2,
}

impl<IN1: SetDutyCycle, IN2: SetDutyCycle> HBridge<IN1, IN2> {
    /// Create a bridge; both inputs are driven low
    pub fn new(mut in1: IN1, mut in2: IN2) -> Result<Self, ActuatorError> {
        off(&mut in1)?;
        off(&mut in2)?;
        Ok(Self { in1, in2 })
    }

    /// Apply a signed duty in per-mille; zero coasts
    pub fn apply(&mut self, duty: i16) -> Result<(), ActuatorError> {
        let magnitude = duty.unsigned_abs().min(DUTY_MAX as u16);
        if duty >= 0 {
            off(&mut self.in2)?;
            on(&mut self.in1, magnitude)
        } else {
            off(&mut self.in1)?;
            on(&mut self.in2, magnitude)
        }
    }

    /// Release the motor (both inputs low)
    pub fn coast(&mut self) -> Result<(), ActuatorError> {
        self.apply(0)
    }

    /// Short the motor terminals (both inputs high)
    pub fn brake(&mut self) -> Result<(), ActuatorError> {
        self.in1.set_duty_cycle_fully_on().map_err(|_| ActuatorError::Fault)?;
        self.in2.set_duty_cycle_fully_on().map_err(|_| ActuatorError::Fault)
    }

    /// Drive the outputs for a motor loop's mode and duty
    ///
    /// A hold sitting on its target brakes instead of leaving the shaft free.
    pub fn drive(&mut self, mode: DriveMode, duty: i16) -> Result<(), ActuatorError> {
        match mode {
            DriveMode::Coasting => self.coast(),
            DriveMode::Holding(_) if duty == 0 => self.brake(),
            _ => self.apply(duty),
        }
    }
}

fn off<P: SetDutyCycle>(pin: &mut P) -> Result<(), ActuatorError> {
    pin.set_duty_cycle_fully_off().map_err(|_| ActuatorError::Fault)
}

fn on<P: SetDutyCycle>(pin: &mut P, per_mille: u16) -> Result<(), ActuatorError> {
    pin.set_duty_cycle_fraction(per_mille, DUTY_MAX as u16)
        .map_err(|_| ActuatorError::Fault)
}
