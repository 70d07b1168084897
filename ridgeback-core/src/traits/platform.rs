//! Platform abstraction
//!
//! A [`Platform`] bundles the sensors and the three actuators of one robot.
//! The control core never touches devices directly: it reads one
//! [`SensorFrame`] per tick and emits an ordered list of [`Command`]s.

use super::motor::{Actuator, ActuatorError, MotorId, StopAction};
use super::sensor::{SensorError, SensorFrame, SensorReadings};

/// A single actuator operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorOp {
    /// Continuous velocity
    RunForever { speed: i32 },
    /// Absolute position move
    RunToAbsPos {
        target: i32,
        speed: u16,
        stop: StopAction,
    },
    /// Immediate stop
    Stop(StopAction),
}

/// Command emitted by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Operation on one actuator
    Motor { id: MotorId, op: MotorOp },
    /// Re-zero one actuator's encoder
    ResetPosition(MotorId),
}

impl Command {
    /// Velocity command
    pub const fn run(id: MotorId, speed: i32) -> Self {
        Self::Motor {
            id,
            op: MotorOp::RunForever { speed },
        }
    }

    /// Position command
    pub const fn run_to(id: MotorId, target: i32, speed: u16, stop: StopAction) -> Self {
        Self::Motor {
            id,
            op: MotorOp::RunToAbsPos {
                target,
                speed,
                stop,
            },
        }
    }

    /// Stop command
    pub const fn stop(id: MotorId, action: StopAction) -> Self {
        Self::Motor {
            id,
            op: MotorOp::Stop(action),
        }
    }
}

/// The robot's devices
pub trait Platform {
    /// Sample reflectance, gyro, and range sensors
    fn read_sensors(&mut self) -> Result<SensorReadings, SensorError>;

    /// Access an actuator
    fn actuator(&mut self, id: MotorId) -> &mut dyn Actuator;

    /// Sample sensors and both wheel positions
    fn read_frame(&mut self) -> Result<SensorFrame, SensorError> {
        let readings = self.read_sensors()?;
        let left_pos = self.actuator(MotorId::Left).position();
        let right_pos = self.actuator(MotorId::Right).position();
        Ok(SensorFrame {
            readings,
            left_pos,
            right_pos,
        })
    }

    /// Apply one command
    fn execute(&mut self, command: &Command) -> Result<(), ActuatorError> {
        match *command {
            Command::Motor { id, op } => {
                let actuator = self.actuator(id);
                match op {
                    MotorOp::RunForever { speed } => actuator.run_forever(speed),
                    MotorOp::RunToAbsPos {
                        target,
                        speed,
                        stop,
                    } => actuator.run_to_abs_pos(target, speed, stop),
                    MotorOp::Stop(action) => actuator.stop(action),
                }
            }
            Command::ResetPosition(id) => {
                self.actuator(id).reset_position();
                Ok(())
            }
        }
    }
}
