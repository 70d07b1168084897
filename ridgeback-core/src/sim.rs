//! Simulated platform for controller tests
//!
//! Motors follow a simple kinematic model: velocity mode integrates the
//! commanded speed, position mode moves toward the target at the
//! commanded speed and stops on it.

extern crate std;

use core::cell::Cell;
use std::vec::Vec;

use crate::traits::{
    Actuator, ActuatorError, Clock, MotorId, MotorOp, Platform, SensorError, SensorReadings,
    StopAction, HARD_SPEED_LIMIT,
};

/// Clock advanced by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Velocity(i32),
    Position { target: i32, speed: i32 },
}

/// Simulated encoder motor
#[derive(Debug, Clone)]
pub struct SimMotor {
    pub position: i32,
    pub position_sp: i32,
    pub last_stop: Option<StopAction>,
    pub resets: u32,
    pub ops: Vec<MotorOp>,
    pub fail_with: Option<ActuatorError>,
    mode: Mode,
}

impl Default for SimMotor {
    fn default() -> Self {
        Self {
            position: 0,
            position_sp: 0,
            last_stop: None,
            resets: 0,
            ops: Vec::new(),
            fail_with: None,
            mode: Mode::Idle,
        }
    }
}

impl SimMotor {
    fn check(&self) -> Result<(), ActuatorError> {
        match self.fail_with {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Integrate motion over `dt_ms`
    pub fn advance(&mut self, dt_ms: u32) {
        match self.mode {
            Mode::Idle => {}
            Mode::Velocity(speed) => {
                self.position += speed * dt_ms as i32 / 1000;
            }
            Mode::Position { target, speed } => {
                let step = (speed * dt_ms as i32 / 1000).max(1);
                let delta = (target - self.position).clamp(-step, step);
                self.position += delta;
                if self.position == target {
                    self.mode = Mode::Idle;
                }
            }
        }
    }

    pub fn speed(&self) -> i32 {
        match self.mode {
            Mode::Velocity(speed) => speed,
            _ => 0,
        }
    }
}

impl Actuator for SimMotor {
    fn run_forever(&mut self, speed: i32) -> Result<(), ActuatorError> {
        self.check()?;
        if speed.abs() > HARD_SPEED_LIMIT {
            return Err(ActuatorError::SpeedOutOfRange);
        }
        self.ops.push(MotorOp::RunForever { speed });
        self.mode = Mode::Velocity(speed);
        Ok(())
    }

    fn run_to_abs_pos(
        &mut self,
        target: i32,
        speed: u16,
        stop: StopAction,
    ) -> Result<(), ActuatorError> {
        self.check()?;
        self.ops.push(MotorOp::RunToAbsPos {
            target,
            speed,
            stop,
        });
        self.position_sp = target;
        self.mode = Mode::Position {
            target,
            speed: speed as i32,
        };
        Ok(())
    }

    fn stop(&mut self, action: StopAction) -> Result<(), ActuatorError> {
        self.check()?;
        self.ops.push(MotorOp::Stop(action));
        self.last_stop = Some(action);
        self.mode = Mode::Idle;
        Ok(())
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn position_sp(&self) -> i32 {
        self.position_sp
    }

    fn reset_position(&mut self) {
        self.position = 0;
        self.position_sp = 0;
        self.resets += 1;
        if let Mode::Position { .. } = self.mode {
            self.mode = Mode::Idle;
        }
    }
}

/// Simulated robot
#[derive(Debug, Clone, Default)]
pub struct SimPlatform {
    pub readings: SensorReadings,
    pub sensor_fault: Option<SensorError>,
    pub left: SimMotor,
    pub right: SimMotor,
    pub gripper: SimMotor,
}

impl SimPlatform {
    pub fn new(readings: SensorReadings) -> Self {
        Self {
            readings,
            ..Default::default()
        }
    }

    pub fn motor(&self, id: MotorId) -> &SimMotor {
        match id {
            MotorId::Left => &self.left,
            MotorId::Right => &self.right,
            MotorId::Gripper => &self.gripper,
        }
    }

    /// Integrate all motors over `dt_ms`
    pub fn advance(&mut self, dt_ms: u32) {
        self.left.advance(dt_ms);
        self.right.advance(dt_ms);
        self.gripper.advance(dt_ms);
    }
}

impl Platform for SimPlatform {
    fn read_sensors(&mut self) -> Result<SensorReadings, SensorError> {
        match self.sensor_fault {
            Some(e) => Err(e),
            None => Ok(self.readings),
        }
    }

    fn actuator(&mut self, id: MotorId) -> &mut dyn Actuator {
        match id {
            MotorId::Left => &mut self.left,
            MotorId::Right => &mut self.right,
            MotorId::Gripper => &mut self.gripper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Command;

    #[test]
    fn test_position_mode_stops_on_target() {
        let mut motor = SimMotor::default();
        motor.run_to_abs_pos(5, 200, StopAction::Hold).unwrap();
        motor.advance(10);
        assert_eq!(motor.position, 2);
        motor.advance(10);
        motor.advance(10);
        assert_eq!(motor.position, 5);
        motor.advance(10);
        assert_eq!(motor.position, 5);
    }

    #[test]
    fn test_platform_executes_commands() {
        let mut platform = SimPlatform::default();
        platform.execute(&Command::run(MotorId::Left, -200)).unwrap();
        platform.advance(100);
        assert_eq!(platform.left.position, -20);
        assert_eq!(platform.left.speed(), -200);

        platform.execute(&Command::ResetPosition(MotorId::Left)).unwrap();
        assert_eq!(platform.left.position, 0);
        assert_eq!(platform.left.resets, 1);

        assert_eq!(
            platform.execute(&Command::run(MotorId::Right, 1000)),
            Err(ActuatorError::SpeedOutOfRange)
        );
    }
}
