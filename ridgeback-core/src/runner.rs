//! Control loop runner
//!
//! Binds a [`Robot`] to a [`Platform`] and a [`Clock`]. Each
//! [`ControlLoop::step`] reads the clock once, reads one sensor frame,
//! runs one controller tick and executes the resulting commands in order.
//! Any failure along the way ends in the emergency stop.

use crate::config::RobotConfig;
use crate::output::{Telemetry, TickOutput};
use crate::robot::Robot;
use crate::safety::{emergency_stop, Fault, Shutdown, StopReason, TickMonitor};
use crate::state::RobotPhase;
use crate::traits::{ActuatorError, Clock, Platform};

/// Result of one successful step
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Clock reading used for this tick
    pub now_ms: u32,
    /// Phase after the tick
    pub phase: RobotPhase,
    /// Commands sent and telemetry raised
    pub output: TickOutput,
}

/// Running controller
pub struct ControlLoop<P, C> {
    platform: P,
    clock: C,
    robot: Robot,
    monitor: TickMonitor,
}

impl<P: Platform, C: Clock> ControlLoop<P, C> {
    /// Validate the configuration, calibrate and send the startup commands
    ///
    /// On failure the platform is stopped before it is dropped.
    pub fn start(mut platform: P, clock: C, config: RobotConfig) -> Result<Self, Shutdown> {
        match startup(&mut platform, &clock, config) {
            Ok(robot) => Ok(Self {
                platform,
                clock,
                robot,
                monitor: TickMonitor::new(config.timing.max_tick_period_ms),
            }),
            Err(fault) => Err(shutdown(&mut platform, StopReason::Fault(fault))),
        }
    }

    /// Run one control tick
    pub fn step(&mut self) -> Result<StepReport, Shutdown> {
        let now_ms = self.clock.now_ms();

        match self.try_step(now_ms) {
            Ok(output) => Ok(StepReport {
                now_ms,
                phase: self.robot.phase(),
                output,
            }),
            Err(fault) => Err(self.emergency_stop(StopReason::Fault(fault))),
        }
    }

    fn try_step(&mut self, now_ms: u32) -> Result<TickOutput, Fault> {
        let overrun = self.monitor.record(now_ms);
        let frame = self.platform.read_frame()?;
        let mut output = self.robot.tick(now_ms, &frame)?;

        if let Some(period_ms) = overrun {
            output.report(Telemetry::TickOverrun { period_ms });
        }

        execute_all(&mut self.platform, &output)?;
        Ok(output)
    }

    /// Coast every actuator and report why
    pub fn emergency_stop(&mut self, reason: StopReason) -> Shutdown {
        shutdown(&mut self.platform, reason)
    }

    /// Delay between the emergency stop and process exit
    pub fn settle_delay_ms(&self) -> u32 {
        self.robot.config().timing.settle_delay_ms
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn tick_monitor(&self) -> &TickMonitor {
        &self.monitor
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

fn startup<P: Platform, C: Clock>(
    platform: &mut P,
    clock: &C,
    config: RobotConfig,
) -> Result<Robot, Fault> {
    config.validate()?;
    let frame = platform.read_frame()?;
    let robot = Robot::new(config, &frame, clock.now_ms());
    execute_all(platform, &robot.startup_commands())?;
    Ok(robot)
}

fn execute_all<P: Platform + ?Sized>(
    platform: &mut P,
    output: &TickOutput,
) -> Result<(), ActuatorError> {
    for command in output.commands() {
        platform.execute(command)?;
    }
    Ok(())
}

fn shutdown<P: Platform + ?Sized>(platform: &mut P, reason: StopReason) -> Shutdown {
    Shutdown {
        reason,
        failed_stops: emergency_stop(platform),
    }
}
