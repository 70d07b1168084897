//! Robot controller context
//!
//! [`Robot`] owns every piece of mutable controller state: the phase, the
//! PID memory and gains, the hill-assist monitor, and the sequencers for
//! the discrete maneuvers. One call to [`Robot::tick`] runs one control
//! tick against one sensor frame and returns the commands to send.
//!
//! Tick order:
//! 1. PID compute (every tick, so the derivative memory stays current)
//! 2. Gate: saturated PID output to the wheels in continuous phases
//! 3. Phase handler, which may raise an [`Event`]
//! 4. Transition, with exit and entry actions for the phases involved

use crate::config::RobotConfig;
use crate::control::{gate_for, LineFollower, PidState};
use crate::maneuver::{
    HillAssist, HillOutcome, PickupOutcome, PickupSequencer, RotateTo, ScanRecord, StairOutcome,
    StairSequencer, StallDetector, TargetLocator,
};
use crate::output::{Telemetry, TickOutput};
use crate::safety::Fault;
use crate::state::{Event, RobotPhase};
use crate::traits::{Command, MotorId, SensorFrame, StopAction};

/// Complete controller state
#[derive(Debug, Clone)]
pub struct Robot {
    config: RobotConfig,
    phase: RobotPhase,
    pid: PidState,
    follower: LineFollower,
    gyro_baseline: i32,
    hill: HillAssist,
    stall: StallDetector,
    stair: StairSequencer,
    rotation: Option<RotateTo>,
    locator: TargetLocator,
    pickup: Option<PickupSequencer>,
}

impl Robot {
    /// Create a controller calibrated from the startup frame
    ///
    /// The configuration is expected to be validated.
    pub fn new(config: RobotConfig, startup: &SensorFrame, now_ms: u32) -> Self {
        Self {
            phase: RobotPhase::LineFollow,
            pid: PidState::new(&config.line_follow),
            follower: LineFollower::calibrate(
                startup.readings.reflectance,
                config.line_follow.calibration_factor,
            ),
            gyro_baseline: startup.readings.gyro_angle,
            hill: HillAssist::new(0, now_ms),
            stall: StallDetector::default(),
            stair: StairSequencer::default(),
            rotation: None,
            locator: TargetLocator::new(config.search.no_target_range),
            pickup: None,
            config,
        }
    }

    /// Commands to send once before the first tick
    ///
    /// Zeroes all three encoders and closes the gripper, which doubles as
    /// a climbing support.
    pub fn startup_commands(&self) -> TickOutput {
        let mut out = TickOutput::new();
        for id in MotorId::ALL {
            out.command(Command::ResetPosition(id));
        }
        out.command(Command::run_to(
            MotorId::Gripper,
            self.config.gripper.closed_position,
            self.config.gripper.speed,
            StopAction::Hold,
        ));
        out
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn phase(&self) -> RobotPhase {
        self.phase
    }

    pub fn pid(&self) -> &PidState {
        &self.pid
    }

    pub fn hill_assist(&self) -> &HillAssist {
        &self.hill
    }

    pub fn stair_ordinal(&self) -> u8 {
        self.stair.ordinal()
    }

    pub fn scan_record(&self) -> Option<ScanRecord> {
        self.locator.best()
    }

    /// Run one control tick
    pub fn tick(&mut self, now_ms: u32, frame: &SensorFrame) -> Result<TickOutput, Fault> {
        let mut out = TickOutput::new();

        let speeds = self.follower.compute(&mut self.pid, frame.readings.reflectance);
        if let Some((left, right)) = gate_for(self.phase).pass(speeds, self.config.limits.max_speed)
        {
            out.drive(left, right);
        }

        let event = match self.phase {
            RobotPhase::LineFollow => self.line_follow(now_ms, frame, &mut out),
            RobotPhase::StairCross => Some(Event::StairArmed),
            RobotPhase::SlopeClimb => self.slope_climb(now_ms, frame),
            RobotPhase::EndOfLineCheck => self.end_of_line_check(frame, &mut out),
            RobotPhase::TurnAlign => self.turn_align(frame, &mut out),
            RobotPhase::Search => self.search(frame, &mut out),
            RobotPhase::Locked => self.locked(&mut out)?,
            RobotPhase::Approach => self.approach(frame, &mut out)?,
            RobotPhase::Pickup => self.pickup(now_ms, frame, &mut out)?,
        };

        if let Some(event) = event {
            self.handle_event(event, now_ms, &mut out);
        }

        Ok(out)
    }

    fn handle_event(&mut self, event: Event, now_ms: u32, out: &mut TickOutput) {
        let from = self.phase;
        let to = from.transition(event);
        if to == from {
            return;
        }

        self.exit(from);
        self.phase = to;
        out.report(Telemetry::PhaseChanged { from, to });
        self.enter(to, now_ms, out);
    }

    fn exit(&mut self, phase: RobotPhase) {
        match phase {
            RobotPhase::TurnAlign | RobotPhase::Search | RobotPhase::Approach => {
                self.rotation = None;
            }
            RobotPhase::Pickup => {
                self.pickup = None;
                self.locator.reset();
            }
            _ => {}
        }
    }

    fn enter(&mut self, phase: RobotPhase, now_ms: u32, out: &mut TickOutput) {
        match phase {
            RobotPhase::StairCross => {
                self.hill.disable();
                self.stall.arm(now_ms);
                out.zero_encoders();
            }
            RobotPhase::SlopeClimb => self.stair.reset(),
            RobotPhase::EndOfLineCheck => {
                out.stop_wheels(StopAction::Hold);
                out.zero_encoders();
            }
            RobotPhase::TurnAlign => out.stop_wheels(StopAction::Coast),
            RobotPhase::Search => self.locator.reset(),
            RobotPhase::Locked => out.stop_wheels(StopAction::Hold),
            RobotPhase::Approach | RobotPhase::Pickup | RobotPhase::LineFollow => {}
        }
    }

    fn line_follow(
        &mut self,
        now_ms: u32,
        frame: &SensorFrame,
        out: &mut TickOutput,
    ) -> Option<Event> {
        let orientation = frame.readings.gyro_angle - self.gyro_baseline;
        let outcome = self.hill.update(
            &self.config.hill_assist,
            &mut self.pid,
            self.config.line_follow.kp,
            now_ms,
            orientation,
        );

        match outcome {
            HillOutcome::Idle => None,
            HillOutcome::Entered { drift } => {
                out.report(Telemetry::SlopeEntered {
                    drift,
                    kp: self.pid.kp,
                });
                None
            }
            HillOutcome::Exited { drift, count } => {
                out.report(Telemetry::SlopeExited {
                    drift,
                    kp: self.pid.kp,
                    count,
                });
                None
            }
            HillOutcome::StairsAhead { drift } => {
                out.report(Telemetry::SlopeExited {
                    drift,
                    kp: self.pid.kp,
                    count: self.config.hill_assist.exits_to_stairs,
                });
                Some(Event::SlopeExitsReached)
            }
        }
    }

    fn slope_climb(&mut self, now_ms: u32, frame: &SensorFrame) -> Option<Event> {
        self.stall
            .sample(&self.config.stair, now_ms, frame.readings.reflectance)
            .then_some(Event::Stalled)
    }

    fn end_of_line_check(&mut self, frame: &SensorFrame, out: &mut TickOutput) -> Option<Event> {
        match self.stair.step(&self.config.stair, frame, out) {
            StairOutcome::LineDetected => {
                out.report(Telemetry::LineReacquired);
                Some(Event::LineDetected)
            }
            StairOutcome::Moving { .. } => None,
            StairOutcome::Advanced { ordinal, rezero } => {
                out.report(Telemetry::StairStep { ordinal });
                if rezero {
                    out.zero_encoders();
                }
                None
            }
            StairOutcome::Cleared => Some(Event::StairsCleared),
        }
    }

    fn turn_align(&mut self, frame: &SensorFrame, out: &mut TickOutput) -> Option<Event> {
        let gripper = self.config.gripper;
        out.command(Command::run_to(
            MotorId::Gripper,
            gripper.rest_position,
            gripper.speed,
            StopAction::Hold,
        ));

        let align = self.config.turn_align;
        let speed = self.config.search.speed;
        let rotation = *self.rotation.get_or_insert_with(|| {
            RotateTo::new(frame, (align.left_target, align.right_target), speed, align.tolerance)
        });

        rotation.step(frame, out).then_some(Event::Aligned)
    }

    fn search(&mut self, frame: &SensorFrame, out: &mut TickOutput) -> Option<Event> {
        let search = self.config.search;
        let tolerance = self.config.turn_align.tolerance;
        let rotation = *self.rotation.get_or_insert_with(|| {
            RotateTo::new(frame, (search.left_target, search.right_target), search.speed, tolerance)
        });

        let arrived = rotation.step(frame, out);

        if let Some(record) = self
            .locator
            .observe(frame.readings.range_mm, frame.left_pos, frame.right_pos)
        {
            out.report(Telemetry::TargetCandidate {
                range_mm: record.min_range,
                left_pos: record.left_pos,
                right_pos: record.right_pos,
            });
        }

        arrived.then_some(Event::SweepComplete)
    }

    fn locked(&mut self, out: &mut TickOutput) -> Result<Option<Event>, Fault> {
        let target = self.locator.best().ok_or(Fault::TargetNotFound)?;
        out.drive_to(target.left_pos, target.right_pos, self.config.search.speed);
        Ok(Some(Event::TargetLocked))
    }

    fn approach(
        &mut self,
        frame: &SensorFrame,
        out: &mut TickOutput,
    ) -> Result<Option<Event>, Fault> {
        let target = self.locator.best().ok_or(Fault::TargetNotFound)?;
        let speed = self.config.search.speed;
        let tolerance = self.config.turn_align.tolerance;
        let rotation = *self.rotation.get_or_insert_with(|| {
            RotateTo::new(frame, (target.left_pos, target.right_pos), speed, tolerance)
        });

        if !rotation.step(frame, out) {
            return Ok(None);
        }

        let reverse = -self.config.line_follow.base_speed;
        out.drive(reverse, reverse);
        self.pickup = Some(PickupSequencer::begin(
            frame.left_pos,
            target.min_range,
            &self.config.pickup,
        ));
        Ok(Some(Event::BearingReached))
    }

    fn pickup(
        &mut self,
        now_ms: u32,
        frame: &SensorFrame,
        out: &mut TickOutput,
    ) -> Result<Option<Event>, Fault> {
        let sequencer = self.pickup.as_mut().ok_or(Fault::TargetNotFound)?;
        let outcome = sequencer.step(
            &self.config.pickup,
            &self.config.gripper,
            now_ms,
            frame,
            out,
        );
        Ok((outcome == PickupOutcome::Complete).then_some(Event::PickupComplete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MotorOp, SensorReadings};

    fn frame(reflectance: [u8; 2], gyro_angle: i32, left_pos: i32, right_pos: i32) -> SensorFrame {
        SensorFrame {
            readings: SensorReadings {
                reflectance,
                gyro_angle,
                range_mm: 2000,
            },
            left_pos,
            right_pos,
        }
    }

    fn ranged(range_mm: u16, left_pos: i32, right_pos: i32) -> SensorFrame {
        let mut f = frame([40, 40], 0, left_pos, right_pos);
        f.readings.range_mm = range_mm;
        f
    }

    fn robot() -> Robot {
        Robot::new(RobotConfig::default(), &frame([40, 40], 0, 0, 0), 0)
    }

    fn phase_changes(out: &TickOutput) -> usize {
        out.telemetry()
            .iter()
            .filter(|t| matches!(t, Telemetry::PhaseChanged { .. }))
            .count()
    }

    /// Two slope exits, then a stall: ends in `EndOfLineCheck` at t=4010
    fn climb_to_stairs(robot: &mut Robot) {
        robot.tick(1000, &frame([40, 40], -13, 0, 0)).unwrap();
        robot.tick(2000, &frame([40, 40], -26, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::StairCross);
        robot.tick(2010, &frame([40, 40], -26, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::SlopeClimb);
        robot.tick(3010, &frame([40, 40], -26, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::SlopeClimb);
        robot.tick(4010, &frame([41, 39], -26, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::EndOfLineCheck);
    }

    /// Drive the stair table and the turn: ends in `Search`
    fn cross_and_align(robot: &mut Robot) {
        climb_to_stairs(robot);
        let done = [(-96, 96), (196, -196), (4, -4), (-96, -96), (-96, 96), (196, -196)];
        for &(l, r) in &done {
            robot.tick(5000, &frame([40, 40], 0, l, r)).unwrap();
        }
        assert_eq!(robot.phase(), RobotPhase::TurnAlign);
        robot.tick(5000, &frame([40, 40], 0, 196, -196)).unwrap();
        robot.tick(5000, &frame([40, 40], 0, -696, 696)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::Search);
    }

    #[test]
    fn test_startup_commands() {
        let out = robot().startup_commands();
        assert_eq!(
            out.commands(),
            &[
                Command::ResetPosition(MotorId::Left),
                Command::ResetPosition(MotorId::Right),
                Command::ResetPosition(MotorId::Gripper),
                Command::run_to(MotorId::Gripper, 1750, 1000, StopAction::Hold),
            ]
        );
    }

    #[test]
    fn test_equal_readings_drive_straight() {
        let mut robot = robot();
        let expected = [Command::run(MotorId::Left, 200), Command::run(MotorId::Right, 200)];

        for tick in 1..=100u32 {
            let out = robot.tick(tick * 10, &frame([40, 40], 0, 0, 0)).unwrap();
            assert_eq!(out.commands(), &expected);
        }
        assert_eq!(robot.phase(), RobotPhase::LineFollow);
    }

    #[test]
    fn test_steering_is_saturated() {
        let mut robot = robot();
        let out = robot.tick(10, &frame([100, 0], 0, 0, 0)).unwrap();
        assert_eq!(
            out.commands(),
            &[Command::run(MotorId::Left, -500), Command::run(MotorId::Right, 500)]
        );
    }

    #[test]
    fn test_slope_gain_cycle() {
        let mut robot = robot();

        let out = robot.tick(1000, &frame([40, 40], 15, 0, 0)).unwrap();
        assert_eq!(robot.pid().kp, 5.0);
        assert!(out
            .telemetry()
            .contains(&Telemetry::SlopeEntered { drift: -15, kp: 5.0 }));

        robot.tick(2000, &frame([40, 40], 2, 0, 0)).unwrap();
        assert_eq!(robot.pid().kp, 15.0);
        assert_eq!(robot.hill_assist().exits(), 1);
        assert_eq!(robot.phase(), RobotPhase::LineFollow);
    }

    #[test]
    fn test_second_slope_exit_enters_stairs() {
        let mut robot = robot();
        robot.tick(1000, &frame([40, 40], -13, 0, 0)).unwrap();
        let out = robot.tick(2000, &frame([40, 40], -26, 0, 0)).unwrap();

        assert_eq!(robot.phase(), RobotPhase::StairCross);
        assert!(!robot.hill_assist().is_enabled());
        assert_eq!(robot.hill_assist().exits(), 0);
        assert!(out.commands().contains(&Command::ResetPosition(MotorId::Left)));
        assert!(out.commands().contains(&Command::ResetPosition(MotorId::Right)));
        assert!(out.telemetry().contains(&Telemetry::EncodersZeroed));

        robot.tick(2010, &frame([40, 40], -26, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::SlopeClimb);
    }

    #[test]
    fn test_stair_entry_uses_baseline_gain() {
        let mut robot = robot();
        robot.tick(1000, &frame([40, 40], 20, 0, 0)).unwrap();
        assert_eq!(robot.pid().kp, 5.0);
        robot.tick(2000, &frame([40, 40], 7, 0, 0)).unwrap();
        let out = robot.tick(3000, &frame([40, 40], -6, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::StairCross);
        assert_eq!(robot.pid().kp, 15.0);
        assert!(out.telemetry().contains(&Telemetry::SlopeExited {
            drift: 13,
            kp: 15.0,
            count: 2
        }));
    }

    #[test]
    fn test_stall_stops_and_zeroes() {
        let mut robot = robot();
        robot.tick(1000, &frame([40, 40], -13, 0, 0)).unwrap();
        robot.tick(2000, &frame([40, 40], -26, 0, 0)).unwrap();
        robot.tick(2010, &frame([40, 40], -26, 0, 0)).unwrap();
        robot.tick(3010, &frame([40, 40], -26, 0, 0)).unwrap();
        let out = robot.tick(4010, &frame([40, 40], -26, 0, 0)).unwrap();

        assert_eq!(robot.phase(), RobotPhase::EndOfLineCheck);
        let commands = out.commands();
        // PID output first, then the stop and the encoder reset
        assert_eq!(commands[0], Command::run(MotorId::Left, 200));
        assert_eq!(commands[2], Command::stop(MotorId::Left, StopAction::Hold));
        assert_eq!(commands[3], Command::stop(MotorId::Right, StopAction::Hold));
        assert_eq!(commands[4], Command::ResetPosition(MotorId::Left));
        assert_eq!(commands[5], Command::ResetPosition(MotorId::Right));
    }

    #[test]
    fn test_gate_closed_in_stair_check() {
        let mut robot = robot();
        climb_to_stairs(&mut robot);
        let out = robot.tick(4020, &frame([100, 20], 0, 0, 0)).unwrap();
        assert!(out.commands().iter().all(|c| !matches!(
            c,
            Command::Motor {
                op: MotorOp::RunForever { .. },
                ..
            }
        )));
    }

    #[test]
    fn test_stair_sequence_reaches_turn_align() {
        let mut robot = robot();
        climb_to_stairs(&mut robot);

        let done = [(-96, 96), (196, -196), (4, -4), (-96, -96), (-96, 96)];
        for (i, &(l, r)) in done.iter().enumerate() {
            let out = robot.tick(5000, &frame([40, 40], 0, l, r)).unwrap();
            assert!(out.telemetry().contains(&Telemetry::StairStep {
                ordinal: i as u8 + 1
            }));
            assert_eq!(out.commands().contains(&Command::ResetPosition(MotorId::Left)), i == 3);
            assert_eq!(robot.phase(), RobotPhase::EndOfLineCheck);
        }

        // Short of the final threshold
        robot.tick(5000, &frame([40, 40], 0, 150, -150)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::EndOfLineCheck);

        let out = robot.tick(5000, &frame([40, 40], 0, 196, -196)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::TurnAlign);
        assert_eq!(robot.stair_ordinal(), 5);
        assert!(out
            .commands()
            .contains(&Command::stop(MotorId::Left, StopAction::Coast)));
        assert!(out
            .commands()
            .contains(&Command::stop(MotorId::Right, StopAction::Coast)));
    }

    #[test]
    fn test_line_during_stair_check_returns_to_climb() {
        let mut robot = robot();
        climb_to_stairs(&mut robot);
        robot.tick(4020, &frame([40, 40], 0, -96, 96)).unwrap();
        assert_eq!(robot.stair_ordinal(), 1);

        let out = robot.tick(4030, &frame([40, 6], 0, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::SlopeClimb);
        assert_eq!(robot.stair_ordinal(), 0);
        assert!(out.telemetry().contains(&Telemetry::LineReacquired));

        // Stall detection keeps the sample taken at 4010
        robot.tick(4500, &frame([40, 40], 0, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::SlopeClimb);
        robot.tick(5010, &frame([40, 40], 0, 0, 0)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::EndOfLineCheck);
    }

    #[test]
    fn test_turn_align_opens_gripper() {
        let mut robot = robot();
        climb_to_stairs(&mut robot);
        let done = [(-96, 96), (196, -196), (4, -4), (-96, -96), (-96, 96), (196, -196)];
        for &(l, r) in &done {
            robot.tick(5000, &frame([40, 40], 0, l, r)).unwrap();
        }

        let out = robot.tick(5010, &frame([40, 40], 0, 196, -196)).unwrap();
        assert_eq!(
            out.commands(),
            &[
                Command::run_to(MotorId::Gripper, 0, 1000, StopAction::Hold),
                Command::run_to(MotorId::Left, -700, 200, StopAction::Hold),
                Command::run_to(MotorId::Right, 700, 200, StopAction::Hold),
            ]
        );
        assert_eq!(robot.phase(), RobotPhase::TurnAlign);
    }

    #[test]
    fn test_search_approach_and_pickup() {
        let mut robot = robot();
        cross_and_align(&mut robot);

        robot.tick(6000, &ranged(1500, -700, 700)).unwrap();
        robot.tick(6010, &ranged(300, -900, 900)).unwrap();
        robot.tick(6020, &ranged(600, -1000, 1000)).unwrap();
        let out = robot.tick(6030, &ranged(900, -1296, 1296)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::Locked);
        assert!(out
            .commands()
            .ends_with(&[
                Command::stop(MotorId::Left, StopAction::Hold),
                Command::stop(MotorId::Right, StopAction::Hold)
            ]));
        assert_eq!(
            robot.scan_record(),
            Some(ScanRecord {
                min_range: 300,
                left_pos: -900,
                right_pos: 900
            })
        );

        let out = robot.tick(6040, &ranged(900, -1296, 1296)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::Approach);
        assert_eq!(
            out.commands(),
            &[
                Command::run_to(MotorId::Left, -900, 200, StopAction::Hold),
                Command::run_to(MotorId::Right, 900, 200, StopAction::Hold),
            ]
        );

        robot.tick(6050, &ranged(900, -1200, 1200)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::Approach);
        let out = robot.tick(6060, &ranged(300, -904, 904)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::Pickup);
        assert!(out
            .commands()
            .ends_with(&[Command::run(MotorId::Left, -200), Command::run(MotorId::Right, -200)]));

        // Start at -904, approach distance 300 * 1.7 = 510
        robot.tick(6070, &ranged(200, -1000, 1000)).unwrap();
        let out = robot.tick(7000, &ranged(80, -1414, 1414)).unwrap();
        assert!(out
            .telemetry()
            .contains(&Telemetry::GripperClosed { left_pos: -1414 }));

        let out = robot.tick(7300, &ranged(80, -1470, 1470)).unwrap();
        assert_eq!(
            out.commands(),
            &[
                Command::stop(MotorId::Left, StopAction::Hold),
                Command::stop(MotorId::Right, StopAction::Hold)
            ]
        );
        assert_eq!(robot.phase(), RobotPhase::Pickup);

        let out = robot.tick(9000, &ranged(80, -1470, 1470)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::LineFollow);
        assert_eq!(phase_changes(&out), 1);
        assert_eq!(robot.pid().kp, 15.0);
        assert_eq!(robot.scan_record(), None);
        // Hill assist stays off for the rest of the run
        assert!(!robot.hill_assist().is_enabled());
    }

    #[test]
    fn test_empty_sweep_is_a_fault() {
        let mut robot = robot();
        cross_and_align(&mut robot);

        robot.tick(6000, &ranged(2600, -700, 700)).unwrap();
        robot.tick(6010, &ranged(2500, -1296, 1296)).unwrap();
        assert_eq!(robot.phase(), RobotPhase::Locked);
        assert_eq!(
            robot.tick(6020, &ranged(2500, -1296, 1296)).unwrap_err(),
            Fault::TargetNotFound
        );
    }
}
