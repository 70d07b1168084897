//! Per-tick controller output
//!
//! The controller never touches hardware. Each tick it fills a
//! [`TickOutput`] with ordered actuator commands and telemetry events;
//! the runner executes the commands and the firmware logs the telemetry.

use heapless::Vec;

use crate::state::RobotPhase;
use crate::traits::{Command, MotorId, StopAction};

/// Maximum commands produced in one tick
pub const MAX_COMMANDS: usize = 12;

/// Maximum telemetry events produced in one tick
pub const MAX_TELEMETRY: usize = 8;

/// Observable controller events
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Telemetry {
    /// Phase transition
    PhaseChanged { from: RobotPhase, to: RobotPhase },
    /// Slope detected; proportional gain lowered
    SlopeEntered { drift: i32, kp: f32 },
    /// Slope left; proportional gain restored
    SlopeExited { drift: i32, kp: f32, count: u8 },
    /// Traction encoders reset to zero
    EncodersZeroed,
    /// Stair maneuver advanced to a new ordinal
    StairStep { ordinal: u8 },
    /// Line seen during the stair check
    LineReacquired,
    /// New closest sample during the sweep
    TargetCandidate { range_mm: u16, left_pos: i32, right_pos: i32 },
    /// Gripper close command issued
    GripperClosed { left_pos: i32 },
    /// Wheel positions and range while picking up
    PickupProgress { left_pos: i32, right_pos: i32, range_mm: u16 },
    /// Tick period above the configured maximum
    TickOverrun { period_ms: u32 },
}

/// Commands and telemetry produced by one tick
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    commands: Vec<Command, MAX_COMMANDS>,
    telemetry: Vec<Telemetry, MAX_TELEMETRY>,
}

impl TickOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command
    ///
    /// Per-tick command counts are bounded well below capacity; an
    /// overflowing command is dropped.
    pub fn command(&mut self, command: Command) {
        let _ = self.commands.push(command);
    }

    /// Queue a telemetry event, dropping it if the buffer is full
    pub fn report(&mut self, event: Telemetry) {
        let _ = self.telemetry.push(event);
    }

    /// Command both traction wheels to a velocity
    pub fn drive(&mut self, left: i32, right: i32) {
        self.command(Command::run(MotorId::Left, left));
        self.command(Command::run(MotorId::Right, right));
    }

    /// Command both traction wheels to absolute positions
    pub fn drive_to(&mut self, left: i32, right: i32, speed: u16) {
        self.command(Command::run_to(MotorId::Left, left, speed, StopAction::Hold));
        self.command(Command::run_to(MotorId::Right, right, speed, StopAction::Hold));
    }

    /// Stop both traction wheels
    pub fn stop_wheels(&mut self, action: StopAction) {
        self.command(Command::stop(MotorId::Left, action));
        self.command(Command::stop(MotorId::Right, action));
    }

    /// Reset both traction encoders
    pub fn zero_encoders(&mut self) {
        self.command(Command::ResetPosition(MotorId::Left));
        self.command(Command::ResetPosition(MotorId::Right));
        self.report(Telemetry::EncodersZeroed);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn telemetry(&self) -> &[Telemetry] {
        &self.telemetry
    }
}
