//! Actuator traits
//!
//! Every motor on the robot (both traction wheels and the gripper) is
//! driven through the same [`Actuator`] interface: a velocity mode, an
//! absolute-position mode, and an explicit stop with a stop action.

/// Speed magnitude above which the traction actuators fault
///
/// The controller clamps everything it sends well below this value.
pub const HARD_SPEED_LIMIT: i32 = 900;

/// Actuator identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorId {
    /// Left traction wheel
    Left,
    /// Right traction wheel
    Right,
    /// Gripper arm
    Gripper,
}

impl MotorId {
    /// All actuators, in emergency-stop order
    pub const ALL: [MotorId; 3] = [MotorId::Left, MotorId::Right, MotorId::Gripper];
}

/// Behavior of an actuator once it stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopAction {
    /// Actively servo to the stop position under load
    #[default]
    Hold,
    /// Release holding torque
    Coast,
}

/// Errors that can occur when commanding an actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// Commanded speed outside the actuator's envelope
    SpeedOutOfRange,
    /// Commanded position outside the actuator's travel
    PositionOutOfRange,
    /// Command mode not supported by this actuator
    Unsupported,
    /// Driver reported a hardware fault
    Fault,
}

/// Trait for a position-sensing motor
pub trait Actuator {
    /// Run continuously at a signed speed (degrees per second)
    fn run_forever(&mut self, speed: i32) -> Result<(), ActuatorError>;

    /// Run to an absolute encoder position at a speed magnitude, then apply `stop`
    fn run_to_abs_pos(&mut self, target: i32, speed: u16, stop: StopAction)
        -> Result<(), ActuatorError>;

    /// Stop immediately with the given stop action
    fn stop(&mut self, action: StopAction) -> Result<(), ActuatorError>;

    /// Current position relative to the last reset
    fn position(&self) -> i32;

    /// Last commanded absolute-position target
    fn position_sp(&self) -> i32;

    /// Make the current position the new zero
    fn reset_position(&mut self);
}
