//! Hardware abstraction traits
//!
//! These traits define the interface between the control core and the
//! board-specific sensor and actuator implementations.

pub mod clock;
pub mod motor;
pub mod platform;
pub mod sensor;

pub use clock::Clock;
pub use motor::{Actuator, ActuatorError, MotorId, StopAction, HARD_SPEED_LIMIT};
pub use platform::{Command, MotorOp, Platform};
pub use sensor::{SensorError, SensorFrame, SensorId, SensorReadings};
