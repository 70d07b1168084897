//! Mission state machine
//!
//! Defines the phases the robot moves through and the only legal
//! transitions between them. The state machine is explicit, finite, and
//! deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::RobotPhase;
