//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod control;
pub mod encoder;
pub mod estop;
pub mod gyro;
pub mod ranging;

pub use control::control_task;
pub use encoder::encoder_task;
pub use estop::estop_task;
pub use gyro::gyro_task;
pub use ranging::ranging_task;
