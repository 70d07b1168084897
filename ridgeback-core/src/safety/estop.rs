//! Emergency stop

use crate::traits::{MotorId, Platform, StopAction};

/// Coast every actuator
///
/// Best effort: a failing actuator does not prevent the others from being
/// stopped. Returns the number of actuators that rejected the command.
pub fn emergency_stop<P: Platform + ?Sized>(platform: &mut P) -> u8 {
    let mut failed = 0;
    for id in MotorId::ALL {
        if platform.actuator(id).stop(StopAction::Coast).is_err() {
            failed += 1;
        }
    }
    failed
}
