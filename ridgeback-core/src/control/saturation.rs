//! Velocity saturation
//!
//! The traction actuators fault above |900|; every velocity the controller
//! sends is clamped to `[-max_speed, max_speed]` first.

/// Clamp a wheel-velocity pair into the safe envelope
///
/// Each side is clamped independently. NaN maps to zero.
pub fn saturate(left: f32, right: f32, max_speed: i32) -> (f32, f32) {
    let max = max_speed as f32;
    (clamp_one(left, max), clamp_one(right, max))
}

fn clamp_one(speed: f32, max: f32) -> f32 {
    if speed.is_nan() {
        0.0
    } else {
        speed.clamp(-max, max)
    }
}

/// Convert a saturated velocity to the integer command unit
///
/// Truncates toward zero.
pub fn to_speed(speed: f32) -> i32 {
    speed as i32
}
