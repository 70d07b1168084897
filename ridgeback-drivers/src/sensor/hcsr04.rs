//! HC-SR04 ultrasonic ranging
//!
//! The sensor reports distance as the width of its echo pulse. Sound
//! travels 0.343 mm/µs and the pulse covers the round trip.

/// Farthest distance reported (mm); also reported for a missing echo
pub const MAX_RANGE_MM: u16 = 2550;

/// Echo wait limit before a reading counts as out of range (µs)
pub const ECHO_TIMEOUT_US: u32 = 25_000;

/// Trigger pulse width (µs)
pub const TRIGGER_PULSE_US: u32 = 10;

/// Convert an echo pulse width to millimetres
///
/// `None` means no echo arrived within [`ECHO_TIMEOUT_US`].
pub fn echo_to_mm(echo_us: Option<u32>) -> u16 {
    match echo_us {
        Some(us) => {
            let mm = us as u64 * 343 / 2000;
            mm.min(MAX_RANGE_MM as u64) as u16
        }
        None => MAX_RANGE_MM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion() {
        // 1 m is about 5831 µs round trip
        assert_eq!(echo_to_mm(Some(5831)), 1000);
        assert_eq!(echo_to_mm(Some(0)), 0);
    }

    #[test]
    fn test_clamps_to_max() {
        assert_eq!(echo_to_mm(Some(ECHO_TIMEOUT_US)), MAX_RANGE_MM);
        assert_eq!(echo_to_mm(Some(u32::MAX)), MAX_RANGE_MM);
    }

    #[test]
    fn test_missing_echo_is_far() {
        assert_eq!(echo_to_mm(None), MAX_RANGE_MM);
    }
}
