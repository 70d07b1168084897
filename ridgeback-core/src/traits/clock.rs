//! Monotonic time source

/// Monotonic millisecond clock
///
/// Read once per control tick. The value may wrap; consumers compare
/// timestamps with wrapping subtraction.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Milliseconds elapsed from `since` to `now`, tolerant of wrap-around
#[inline]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_simple() {
        assert_eq!(elapsed_ms(1500, 500), 1000);
    }

    #[test]
    fn test_elapsed_wraps() {
        assert_eq!(elapsed_ms(100, u32::MAX - 99), 200);
    }
}
