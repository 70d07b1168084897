//! Tick period monitor
//!
//! Maneuver targets are checked once per tick, so a long tick lets a wheel
//! run past its threshold. The monitor tracks the period between ticks and
//! flags any period above the configured bound.

use crate::traits::clock::elapsed_ms;

/// Tick period tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickMonitor {
    max_period_ms: u32,
    last_tick_ms: Option<u32>,
    worst_period_ms: u32,
    overruns: u32,
}

impl TickMonitor {
    pub fn new(max_period_ms: u32) -> Self {
        Self {
            max_period_ms,
            last_tick_ms: None,
            worst_period_ms: 0,
            overruns: 0,
        }
    }

    /// Record a tick; returns the period if it overran
    pub fn record(&mut self, now_ms: u32) -> Option<u32> {
        let previous = self.last_tick_ms.replace(now_ms)?;
        let period = elapsed_ms(now_ms, previous);
        self.worst_period_ms = self.worst_period_ms.max(period);

        if period > self.max_period_ms {
            self.overruns = self.overruns.saturating_add(1);
            Some(period)
        } else {
            None
        }
    }

    /// Longest period seen
    pub fn worst_period_ms(&self) -> u32 {
        self.worst_period_ms
    }

    /// Number of overrun ticks
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_has_no_period() {
        let mut monitor = TickMonitor::new(50);
        assert_eq!(monitor.record(1000), None);
        assert_eq!(monitor.worst_period_ms(), 0);
    }

    #[test]
    fn test_overrun_detection() {
        let mut monitor = TickMonitor::new(50);
        monitor.record(0);
        assert_eq!(monitor.record(10), None);
        assert_eq!(monitor.record(60), None);
        assert_eq!(monitor.record(121), Some(61));
        assert_eq!(monitor.overruns(), 1);
        assert_eq!(monitor.worst_period_ms(), 61);
    }

    #[test]
    fn test_clock_wrap() {
        let mut monitor = TickMonitor::new(50);
        monitor.record(u32::MAX - 4);
        assert_eq!(monitor.record(5), None);
        assert_eq!(monitor.worst_period_ms(), 10);
    }
}
