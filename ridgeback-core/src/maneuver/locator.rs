//! Closest-target tracking during the search sweep

/// Closest range sample and the wheel positions it was taken at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanRecord {
    pub min_range: u16,
    pub left_pos: i32,
    pub right_pos: i32,
}

/// Keeps the closest sample seen since the last reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetLocator {
    no_target_range: u16,
    best: Option<ScanRecord>,
}

impl TargetLocator {
    /// Samples at or beyond `no_target_range` never become candidates
    pub fn new(no_target_range: u16) -> Self {
        Self {
            no_target_range,
            best: None,
        }
    }

    pub fn reset(&mut self) {
        self.best = None;
    }

    /// Record a sample; returns the new record if it is strictly closer
    pub fn observe(&mut self, range_mm: u16, left_pos: i32, right_pos: i32) -> Option<ScanRecord> {
        let bound = self.best.map_or(self.no_target_range, |b| b.min_range);
        if range_mm >= bound {
            return None;
        }

        let record = ScanRecord {
            min_range: range_mm,
            left_pos,
            right_pos,
        };
        self.best = Some(record);
        Some(record)
    }

    pub fn best(&self) -> Option<ScanRecord> {
        self.best
    }
}
