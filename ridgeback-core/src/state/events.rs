//! Events that trigger phase transitions

/// Events that can trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Hill-assist events
    /// Enough slope exits have been counted to reach the stairs
    SlopeExitsReached,

    // Stair-crossing events
    /// Stair attempt initialized
    StairArmed,
    /// Reflectance stopped changing while climbing
    Stalled,
    /// A line is visible under either sensor
    LineDetected,
    /// Final stair step completed
    StairsCleared,

    // Search events
    /// In-place rotation reached its targets
    Aligned,
    /// Range sweep reached its end
    SweepComplete,
    /// Wheels commanded toward the recorded bearing
    TargetLocked,
    /// Wheels back at the recorded bearing
    BearingReached,

    // Pickup events
    /// Gripper closed and the dwell elapsed
    PickupComplete,
}
