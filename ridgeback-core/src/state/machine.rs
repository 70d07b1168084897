//! Phase definition and transition table
//!
//! Every wheel command is a function of the current phase. Continuous
//! phases let the line-follow PID drive the wheels; discrete phases hand
//! the wheels to a sequencer.

use super::events::Event;

/// Robot phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RobotPhase {
    /// Following the line, hill assist watching for slopes
    LineFollow,
    /// Following the line on the upper level, watching for a stall
    SlopeClimb,
    /// Stopped at the top; probing for a line or walking the gap
    EndOfLineCheck,
    /// Entry into the stair attempt (single tick)
    StairCross,
    /// Rotating in place before the sweep
    TurnAlign,
    /// Rotating while sampling range
    Search,
    /// Sweep done, best bearing recorded
    Locked,
    /// Turning back to the recorded bearing
    Approach,
    /// Reversing onto the target and gripping it
    Pickup,
}

impl RobotPhase {
    /// Check if the line-follow PID drives the wheels in this phase
    pub fn continuous_control(&self) -> bool {
        matches!(self, RobotPhase::LineFollow | RobotPhase::SlopeClimb)
    }

    /// Process an event and return the next phase
    ///
    /// Events that do not apply to the current phase leave it unchanged.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use RobotPhase::*;

        match (self, event) {
            (LineFollow, SlopeExitsReached) => StairCross,

            (StairCross, StairArmed) => SlopeClimb,

            (SlopeClimb, Stalled) => EndOfLineCheck,

            (EndOfLineCheck, LineDetected) => SlopeClimb,
            (EndOfLineCheck, StairsCleared) => TurnAlign,

            (TurnAlign, Aligned) => Search,
            (Search, SweepComplete) => Locked,
            (Locked, TargetLocked) => Approach,
            (Approach, BearingReached) => Pickup,
            (Pickup, PickupComplete) => LineFollow,

            // Default: stay in current phase
            _ => self,
        }
    }
}
