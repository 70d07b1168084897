//! Discrete maneuvers
//!
//! Each sequencer owns the wheels during its phase. Sequencers are
//! idempotent per tick: they re-send the same position or velocity
//! command every tick and report progress through an outcome value. The
//! state machine in [`crate::robot`] acts on those outcomes.

pub mod align;
pub mod hill_assist;
pub mod locator;
pub mod pickup;
pub mod stair;

pub use align::{Arrival, RotateTo};
pub use hill_assist::{HillAssist, HillOutcome};
pub use locator::{ScanRecord, TargetLocator};
pub use pickup::{PickupOutcome, PickupSequencer};
pub use stair::{StairOutcome, StairSequencer, StallDetector};
