//! Safety and shutdown
//!
//! Every way the controller can end funnels through
//! [`emergency_stop`]. The resulting [`Shutdown`] records why, and maps
//! to the process-level [`ExitStatus`].

pub mod estop;
pub mod monitor;

pub use estop::emergency_stop;
pub use monitor::TickMonitor;

use crate::config::ConfigError;
use crate::traits::{ActuatorError, SensorError};

/// Unrecoverable controller fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// A sensor could not be read
    SensorFailure(SensorError),
    /// An actuator rejected a command
    ActuatorFailure(ActuatorError),
    /// The search sweep finished without a candidate
    TargetNotFound,
    /// Configuration failed validation
    InvalidConfig(ConfigError),
}

impl From<SensorError> for Fault {
    fn from(e: SensorError) -> Self {
        Fault::SensorFailure(e)
    }
}

impl From<ActuatorError> for Fault {
    fn from(e: ActuatorError) -> Self {
        Fault::ActuatorFailure(e)
    }
}

impl From<ConfigError> for Fault {
    fn from(e: ConfigError) -> Self {
        Fault::InvalidConfig(e)
    }
}

/// Why the controller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// Stop requested by the operator
    Operator,
    /// Fatal fault
    Fault(Fault),
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExitStatus {
    Success,
    Failure,
}

/// Outcome of an emergency stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Shutdown {
    pub reason: StopReason,
    /// Actuators that rejected the coast command
    pub failed_stops: u8,
}

impl Shutdown {
    pub fn exit_status(&self) -> ExitStatus {
        match self.reason {
            StopReason::Operator => ExitStatus::Success,
            StopReason::Fault(_) => ExitStatus::Failure,
        }
    }

    pub fn fault(&self) -> Option<Fault> {
        match self.reason {
            StopReason::Operator => None,
            StopReason::Fault(fault) => Some(fault),
        }
    }
}
