//! Embedded robot configuration

use defmt::*;
use ridgeback_core::config::{parse_config, RobotConfig};

/// Compiled-in configuration, validated by build.rs
const ROBOT_TOML: &str = include_str!("../robot.toml");

/// Parse the embedded configuration
///
/// A parse failure falls back to the built-in defaults. Validation runs
/// later, when the control loop starts.
pub fn load_config() -> RobotConfig {
    match parse_config(ROBOT_TOML) {
        Ok(config) => {
            info!("Parsed robot.toml");
            config
        }
        Err(e) => {
            error!("robot.toml line {}: {:?}", e.line, e.kind);
            warn!("Using default configuration");
            RobotConfig::default()
        }
    }
}
