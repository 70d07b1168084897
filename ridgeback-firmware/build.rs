//! Build script for ridgeback-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates robot.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Known keys per section, with whether the value may be fractional
const SECTIONS: &[(&str, &[(&str, ValueKind)])] = &[
    (
        "line_follow",
        &[
            ("kp", ValueKind::Float),
            ("kd", ValueKind::Float),
            ("base_speed", ValueKind::Integer),
            ("calibration_factor", ValueKind::Float),
        ],
    ),
    (
        "limits",
        &[
            ("max_speed", ValueKind::Integer),
            ("hard_speed_limit", ValueKind::Integer),
        ],
    ),
    (
        "hill_assist",
        &[
            ("sample_interval_ms", ValueKind::Integer),
            ("enter_drift", ValueKind::Integer),
            ("exit_drift", ValueKind::Integer),
            ("slope_kp", ValueKind::Float),
            ("exits_to_stairs", ValueKind::Integer),
        ],
    ),
    (
        "stair",
        &[
            ("stall_interval_ms", ValueKind::Integer),
            ("stall_delta", ValueKind::Integer),
            ("line_threshold", ValueKind::Integer),
            ("move_speed", ValueKind::Integer),
        ],
    ),
    (
        "turn_align",
        &[
            ("left_target", ValueKind::Integer),
            ("right_target", ValueKind::Integer),
            ("tolerance", ValueKind::Integer),
        ],
    ),
    (
        "search",
        &[
            ("left_target", ValueKind::Integer),
            ("right_target", ValueKind::Integer),
            ("speed", ValueKind::Integer),
            ("no_target_range", ValueKind::Integer),
        ],
    ),
    (
        "gripper",
        &[
            ("rest_position", ValueKind::Integer),
            ("closed_position", ValueKind::Integer),
            ("speed", ValueKind::Integer),
        ],
    ),
    (
        "pickup",
        &[
            ("distance_factor", ValueKind::Float),
            ("settle_ms", ValueKind::Integer),
            ("release_ms", ValueKind::Integer),
        ],
    ),
    (
        "timing",
        &[
            ("tick_interval_ms", ValueKind::Integer),
            ("max_tick_period_ms", ValueKind::Integer),
            ("settle_delay_ms", ValueKind::Integer),
        ],
    ),
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Integer,
    Float,
}

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate robot.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=robot.toml");

    let config_path = Path::new("robot.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: robot.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds robot.toml at build time.                   ║\n\
            ║  Please create one in the ridgeback-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read robot.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            report(
                "Invalid TOML syntax in robot.toml",
                &e.to_string().lines().map(String::from).collect::<Vec<_>>(),
            );
        }
    };

    let mut errors = validate_keys(&config);
    errors.extend(validate_speeds(&config));
    errors.extend(validate_timing(&config));

    if !errors.is_empty() {
        report("Invalid configuration in robot.toml", &errors);
    }

    println!("cargo:warning=robot.toml validated successfully");
}

/// Panic with a boxed error listing
fn report(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.len() > 62 {
                    format!("{}...", &line[..59])
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Every section and key must be known, with a value of the right type
fn validate_keys(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return errors,
    };

    for (section, body) in root {
        let keys = match SECTIONS.iter().find(|(name, _)| name == section) {
            Some((_, keys)) => keys,
            None => {
                errors.push(format!("unknown section [{}]", section));
                continue;
            }
        };

        let body = match body.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };

        for (key, value) in body {
            match keys.iter().find(|(name, _)| name == key) {
                None => errors.push(format!("[{}] unknown key '{}'", section, key)),
                Some((_, ValueKind::Integer)) => {
                    if value.as_integer().is_none() {
                        errors.push(format!("[{}] {} must be an integer", section, key));
                    }
                }
                Some((_, ValueKind::Float)) => {
                    if value.as_float().is_none() && value.as_integer().is_none() {
                        errors.push(format!("[{}] {} must be a number", section, key));
                    }
                }
            }
        }
    }

    errors
}

fn integer(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

/// Speed envelope checks, using built-in defaults for omitted keys
fn validate_speeds(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let max = integer(config, "limits", "max_speed").unwrap_or(500);
    let hard = integer(config, "limits", "hard_speed_limit").unwrap_or(900);
    if max <= 0 || max >= hard {
        errors.push(format!(
            "max_speed ({}) must be positive and below hard_speed_limit ({})",
            max, hard
        ));
    }

    for (section, key) in [
        ("line_follow", "base_speed"),
        ("stair", "move_speed"),
        ("search", "speed"),
    ] {
        if let Some(speed) = integer(config, section, key) {
            if speed <= 0 || speed > max {
                errors.push(format!("[{}] {} must be 1-{}", section, key, max));
            }
        }
    }

    if let Some(tolerance) = integer(config, "turn_align", "tolerance") {
        if tolerance < 0 {
            errors.push(format!("[turn_align] tolerance ({}) must not be negative", tolerance));
        }
    }

    errors
}

fn validate_timing(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    for (section, key) in [
        ("hill_assist", "sample_interval_ms"),
        ("stair", "stall_interval_ms"),
        ("timing", "tick_interval_ms"),
        ("timing", "max_tick_period_ms"),
        ("hill_assist", "exits_to_stairs"),
    ] {
        if integer(config, section, key) == Some(0) {
            errors.push(format!("[{}] {} must be non-zero", section, key));
        }
    }

    let settle = integer(config, "pickup", "settle_ms").unwrap_or(300);
    let release = integer(config, "pickup", "release_ms").unwrap_or(2000);
    if release < settle {
        errors.push("[pickup] release_ms must not be below settle_ms".into());
    }

    errors
}
