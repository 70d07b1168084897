//! Minimal TOML parser for robot configuration
//!
//! Handles only the subset used by `robot.toml`. It does NOT support the
//! full TOML spec and does not allocate.
//!
//! Supported features:
//! - `[section]` headers
//! - `key = value` pairs with integer or float values
//! - Comments (`# ...`), including trailing comments
//!
//! Every key overrides the matching field of [`RobotConfig::default()`].
//! The stair step table is fixed track geometry and is not configurable.

use super::types::RobotConfig;

/// Kind of parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Section header is not one of the known sections
    InvalidSection,
    /// Key is not known in the current section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    Syntax,
    /// Value does not parse as the field's type
    InvalidValue,
}

/// Parse error with 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    LineFollow,
    Limits,
    HillAssist,
    Stair,
    TurnAlign,
    Search,
    Gripper,
    Pickup,
    Timing,
}

/// Parse TOML configuration into a [`RobotConfig`]
pub fn parse_config(input: &str) -> Result<RobotConfig, ParseError> {
    let mut config = RobotConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(line[1..line.len() - 1].trim()).ok_or(ParseError {
                line: line_no,
                kind: ParseErrorKind::InvalidSection,
            })?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError {
            line: line_no,
            kind: ParseErrorKind::Syntax,
        })?;

        apply_key(&mut config, section, key, value).map_err(|kind| ParseError {
            line: line_no,
            kind,
        })?;
    }

    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header {
        "line_follow" => Some(Section::LineFollow),
        "limits" => Some(Section::Limits),
        "hill_assist" => Some(Section::HillAssist),
        "stair" => Some(Section::Stair),
        "turn_align" => Some(Section::TurnAlign),
        "search" => Some(Section::Search),
        "gripper" => Some(Section::Gripper),
        "pickup" => Some(Section::Pickup),
        "timing" => Some(Section::Timing),
        _ => None,
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a numeric value
fn parse_num<T: core::str::FromStr>(value: &str) -> Result<T, ParseErrorKind> {
    value.parse().map_err(|_| ParseErrorKind::InvalidValue)
}

fn apply_key(
    config: &mut RobotConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    use ParseErrorKind::UnknownKey;

    match section {
        Section::Root => return Err(UnknownKey),
        Section::LineFollow => {
            let c = &mut config.line_follow;
            match key {
                "kp" => c.kp = parse_num(value)?,
                "kd" => c.kd = parse_num(value)?,
                "base_speed" => c.base_speed = parse_num(value)?,
                "calibration_factor" => c.calibration_factor = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
        Section::Limits => {
            let c = &mut config.limits;
            match key {
                "max_speed" => c.max_speed = parse_num(value)?,
                "hard_speed_limit" => c.hard_speed_limit = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
        Section::HillAssist => {
            let c = &mut config.hill_assist;
            match key {
                "sample_interval_ms" => c.sample_interval_ms = parse_num(value)?,
                "enter_drift" => c.enter_drift = parse_num(value)?,
                "exit_drift" => c.exit_drift = parse_num(value)?,
                "slope_kp" => c.slope_kp = parse_num(value)?,
                "exits_to_stairs" => c.exits_to_stairs = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
        Section::Stair => {
            let c = &mut config.stair;
            match key {
                "stall_interval_ms" => c.stall_interval_ms = parse_num(value)?,
                "stall_delta" => c.stall_delta = parse_num(value)?,
                "line_threshold" => c.line_threshold = parse_num(value)?,
                "move_speed" => c.move_speed = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
        Section::TurnAlign => {
            let c = &mut config.turn_align;
            match key {
                "left_target" => c.left_target = parse_num(value)?,
                "right_target" => c.right_target = parse_num(value)?,
                "tolerance" => c.tolerance = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
        Section::Search => {
            let c = &mut config.search;
            match key {
                "left_target" => c.left_target = parse_num(value)?,
                "right_target" => c.right_target = parse_num(value)?,
                "speed" => c.speed = parse_num(value)?,
                "no_target_range" => c.no_target_range = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
        Section::Gripper => {
            let c = &mut config.gripper;
            match key {
                "rest_position" => c.rest_position = parse_num(value)?,
                "closed_position" => c.closed_position = parse_num(value)?,
                "speed" => c.speed = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
        Section::Pickup => {
            let c = &mut config.pickup;
            match key {
                "distance_factor" => c.distance_factor = parse_num(value)?,
                "settle_ms" => c.settle_ms = parse_num(value)?,
                "release_ms" => c.release_ms = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
        Section::Timing => {
            let c = &mut config.timing;
            match key {
                "tick_interval_ms" => c.tick_interval_ms = parse_num(value)?,
                "max_tick_period_ms" => c.max_tick_period_ms = parse_num(value)?,
                "settle_delay_ms" => c.settle_delay_ms = parse_num(value)?,
                _ => return Err(UnknownKey),
            }
        }
    }

    Ok(())
}
