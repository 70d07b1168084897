//! Configuration types
//!
//! Board-agnostic configuration structures and the `robot.toml` parser.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
