//! # Box Joint Core
//!
//! Core types shared by the box joint companion crates:
//! - Error types for connection and text-format failures
//! - The comma-separated integer list codec used for patterns and move
//!   lists on the wire and in the UI
//!
//! All widths and moves are integers in thousandths of an inch (thou).

pub mod error;
pub mod number_list;

pub use error::{ConnectionError, Error, FormatError, Result};
pub use number_list::{encode_moves, format_number_list, parse_number_list};
