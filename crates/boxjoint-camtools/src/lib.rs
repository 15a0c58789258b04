//! # Box Joint CAM Tools
//!
//! Computes the move lists a box joint jig executes to cut a finger
//! pattern, and generates random patterns for testing the jig.
//!
//! ## Tools Included
//!
//! - **Move Calculator**: Turns a gap/finger pattern, kerf, tolerance and
//!   smoothness into incremental stepper travel distances, gap-first or
//!   finger-first
//! - **Random Pattern Generator**: Uniformly random gap/finger widths

pub mod error;
pub mod move_calculator;
pub mod pattern_generator;

pub use error::{CalculationError, CalculationResult, GeneratorError, GeneratorResult};
pub use move_calculator::{
    validate_smoothness, CutOrder, CutSettings, MoveCalculator, MovePlan, DEFAULT_KERF,
    DEFAULT_SMOOTHNESS, DEFAULT_TOLERANCE, MAX_MOVES,
};
pub use pattern_generator::{generate, PatternGeneratorParameters, RandomPatternGenerator};
