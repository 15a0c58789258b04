//! Error types for the CAM tools crate.
//!
//! Every failure here is an expected, recoverable condition: the caller
//! shows the reason to the operator and waits for the next edit.

use boxjoint_core::FormatError;
use thiserror::Error;

/// Reasons a move list could not be calculated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    /// No pattern was entered.
    #[error("Pattern is missing")]
    MissingPattern,

    /// The pattern text is not a list of integers.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] FormatError),

    /// One or more machine parameters are unset.
    #[error("Calculator not configured, missing: {missing}")]
    NotConfigured { missing: String },

    /// The pattern must alternate gap and finger widths.
    #[error("Pattern length {len} is not even")]
    OddPatternLength { len: usize },

    /// A pattern with no widths never covers the stock.
    #[error("Pattern is empty")]
    EmptyPattern,

    /// A gap narrower than kerf plus tolerance cannot be cut.
    #[error("Gap too thin: {width} (minimum {minimum})")]
    GapTooThin { width: i32, minimum: i64 },

    /// A finger narrower than kerf plus tolerance cannot be left standing.
    #[error("Finger too thin: {width} (minimum {minimum})")]
    FingerTooThin { width: i32, minimum: i64 },

    /// `kerf * smoothness` truncates to a step that never advances the tool.
    #[error("Step size {step} does not advance the tool (kerf {kerf}, smoothness {smoothness})")]
    ZeroStep {
        step: i32,
        kerf: i32,
        smoothness: f64,
    },

    /// A move does not fit in the jig's 32-bit move range.
    #[error("Move of {width} is out of range")]
    WidthOverflow { width: i64 },

    /// The move list grew past the most the jig accepts in one line.
    #[error("Move list exceeds {limit} moves")]
    TooManyMoves { limit: usize },

    /// A full pass over the pattern consumed no stock width.
    #[error("Pattern makes no progress across the stock")]
    NoProgress,

    /// A parameter value is outside its valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max}, exclusive)")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Reasons a random pattern could not be generated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The width range is empty.
    #[error("Invalid width range: min {min} is greater than max {max}")]
    InvalidRange { min: i32, max: i32 },
}

/// Result type alias for move calculation.
pub type CalculationResult<T> = Result<T, CalculationError>;

/// Result type alias for pattern generation.
pub type GeneratorResult<T> = Result<T, GeneratorError>;
