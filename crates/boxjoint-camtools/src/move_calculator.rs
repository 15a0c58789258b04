//! Box joint move calculation
//!
//! Turns a finger/gap width pattern into the ordered list of incremental
//! travel distances the jig's stepper executes, one saw pass per move.
//!
//! The pattern alternates `gap, finger, gap, finger, ...` starting with a
//! gap. All values are in thousandths of an inch. The calculator walks the
//! pattern repeatedly until the accumulated nominal width reaches the stock
//! width, so the last traversal may run past the end of the stock.

use crate::error::{CalculationError, CalculationResult};
use boxjoint_core::parse_number_list;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default saw kerf (thou)
pub const DEFAULT_KERF: i32 = 100;
/// Default assembly tolerance (thou)
pub const DEFAULT_TOLERANCE: i32 = 2;
/// Default smoothness, halfway between finest and coarsest
pub const DEFAULT_SMOOTHNESS: f64 = 0.5;
/// Longest move list produced for one cut order
pub const MAX_MOVES: usize = 100_000;

/// Order in which the cutting head traverses the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CutOrder {
    /// Each `(gap, finger)` pair is cut gap then finger.
    GapFirst,
    /// The stock starts with a finger; pairs are cut finger then gap.
    FingerFirst,
}

impl CutOrder {
    /// Map the boolean "finger first" flag to a cut order
    pub fn from_finger_first(finger_first: bool) -> Self {
        if finger_first {
            Self::FingerFirst
        } else {
            Self::GapFirst
        }
    }

    /// Whether this is the finger-first order
    pub fn is_finger_first(self) -> bool {
        matches!(self, Self::FingerFirst)
    }
}

impl fmt::Display for CutOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GapFirst => write!(f, "gap-first"),
            Self::FingerFirst => write!(f, "finger-first"),
        }
    }
}

/// Check that a smoothness value lies in the open interval (0, 1).
///
/// The calculator does not call this itself; settings and input layers
/// reject out-of-range values before they reach it.
pub fn validate_smoothness(value: f64) -> CalculationResult<f64> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(CalculationError::OutOfRange {
            name: "smoothness".to_string(),
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

/// Move lists for both cut orders of the same pattern
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    /// Result of the gap-first calculation
    pub gap_first: CalculationResult<Vec<i32>>,
    /// Result of the finger-first calculation
    pub finger_first: CalculationResult<Vec<i32>>,
}

impl MovePlan {
    /// Result for the given cut order
    pub fn for_order(&self, order: CutOrder) -> &CalculationResult<Vec<i32>> {
        match order {
            CutOrder::GapFirst => &self.gap_first,
            CutOrder::FingerFirst => &self.finger_first,
        }
    }
}

/// Move calculator configuration
///
/// Each parameter may be unset. The operator edits them one field at a
/// time, so setters replace a single value and the last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCalculator {
    kerf: Option<i32>,
    tolerance: Option<i32>,
    smoothness: Option<f64>,
    stock_width: Option<i32>,
}

impl Default for MoveCalculator {
    fn default() -> Self {
        Self {
            kerf: Some(DEFAULT_KERF),
            tolerance: Some(DEFAULT_TOLERANCE),
            smoothness: Some(DEFAULT_SMOOTHNESS),
            stock_width: None,
        }
    }
}

impl MoveCalculator {
    /// Create a calculator with default kerf, tolerance and smoothness and
    /// no stock width
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with every parameter unset
    pub fn unconfigured() -> Self {
        Self {
            kerf: None,
            tolerance: None,
            smoothness: None,
            stock_width: None,
        }
    }

    pub fn kerf(&self) -> Option<i32> {
        self.kerf
    }

    pub fn tolerance(&self) -> Option<i32> {
        self.tolerance
    }

    pub fn smoothness(&self) -> Option<f64> {
        self.smoothness
    }

    pub fn stock_width(&self) -> Option<i32> {
        self.stock_width
    }

    /// Set the blade width removed by one pass
    pub fn set_kerf(&mut self, kerf: Option<i32>) -> &mut Self {
        self.kerf = kerf;
        self
    }

    /// Set the slack taken from fingers and added to gaps
    pub fn set_tolerance(&mut self, tolerance: Option<i32>) -> &mut Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the fraction of kerf used as the gap sub-cut step.
    ///
    /// Meaningful only in (0, 1); see [`validate_smoothness`].
    pub fn set_smoothness(&mut self, smoothness: Option<f64>) -> &mut Self {
        self.smoothness = smoothness;
        self
    }

    /// Set the total travel available across the stock
    pub fn set_stock_width(&mut self, stock_width: Option<i32>) -> &mut Self {
        self.stock_width = stock_width;
        self
    }

    /// Replace all four parameters at once
    pub fn configure(
        &mut self,
        kerf: Option<i32>,
        tolerance: Option<i32>,
        smoothness: Option<f64>,
        stock_width: Option<i32>,
    ) -> &mut Self {
        self.kerf = kerf;
        self.tolerance = tolerance;
        self.smoothness = smoothness;
        self.stock_width = stock_width;
        self
    }

    /// Resolve the parameters into a fully specified [`CutSettings`].
    pub fn cut_settings(&self) -> CalculationResult<CutSettings> {
        match (self.kerf, self.tolerance, self.smoothness, self.stock_width) {
            (Some(kerf), Some(tolerance), Some(smoothness), Some(stock_width)) => {
                CutSettings::new(kerf, tolerance, smoothness, stock_width)
            }
            _ => {
                let missing = [
                    ("kerf", self.kerf.is_none()),
                    ("tolerance", self.tolerance.is_none()),
                    ("smoothness", self.smoothness.is_none()),
                    ("stock_width", self.stock_width.is_none()),
                ]
                .iter()
                .filter(|(_, unset)| *unset)
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", ");
                tracing::warn!("Calculator not set up yet, missing: {}", missing);
                Err(CalculationError::NotConfigured { missing })
            }
        }
    }

    /// Calculate the move list for a pattern in the given cut order.
    pub fn calculate(&self, pattern: &[i32], order: CutOrder) -> CalculationResult<Vec<i32>> {
        let settings = self.cut_settings()?;

        if pattern.len() % 2 != 0 {
            tracing::warn!("Pattern length {} is not even", pattern.len());
            return Err(CalculationError::OddPatternLength { len: pattern.len() });
        }
        if pattern.is_empty() {
            tracing::warn!("Pattern is empty");
            return Err(CalculationError::EmptyPattern);
        }

        let stock_width = i64::from(settings.stock_width);
        let mut moves = Vec::new();
        let mut total_travel: i64 = 0;
        let mut first = true;

        while total_travel < stock_width {
            let travel = settings.add_moves_for_iteration(pattern, &mut moves, first, order)?;
            if travel <= 0 {
                tracing::warn!("Pattern traversal made no progress ({})", travel);
                return Err(CalculationError::NoProgress);
            }
            if moves.len() > MAX_MOVES {
                tracing::warn!("Move list passed {} moves", MAX_MOVES);
                return Err(CalculationError::TooManyMoves { limit: MAX_MOVES });
            }
            total_travel += travel;
            first = false;
        }

        tracing::debug!(
            "Calculated {} {} moves covering {} of {}",
            moves.len(),
            order,
            total_travel,
            stock_width
        );
        Ok(moves)
    }

    /// Parse a comma-separated pattern and calculate its move list.
    ///
    /// Blank text counts as a missing pattern.
    pub fn calculate_text(&self, text: &str, order: CutOrder) -> CalculationResult<Vec<i32>> {
        let pattern = Self::parse_pattern(text)?;
        self.calculate(&pattern, order)
    }

    /// Calculate both cut orders for the same pattern
    pub fn calculate_both(&self, pattern: &[i32]) -> MovePlan {
        MovePlan {
            gap_first: self.calculate(pattern, CutOrder::GapFirst),
            finger_first: self.calculate(pattern, CutOrder::FingerFirst),
        }
    }

    /// Parse a comma-separated pattern and calculate both cut orders
    pub fn plan_text(&self, text: &str) -> MovePlan {
        match Self::parse_pattern(text) {
            Ok(pattern) => self.calculate_both(&pattern),
            Err(e) => MovePlan {
                gap_first: Err(e.clone()),
                finger_first: Err(e),
            },
        }
    }

    fn parse_pattern(text: &str) -> CalculationResult<Vec<i32>> {
        if text.trim().is_empty() {
            tracing::debug!("Pattern is missing");
            return Err(CalculationError::MissingPattern);
        }
        Ok(parse_number_list(text)?)
    }
}

/// Fully resolved cutting parameters
///
/// Produced by [`MoveCalculator::cut_settings`]. The per-feature cut
/// operations append to a caller-owned move list and return the nominal
/// width they account for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutSettings {
    kerf: i32,
    tolerance: i32,
    smoothness: f64,
    stock_width: i32,
    step: i32,
}

impl CutSettings {
    /// Resolve settings, computing the gap sub-cut step as
    /// `kerf * smoothness` truncated toward zero.
    pub fn new(
        kerf: i32,
        tolerance: i32,
        smoothness: f64,
        stock_width: i32,
    ) -> CalculationResult<Self> {
        let step = (f64::from(kerf) * smoothness) as i32;
        if step <= 0 {
            tracing::warn!(
                "Step {} does not advance (kerf {}, smoothness {})",
                step,
                kerf,
                smoothness
            );
            return Err(CalculationError::ZeroStep {
                step,
                kerf,
                smoothness,
            });
        }
        Ok(Self {
            kerf,
            tolerance,
            smoothness,
            stock_width,
            step,
        })
    }

    pub fn kerf(&self) -> i32 {
        self.kerf
    }

    pub fn tolerance(&self) -> i32 {
        self.tolerance
    }

    pub fn smoothness(&self) -> f64 {
        self.smoothness
    }

    pub fn stock_width(&self) -> i32 {
        self.stock_width
    }

    /// Sub-cut step used inside a gap
    pub fn step(&self) -> i32 {
        self.step
    }

    /// Narrowest gap or finger that can be cut with tolerance preserved
    pub fn minimum_width(&self) -> i64 {
        i64::from(self.kerf) + i64::from(self.tolerance)
    }

    fn to_move(width: i64) -> CalculationResult<i32> {
        i32::try_from(width).map_err(|_| {
            tracing::warn!("Move of {} is out of range", width);
            CalculationError::WidthOverflow { width }
        })
    }

    /// Cut a gap as a series of sub-moves.
    ///
    /// The entry cut has already removed one kerf. Full steps are emitted
    /// while they stay short of `gap + tolerance`, then one finishing move
    /// covers the remainder. Returns the nominal `gap`, not the sum of the
    /// emitted moves (`gap + tolerance - kerf`).
    pub fn cut_gap(&self, gap: i32, moves: &mut Vec<i32>) -> CalculationResult<i32> {
        let minimum = self.minimum_width();
        if i64::from(gap) < minimum {
            tracing::warn!("Gap too thin: {}", gap);
            return Err(CalculationError::GapTooThin {
                width: gap,
                minimum,
            });
        }

        // full steps while kerf + n * step stays below the target
        let remaining = i64::from(gap) + i64::from(self.tolerance) - i64::from(self.kerf);
        let steps = (remaining - 1).max(0) / i64::from(self.step);
        if steps >= MAX_MOVES as i64 || moves.len() + steps as usize >= MAX_MOVES {
            tracing::warn!("Gap {} needs {} sub-cuts", gap, steps + 1);
            return Err(CalculationError::TooManyMoves { limit: MAX_MOVES });
        }
        let finish = Self::to_move(remaining - steps * i64::from(self.step))?;

        moves.extend(std::iter::repeat(self.step).take(steps as usize));
        moves.push(finish);

        Ok(gap)
    }

    /// Cut past a finger in a single move.
    ///
    /// The tool travels the finger plus one kerf, less the tolerance taken
    /// out of the finger. Returns the nominal `finger`.
    pub fn cut_finger(&self, finger: i32, moves: &mut Vec<i32>) -> CalculationResult<i32> {
        let minimum = self.minimum_width();
        if i64::from(finger) < minimum {
            tracing::warn!("Finger too thin: {}", finger);
            return Err(CalculationError::FingerTooThin {
                width: finger,
                minimum,
            });
        }

        let travel = Self::to_move(
            i64::from(self.kerf) + i64::from(finger) - i64::from(self.tolerance),
        )?;
        moves.push(travel);
        Ok(finger)
    }

    /// First finger of a finger-first run.
    ///
    /// The right side of the blade starts flush with the right side of the
    /// stock, so the move is `finger - tolerance` with no kerf added. It
    /// contributes nothing to the accumulated travel.
    pub fn cut_leading_finger(&self, finger: i32, moves: &mut Vec<i32>) -> CalculationResult<()> {
        let minimum = self.minimum_width();
        if i64::from(finger) < minimum {
            tracing::warn!("Leading finger too thin: {}", finger);
            return Err(CalculationError::FingerTooThin {
                width: finger,
                minimum,
            });
        }

        moves.push(Self::to_move(i64::from(finger) - i64::from(self.tolerance))?);
        Ok(())
    }

    /// Emit one full traversal of the pattern, returning its nominal width.
    fn add_moves_for_iteration(
        &self,
        pattern: &[i32],
        moves: &mut Vec<i32>,
        first: bool,
        order: CutOrder,
    ) -> CalculationResult<i64> {
        let mut travel: i64 = 0;
        let mut pairs = pattern.chunks_exact(2);

        match order {
            CutOrder::GapFirst => {
                for pair in pairs {
                    travel += i64::from(self.cut_gap(pair[0], moves)?);
                    travel += i64::from(self.cut_finger(pair[1], moves)?);
                }
            }
            CutOrder::FingerFirst => {
                if first {
                    if let Some(pair) = pairs.next() {
                        self.cut_leading_finger(pair[0], moves)?;
                        travel += i64::from(self.cut_gap(pair[1], moves)?);
                    }
                }
                for pair in pairs {
                    travel += i64::from(self.cut_finger(pair[0], moves)?);
                    travel += i64::from(self.cut_gap(pair[1], moves)?);
                }
            }
        }

        Ok(travel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CutSettings {
        CutSettings::new(100, 2, 0.5, 3000).unwrap()
    }

    #[test]
    fn test_step_truncates() {
        assert_eq!(CutSettings::new(100, 2, 0.5, 0).unwrap().step(), 50);
        assert_eq!(CutSettings::new(100, 2, 0.339, 0).unwrap().step(), 33);
        assert_eq!(CutSettings::new(101, 2, 0.999, 0).unwrap().step(), 100);
    }

    #[test]
    fn test_zero_step_rejected() {
        let err = CutSettings::new(100, 2, 0.001, 3000).unwrap_err();
        assert!(matches!(err, CalculationError::ZeroStep { step: 0, .. }));
        assert!(CutSettings::new(100, 2, -0.5, 3000).is_err());
    }

    #[test]
    fn test_cut_gap_sequence() {
        let mut moves = Vec::new();
        assert_eq!(settings().cut_gap(300, &mut moves), Ok(300));
        assert_eq!(moves, vec![50, 50, 50, 50, 2]);
        assert_eq!(moves.iter().sum::<i32>(), 300 + 2 - 100);
    }

    #[test]
    fn test_cut_gap_at_minimum_width() {
        let mut moves = Vec::new();
        settings().cut_gap(102, &mut moves).unwrap();
        // 100 + 50 < 104 is false, so only the finishing move
        assert_eq!(moves, vec![4]);
    }

    #[test]
    fn test_cut_finger_and_leading_finger() {
        let s = settings();
        let mut moves = Vec::new();
        assert_eq!(s.cut_finger(300, &mut moves), Ok(300));
        s.cut_leading_finger(500, &mut moves).unwrap();
        assert_eq!(moves, vec![398, 498]);
    }

    #[test]
    fn test_out_of_range_moves_rejected() {
        let s = settings();
        let mut moves = Vec::new();
        assert_eq!(
            s.cut_finger(i32::MAX, &mut moves),
            Err(CalculationError::WidthOverflow {
                width: i64::from(i32::MAX) + 98
            })
        );
        assert_eq!(
            s.cut_gap(i32::MAX, &mut moves),
            Err(CalculationError::TooManyMoves { limit: MAX_MOVES })
        );
        assert!(moves.is_empty());

        let wide = CutSettings::new(100, i32::MIN, 0.5, 3000).unwrap();
        assert_eq!(wide.minimum_width(), i64::from(i32::MIN) + 100);
        assert!(matches!(
            wide.cut_finger(300, &mut moves),
            Err(CalculationError::WidthOverflow { .. })
        ));
    }

    #[test]
    fn test_thin_features_leave_moves_untouched() {
        let s = settings();
        let mut moves = vec![7];
        assert!(s.cut_gap(101, &mut moves).is_err());
        assert!(s.cut_finger(50, &mut moves).is_err());
        assert!(s.cut_leading_finger(101, &mut moves).is_err());
        assert_eq!(moves, vec![7]);
    }

    #[test]
    fn test_missing_parameters_listed() {
        let mut calc = MoveCalculator::unconfigured();
        calc.set_kerf(Some(100));
        let err = calc.cut_settings().unwrap_err();
        assert_eq!(
            err,
            CalculationError::NotConfigured {
                missing: "tolerance, smoothness, stock_width".to_string()
            }
        );
    }

    #[test]
    fn test_cut_order_mapping() {
        assert_eq!(CutOrder::from_finger_first(true), CutOrder::FingerFirst);
        assert_eq!(CutOrder::from_finger_first(false), CutOrder::GapFirst);
        assert!(CutOrder::FingerFirst.is_finger_first());
        assert_eq!(CutOrder::GapFirst.to_string(), "gap-first");
    }

    #[test]
    fn test_validate_smoothness() {
        assert_eq!(validate_smoothness(0.5), Ok(0.5));
        assert!(validate_smoothness(0.0).is_err());
        assert!(validate_smoothness(1.0).is_err());
        assert!(validate_smoothness(f64::NAN).is_err());
    }
}
