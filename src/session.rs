//! Cut session
//!
//! Holds the operator's current inputs and the move plan derived from them.
//! Every edit replaces one input and recalculates both cut orders, so the
//! plan always reflects the latest values. An integer field that fails to
//! parse is unset rather than left at its previous value. Smoothness text
//! that is not a number leaves the previous smoothness in place; a number
//! outside (0, 1) unsets it.

use anyhow::bail;
use boxjoint_camtools::{
    validate_smoothness, CalculationResult, CutOrder, MoveCalculator, MovePlan,
};
use boxjoint_communication::{LineTransport, PortOpener};
use boxjoint_core::format_number_list;
use thiserror::Error;

/// An input field rejected its text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field} invalid: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Current inputs plus the move plan computed from them
#[derive(Debug, Clone)]
pub struct CutSession {
    calculator: MoveCalculator,
    pattern_text: String,
    plan: MovePlan,
}

impl CutSession {
    /// Start a session with the given machine parameters and no pattern
    pub fn new(calculator: MoveCalculator) -> Self {
        let plan = calculator.plan_text("");
        Self {
            calculator,
            pattern_text: String::new(),
            plan,
        }
    }

    pub fn calculator(&self) -> &MoveCalculator {
        &self.calculator
    }

    pub fn pattern_text(&self) -> &str {
        &self.pattern_text
    }

    /// Plan for the current inputs
    pub fn plan(&self) -> &MovePlan {
        &self.plan
    }

    /// Moves (or the reason there are none) for one cut order
    pub fn moves(&self, order: CutOrder) -> &CalculationResult<Vec<i32>> {
        self.plan.for_order(order)
    }

    /// Replace the pattern text and recalculate
    pub fn set_pattern_text(&mut self, text: &str) -> &MovePlan {
        self.pattern_text = text.to_string();
        self.recalculate()
    }

    /// Replace the pattern with generated widths and recalculate
    pub fn set_pattern(&mut self, pattern: &[i32]) -> &MovePlan {
        let text = format_number_list(pattern);
        self.set_pattern_text(&text)
    }

    pub fn set_kerf_text(&mut self, text: &str) -> Result<(), FieldError> {
        let kerf = parse_int("kerf", text).and_then(|kerf| {
            if kerf > 0 {
                Ok(kerf)
            } else {
                Err(FieldError::new("kerf", "must be > 0"))
            }
        });
        self.calculator.set_kerf(kerf.as_ref().ok().copied());
        self.recalculate();
        kerf.map(|_| ())
    }

    pub fn set_tolerance_text(&mut self, text: &str) -> Result<(), FieldError> {
        let tolerance = parse_int("tolerance", text);
        self.calculator
            .set_tolerance(tolerance.as_ref().ok().copied());
        self.recalculate();
        tolerance.map(|_| ())
    }

    /// Smoothness must parse and lie strictly between 0 and 1
    pub fn set_smoothness_text(&mut self, text: &str) -> Result<(), FieldError> {
        let value = text
            .trim()
            .parse::<f64>()
            .map_err(|e| FieldError::new("smoothness", e.to_string()))?;
        let smoothness = validate_smoothness(value)
            .map_err(|e| FieldError::new("smoothness", e.to_string()));
        self.calculator
            .set_smoothness(smoothness.as_ref().ok().copied());
        self.recalculate();
        smoothness.map(|_| ())
    }

    pub fn set_stock_width_text(&mut self, text: &str) -> Result<(), FieldError> {
        let stock_width = parse_int("stock width", text);
        self.calculator
            .set_stock_width(stock_width.as_ref().ok().copied());
        self.recalculate();
        stock_width.map(|_| ())
    }

    /// Send the moves for `order` as one line; returns the number sent
    pub fn send<O: PortOpener>(
        &self,
        transport: &LineTransport<O>,
        order: CutOrder,
    ) -> anyhow::Result<usize> {
        let moves = match self.moves(order) {
            Ok(moves) if !moves.is_empty() => moves,
            Ok(_) => bail!("No {} moves to send", order),
            Err(e) => bail!("No {} moves to send: {}", order, e),
        };
        transport.send_moves(moves)?;
        tracing::info!("Sent {} {} moves", moves.len(), order);
        Ok(moves.len())
    }

    fn recalculate(&mut self) -> &MovePlan {
        self.plan = self.calculator.plan_text(&self.pattern_text);
        if let Err(e) = &self.plan.gap_first {
            tracing::debug!("No moves for current inputs: {}", e);
        }
        &self.plan
    }
}

impl Default for CutSession {
    fn default() -> Self {
        Self::new(MoveCalculator::default())
    }
}

fn parse_int(field: &'static str, text: &str) -> Result<i32, FieldError> {
    text.trim()
        .parse::<i32>()
        .map_err(|e| FieldError::new(field, e.to_string()))
}
