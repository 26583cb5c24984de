//! Shared zero-on-invalid-input policy.
//!
//! Engines that treat degenerate numeric input as a no-op scenario collect
//! their preconditions in a [`Guard`]. When any rule fails the engine returns
//! `T::default()` (all zeros, empty schedules) with one warning per violated
//! rule instead of raising an error. A computation whose intermediate values
//! leave the `Decimal` range is rejected the same way through [`out_of_range`].

use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput};

/// Longest horizon any projection accepts, in years.
pub const MAX_HORIZON_YEARS: u32 = 100;
/// Longest loan tenure or monthly simulation, in months.
pub const MAX_HORIZON_MONTHS: u32 = MAX_HORIZON_YEARS * 12;

const OUT_OF_RANGE: &str = "result exceeds the supported decimal range";

#[derive(Debug, Default)]
pub struct Guard {
    violations: Vec<String>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, ok: bool, field: &str, reason: &str) -> Self {
        if !ok {
            self.violations.push(format!("{field}: {reason}"));
        }
        self
    }

    pub fn positive(self, value: Decimal, field: &str) -> Self {
        self.require(value > Decimal::ZERO, field, "must be greater than zero")
    }

    pub fn non_negative(self, value: Decimal, field: &str) -> Self {
        self.require(value >= Decimal::ZERO, field, "must not be negative")
    }

    pub fn at_most(self, value: u32, max: u32, field: &str) -> Self {
        self.require(value <= max, field, &format!("must be at most {max}"))
    }

    /// Reject when a precomputed figure (`None`) overflowed.
    pub fn in_range<V>(self, value: Option<&V>, field: &str) -> Self {
        self.require(value.is_some(), field, OUT_OF_RANGE)
    }

    pub fn is_clear(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// The all-zero envelope for `T` when any rule failed, `None` otherwise.
    pub fn reject<T: Default + Serialize>(
        self,
        methodology: &str,
        assumptions: &impl Serialize,
        start: Instant,
    ) -> Option<ComputationOutput<T>> {
        if self.is_clear() {
            return None;
        }
        Some(self.into_zero_result(methodology, assumptions, start))
    }

    fn into_zero_result<T: Default + Serialize>(
        self,
        methodology: &str,
        assumptions: &impl Serialize,
        start: Instant,
    ) -> ComputationOutput<T> {
        tracing::warn!(
            methodology,
            violations = ?self.violations,
            "input rejected, returning zero result"
        );
        with_metadata(
            methodology,
            assumptions,
            self.violations,
            start.elapsed().as_micros() as u64,
            T::default(),
        )
    }
}

/// The all-zero envelope for a computation that overflowed part-way, after
/// its inputs passed the guard. `field` names the figure that overflowed.
pub fn out_of_range<T: Default + Serialize>(
    field: &str,
    methodology: &str,
    assumptions: &impl Serialize,
    start: Instant,
) -> ComputationOutput<T> {
    Guard::new()
        .require(false, field, OUT_OF_RANGE)
        .into_zero_result(methodology, assumptions, start)
}
