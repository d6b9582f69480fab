//! Non-negative monetary amounts.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A non-negative decimal amount in the storefront's single currency.
///
/// Exact decimal arithmetic: totals never drift the way binary floats do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const MAX: Money = Money(Decimal::MAX);

    /// Build an amount from an already-validated decimal.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation(format!(
                "amount must not be negative (got {amount})"
            )));
        }
        Ok(Self(amount.normalize()))
    }

    /// Build an amount from minor units (e.g. centavos).
    pub fn from_minor(minor: u64) -> Self {
        Self(Decimal::new(minor as i64, 2).normalize())
    }

    /// Parse a decimal string such as `"8.50"`.
    ///
    /// Rejects anything that is not a plain finite non-negative decimal:
    /// empty input, trailing garbage, `NaN`, exponents, negative values.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("price must not be empty"));
        }
        let plain = trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+'));
        if !plain {
            return Err(DomainError::validation(format!(
                "malformed price {raw:?}: expected a plain decimal like 8.50"
            )));
        }
        let amount = Decimal::from_str_exact(trimmed)
            .map_err(|e| DomainError::validation(format!("malformed price {raw:?}: {e}")))?;
        Self::new(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// This amount multiplied by a quantity.
    pub fn checked_times(self, quantity: u32) -> DomainResult<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or_else(|| DomainError::overflow(format!("{self} x {quantity} is too large")))
    }

    pub fn checked_plus(self, other: Self) -> DomainResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| DomainError::overflow(format!("{self} + {other} is too large")))
    }

    /// The amount rounded to two places, midpoint away from zero.
    pub fn rounded_cents(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.rounded_cents())
    }
}
