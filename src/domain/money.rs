//! Fixed-point money amounts.
//!
//! Prices are stored as `NUMERIC(12, 2)` and travel through the service as
//! [`Money`], a non-negative `Decimal` with two fractional digits. Conversion
//! to a JSON number happens once, at serialization time.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::DomainError;

pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Validate and normalise an amount for the named field.
    pub fn new(amount: Decimal, field: &'static str) -> Result<Self, DomainError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::negative_amount(field));
        }
        Ok(Self(
            amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        ))
    }

    pub fn amount(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(value.trim())
            .map_err(|_| DomainError::unknown_variant("amount", value))?;
        Money::new(amount, "amount")
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::new(amount, "amount").map_err(serde::de::Error::custom)
    }
}
