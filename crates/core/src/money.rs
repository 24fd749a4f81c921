//! # Money Module
//!
//! Currency and Money for the ledger. Ledger balances and transfer amounts
//! are `i64` minor units (cents); `Money` converts between those units and
//! `rust_decimal::Decimal` for human input/output without ever letting an
//! imprecise representation into the store.

use crate::error::{CoreError, CoreResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported ledger currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Cad,
}

impl Currency {
    /// Currency code as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cad => "CAD",
        }
    }

    /// Number of decimal places of the minor unit
    pub fn decimals(&self) -> u32 {
        match self {
            Currency::Usd | Currency::Eur | Currency::Cad => 2,
        }
    }

    /// All supported currencies
    pub fn all() -> &'static [Currency] {
        &[Currency::Usd, Currency::Eur, Currency::Cad]
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "CAD" => Ok(Currency::Cad),
            other => Err(CoreError::UnknownCurrency(other.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An amount of money in minor units of one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the smallest currency unit (signed)
    pub minor: i64,
    pub currency: Currency,
}

impl Money {
    pub fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Convert a decimal amount ("10.50") into minor units.
    ///
    /// Rejects amounts with more fractional digits than the currency carries,
    /// and amounts outside the `i64` range.
    pub fn from_decimal(amount: Decimal, currency: Currency) -> CoreResult<Self> {
        let scaled = amount * Decimal::from(10_i64.pow(currency.decimals()));
        if scaled.fract() != Decimal::ZERO {
            return Err(CoreError::InvalidAmount(format!(
                "{} has more than {} decimal places",
                amount,
                currency.decimals()
            )));
        }
        let minor = scaled
            .trunc()
            .to_i64()
            .ok_or_else(|| CoreError::InvalidAmount(format!("{} out of range", amount)))?;
        Ok(Self { minor, currency })
    }

    /// Decimal view of the amount, e.g. 1050 minor USD -> 10.50
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor, self.currency.decimals())
    }

    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal(), self.currency)
    }
}
