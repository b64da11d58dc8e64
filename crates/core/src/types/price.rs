//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify returns money as a decimal string plus an ISO 4217 code. Prices are
//! parsed once at the API boundary so the rest of the crate never handles
//! floating point amounts. Formatting for display is left to the presentation
//! layer.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a price returned by the commerce API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("invalid decimal amount: {0}")]
    InvalidAmount(String),
    #[error("missing currency code")]
    MissingCurrency,
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// Parse a decimal amount string as sent by the API.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the amount is not a decimal or the currency
    /// code is empty.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        if currency_code.trim().is_empty() {
            return Err(PriceError::MissingCurrency);
        }
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| PriceError::InvalidAmount(amount.to_string()))?;
        Ok(Self::new(amount, currency_code))
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_string() {
        let price = Price::parse("19.90", "USD").unwrap();
        assert_eq!(price.amount, Decimal::new(1990, 2));
        assert_eq!(price.currency_code, "USD");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            Price::parse("twelve", "USD"),
            Err(PriceError::InvalidAmount("twelve".to_string()))
        );
        assert_eq!(Price::parse("1.00", " "), Err(PriceError::MissingCurrency));
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let price = Price::parse("5.5", "CAD").unwrap();
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["amount"], "5.5");
        assert_eq!(json["currency_code"], "CAD");
    }
}
