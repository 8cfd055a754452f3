//! Fixed USD-based exchange rates and currency conversion.

use crate::domain::Currency;
use thiserror::Error;

/// Built-in rates, expressed as the USD value of one unit.
const STANDARD_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 1.10),
    ("GBP", 1.28),
    ("JPY", 0.0071),
    ("CAD", 0.74),
    ("AUD", 0.67),
    ("CHF", 1.13),
    ("INR", 0.012),
    ("CNY", 0.14),
    ("HKD", 0.128),
];

/// Errors raised while converting between currencies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("no exchange rate for currency '{0}'")]
    UnsupportedCurrency(String),
}

/// Exchange-rate table keyed to USD.
///
/// Cross rates are derived from the two USD rates, so converting A to B and
/// back to A returns the original amount up to floating-point error.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: Vec<(String, f64)>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RateTable {
    /// The built-in table covering every supported currency.
    pub fn standard() -> Self {
        Self::from_rates(STANDARD_RATES.iter().map(|(c, r)| (*c, *r)))
    }

    /// Builds a table from `(code, usd_value)` pairs.
    pub fn from_rates<'a>(rates: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.to_uppercase(), rate))
                .collect(),
        }
    }

    /// USD value of one unit of `code`.
    pub fn usd_rate(&self, code: &str) -> Option<f64> {
        self.rates
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|(_, r)| *r)
    }

    /// All `(code, usd_value)` pairs in table order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(c, r)| (c.as_str(), *r))
    }

    /// Converts `amount` from one currency to another.
    ///
    /// Identity when both currencies are equal; the result is not rounded.
    pub fn convert(
        &self,
        amount: f64,
        from: &Currency,
        to: &Currency,
    ) -> Result<f64, ConversionError> {
        if from == to {
            return Ok(amount);
        }
        let from_rate = self
            .usd_rate(from.as_str())
            .ok_or_else(|| ConversionError::UnsupportedCurrency(from.to_string()))?;
        let to_rate = self
            .usd_rate(to.as_str())
            .ok_or_else(|| ConversionError::UnsupportedCurrency(to.to_string()))?;
        Ok(amount * from_rate / to_rate)
    }
}

/// Rounds to two decimal places for display.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
