//! Currency code value type.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Currency codes accepted when recording subscriptions and budgets.
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF", "INR", "CNY", "HKD",
];

/// An uppercase ISO currency code from [`SUPPORTED_CURRENCIES`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Currency(String);

/// Error returned when parsing an unsupported currency code.
#[derive(Debug, Clone)]
pub struct ParseCurrencyError(String);

impl fmt::Display for ParseCurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported currency: '{}'. Supported currencies are: {}",
            self.0,
            SUPPORTED_CURRENCIES.join(", ")
        )
    }
}

impl std::error::Error for ParseCurrencyError {}

impl Currency {
    /// Parses and normalizes a currency code.
    pub fn new(s: &str) -> Result<Self, ParseCurrencyError> {
        let code = s.trim().to_uppercase();
        if SUPPORTED_CURRENCIES.contains(&code.as_str()) {
            Ok(Self(code))
        } else {
            Err(ParseCurrencyError(s.trim().to_string()))
        }
    }

    /// The base currency of the exchange-rate table.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display symbol, falling back to the code itself.
    pub fn symbol(&self) -> &str {
        match self.0.as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "INR" => "₹",
            "JPY" | "CNY" => "¥",
            "CAD" => "C$",
            "AUD" => "A$",
            "HKD" => "HK$",
            other => other,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
