//! Payment method value type.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Payment methods accepted for a subscription, in canonical spelling.
pub const ALLOWED_PAYMENT_METHODS: &[&str] =
    &["Visa", "Mastercard", "PayPal", "BankTransfer", "UPI"];

/// A payment method from the fixed allow-list.
///
/// Matching is case-insensitive; the stored form always uses the canonical
/// spelling from [`ALLOWED_PAYMENT_METHODS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaymentMethod(&'static str);

/// Error returned when parsing an unsupported payment method.
#[derive(Debug, Clone)]
pub struct ParsePaymentMethodError(String);

impl fmt::Display for ParsePaymentMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a supported payment method. Allowed: {}",
            self.0,
            ALLOWED_PAYMENT_METHODS.join(", ")
        )
    }
}

impl std::error::Error for ParsePaymentMethodError {}

impl PaymentMethod {
    pub fn new(s: &str) -> Result<Self, ParsePaymentMethodError> {
        let trimmed = s.trim();
        ALLOWED_PAYMENT_METHODS
            .iter()
            .find(|m| m.eq_ignore_ascii_case(trimmed))
            .map(|m| Self(m))
            .ok_or_else(|| ParsePaymentMethodError(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for PaymentMethod {
    type Err = ParsePaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}
