//! Monthly per-currency budget caps.

use crate::domain::{Currency, YearMonth};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A spending cap for one currency in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    #[serde(serialize_with = "serialize_period")]
    period: YearMonth,
    currency: Currency,
    amount: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        period: YearMonth,
        currency: Currency,
        amount: f64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            period,
            currency,
            amount,
            created_at,
            updated_at,
        }
    }

    pub fn period(&self) -> YearMonth {
        self.period
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn serialize_period<S: serde::Serializer>(period: &YearMonth, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&format_args!("{:04}-{:02}", period.year(), period.month()))
}
