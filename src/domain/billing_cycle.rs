//! Billing cycle of a subscription.

use chrono::{Months, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How often a subscription charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Biannual,
    Annual,
}

/// Error returned when parsing an unknown billing cycle.
#[derive(Debug, Clone)]
pub struct ParseBillingCycleError(String);

impl fmt::Display for ParseBillingCycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = BillingCycle::ALL.iter().map(|c| c.as_str()).collect();
        write!(
            f,
            "invalid billing cycle: '{}'. Valid options are: {}",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for ParseBillingCycleError {}

impl BillingCycle {
    pub const ALL: [BillingCycle; 4] = [
        BillingCycle::Monthly,
        BillingCycle::Quarterly,
        BillingCycle::Biannual,
        BillingCycle::Annual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Biannual => "biannual",
            BillingCycle::Annual => "annual",
        }
    }

    /// Number of calendar months covered by one charge.
    pub fn months(self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::Biannual => 6,
            BillingCycle::Annual => 12,
        }
    }

    /// Number of charges per year.
    pub fn charges_per_year(self) -> u32 {
        12 / self.months()
    }

    /// Cost per month for a charge of `cost` on this cycle.
    pub fn monthly_equivalent(self, cost: f64) -> f64 {
        cost / f64::from(self.months())
    }

    /// Cost per year for a charge of `cost` on this cycle.
    pub fn annual_equivalent(self, cost: f64) -> f64 {
        cost * f64::from(self.charges_per_year())
    }

    /// Advances `date` by one cycle.
    ///
    /// Days past the end of the target month clamp to its last day,
    /// so 2024-01-31 advanced monthly is 2024-02-29.
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_add_months(Months::new(self.months()))
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = ParseBillingCycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BillingCycle::Monthly),
            "quarterly" => Ok(BillingCycle::Quarterly),
            "biannual" => Ok(BillingCycle::Biannual),
            // "yearly" is what older databases and the add path used
            "annual" | "yearly" => Ok(BillingCycle::Annual),
            _ => Err(ParseBillingCycleError(s.trim().to_string())),
        }
    }
}

impl Serialize for BillingCycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
