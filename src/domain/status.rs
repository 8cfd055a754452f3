//! Persisted subscription status.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status stored with a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    #[default]
    Active,
    Trial,
    Expiring,
    Cancelled,
}

/// Error returned when parsing an unknown status.
#[derive(Debug, Clone)]
pub struct ParseStatusError(String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = Status::ALL.iter().map(|s| s.as_str()).collect();
        write!(
            f,
            "'{}' is not a valid status. Allowed values: {}",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Active,
        Status::Trial,
        Status::Expiring,
        Status::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Trial => "trial",
            Status::Expiring => "expiring",
            Status::Cancelled => "cancelled",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Status::Active => "currently ongoing subscription",
            Status::Trial => "in trial period",
            Status::Expiring => "about to end soon",
            Status::Cancelled => "no longer active",
        }
    }

    /// Whether a subscription in this status can be relabeled as expiring.
    pub fn is_renewing(self) -> bool {
        matches!(self, Status::Active | Status::Trial)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "trial" => Ok(Status::Trial),
            "expiring" => Ok(Status::Expiring),
            "cancelled" | "canceled" => Ok(Status::Cancelled),
            _ => Err(ParseStatusError(s.trim().to_string())),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
