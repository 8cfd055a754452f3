//! Output format types and shared rendering helpers.

use crate::domain::Currency;
use crate::report::round_cents;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Prints as pretty JSON on stdout.
    pub fn print(&self) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

/// Formats an amount with its currency symbol, e.g. `$15.00` or `CHF 9.50`.
pub fn money(amount: f64, currency: &Currency) -> String {
    let symbol = currency.symbol();
    let value = round_cents(amount);
    if symbol == currency.as_str() {
        format!("{} {:.2}", symbol, value)
    } else {
        format!("{}{:.2}", symbol, value)
    }
}

/// Prints each warning on stderr as `Warning: ...`.
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}

/// Human description of days until a date, e.g. "in 3 days" or "2 days ago".
pub fn relative_days(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 0 => format!("in {} days", d),
        d => format!("{} days ago", -d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_uses_symbol_when_known() {
        assert_eq!(money(15.0, &Currency::usd()), "$15.00");
        assert_eq!(money(9.499, &Currency::new("CHF").unwrap()), "CHF 9.50");
    }

    #[test]
    fn relative_days_wording() {
        assert_eq!(relative_days(0), "today");
        assert_eq!(relative_days(3), "in 3 days");
        assert_eq!(relative_days(-2), "2 days ago");
    }

    #[test]
    fn json_output_omits_empty_warnings() {
        let json = serde_json::to_string(&Output::new(vec![1, 2])).unwrap();
        assert_eq!(json, r#"{"data":[1,2]}"#);
    }
}
