//! Command handlers for the CLI.

mod add;
mod budget;
mod delete;
mod resolve;
mod summary;
mod update;
mod usage;
mod view;

#[cfg(test)]
pub(crate) mod tests;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::cli::error::CommandError;
use crate::domain::{Currency, PaymentMethod, Status, Tag};
use crate::store::{SqliteStore, SubscriptionFilter};

// Re-export public items
pub use add::{AddOutcome, add_subscription, handle_add};
pub use budget::{BudgetReport, budget_report, handle_budget, set_budget};
pub use delete::{DeleteOutcome, delete_subscription, handle_delete};
pub use resolve::{ResolveResult, resolve_reference, resolve_target};
pub use summary::{SummaryReport, handle_summary, summarize};
pub use update::{UpdateOutcome, handle_update_status, update_subscription};
pub use usage::{UsageReport, handle_list_usage, usage_report};
pub use view::{ViewReport, handle_view, view_report};

// ===========================================
// Shared Context
// ===========================================

/// Settings resolved from flags and the config file, shared by every handler.
#[derive(Debug, Clone)]
pub struct Context {
    pub db_path: PathBuf,
    pub expiring_days: Option<i64>,
    pub report_currency: Option<Currency>,
    pub today: NaiveDate,
}

impl Context {
    /// Opens the subscription store at the configured path.
    pub fn open_store(&self) -> Result<SqliteStore> {
        SqliteStore::open(&self.db_path)
            .with_context(|| format!("failed to open database at {}", self.db_path.display()))
    }
}

// ===========================================
// Shared Utilities
// ===========================================

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// Parses an optional currency flag.
pub(crate) fn parse_currency(value: Option<&str>) -> Result<Option<Currency>, CommandError> {
    value
        .map(Currency::new)
        .transpose()
        .map_err(|e| CommandError::validation(e.to_string()))
}

/// Parses an optional tag flag.
pub(crate) fn parse_tag(value: Option<&str>) -> Result<Option<Tag>, CommandError> {
    value
        .map(Tag::new)
        .transpose()
        .map_err(|e| CommandError::validation(e.to_string()))
}

/// Parses an optional payment method flag.
pub(crate) fn parse_payment_method(
    value: Option<&str>,
) -> Result<Option<PaymentMethod>, CommandError> {
    value
        .map(PaymentMethod::new)
        .transpose()
        .map_err(|e| CommandError::validation(e.to_string()))
}

/// Builds a listing filter from the raw filter flags shared by several commands.
pub(crate) fn build_filter(
    statuses: &[String],
    currency: Option<&str>,
    tag: Option<&str>,
    payment_methods: &[String],
) -> Result<SubscriptionFilter, CommandError> {
    let statuses = statuses
        .iter()
        .map(|s| s.parse::<Status>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CommandError::validation(e.to_string()))?;
    let payment_methods = payment_methods
        .iter()
        .map(|m| PaymentMethod::new(m))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CommandError::validation(e.to_string()))?;

    Ok(SubscriptionFilter::new()
        .statuses(statuses)
        .currency(parse_currency(currency)?)
        .tag(parse_tag(tag)?)
        .payment_methods(payment_methods))
}

/// Resolves the expiring threshold: flag, then config file, then the default.
pub(crate) fn expiring_days(flag: Option<i64>, ctx: &Context) -> Result<i64, CommandError> {
    let days = flag
        .or(ctx.expiring_days)
        .unwrap_or(crate::report::DEFAULT_EXPIRING_DAYS);
    if days < 0 {
        return Err(CommandError::validation("--expiring-days cannot be negative"));
    }
    Ok(days)
}

/// Resolves the currency used for cross-currency totals.
///
/// An explicit target wins; otherwise the single currency in use, otherwise
/// the configured report currency, otherwise USD.
pub(crate) fn report_currency<'a>(
    explicit: Option<&Currency>,
    configured: Option<&Currency>,
    in_use: impl IntoIterator<Item = &'a Currency>,
) -> Currency {
    if let Some(target) = explicit {
        return target.clone();
    }
    let mut currencies: Vec<&Currency> = in_use.into_iter().collect();
    currencies.sort();
    currencies.dedup();
    match (currencies.as_slice(), configured) {
        ([only], _) => (*only).clone(),
        (_, Some(configured)) => configured.clone(),
        _ => Currency::usd(),
    }
}
