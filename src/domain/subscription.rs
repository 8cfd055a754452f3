//! The subscription entity and its validated construction.

use crate::domain::{
    BillingCycle, Currency, ParseBillingCycleError, ParseCurrencyError, ParseDateError,
    ParsePaymentMethodError, ParseStatusError, ParseTagError, PaymentMethod, Status, Tag,
    parse_iso_date,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while constructing or updating a subscription.
#[derive(Debug, Clone, Error)]
pub enum SubscriptionError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("invalid cost: '{0}'. Cost must be a positive number.")]
    InvalidCost(String),

    #[error("{0}")]
    BillingCycle(#[from] ParseBillingCycleError),

    #[error("{0}")]
    Currency(#[from] ParseCurrencyError),

    #[error("{0}")]
    Date(#[from] ParseDateError),

    #[error("renewal date ({renewal}) cannot be earlier than start date ({start})")]
    RenewalBeforeStart { renewal: NaiveDate, start: NaiveDate },

    #[error("cannot derive a renewal date from {start} for a {cycle} cycle")]
    RenewalOutOfRange { start: NaiveDate, cycle: BillingCycle },

    #[error("{0}")]
    Tag(#[from] ParseTagError),

    #[error("{0}")]
    PaymentMethod(#[from] ParsePaymentMethodError),

    #[error("{0}")]
    Status(#[from] ParseStatusError),

    #[error("a subscription cannot be its own parent")]
    SelfParent,
}

/// A tracked recurring-payment subscription.
///
/// Construct through [`Subscription::builder`] (typed values) or
/// [`SubscriptionInput::into_builder`] (raw command-line text). Both paths
/// enforce the same invariants:
/// - the name is non-empty after trimming
/// - the cost is a finite number greater than zero
/// - the renewal date is not earlier than the start date
///
/// `id` is `None` until the subscription has been stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    id: Option<i64>,
    name: String,
    cost: f64,
    billing_cycle: BillingCycle,
    currency: Currency,
    start_date: NaiveDate,
    renewal_date: NaiveDate,
    trial_end_date: Option<NaiveDate>,
    payment_method: Option<PaymentMethod>,
    notes: Option<String>,
    status: Status,
    tags: Vec<Tag>,
    parent_subscription_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Creates a builder with the required fields.
    pub fn builder(
        name: impl Into<String>,
        cost: f64,
        billing_cycle: BillingCycle,
        currency: Currency,
        start_date: NaiveDate,
    ) -> SubscriptionBuilder {
        SubscriptionBuilder::new(name.into(), cost, billing_cycle, currency, start_date)
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn billing_cycle(&self) -> BillingCycle {
        self.billing_cycle
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn renewal_date(&self) -> NaiveDate {
        self.renewal_date
    }

    pub fn trial_end_date(&self) -> Option<NaiveDate> {
        self.trial_end_date
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method.as_ref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn parent_subscription_id(&self) -> Option<i64> {
        self.parent_subscription_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Cost normalized to one month.
    pub fn monthly_cost(&self) -> f64 {
        self.billing_cycle.monthly_equivalent(self.cost)
    }

    /// Cost normalized to one year.
    pub fn annual_cost(&self) -> f64 {
        self.billing_cycle.annual_equivalent(self.cost)
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Non-fatal date inconsistencies worth telling the user about.
    pub fn date_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(trial_end) = self.trial_end_date {
            if trial_end < self.start_date {
                warnings.push(format!(
                    "trial end date ({}) is earlier than start date ({})",
                    trial_end, self.start_date
                ));
            }
            if trial_end > self.renewal_date {
                warnings.push(format!(
                    "trial end date ({}) is after renewal date ({})",
                    trial_end, self.renewal_date
                ));
            }
        }
        warnings
    }

    /// Returns a copy with `changes` applied and re-validated.
    ///
    /// `updated_at` is set to `now`.
    pub fn apply(
        &self,
        changes: &SubscriptionChanges,
        now: DateTime<Utc>,
    ) -> Result<Subscription, SubscriptionError> {
        let mut updated = self.clone();
        if let Some(status) = changes.status {
            updated.status = status;
        }
        if let Some(payment_method) = &changes.payment_method {
            updated.payment_method = payment_method.clone();
        }
        if let Some(tags) = &changes.tags {
            updated.tags = deduplicate_tags(tags.clone());
        }
        if let Some(parent) = changes.parent_subscription_id {
            updated.parent_subscription_id = parent;
        }
        if let Some(renewal) = changes.renewal_date {
            if renewal < updated.start_date {
                return Err(SubscriptionError::RenewalBeforeStart {
                    renewal,
                    start: updated.start_date,
                });
            }
            updated.renewal_date = renewal;
        }
        if updated.id.is_some() && updated.id == updated.parent_subscription_id {
            return Err(SubscriptionError::SelfParent);
        }
        updated.updated_at = now;
        Ok(updated)
    }

    /// Returns the same subscription carrying its stored id.
    pub(crate) fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {:.2} {}, status: {}",
            self.name, self.currency, self.cost, self.billing_cycle, self.status
        )?;
        if let Some(pm) = &self.payment_method {
            write!(f, ", payment: {}", pm)?;
        }
        if !self.tags.is_empty() {
            write!(f, ", tags: [{}]", Tag::join(&self.tags).replace(',', ", "))?;
        }
        write!(f, ")")
    }
}

/// Field changes applied by `update-status`.
///
/// `None` leaves a field untouched; for optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionChanges {
    pub status: Option<Status>,
    pub payment_method: Option<Option<PaymentMethod>>,
    pub tags: Option<Vec<Tag>>,
    pub parent_subscription_id: Option<Option<i64>>,
    pub renewal_date: Option<NaiveDate>,
}

impl SubscriptionChanges {
    pub fn is_empty(&self) -> bool {
        *self == SubscriptionChanges::default()
    }
}

/// Builder for constructing a validated [`Subscription`].
pub struct SubscriptionBuilder {
    id: Option<i64>,
    name: String,
    cost: f64,
    billing_cycle: BillingCycle,
    currency: Currency,
    start_date: NaiveDate,
    renewal_date: Option<NaiveDate>,
    trial_end_date: Option<NaiveDate>,
    payment_method: Option<PaymentMethod>,
    notes: Option<String>,
    status: Status,
    tags: Vec<Tag>,
    parent_subscription_id: Option<i64>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl SubscriptionBuilder {
    fn new(
        name: String,
        cost: f64,
        billing_cycle: BillingCycle,
        currency: Currency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name,
            cost,
            billing_cycle,
            currency,
            start_date,
            renewal_date: None,
            trial_end_date: None,
            payment_method: None,
            notes: None,
            status: Status::default(),
            tags: Vec::new(),
            parent_subscription_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the renewal date; when left unset it is derived from the start date.
    pub fn renewal_date(mut self, date: Option<NaiveDate>) -> Self {
        self.renewal_date = date;
        self
    }

    pub fn trial_end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.trial_end_date = date;
        self
    }

    pub fn payment_method(mut self, method: Option<PaymentMethod>) -> Self {
        self.payment_method = method;
        self
    }

    /// Sets the notes. Empty or whitespace-only text is normalized to None.
    pub fn notes(mut self, notes: Option<impl Into<String>>) -> Self {
        self.notes = notes
            .map(|s| s.into())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Sets the tags. Duplicates are removed (first occurrence kept).
    pub fn tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = deduplicate_tags(tags);
        self
    }

    pub fn parent_subscription_id(mut self, parent: Option<i64>) -> Self {
        self.parent_subscription_id = parent;
        self
    }

    pub fn timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        self
    }

    /// Builds the Subscription.
    ///
    /// # Errors
    ///
    /// Returns `SubscriptionError` if:
    /// - The name is empty or whitespace-only
    /// - The cost is not a finite number greater than zero
    /// - The renewal date precedes the start date
    /// - The subscription names itself as parent
    pub fn build(self) -> Result<Subscription, SubscriptionError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SubscriptionError::EmptyName);
        }

        if !self.cost.is_finite() || self.cost <= 0.0 {
            return Err(SubscriptionError::InvalidCost(self.cost.to_string()));
        }

        let renewal_date = match self.renewal_date {
            Some(renewal) if renewal < self.start_date => {
                return Err(SubscriptionError::RenewalBeforeStart {
                    renewal,
                    start: self.start_date,
                });
            }
            Some(renewal) => renewal,
            None => self.billing_cycle.advance(self.start_date).ok_or(
                SubscriptionError::RenewalOutOfRange {
                    start: self.start_date,
                    cycle: self.billing_cycle,
                },
            )?,
        };

        if self.id.is_some() && self.id == self.parent_subscription_id {
            return Err(SubscriptionError::SelfParent);
        }

        let now = Utc::now();
        Ok(Subscription {
            id: self.id,
            name: name.to_string(),
            cost: self.cost,
            billing_cycle: self.billing_cycle,
            currency: self.currency,
            start_date: self.start_date,
            renewal_date,
            trial_end_date: self.trial_end_date,
            payment_method: self.payment_method,
            notes: self.notes,
            status: self.status,
            tags: self.tags,
            parent_subscription_id: self.parent_subscription_id,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// Raw subscription fields as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionInput {
    pub name: String,
    pub cost: String,
    pub billing_cycle: String,
    pub currency: String,
    pub start_date: String,
    pub renewal_date: Option<String>,
    pub trial_end_date: Option<String>,
    pub payment_method: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

impl SubscriptionInput {
    /// Parses every raw field, returning a builder ready for `build()`.
    ///
    /// The parent subscription is not part of the raw input since resolving it
    /// needs the store.
    pub fn into_builder(self) -> Result<SubscriptionBuilder, SubscriptionError> {
        if self.name.trim().is_empty() {
            return Err(SubscriptionError::EmptyName);
        }

        let cost = parse_cost(&self.cost)?;
        let billing_cycle: BillingCycle = self.billing_cycle.parse()?;
        let currency = Currency::new(&self.currency)?;
        let start_date = parse_iso_date(&self.start_date, "start date")?;

        let renewal_date = self
            .renewal_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_iso_date(s, "renewal date"))
            .transpose()?;

        let trial_end_date = self
            .trial_end_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_iso_date(s, "trial end date"))
            .transpose()?;

        let payment_method = self
            .payment_method
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(PaymentMethod::new)
            .transpose()?;

        let tags = self
            .tags
            .iter()
            .map(|t| Tag::new(t))
            .collect::<Result<Vec<_>, _>>()?;

        let status = match self.status.as_deref() {
            Some(s) => s.parse()?,
            None => Status::default(),
        };

        Ok(
            Subscription::builder(self.name, cost, billing_cycle, currency, start_date)
                .renewal_date(renewal_date)
                .trial_end_date(trial_end_date)
                .payment_method(payment_method)
                .tags(tags)
                .notes(self.notes)
                .status(status),
        )
    }
}

/// Parses a cost string into a positive amount.
pub fn parse_cost(s: &str) -> Result<f64, SubscriptionError> {
    let trimmed = s.trim();
    match trimmed.parse::<f64>() {
        Ok(cost) if cost.is_finite() && cost > 0.0 => Ok(cost),
        _ => Err(SubscriptionError::InvalidCost(trimmed.to_string())),
    }
}

fn deduplicate_tags(tags: Vec<Tag>) -> Vec<Tag> {
    let mut seen = Vec::new();
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}
