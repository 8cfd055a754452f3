//! SubscriptionRepository trait, filters and result types.

use crate::domain::{Budget, Currency, PaymentMethod, Status, Subscription, Tag, YearMonth};
use std::path::PathBuf;
use thiserror::Error;

// ===========================================
// StoreError Type
// ===========================================

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested subscription does not exist.
    #[error("subscription not found: {id}")]
    NotFound { id: i64 },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be turned back into a domain value.
    #[error("invalid data in database: {0}")]
    InvalidData(String),

    /// An I/O error occurred.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deletion refused because other subscriptions name this one as parent.
    #[error("cannot delete '{name}': {} subscription(s) depend on it", children.len())]
    HasChildren {
        name: String,
        children: Vec<(i64, String)>,
    },

    /// The database was written by a newer release.
    #[error("database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i64, supported: i64 },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ===========================================
// Sorting
// ===========================================

/// Column a subscription listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Cost,
    BillingCycle,
    Currency,
    StartDate,
    RenewalDate,
    Status,
    PaymentMethod,
    CreatedAt,
}

impl SortKey {
    /// SQL expression used in the ORDER BY clause.
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Name => "name COLLATE NOCASE",
            SortKey::Cost => "cost",
            SortKey::BillingCycle => "billing_cycle",
            SortKey::Currency => "currency",
            SortKey::StartDate => "start_date",
            SortKey::RenewalDate => "renewal_date",
            SortKey::Status => "status",
            SortKey::PaymentMethod => "payment_method",
            SortKey::CreatedAt => "created_at",
        }
    }
}

// ===========================================
// SubscriptionFilter
// ===========================================

/// Conjunction of optional criteria for listing subscriptions.
///
/// An empty filter matches every row. Without a sort key rows come back by
/// name (case-insensitive), then id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFilter {
    pub statuses: Vec<Status>,
    pub currency: Option<Currency>,
    pub tag: Option<Tag>,
    pub payment_methods: Vec<PaymentMethod>,
    pub parent: Option<i64>,
    pub sort: Option<SortKey>,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl SubscriptionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(mut self, statuses: Vec<Status>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn currency(mut self, currency: Option<Currency>) -> Self {
        self.currency = currency;
        self
    }

    pub fn tag(mut self, tag: Option<Tag>) -> Self {
        self.tag = tag;
        self
    }

    pub fn payment_methods(mut self, methods: Vec<PaymentMethod>) -> Self {
        self.payment_methods = methods;
        self
    }

    pub fn parent(mut self, parent: Option<i64>) -> Self {
        self.parent = parent;
        self
    }

    pub fn sort(mut self, key: Option<SortKey>, descending: bool) -> Self {
        self.sort = key;
        self.descending = descending;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Human-readable list of the active criteria, e.g. `status=active, tag=work`.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if !self.statuses.is_empty() {
            let names: Vec<_> = self.statuses.iter().map(|s| s.as_str()).collect();
            parts.push(format!("status={}", names.join("|")));
        }
        if let Some(currency) = &self.currency {
            parts.push(format!("currency={}", currency));
        }
        if let Some(tag) = &self.tag {
            parts.push(format!("tag={}", tag));
        }
        if !self.payment_methods.is_empty() {
            let names: Vec<_> = self.payment_methods.iter().map(PaymentMethod::as_str).collect();
            parts.push(format!("payment_method={}", names.join("|")));
        }
        if let Some(parent) = self.parent {
            parts.push(format!("parent={}", parent));
        }
        parts
    }
}

// ===========================================
// Usage counts
// ===========================================

/// How many subscriptions use a tag or payment method.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UsageCount {
    pub name: String,
    pub count: usize,
}

impl UsageCount {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Sorts usage counts by count descending, then name ascending.
pub fn sort_usage(counts: &mut [UsageCount]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
}

// ===========================================
// SubscriptionRepository Trait
// ===========================================

/// Persistent storage for subscriptions and budgets.
pub trait SubscriptionRepository {
    /// Stores a new subscription and returns its assigned id.
    fn insert_subscription(&mut self, subscription: &Subscription) -> StoreResult<i64>;

    /// Retrieves a single subscription by id.
    fn get_subscription(&self, id: i64) -> StoreResult<Option<Subscription>>;

    /// Finds subscriptions whose name matches exactly (case-insensitive).
    fn find_by_name(&self, name: &str) -> StoreResult<Vec<Subscription>>;

    /// Lists subscriptions matching the filter, sorted and limited.
    fn list_subscriptions(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<Subscription>>;

    /// Overwrites every mutable column of a stored subscription.
    fn update_subscription(&mut self, subscription: &Subscription) -> StoreResult<()>;

    /// Lists the direct children of a subscription.
    fn children_of(&self, id: i64) -> StoreResult<Vec<Subscription>>;

    /// Deletes a subscription.
    ///
    /// Fails with [`StoreError::HasChildren`] when any subscription names it
    /// as parent, and [`StoreError::NotFound`] when the id is unknown.
    fn delete_subscription(&mut self, id: i64) -> StoreResult<()>;

    /// Creates or replaces the cap for a month and currency.
    ///
    /// Returns `true` when a new budget was created.
    fn set_budget(
        &mut self,
        period: YearMonth,
        currency: &Currency,
        amount: f64,
    ) -> StoreResult<bool>;

    /// Lists budgets, optionally narrowed by year, month and currency.
    fn get_budgets(
        &self,
        year: Option<i32>,
        month: Option<u32>,
        currency: Option<&Currency>,
    ) -> StoreResult<Vec<Budget>>;

    /// Tag usage among subscriptions matching the filter.
    fn tag_usage(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<UsageCount>>;

    /// Payment method usage among subscriptions matching the filter.
    fn payment_method_usage(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<UsageCount>>;
}
