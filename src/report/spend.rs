//! Spend aggregation: per-currency totals, grouped buckets and rankings.

use crate::domain::Currency;
use crate::report::SubscriptionView;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket name for subscriptions without a payment method.
pub const UNSPECIFIED: &str = "unspecified";

/// Monthly and annual totals for one currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyTotals {
    pub currency: Currency,
    pub monthly: f64,
    pub annual: f64,
    pub count: usize,
}

/// Sums the equivalent costs of each view, grouped by effective currency.
///
/// Views carrying a conversion are counted in the converted currency.
/// Results are ordered by currency code.
pub fn totals_by_currency(views: &[SubscriptionView<'_>]) -> Vec<CurrencyTotals> {
    let mut totals: BTreeMap<Currency, CurrencyTotals> = BTreeMap::new();
    for view in views {
        let (monthly, currency) = view.effective_monthly();
        let (annual, _) = view.effective_annual();
        let entry = totals
            .entry(currency.clone())
            .or_insert_with(|| CurrencyTotals {
                currency: currency.clone(),
                monthly: 0.0,
                annual: 0.0,
                count: 0,
            });
        entry.monthly += monthly;
        entry.annual += annual;
        entry.count += 1;
    }
    totals.into_values().collect()
}

/// Spend attributed to one group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendBucket {
    pub name: String,
    pub amount: f64,
    pub count: usize,
}

/// Groups `items` into buckets, adding each item's amount to every key it yields.
///
/// An item yielding several keys (tags) contributes its full amount to each,
/// so bucket sums may exceed the overall total. Buckets are ordered by amount
/// descending, then name.
pub fn group_spend<T>(
    items: &[T],
    amount: impl Fn(&T) -> f64,
    keys: impl Fn(&T) -> Vec<String>,
) -> Vec<SpendBucket> {
    let mut buckets: BTreeMap<String, SpendBucket> = BTreeMap::new();
    for item in items {
        let value = amount(item);
        for key in keys(item) {
            let bucket = buckets.entry(key.clone()).or_insert_with(|| SpendBucket {
                name: key,
                amount: 0.0,
                count: 0,
            });
            bucket.amount += value;
            bucket.count += 1;
        }
    }

    let mut result: Vec<SpendBucket> = buckets.into_values().collect();
    result.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.name.cmp(&b.name))
    });
    result
}

/// One entry of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSpend {
    pub name: String,
    pub amount: f64,
}

/// The `n` largest amounts, ties broken by name ascending.
pub fn top_n<T>(
    items: &[T],
    n: usize,
    name: impl Fn(&T) -> String,
    amount: impl Fn(&T) -> f64,
) -> Vec<RankedSpend> {
    let mut ranked: Vec<RankedSpend> = items
        .iter()
        .map(|item| RankedSpend {
            name: name(item),
            amount: amount(item),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(n);
    ranked
}
