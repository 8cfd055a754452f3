//! Monthly budget utilization.

use crate::domain::{Budget, Currency, PaymentMethod, Status, Subscription, Tag, YearMonth};
use serde::Serialize;
use std::fmt;

/// Percent of the cap above which a budget is considered at risk.
pub const AT_RISK_PERCENT: f64 = 90.0;

/// Whether a subscription incurs a charge during `period`.
///
/// A subscription counts when it has started by the end of the month and
/// either starts in the month, renews in the month, or last renewed before
/// the month with its next renewal landing on or after the month start.
pub fn is_active_in_month(subscription: &Subscription, period: YearMonth) -> bool {
    let start = subscription.start_date();
    let renewal = subscription.renewal_date();
    let month_start = period.first_day();

    if start > period.last_day() {
        return false;
    }
    if period.contains(start) || period.contains(renewal) {
        return true;
    }
    renewal < month_start
        && subscription
            .billing_cycle()
            .advance(renewal)
            .is_some_and(|next| next >= month_start)
}

/// Budget health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Ok,
    AtRisk,
    Over,
}

impl RiskLevel {
    /// Over when utilized exceeds the cap; at risk above 90 percent.
    pub fn classify(utilized: f64, cap: f64, percent: f64) -> Self {
        if utilized > cap {
            RiskLevel::Over
        } else if percent > AT_RISK_PERCENT {
            RiskLevel::AtRisk
        } else {
            RiskLevel::Ok
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Ok => "ok",
            RiskLevel::AtRisk => "at risk",
            RiskLevel::Over => "over",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrows which subscriptions count toward utilization.
///
/// The cap itself is unaffected by these filters.
#[derive(Debug, Clone, Default)]
pub struct UtilizationFilter {
    pub tag: Option<Tag>,
    pub payment_method: Option<PaymentMethod>,
}

impl UtilizationFilter {
    fn matches(&self, subscription: &Subscription) -> bool {
        let tag_ok = self.tag.as_ref().is_none_or(|t| subscription.has_tag(t));
        let method_ok = self
            .payment_method
            .as_ref()
            .is_none_or(|m| subscription.payment_method() == Some(m));
        tag_ok && method_ok
    }
}

/// A subscription counted toward a budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountedSubscription {
    pub id: Option<i64>,
    pub name: String,
    pub cost: f64,
}

/// How much of a budget the month's charges consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUtilization {
    pub year: i32,
    pub month: u32,
    pub currency: Currency,
    pub cap: f64,
    pub utilized: f64,
    pub remaining: f64,
    pub percent: f64,
    pub risk: RiskLevel,
    pub subscriptions: Vec<CountedSubscription>,
}

impl BudgetUtilization {
    pub fn count(&self) -> usize {
        self.subscriptions.len()
    }
}

/// Whether a subscription's cost counts against budgets for `period`.
pub fn counts_toward(subscription: &Subscription, period: YearMonth) -> bool {
    subscription.status() != Status::Cancelled && is_active_in_month(subscription, period)
}

/// Computes utilization of `budget` from the raw cost of qualifying subscriptions.
///
/// Subscriptions in other currencies, cancelled ones, and those not active
/// in the budget month are ignored.
pub fn utilization(
    budget: &Budget,
    subscriptions: &[Subscription],
    filter: &UtilizationFilter,
) -> BudgetUtilization {
    let period = budget.period();
    let counted: Vec<CountedSubscription> = subscriptions
        .iter()
        .filter(|s| s.currency() == budget.currency())
        .filter(|s| counts_toward(s, period))
        .filter(|s| filter.matches(s))
        .map(|s| CountedSubscription {
            id: s.id(),
            name: s.name().to_string(),
            cost: s.cost(),
        })
        .collect();

    let cap = budget.amount();
    let utilized: f64 = counted.iter().map(|s| s.cost).sum();
    let percent = if cap > 0.0 { utilized * 100.0 / cap } else { 0.0 };

    BudgetUtilization {
        year: period.year(),
        month: period.month(),
        currency: budget.currency().clone(),
        cap,
        utilized,
        remaining: cap - utilized,
        percent,
        risk: RiskLevel::classify(utilized, cap, percent),
        subscriptions: counted,
    }
}
