//! Read-only presentation view of a stored subscription.

use crate::domain::{Currency, Status, Subscription, days_until};
use crate::report::{ConversionError, RateTable};
use chrono::NaiveDate;
use serde::Serialize;

/// Default number of days before renewal at which a subscription shows as expiring.
pub const DEFAULT_EXPIRING_DAYS: i64 = 7;

/// Costs restated in another currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedCost {
    pub currency: Currency,
    pub cost: f64,
    pub monthly_cost: f64,
    pub annual_cost: f64,
}

/// A subscription enriched with values derived for display.
///
/// The derived `display_status` is never written back to storage.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView<'a> {
    #[serde(flatten)]
    pub subscription: &'a Subscription,
    pub display_status: Status,
    pub days_until_renewal: i64,
    pub is_overdue: bool,
    pub monthly_cost: f64,
    pub annual_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted: Option<ConvertedCost>,
}

impl<'a> SubscriptionView<'a> {
    /// Derives the view as of `today`.
    ///
    /// Renewing subscriptions (active or trial) whose renewal falls within
    /// `expiring_days` from today display as expiring. Overdue renewals keep
    /// their stored status and are flagged instead.
    pub fn new(subscription: &'a Subscription, today: NaiveDate, expiring_days: i64) -> Self {
        let days = days_until(subscription.renewal_date(), today);
        let is_overdue = days < 0;
        let display_status = if subscription.status().is_renewing()
            && (0..=expiring_days).contains(&days)
        {
            Status::Expiring
        } else {
            subscription.status()
        };

        Self {
            subscription,
            display_status,
            days_until_renewal: days,
            is_overdue,
            monthly_cost: subscription.monthly_cost(),
            annual_cost: subscription.annual_cost(),
            converted: None,
        }
    }

    /// Attaches costs converted into `target`.
    pub fn convert(
        mut self,
        rates: &RateTable,
        target: &Currency,
    ) -> Result<Self, ConversionError> {
        let from = self.subscription.currency();
        self.converted = Some(ConvertedCost {
            currency: target.clone(),
            cost: rates.convert(self.subscription.cost(), from, target)?,
            monthly_cost: rates.convert(self.monthly_cost, from, target)?,
            annual_cost: rates.convert(self.annual_cost, from, target)?,
        });
        Ok(self)
    }

    /// True when the renewal is between today and `days` from now.
    pub fn renews_within(&self, days: i64) -> bool {
        (0..=days).contains(&self.days_until_renewal)
    }

    /// Monthly cost in the converted currency when present, else the original.
    pub fn effective_monthly(&self) -> (f64, &Currency) {
        match &self.converted {
            Some(c) => (c.monthly_cost, &c.currency),
            None => (self.monthly_cost, self.subscription.currency()),
        }
    }

    /// Annual cost in the converted currency when present, else the original.
    pub fn effective_annual(&self) -> (f64, &Currency) {
        match &self.converted {
            Some(c) => (c.annual_cost, &c.currency),
            None => (self.annual_cost, self.subscription.currency()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BillingCycle;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn renewing_on(renewal: &str, status: Status) -> Subscription {
        Subscription::builder(
            "Test",
            12.0,
            BillingCycle::Quarterly,
            Currency::usd(),
            date("2024-01-01"),
        )
        .renewal_date(Some(date(renewal)))
        .status(status)
        .build()
        .unwrap()
    }

    #[test]
    fn active_near_renewal_displays_expiring() {
        let sub = renewing_on("2024-03-05", Status::Active);
        let view = SubscriptionView::new(&sub, date("2024-03-01"), 7);
        assert_eq!(view.display_status, Status::Expiring);
        assert_eq!(view.days_until_renewal, 4);
        assert!(!view.is_overdue);
        // stored value untouched
        assert_eq!(sub.status(), Status::Active);
    }

    #[test]
    fn renewal_on_threshold_counts() {
        let sub = renewing_on("2024-03-08", Status::Trial);
        assert_eq!(
            SubscriptionView::new(&sub, date("2024-03-01"), 7).display_status,
            Status::Expiring
        );
        assert_eq!(
            SubscriptionView::new(&sub, date("2024-03-01"), 6).display_status,
            Status::Trial
        );
    }

    #[test]
    fn cancelled_never_relabeled() {
        let sub = renewing_on("2024-03-02", Status::Cancelled);
        let view = SubscriptionView::new(&sub, date("2024-03-01"), 7);
        assert_eq!(view.display_status, Status::Cancelled);
    }

    #[test]
    fn overdue_keeps_stored_status() {
        let sub = renewing_on("2024-02-20", Status::Active);
        let view = SubscriptionView::new(&sub, date("2024-03-01"), 7);
        assert!(view.is_overdue);
        assert_eq!(view.display_status, Status::Active);
        assert_eq!(view.days_until_renewal, -10);
    }

    #[test]
    fn derives_equivalent_costs() {
        let sub = renewing_on("2024-04-01", Status::Active);
        let view = SubscriptionView::new(&sub, date("2024-03-01"), 7);
        assert_eq!(view.monthly_cost, 4.0);
        assert_eq!(view.annual_cost, 48.0);
    }

    #[test]
    fn conversion_attaches_target_amounts() {
        let sub = renewing_on("2024-04-01", Status::Active);
        let eur = Currency::new("EUR").unwrap();
        let view = SubscriptionView::new(&sub, date("2024-03-01"), 7)
            .convert(&RateTable::standard(), &eur)
            .unwrap();
        let (monthly, currency) = view.effective_monthly();
        assert_eq!(currency, &eur);
        assert!((monthly - 4.0 / 1.10).abs() < 1e-9);
    }
}
