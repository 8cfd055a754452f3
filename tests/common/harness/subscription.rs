//! Builder for test subscriptions with sensible defaults.

// Allow dead code since not every test binary uses every helper
#![allow(dead_code)]

use chrono::NaiveDate;
use renewalradar::domain::{BillingCycle, Currency, PaymentMethod, Status, Subscription, Tag};

/// Builder for seeding subscriptions directly into a test database.
///
/// Defaults to a monthly USD subscription starting 2024-01-01.
#[derive(Debug, Clone)]
pub struct TestSubscription {
    name: String,
    cost: f64,
    cycle: BillingCycle,
    currency: String,
    start: NaiveDate,
    renewal: Option<NaiveDate>,
    status: Status,
    tags: Vec<String>,
    payment_method: Option<String>,
    parent: Option<i64>,
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid test date")
}

impl TestSubscription {
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
            cycle: BillingCycle::Monthly,
            currency: "USD".to_string(),
            start: date("2024-01-01"),
            renewal: None,
            status: Status::Active,
            tags: Vec::new(),
            payment_method: None,
            parent: None,
        }
    }

    pub fn cycle(mut self, cycle: BillingCycle) -> Self {
        self.cycle = cycle;
        self
    }

    pub fn currency(mut self, code: &str) -> Self {
        self.currency = code.to_string();
        self
    }

    /// Sets the start date (YYYY-MM-DD).
    pub fn start(mut self, start: &str) -> Self {
        self.start = date(start);
        self
    }

    /// Sets an explicit renewal date (YYYY-MM-DD).
    pub fn renewal(mut self, renewal: &str) -> Self {
        self.renewal = Some(date(renewal));
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn payment_method(mut self, method: &str) -> Self {
        self.payment_method = Some(method.to_string());
        self
    }

    pub fn parent(mut self, id: i64) -> Self {
        self.parent = Some(id);
        self
    }

    /// Builds the domain value, panicking on invalid test data.
    pub fn to_subscription(&self) -> Subscription {
        Subscription::builder(
            self.name.clone(),
            self.cost,
            self.cycle,
            Currency::new(&self.currency).expect("Invalid currency"),
            self.start,
        )
        .renewal_date(self.renewal)
        .status(self.status)
        .tags(
            self.tags
                .iter()
                .map(|t| Tag::new(t).expect("Invalid tag"))
                .collect(),
        )
        .payment_method(
            self.payment_method
                .as_deref()
                .map(|m| PaymentMethod::new(m).expect("Invalid payment method")),
        )
        .parent_subscription_id(self.parent)
        .build()
        .expect("Invalid test subscription")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_monthly_usd() {
        let sub = TestSubscription::new("Netflix", 15.99).to_subscription();
        assert_eq!(sub.billing_cycle(), BillingCycle::Monthly);
        assert_eq!(sub.currency().as_str(), "USD");
        assert_eq!(sub.renewal_date(), date("2024-02-01"));
    }

    #[test]
    fn builder_sets_optional_fields() {
        let sub = TestSubscription::new("Slack", 8.0)
            .tag("work")
            .payment_method("Visa")
            .status(Status::Trial)
            .to_subscription();
        assert_eq!(sub.tags()[0].as_str(), "work");
        assert_eq!(sub.payment_method().map(|m| m.as_str()), Some("Visa"));
        assert_eq!(sub.status(), Status::Trial);
    }
}
