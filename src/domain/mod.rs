//! Core types: Subscription, Budget, and their validated field values

mod billing_cycle;
mod budget;
mod currency;
mod dates;
mod payment_method;
mod status;
mod subscription;
mod tag;

pub use billing_cycle::{BillingCycle, ParseBillingCycleError};
pub use budget::Budget;
pub use currency::{Currency, ParseCurrencyError, SUPPORTED_CURRENCIES};
pub use dates::{ParseDateError, YearMonth, days_until, parse_iso_date};
pub use payment_method::{ALLOWED_PAYMENT_METHODS, ParsePaymentMethodError, PaymentMethod};
pub use status::{ParseStatusError, Status};
pub use subscription::{
    Subscription, SubscriptionBuilder, SubscriptionChanges, SubscriptionError, SubscriptionInput,
    parse_cost,
};
pub use tag::{ALLOWED_TAGS, ParseTagError, Tag};
