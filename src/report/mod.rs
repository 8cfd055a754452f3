//! Cost aggregation, currency conversion and budget utilization

mod budget;
mod rates;
mod spend;
mod view;

pub use budget::{
    AT_RISK_PERCENT, BudgetUtilization, CountedSubscription, RiskLevel, UtilizationFilter,
    counts_toward, is_active_in_month, utilization,
};
pub use rates::{ConversionError, RateTable, round_cents};
pub use spend::{
    CurrencyTotals, RankedSpend, SpendBucket, UNSPECIFIED, group_spend, top_n,
    totals_by_currency,
};
pub use view::{ConvertedCost, DEFAULT_EXPIRING_DAYS, SubscriptionView};
