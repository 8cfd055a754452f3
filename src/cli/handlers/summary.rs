//! Summary command handler.

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::view::{UpcomingRenewal, enrich, upcoming_renewals};
use super::{Context, build_filter, expiring_days, parse_currency, report_currency};
use crate::cli::SummaryArgs;
use crate::cli::output::{Output, OutputFormat, money, print_warnings};
use crate::domain::{Currency, Status};
use crate::report::{
    CurrencyTotals, RankedSpend, RateTable, SpendBucket, SubscriptionView, UNSPECIFIED,
    group_spend, top_n, totals_by_currency,
};
use crate::store::SubscriptionRepository;

/// Number of subscriptions holding one display status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

/// Most expensive subscriptions plus tag and payment breakdowns.
#[derive(Debug, Clone, Serialize)]
pub struct TopBreakdown {
    pub subscriptions: Vec<RankedSpend>,
    pub by_tag: Vec<SpendBucket>,
    pub by_payment_method: Vec<SpendBucket>,
}

/// Portfolio rollup. Amounts are monthly equivalents.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub total: usize,
    pub status_counts: Vec<StatusCount>,
    pub by_currency: Vec<CurrencyTotals>,
    pub report_currency: Currency,
    pub monthly_total: f64,
    pub annual_total: f64,
    pub spend_by_status: Vec<SpendBucket>,
    pub expiring_days: i64,
    pub upcoming_renewals: Vec<UpcomingRenewal>,
    pub average_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<TopBreakdown>,
    #[serde(skip)]
    pub filters: Vec<String>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Builds the summary for the subscriptions matching the flags.
///
/// Report-currency totals leave out subscriptions that cannot be converted;
/// each one skipped adds a warning.
pub fn summarize<R: SubscriptionRepository>(
    store: &R,
    args: &SummaryArgs,
    ctx: &Context,
) -> Result<SummaryReport> {
    let filter = build_filter(
        &args.statuses,
        args.currency.as_deref(),
        None,
        &args.payment_methods,
    )?;
    let days = expiring_days(args.expiring_days, ctx)?;
    let explicit = parse_currency(args.convert_to.as_deref())?;

    let subscriptions = store
        .list_subscriptions(&filter)
        .context("failed to list subscriptions")?;
    let target = report_currency(
        explicit.as_ref(),
        ctx.report_currency.as_ref(),
        subscriptions.iter().map(|s| s.currency()),
    );
    tracing::debug!(count = subscriptions.len(), currency = %target, "summarizing");

    let raw: Vec<SubscriptionView<'_>> = subscriptions
        .iter()
        .map(|s| SubscriptionView::new(s, ctx.today, days))
        .collect();
    let mut warnings = Vec::new();
    let views = enrich(
        &subscriptions,
        ctx.today,
        days,
        Some(&target),
        &RateTable::standard(),
        &mut warnings,
    );
    let in_target: Vec<&SubscriptionView<'_>> = views
        .iter()
        .filter(|v| v.effective_monthly().1 == &target)
        .collect();
    let monthly = |v: &&SubscriptionView<'_>| v.effective_monthly().0;

    let status_counts = Status::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: views.iter().filter(|v| v.display_status == status).count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    let monthly_total: f64 = in_target.iter().map(monthly).sum();
    let annual_total: f64 = in_target.iter().map(|v| v.effective_annual().0).sum();
    let average_monthly = (!in_target.is_empty()).then(|| monthly_total / in_target.len() as f64);

    let top = args.top.map(|n| TopBreakdown {
        subscriptions: top_n(&in_target, n, |v| v.subscription.name().to_string(), monthly),
        by_tag: group_spend(&in_target, monthly, |v| {
            v.subscription
                .tags()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect()
        }),
        by_payment_method: group_spend(&in_target, monthly, |v| {
            vec![
                v.subscription
                    .payment_method()
                    .map_or(UNSPECIFIED, |m| m.as_str())
                    .to_string(),
            ]
        }),
    });

    Ok(SummaryReport {
        total: views.len(),
        status_counts,
        by_currency: totals_by_currency(&raw),
        spend_by_status: group_spend(&in_target, monthly, |v| vec![v.display_status.to_string()]),
        monthly_total,
        annual_total,
        expiring_days: days,
        upcoming_renewals: upcoming_renewals(&views, days),
        average_monthly,
        top,
        report_currency: target,
        filters: filter.describe(),
        warnings,
    })
}

pub fn handle_summary(args: &SummaryArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let report = summarize(&store, args, ctx)?;

    match args.format {
        OutputFormat::Json => {
            let warnings = report.warnings.clone();
            Output::new(&report).with_warnings(warnings).print()?;
        }
        OutputFormat::Human => {
            print_warnings(&report.warnings);
            if report.total == 0 {
                println!("No subscriptions found.");
            } else {
                print_summary(&report);
            }
            if !report.filters.is_empty() {
                println!();
                println!("Filters applied: {}", report.filters.join(", "));
            }
        }
    }
    Ok(())
}

fn print_summary(report: &SummaryReport) {
    let divider = "=".repeat(60);
    let target = &report.report_currency;

    println!("SUBSCRIPTION PORTFOLIO SUMMARY");
    println!("{}", divider);
    println!("Subscription Counts:");
    println!("  Total Subscriptions: {}", report.total);
    println!("  By Status:");
    for count in &report.status_counts {
        println!("    {}: {}", count.status, count.count);
    }

    println!("{}", divider);
    println!("Financial Overview:");
    println!("  By Currency:");
    for totals in &report.by_currency {
        println!(
            "    {}: {} monthly, {} annually",
            totals.currency,
            money(totals.monthly, &totals.currency),
            money(totals.annual, &totals.currency)
        );
    }
    println!(
        "  Total Monthly Spend: {} ({})",
        money(report.monthly_total, target),
        target
    );
    println!(
        "  Total Annual Spend: {} ({})",
        money(report.annual_total, target),
        target
    );
    if !report.spend_by_status.is_empty() {
        println!("  Spend by Status:");
        for bucket in &report.spend_by_status {
            println!("    {}: {}", bucket.name, money(bucket.amount, target));
        }
    }

    println!("{}", divider);
    println!("Upcoming Activity:");
    println!(
        "  Upcoming Renewals: {} in next {} days",
        report.upcoming_renewals.len(),
        report.expiring_days
    );
    for renewal in &report.upcoming_renewals {
        println!(
            "    {} on {} ({} day(s))",
            renewal.name, renewal.renewal_date, renewal.days_until_renewal
        );
    }
    if let Some(average) = report.average_monthly {
        println!(
            "  Average Subscription Cost: {} per month",
            money(average, target)
        );
    }

    if let Some(top) = &report.top {
        println!("{}", divider);
        println!("Top {} by Monthly Spend:", top.subscriptions.len());
        for (rank, entry) in top.subscriptions.iter().enumerate() {
            println!("  {}. {}: {}", rank + 1, entry.name, money(entry.amount, target));
        }
        print_buckets(
            "Spend by Tag (subscriptions with several tags count in each):",
            &top.by_tag,
            target,
        );
        print_buckets("Spend by Payment Method:", &top.by_payment_method, target);
    }
}

fn print_buckets(title: &str, buckets: &[SpendBucket], currency: &Currency) {
    println!("{}", title);
    if buckets.is_empty() {
        println!("  (none)");
    }
    for bucket in buckets {
        println!(
            "  {}: {} ({} subscription(s))",
            bucket.name,
            money(bucket.amount, currency),
            bucket.count
        );
    }
}
