//! Budget command handler.

use anyhow::{Context as _, Result};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{Context, parse_currency, parse_payment_method, parse_tag};
use crate::cli::BudgetArgs;
use crate::cli::error::CommandError;
use crate::cli::output::{Output, OutputFormat, money, print_warnings};
use crate::domain::{Currency, YearMonth};
use crate::report::{BudgetUtilization, RateTable, RiskLevel, UtilizationFilter, utilization};
use crate::store::{SubscriptionFilter, SubscriptionRepository};

const MIN_YEAR: i32 = 2000;
const MAX_YEARS_AHEAD: i32 = 10;

/// Result of `budget --set`.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetSet {
    pub year: i32,
    pub month: u32,
    pub currency: Currency,
    pub amount: f64,
    pub created: bool,
}

/// One budget and how much of it is used.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetRow {
    #[serde(flatten)]
    pub utilization: BudgetUtilization,
    pub is_current: bool,
}

/// Every listed budget restated in USD and summed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsdTotal {
    pub cap: f64,
    pub utilized: f64,
    pub remaining: f64,
    pub percent: f64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateEntry {
    pub currency: String,
    pub usd_rate: f64,
}

/// Result of `budget --view`.
#[derive(Debug, Serialize)]
pub struct BudgetReport {
    pub budgets: Vec<BudgetRow>,
    pub total_usd: UsdTotal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rates: Option<Vec<RateEntry>>,
    #[serde(skip)]
    pub current: YearMonth,
    #[serde(skip)]
    pub filters: Vec<String>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

fn validate_year(year: i32, today: NaiveDate) -> Result<i32, CommandError> {
    let max = today.year() + MAX_YEARS_AHEAD;
    if (MIN_YEAR..=max).contains(&year) {
        Ok(year)
    } else {
        Err(CommandError::validation(format!(
            "year {} seems invalid (must be between {} and {})",
            year, MIN_YEAR, max
        )))
    }
}

fn validate_month(month: u32) -> Result<u32, CommandError> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(CommandError::validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )))
    }
}

fn parse_amount(raw: &str) -> Result<f64, CommandError> {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(CommandError::validation(format!(
            "invalid budget amount: '{}'. Amount must be a positive number.",
            raw
        ))),
    }
}

/// Creates or replaces the budget for a month and currency.
///
/// Year and month default to the current month, currency to USD.
pub fn set_budget<R: SubscriptionRepository>(
    store: &mut R,
    args: &BudgetArgs,
    today: NaiveDate,
) -> Result<BudgetSet> {
    let raw = args.set.as_deref().unwrap_or_default();
    let amount = parse_amount(raw)?;
    let year = validate_year(args.year.unwrap_or(today.year()), today)?;
    let month = validate_month(args.month.unwrap_or(today.month()))?;
    let currency = parse_currency(args.currency.as_deref())?.unwrap_or_else(Currency::usd);
    let period = YearMonth::new(year, month)
        .ok_or_else(|| CommandError::validation(format!("invalid period {}-{:02}", year, month)))?;

    let created = store
        .set_budget(period, &currency, amount)
        .with_context(|| format!("failed to store budget for {}", period))?;

    Ok(BudgetSet {
        year,
        month,
        currency,
        amount,
        created,
    })
}

/// Computes utilization for every budget matching the year, month and currency flags.
pub fn budget_report<R: SubscriptionRepository>(
    store: &R,
    args: &BudgetArgs,
    today: NaiveDate,
) -> Result<BudgetReport> {
    let year = args.year.map(|y| validate_year(y, today)).transpose()?;
    let month = args.month.map(validate_month).transpose()?;
    let currency = parse_currency(args.currency.as_deref())?;
    let filter = UtilizationFilter {
        tag: parse_tag(args.tag.as_deref())?,
        payment_method: parse_payment_method(args.payment_method.as_deref())?,
    };

    let budgets = store
        .get_budgets(year, month, currency.as_ref())
        .context("failed to load budgets")?;
    let subscriptions = store
        .list_subscriptions(&SubscriptionFilter::new())
        .context("failed to list subscriptions")?;

    let current = YearMonth::of(today);
    let rows: Vec<BudgetRow> = budgets
        .iter()
        .map(|budget| BudgetRow {
            utilization: utilization(budget, &subscriptions, &filter),
            is_current: budget.period() == current,
        })
        .collect();

    let rates = RateTable::standard();
    let mut warnings = Vec::new();
    let total_usd = usd_total(&rows, &rates, &mut warnings);

    let mut filters = Vec::new();
    if let Some(year) = year {
        filters.push(format!("year={}", year));
    }
    if let Some(month) = month {
        filters.push(format!("month={}", month));
    }
    if let Some(currency) = &currency {
        filters.push(format!("currency={}", currency));
    }
    if let Some(tag) = &filter.tag {
        filters.push(format!("tag={}", tag));
    }
    if let Some(method) = &filter.payment_method {
        filters.push(format!("payment_method={}", method));
    }

    Ok(BudgetReport {
        budgets: rows,
        total_usd,
        rates: args.show_rates.then(|| {
            rates
                .entries()
                .map(|(code, usd_rate)| RateEntry {
                    currency: code.to_string(),
                    usd_rate,
                })
                .collect()
        }),
        current,
        filters,
        warnings,
    })
}

fn usd_total(rows: &[BudgetRow], rates: &RateTable, warnings: &mut Vec<String>) -> UsdTotal {
    let usd = Currency::usd();
    let mut cap = 0.0;
    let mut utilized = 0.0;
    for row in rows {
        let u = &row.utilization;
        match (
            rates.convert(u.cap, &u.currency, &usd),
            rates.convert(u.utilized, &u.currency, &usd),
        ) {
            (Ok(c), Ok(used)) => {
                cap += c;
                utilized += used;
            }
            (Err(err), _) | (_, Err(err)) => {
                warnings.push(format!("skipping {} in the USD total: {}", u.currency, err));
            }
        }
    }
    let percent = if cap > 0.0 { utilized * 100.0 / cap } else { 0.0 };
    UsdTotal {
        cap,
        utilized,
        remaining: cap - utilized,
        percent,
        risk: RiskLevel::classify(utilized, cap, percent),
    }
}

pub fn handle_budget(args: &BudgetArgs, ctx: &Context) -> Result<()> {
    if args.set.is_some() {
        let mut store = ctx.open_store()?;
        let outcome = set_budget(&mut store, args, ctx.today)?;
        match args.format {
            OutputFormat::Json => Output::new(&outcome).print()?,
            OutputFormat::Human => print_set(&outcome),
        }
        return Ok(());
    }

    let store = ctx.open_store()?;
    let report = budget_report(&store, args, ctx.today)?;
    match args.format {
        OutputFormat::Json => {
            let warnings = report.warnings.clone();
            Output::new(&report).with_warnings(warnings).print()?;
        }
        OutputFormat::Human => {
            print_warnings(&report.warnings);
            print_report(&report, args.detailed);
        }
    }
    Ok(())
}

fn period_label(year: i32, month: u32) -> String {
    YearMonth::new(year, month).map_or_else(|| format!("{}-{:02}", year, month), |p| p.to_string())
}

fn print_set(outcome: &BudgetSet) {
    let period = period_label(outcome.year, outcome.month);
    let amount = money(outcome.amount, &outcome.currency);
    if outcome.created {
        println!(
            "Budget of {} {} set for {}",
            amount, outcome.currency, period
        );
    } else {
        println!(
            "Budget for {} in {} updated to {}",
            period, outcome.currency, amount
        );
    }
}

fn print_report(report: &BudgetReport, detailed: bool) {
    if report.budgets.is_empty() {
        println!("No budgets found.");
        if !report.filters.is_empty() {
            println!("Filters applied: {}", report.filters.join(", "));
        }
        println!();
        println!("To create a budget, use:");
        println!(
            "  renewalradar budget --set AMOUNT --currency CURRENCY [--month MONTH] [--year YEAR]"
        );
        return;
    }

    let title = "Budgets";
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));

    if let Some(rates) = &report.rates {
        println!("Exchange Rates (relative to USD):");
        for entry in rates.iter().filter(|e| e.currency != "USD") {
            println!("- {}: 1 {} = {} USD", entry.currency, entry.currency, entry.usd_rate);
        }
        println!();
    }

    let header = format!(
        "{:<26}  {:<8}  {:>12}  {:>12}  {:>12}  {:>8}  {:<8}  {:>5}",
        "Month", "Currency", "Budget", "Utilized", "Remaining", "% Used", "Risk", "Subs"
    );
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));
    for row in &report.budgets {
        let u = &row.utilization;
        let mut label = period_label(u.year, u.month);
        if row.is_current {
            label.push_str(" (Current)");
        }
        println!(
            "{:<26}  {:<8}  {:>12.2}  {:>12.2}  {:>12.2}  {:>7.1}%  {:<8}  {:>5}",
            label,
            u.currency,
            u.cap,
            u.utilized,
            u.remaining,
            u.percent,
            u.risk,
            u.count()
        );
    }

    let total = &report.total_usd;
    println!();
    println!(
        "TOTAL (USD): Budget = {:.2}, Utilized = {:.2}, Remaining = {:.2}, % Used = {:.2}%, Risk = {}",
        total.cap, total.utilized, total.remaining, total.percent, total.risk
    );

    println!();
    println!("Note:");
    println!(
        "- 'Utilized' counts non-cancelled subscriptions billed in the month, at their per-charge cost"
    );
    println!("- Only subscriptions in a budget's currency count toward it");
    println!("- Totals are converted to USD using fixed exchange rates");
    println!("- Risk: 'over' above the cap, 'at risk' above 90% used, 'ok' otherwise");
    println!("- Current month: {}", report.current);
    if !report.filters.is_empty() {
        println!("- Filters applied: {}", report.filters.join(", "));
    }

    if detailed {
        for row in &report.budgets {
            let u = &row.utilization;
            println!();
            println!("{} ({}):", period_label(u.year, u.month), u.currency);
            println!("  Budget amount: {}", money(u.cap, &u.currency));
            println!(
                "  Utilized: {} ({} subscription(s))",
                money(u.utilized, &u.currency),
                u.count()
            );
            println!("  Remaining: {}", money(u.remaining, &u.currency));
            println!("  Status: {} - {:.1}% used", u.risk, u.percent);
            println!("  Subscriptions:");
            if u.subscriptions.is_empty() {
                println!("    No active subscriptions found for this period.");
            }
            for (i, sub) in u.subscriptions.iter().enumerate() {
                println!(
                    "    {}. {} (#{}): {}",
                    i + 1,
                    sub.name,
                    sub.id.unwrap_or_default(),
                    money(sub.cost, &u.currency)
                );
            }
        }
    }
}
