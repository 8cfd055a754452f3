//! View command handler.

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::{Context, build_filter, expiring_days, parse_currency, truncate_str};
use crate::cli::ViewArgs;
use crate::cli::output::{Output, OutputFormat, money, print_warnings};
use crate::domain::{Currency, Status, Subscription, Tag};
use crate::report::{CurrencyTotals, RateTable, SubscriptionView, totals_by_currency};
use crate::store::SubscriptionRepository;

/// Window used for the "upcoming renewals" footer.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Subscriptions selected by `view`, plus the options used to present them.
#[derive(Debug)]
pub struct ViewReport {
    pub subscriptions: Vec<Subscription>,
    pub expiring_days: i64,
    pub convert_to: Option<Currency>,
    pub filters: Vec<String>,
}

/// A renewal falling inside the upcoming window.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingRenewal {
    pub id: Option<i64>,
    pub name: String,
    pub renewal_date: NaiveDate,
    pub days_until_renewal: i64,
}

#[derive(Serialize)]
struct ViewJson<'a> {
    subscriptions: &'a [SubscriptionView<'a>],
    totals: Vec<CurrencyTotals>,
    upcoming_renewals: Vec<UpcomingRenewal>,
}

/// Loads the subscriptions matching the view flags.
pub fn view_report<R: SubscriptionRepository>(
    store: &R,
    args: &ViewArgs,
    ctx: &Context,
) -> Result<ViewReport> {
    let filter = build_filter(
        &args.statuses,
        args.currency.as_deref(),
        args.tag.as_deref(),
        &args.payment_methods,
    )?
    .sort(args.sort, args.desc)
    .limit(args.limit);

    let convert_to = parse_currency(args.convert_to.as_deref())?;
    let expiring_days = expiring_days(args.expiring_days, ctx)?;

    let subscriptions = store
        .list_subscriptions(&filter)
        .context("failed to list subscriptions")?;

    Ok(ViewReport {
        subscriptions,
        expiring_days,
        convert_to,
        filters: filter.describe(),
    })
}

/// Builds display views, converting into `target` when given.
///
/// Conversion failures keep the original currency and add a warning.
pub(crate) fn enrich<'a>(
    subscriptions: &'a [Subscription],
    today: NaiveDate,
    expiring_days: i64,
    target: Option<&Currency>,
    rates: &RateTable,
    warnings: &mut Vec<String>,
) -> Vec<SubscriptionView<'a>> {
    subscriptions
        .iter()
        .map(|sub| {
            let view = SubscriptionView::new(sub, today, expiring_days);
            match target {
                Some(target) => match view.clone().convert(rates, target) {
                    Ok(converted) => converted,
                    Err(err) => {
                        tracing::debug!(%err, name = sub.name(), "conversion fallback");
                        warnings.push(format!(
                            "{}; '{}' shown in {}",
                            err,
                            sub.name(),
                            sub.currency()
                        ));
                        view
                    }
                },
                None => view,
            }
        })
        .collect()
}

/// Renewals within the upcoming window, soonest first. Cancelled ones are skipped.
pub(crate) fn upcoming_renewals(
    views: &[SubscriptionView<'_>],
    window: i64,
) -> Vec<UpcomingRenewal> {
    let mut upcoming: Vec<UpcomingRenewal> = views
        .iter()
        .filter(|v| v.subscription.status() != Status::Cancelled && v.renews_within(window))
        .map(|v| UpcomingRenewal {
            id: v.subscription.id(),
            name: v.subscription.name().to_string(),
            renewal_date: v.subscription.renewal_date(),
            days_until_renewal: v.days_until_renewal,
        })
        .collect();
    upcoming.sort_by(|a, b| {
        a.days_until_renewal
            .cmp(&b.days_until_renewal)
            .then_with(|| a.name.cmp(&b.name))
    });
    upcoming
}

pub fn handle_view(args: &ViewArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let report = view_report(&store, args, ctx)?;

    let rates = RateTable::standard();
    let mut warnings = Vec::new();
    let views = enrich(
        &report.subscriptions,
        ctx.today,
        report.expiring_days,
        report.convert_to.as_ref(),
        &rates,
        &mut warnings,
    );
    let totals = totals_by_currency(&views);
    let upcoming = upcoming_renewals(&views, UPCOMING_WINDOW_DAYS);

    match args.format {
        OutputFormat::Json => {
            let data = ViewJson {
                subscriptions: &views,
                totals,
                upcoming_renewals: upcoming,
            };
            Output::new(data).with_warnings(warnings).print()?;
        }
        OutputFormat::Human => {
            print_warnings(&warnings);
            if views.is_empty() {
                println!("No subscriptions found.");
                print_filters(&report.filters);
                return Ok(());
            }
            if args.tree {
                print_tree(&views);
            } else {
                print_table(&views, report.convert_to.as_ref());
            }
            print_footer(&views, &totals, &upcoming);
            print_filters(&report.filters);
        }
    }
    Ok(())
}

fn print_filters(filters: &[String]) {
    if !filters.is_empty() {
        println!();
        println!("Filters applied: {}", filters.join(", "));
    }
}

fn status_label(view: &SubscriptionView<'_>) -> String {
    if view.is_overdue {
        format!("{} (overdue)", view.display_status)
    } else {
        view.display_status.to_string()
    }
}

fn print_table(views: &[SubscriptionView<'_>], convert_to: Option<&Currency>) {
    let mut header = format!(
        "{:>4}  {:<24}  {:>14}  {:<9}  {:<18}  {:<10}  {:>6}  {:<12}  {:<16}",
        "ID", "Name", "Cost", "Cycle", "Status", "Renewal", "Days", "Payment", "Tags"
    );
    if let Some(target) = convert_to {
        header.push_str(&format!("  {:>14}", format!("Monthly {}", target)));
    }
    println!("{}", header);
    println!("{}", "-".repeat(header.chars().count()));

    for view in views {
        let sub = view.subscription;
        print!(
            "{:>4}  {:<24}  {:>14}  {:<9}  {:<18}  {:<10}  {:>6}  {:<12}  {:<16}",
            sub.id().unwrap_or_default(),
            truncate_str(sub.name(), 24),
            format!("{:.2} {}", sub.cost(), sub.currency()),
            sub.billing_cycle(),
            status_label(view),
            sub.renewal_date(),
            view.days_until_renewal,
            sub.payment_method().map_or("-", |m| m.as_str()),
            truncate_str(&Tag::join(sub.tags()), 16),
        );
        match &view.converted {
            Some(c) => println!("  {:>14}", money(c.monthly_cost, &c.currency)),
            None if convert_to.is_some() => println!("  {:>14}", "-"),
            None => println!(),
        }
    }
}

/// Renders parents before their children, indented with box-drawing guides.
fn print_tree(views: &[SubscriptionView<'_>]) {
    let ids: HashSet<i64> = views.iter().filter_map(|v| v.subscription.id()).collect();
    let mut children: BTreeMap<i64, Vec<&SubscriptionView<'_>>> = BTreeMap::new();
    let mut roots = Vec::new();
    for view in views {
        match view.subscription.parent_subscription_id() {
            Some(parent) if ids.contains(&parent) => children.entry(parent).or_default().push(view),
            _ => roots.push(view),
        }
    }

    fn render(
        view: &SubscriptionView<'_>,
        prefix: &str,
        connector: &str,
        children: &BTreeMap<i64, Vec<&SubscriptionView<'_>>>,
        seen: &mut HashSet<i64>,
    ) {
        let sub = view.subscription;
        println!(
            "{}{}{} (#{}) - {} {} [{}]",
            prefix,
            connector,
            sub.name(),
            sub.id().unwrap_or_default(),
            money(sub.cost(), sub.currency()),
            sub.billing_cycle(),
            status_label(view)
        );
        let Some(id) = sub.id() else { return };
        if !seen.insert(id) {
            return;
        }
        let Some(kids) = children.get(&id) else { return };
        let child_prefix = match connector {
            "├── " => format!("{}│   ", prefix),
            "└── " => format!("{}    ", prefix),
            _ => prefix.to_string(),
        };
        for (i, child) in kids.iter().enumerate() {
            let last = i + 1 == kids.len();
            render(
                child,
                &child_prefix,
                if last { "└── " } else { "├── " },
                children,
                seen,
            );
        }
    }

    let mut seen = HashSet::new();
    for root in roots {
        render(root, "", "", &children, &mut seen);
    }
}

fn print_footer(
    views: &[SubscriptionView<'_>],
    totals: &[CurrencyTotals],
    upcoming: &[UpcomingRenewal],
) {
    println!();
    println!("{} subscription(s)", views.len());
    println!("Totals:");
    for total in totals {
        println!(
            "  {}: {} monthly, {} annually ({} subscription(s))",
            total.currency,
            money(total.monthly, &total.currency),
            money(total.annual, &total.currency),
            total.count
        );
    }

    if upcoming.is_empty() {
        println!("No renewals in the next {} days.", UPCOMING_WINDOW_DAYS);
    } else {
        println!("Upcoming renewals (next {} days):", UPCOMING_WINDOW_DAYS);
        for renewal in upcoming {
            println!(
                "  {} on {} ({} day(s))",
                renewal.name, renewal.renewal_date, renewal.days_until_renewal
            );
        }
    }
}
