//! List-usage command handler.

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{Context, build_filter};
use crate::cli::ListUsageArgs;
use crate::cli::output::{Output, OutputFormat};
use crate::domain::Tag;
use crate::store::{SubscriptionRepository, UsageCount};

/// Tag and payment method frequencies. Sections not requested are `None`.
#[derive(Debug, Default, Serialize)]
pub struct UsageReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<UsageCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Vec<UsageCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unused_tags: Option<Vec<String>>,
    #[serde(skip)]
    pub filters: Vec<String>,
}

/// Counts tag and payment method usage among matching subscriptions.
///
/// Both lists are produced when neither `--list-tags` nor
/// `--list-payment-methods` is given.
pub fn usage_report<R: SubscriptionRepository>(
    store: &R,
    args: &ListUsageArgs,
) -> Result<UsageReport> {
    let filter = build_filter(
        &args.statuses,
        args.currency.as_deref(),
        args.tag.as_deref(),
        &args.payment_methods,
    )?;
    let both = !args.list_tags && !args.list_payment_methods;

    let tags = if both || args.list_tags || args.unused_tags {
        Some(store.tag_usage(&filter).context("failed to count tag usage")?)
    } else {
        None
    };

    let unused_tags = match (&tags, args.unused_tags) {
        (Some(used), true) => Some(
            Tag::all()
                .into_iter()
                .filter(|t| !used.iter().any(|u| u.name == t.as_str()))
                .map(|t| t.as_str().to_string())
                .collect(),
        ),
        _ => None,
    };

    let payment_methods = if both || args.list_payment_methods {
        Some(
            store
                .payment_method_usage(&filter)
                .context("failed to count payment method usage")?,
        )
    } else {
        None
    };

    Ok(UsageReport {
        tags: tags.filter(|_| both || args.list_tags),
        payment_methods,
        unused_tags,
        filters: filter.describe(),
    })
}

pub fn handle_list_usage(args: &ListUsageArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let report = usage_report(&store, args)?;

    match args.format {
        OutputFormat::Json => Output::new(&report).print()?,
        OutputFormat::Human => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &UsageReport) {
    let mut sections = Vec::new();
    if let Some(tags) = &report.tags {
        sections.push(usage_section("Tags in use:", "No tags in use.", tags));
    }
    if let Some(unused) = &report.unused_tags {
        let mut lines = vec!["Unused Tags:".to_string()];
        if unused.is_empty() {
            lines.push("All tags are currently in use.".to_string());
        }
        lines.extend(unused.iter().map(|t| format!("- {}", t)));
        sections.push(lines);
    }
    if let Some(methods) = &report.payment_methods {
        sections.push(usage_section(
            "Payment Methods:",
            "No payment methods in use.",
            methods,
        ));
    }

    let rendered: Vec<String> = sections.into_iter().map(|lines| lines.join("\n")).collect();
    println!("{}", rendered.join("\n\n"));

    if !report.filters.is_empty() {
        println!();
        println!("Filters applied: {}", report.filters.join(", "));
    }
}

fn usage_section(title: &str, empty: &str, counts: &[UsageCount]) -> Vec<String> {
    if counts.is_empty() {
        return vec![empty.to_string()];
    }
    let width = counts.iter().map(|c| c.name.chars().count()).max().unwrap_or(0);
    let mut lines = vec![title.to_string()];
    lines.extend(
        counts
            .iter()
            .map(|c| format!("{:<width$} - {}", c.name, c.count, width = width)),
    );
    lines
}
