//! Delete command handler.

use anyhow::{Context as _, Result};
use chrono::NaiveDate;

use super::{Context, resolve_target};
use crate::cli::DeleteArgs;
use crate::cli::error::{CommandError, classify_store_error};
use crate::cli::output::{money, print_warnings};
use crate::domain::{Subscription, Tag, YearMonth};
use crate::report::counts_toward;
use crate::store::SubscriptionRepository;

/// What `delete` did, or would do in a dry run.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub subscription: Subscription,
    pub deleted: bool,
    pub warnings: Vec<String>,
}

/// Deletes the targeted subscription unless children depend on it.
///
/// The child guard applies even with `--force`. A dry run reports the same
/// checks without writing.
pub fn delete_subscription<R: SubscriptionRepository>(
    store: &mut R,
    args: &DeleteArgs,
    today: NaiveDate,
) -> Result<DeleteOutcome> {
    let subscription = resolve_target(store, &args.target)?;
    let id = subscription
        .id()
        .ok_or_else(|| CommandError::not_found_name(subscription.name()))?;

    let children = store
        .children_of(id)
        .with_context(|| format!("failed to check dependents of '{}'", subscription.name()))?;
    if !children.is_empty() {
        return Err(CommandError::HasChildren {
            name: subscription.name().to_string(),
            children: children
                .iter()
                .map(|c| (c.id().unwrap_or_default(), c.name().to_string()))
                .collect(),
        }
        .into());
    }

    let warnings = budget_warning(store, &subscription, today)?
        .into_iter()
        .collect();

    if args.dry_run {
        return Ok(DeleteOutcome {
            subscription,
            deleted: false,
            warnings,
        });
    }

    if !(args.confirm || args.force) {
        return Err(CommandError::validation(
            "deletion not confirmed. Use --confirm to permanently delete the subscription.",
        )
        .into());
    }

    store.delete_subscription(id).map_err(classify_store_error)?;

    Ok(DeleteOutcome {
        subscription,
        deleted: true,
        warnings,
    })
}

/// Warns when the subscription counts toward this month's budget.
fn budget_warning<R: SubscriptionRepository>(
    store: &R,
    subscription: &Subscription,
    today: NaiveDate,
) -> Result<Option<String>> {
    let period = YearMonth::of(today);
    if !counts_toward(subscription, period) {
        return Ok(None);
    }

    let budgets = store
        .get_budgets(
            Some(period.year()),
            Some(period.month()),
            Some(subscription.currency()),
        )
        .context("failed to load budgets")?;

    Ok(budgets.first().map(|budget| {
        format!(
            "'{}' contributed {} to the {} budget for {}; utilization will change.",
            subscription.name(),
            money(subscription.cost(), subscription.currency()),
            budget.currency(),
            period
        )
    }))
}

pub fn handle_delete(args: &DeleteArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let outcome = delete_subscription(&mut store, args, ctx.today)?;
    let sub = &outcome.subscription;

    if outcome.deleted {
        println!("Subscription deleted:");
    } else {
        println!("Dry run: the following subscription would be deleted:");
    }
    println!("  ID: {}", sub.id().unwrap_or_default());
    println!("  Name: {}", sub.name());
    println!(
        "  Cost: {} {} ({})",
        money(sub.cost(), sub.currency()),
        sub.currency(),
        sub.billing_cycle()
    );
    println!("  Status: {}", sub.status());
    println!("  Start Date: {}", sub.start_date());
    println!("  Renewal Date: {}", sub.renewal_date());
    if let Some(method) = sub.payment_method() {
        println!("  Payment Method: {}", method);
    }
    if !sub.tags().is_empty() {
        println!("  Tags: {}", Tag::join(sub.tags()).replace(',', ", "));
    }
    if !outcome.deleted {
        println!("No changes made. Re-run with --confirm to delete.");
    }
    print_warnings(&outcome.warnings);
    Ok(())
}
