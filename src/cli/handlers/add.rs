//! Add command handler.

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use serde::Serialize;

use super::{Context, resolve_reference};
use crate::cli::AddArgs;
use crate::cli::error::CommandError;
use crate::cli::output::{Output, OutputFormat, money, print_warnings, relative_days};
use crate::domain::{Subscription, SubscriptionInput, Tag, days_until};
use crate::store::SubscriptionRepository;

/// What `add` stored.
#[derive(Debug, Serialize)]
pub struct AddOutcome {
    pub subscription: Subscription,
    pub days_until_renewal: i64,
    pub annual_cost: f64,
    #[serde(skip)]
    pub parent_name: Option<String>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Validates the arguments and stores a new subscription.
pub fn add_subscription<R: SubscriptionRepository>(
    store: &mut R,
    args: &AddArgs,
    today: NaiveDate,
) -> Result<AddOutcome> {
    let input = SubscriptionInput {
        name: args.name.clone(),
        cost: args.cost.clone(),
        billing_cycle: args.billing_cycle.clone(),
        currency: args.currency.clone(),
        start_date: args.start_date.clone(),
        renewal_date: args.renewal_date.clone(),
        trial_end_date: args.trial_end_date.clone(),
        payment_method: args.payment_method.clone(),
        tags: args.tags.clone(),
        notes: args.notes.clone(),
        status: args.status.clone(),
    };
    let builder = input.into_builder().map_err(CommandError::from)?;

    let parent = match args.parent.as_deref() {
        Some(reference) => Some(resolve_reference(store, reference)?.into_unique(reference)?),
        None => None,
    };

    let subscription = builder
        .parent_subscription_id(parent.as_ref().and_then(Subscription::id))
        .build()
        .map_err(CommandError::from)?;
    let warnings = subscription.date_warnings();

    let id = store
        .insert_subscription(&subscription)
        .with_context(|| format!("failed to save subscription '{}'", subscription.name()))?;
    let subscription = store
        .get_subscription(id)
        .with_context(|| format!("failed to reload subscription {}", id))?
        .ok_or_else(|| CommandError::not_found_id(id))?;

    Ok(AddOutcome {
        days_until_renewal: days_until(subscription.renewal_date(), today),
        annual_cost: subscription.annual_cost(),
        parent_name: parent.map(|p| p.name().to_string()),
        warnings,
        subscription,
    })
}

pub fn handle_add(args: &AddArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let outcome = add_subscription(&mut store, args, ctx.today)?;

    match args.format {
        OutputFormat::Human => {
            print_warnings(&outcome.warnings);
            print_added(&outcome, ctx.today);
        }
        OutputFormat::Json => {
            let warnings = outcome.warnings.clone();
            Output::new(&outcome).with_warnings(warnings).print()?;
        }
    }
    Ok(())
}

fn print_added(outcome: &AddOutcome, today: NaiveDate) {
    let sub = &outcome.subscription;
    let currency = sub.currency();

    println!(
        "Subscription '{}' added successfully (ID: {}).",
        sub.name(),
        sub.id().unwrap_or_default()
    );
    println!("Details:");
    println!(
        "  Cost: {} {} ({})",
        money(sub.cost(), currency),
        currency,
        sub.billing_cycle()
    );
    println!("  Status: {}", sub.status());
    println!("  Start Date: {}", sub.start_date());
    println!(
        "  Renewal Date: {} ({})",
        sub.renewal_date(),
        relative_days(outcome.days_until_renewal)
    );
    println!("  Days until renewal: {}", outcome.days_until_renewal);

    if let Some(trial_end) = sub.trial_end_date() {
        let remaining = days_until(trial_end, today);
        let state = if remaining >= 0 {
            format!("trial active, ends {}", relative_days(remaining))
        } else {
            "trial ended".to_string()
        };
        println!("  Trial End Date: {} ({})", trial_end, state);
    }

    println!("  Annual cost: {} {}", money(outcome.annual_cost, currency), currency);

    if let Some(method) = sub.payment_method() {
        println!("  Payment Method: {}", method);
    }
    if !sub.tags().is_empty() {
        println!("  Tags: {}", Tag::join(sub.tags()).replace(',', ", "));
    }
    if let Some(parent) = &outcome.parent_name {
        println!(
            "  Parent: {} (ID: {})",
            parent,
            sub.parent_subscription_id().unwrap_or_default()
        );
    }
    if let Some(notes) = sub.notes() {
        println!("  Notes: {}", notes);
    }
}
