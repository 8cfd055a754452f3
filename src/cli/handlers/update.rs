//! Update-status command handler.

use anyhow::{Context as _, Result};
use chrono::Utc;

use super::{Context, resolve_reference, resolve_target};
use crate::cli::UpdateStatusArgs;
use crate::cli::error::{CommandError, classify_store_error};
use crate::domain::{
    PaymentMethod, Status, Subscription, SubscriptionChanges, Tag, parse_iso_date,
};
use crate::store::SubscriptionRepository;

/// Result of an update: the stored value before and after, and what differed.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub before: Subscription,
    pub after: Subscription,
    pub changes: Vec<String>,
}

impl UpdateOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Applies the requested field changes to one subscription.
///
/// When every requested value is already in place nothing is written and
/// the outcome carries no changes.
pub fn update_subscription<R: SubscriptionRepository>(
    store: &mut R,
    args: &UpdateStatusArgs,
) -> Result<UpdateOutcome> {
    let before = resolve_target(store, &args.target)?;
    let changes = requested_changes(store, &before, args)?;
    if changes.is_empty() {
        return Err(CommandError::validation(
            "nothing to update. Use --to, --payment-method, --clear-payment-method, --add-tag, \
             --remove-tag, --clear-tags, --parent, --no-parent or --renewal-date.",
        )
        .into());
    }

    // Applying at the old timestamp lets an unchanged result compare equal.
    let candidate = before
        .apply(&changes, before.updated_at())
        .map_err(CommandError::from)?;
    let diff = describe_diff(&before, &candidate);
    if diff.is_empty() {
        return Ok(UpdateOutcome {
            after: before.clone(),
            before,
            changes: diff,
        });
    }

    let after = before
        .apply(&changes, Utc::now())
        .map_err(CommandError::from)?;
    store
        .update_subscription(&after)
        .map_err(classify_store_error)
        .with_context(|| format!("failed to update '{}'", before.name()))?;

    Ok(UpdateOutcome {
        before,
        after,
        changes: diff,
    })
}

fn requested_changes<R: SubscriptionRepository>(
    store: &R,
    current: &Subscription,
    args: &UpdateStatusArgs,
) -> Result<SubscriptionChanges> {
    let mut changes = SubscriptionChanges::default();

    if let Some(status) = &args.to {
        let status = status
            .parse::<Status>()
            .map_err(|e| CommandError::validation(e.to_string()))?;
        changes.status = Some(status);
    }

    if args.clear_payment_method {
        changes.payment_method = Some(None);
    } else if let Some(method) = &args.payment_method {
        let method = PaymentMethod::new(method)
            .map_err(|e| CommandError::validation(e.to_string()))?;
        changes.payment_method = Some(Some(method));
    }

    if args.clear_tags || !args.add_tag.is_empty() || !args.remove_tag.is_empty() {
        let parse = |values: &[String]| {
            values
                .iter()
                .map(|t| Tag::new(t))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CommandError::validation(e.to_string()))
        };
        let to_add = parse(&args.add_tag)?;
        let to_remove = parse(&args.remove_tag)?;

        let mut tags: Vec<Tag> = if args.clear_tags {
            Vec::new()
        } else {
            current.tags().to_vec()
        };
        tags.retain(|t| !to_remove.contains(t));
        for tag in to_add {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        changes.tags = Some(tags);
    }

    if args.no_parent {
        changes.parent_subscription_id = Some(None);
    } else if let Some(reference) = &args.parent {
        let parent = resolve_reference(store, reference)?.into_unique(reference)?;
        ensure_no_cycle(store, current, &parent)?;
        changes.parent_subscription_id = Some(parent.id());
    }

    if let Some(date) = &args.renewal_date {
        let date = parse_iso_date(date, "renewal date")
            .map_err(|e| CommandError::validation(e.to_string()))?;
        changes.renewal_date = Some(date);
    }

    Ok(changes)
}

/// Rejects a parent that is the subscription itself or one of its descendants.
fn ensure_no_cycle<R: SubscriptionRepository>(
    store: &R,
    subscription: &Subscription,
    new_parent: &Subscription,
) -> Result<()> {
    let mut cursor = Some(new_parent.clone());
    let mut visited = Vec::new();
    while let Some(node) = cursor {
        if node.id() == subscription.id() {
            return Err(CommandError::validation(format!(
                "cannot make '{}' a parent of '{}': that would create a cycle",
                new_parent.name(),
                subscription.name()
            ))
            .into());
        }
        if visited.contains(&node.id()) {
            break;
        }
        visited.push(node.id());
        cursor = match node.parent_subscription_id() {
            Some(parent_id) => store
                .get_subscription(parent_id)
                .context("failed to walk parent chain")?,
            None => None,
        };
    }
    Ok(())
}

fn describe_diff(before: &Subscription, after: &Subscription) -> Vec<String> {
    let mut diff = Vec::new();
    if before.status() != after.status() {
        diff.push(format!("status: {} -> {}", before.status(), after.status()));
    }
    if before.payment_method() != after.payment_method() {
        diff.push(format!(
            "payment method: {} -> {}",
            before.payment_method().map_or("none", PaymentMethod::as_str),
            after.payment_method().map_or("none", PaymentMethod::as_str)
        ));
    }
    if before.tags() != after.tags() {
        diff.push(format!(
            "tags: [{}] -> [{}]",
            Tag::join(before.tags()).replace(',', ", "),
            Tag::join(after.tags()).replace(',', ", ")
        ));
    }
    if before.parent_subscription_id() != after.parent_subscription_id() {
        let show = |p: Option<i64>| p.map_or("none".to_string(), |id| format!("#{}", id));
        diff.push(format!(
            "parent: {} -> {}",
            show(before.parent_subscription_id()),
            show(after.parent_subscription_id())
        ));
    }
    if before.renewal_date() != after.renewal_date() {
        diff.push(format!(
            "renewal date: {} -> {}",
            before.renewal_date(),
            after.renewal_date()
        ));
    }
    diff
}

pub fn handle_update_status(args: &UpdateStatusArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let outcome = update_subscription(&mut store, args)?;
    let name = outcome.after.name();

    if outcome.is_unchanged() {
        match &args.to {
            Some(_) if args_only_status(args) => println!(
                "Notice: status for '{}' is already set to '{}'",
                name,
                outcome.after.status()
            ),
            _ => println!("Notice: '{}' already has the requested values; nothing changed.", name),
        }
        return Ok(());
    }

    println!("Updated '{}':", name);
    for change in &outcome.changes {
        println!("  {}", change);
    }
    Ok(())
}

fn args_only_status(args: &UpdateStatusArgs) -> bool {
    args.payment_method.is_none()
        && !args.clear_payment_method
        && args.add_tag.is_empty()
        && args.remove_tag.is_empty()
        && !args.clear_tags
        && args.parent.is_none()
        && !args.no_parent
        && args.renewal_date.is_none()
}
