//! Subscription lookup by name or id.

use anyhow::{Context, Result};

use crate::cli::TargetArgs;
use crate::cli::error::CommandError;
use crate::domain::Subscription;
use crate::store::SubscriptionRepository;

/// Result of looking up a subscription reference.
#[derive(Debug)]
pub enum ResolveResult {
    /// Exactly one subscription matched.
    Unique(Subscription),
    /// Several subscriptions share the name.
    Ambiguous(Vec<Subscription>),
    /// Nothing matched.
    NotFound,
}

impl ResolveResult {
    fn from_matches(mut matches: Vec<Subscription>) -> Self {
        match matches.len() {
            0 => ResolveResult::NotFound,
            1 => matches
                .pop()
                .map_or(ResolveResult::NotFound, ResolveResult::Unique),
            _ => ResolveResult::Ambiguous(matches),
        }
    }

    /// Turns the lookup into the single subscription or a user-facing error.
    pub fn into_unique(self, reference: &str) -> Result<Subscription> {
        match self {
            ResolveResult::Unique(sub) => Ok(sub),
            ResolveResult::Ambiguous(matches) => {
                Err(CommandError::ambiguous(reference, &matches).into())
            }
            ResolveResult::NotFound => Err(CommandError::not_found_name(reference).into()),
        }
    }
}

/// Looks up a subscription given as either an id or a name.
///
/// A purely numeric reference is tried as an id first; when no subscription
/// has that id, it falls back to a name match. Names compare
/// case-insensitively.
pub fn resolve_reference<R: SubscriptionRepository>(
    store: &R,
    reference: &str,
) -> Result<ResolveResult> {
    let reference = reference.trim();

    if let Ok(id) = reference.parse::<i64>()
        && let Some(sub) = store
            .get_subscription(id)
            .with_context(|| format!("failed to look up subscription {}", id))?
    {
        return Ok(ResolveResult::Unique(sub));
    }

    let matches = store
        .find_by_name(reference)
        .with_context(|| format!("failed to search for '{}'", reference))?;
    Ok(ResolveResult::from_matches(matches))
}

/// Resolves the `--name` / `--id` pair to exactly one subscription.
pub fn resolve_target<R: SubscriptionRepository>(
    store: &R,
    target: &TargetArgs,
) -> Result<Subscription> {
    if let Some(id) = target.id {
        return store
            .get_subscription(id)
            .with_context(|| format!("failed to look up subscription {}", id))?
            .ok_or_else(|| CommandError::not_found_id(id).into());
    }

    let name = target.name.as_deref().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(CommandError::validation("either --name or --id is required").into());
    }

    let matches = store
        .find_by_name(name)
        .with_context(|| format!("failed to search for '{}'", name))?;
    ResolveResult::from_matches(matches).into_unique(name)
}
