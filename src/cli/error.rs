//! User-facing command errors and their terminal rendering.

use crate::domain::{Subscription, SubscriptionError};
use crate::store::StoreError;
use thiserror::Error;

/// Errors a command reports to the user as a single line.
///
/// Anything else reaching `main` is treated as an unexpected failure.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Bad input; nothing was written.
    #[error("{0}")]
    Validation(String),

    /// The named or numbered subscription does not exist.
    #[error("subscription {0} not found. Use `renewalradar view` to list subscriptions.")]
    NotFound(String),

    /// A name matched more than one subscription.
    #[error(
        "'{name}' matches {} subscriptions (ids: {}). Use --id to choose one.",
        ids.len(),
        join_ids(ids)
    )]
    Ambiguous { name: String, ids: Vec<i64> },

    /// Deletion blocked by dependent subscriptions.
    #[error(
        "cannot delete '{name}': it is the parent of {}. Reassign or delete them first.",
        describe_children(children)
    )]
    HasChildren {
        name: String,
        children: Vec<(i64, String)>,
    },
}

impl CommandError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CommandError::Validation(msg.into())
    }

    pub fn not_found_id(id: i64) -> Self {
        CommandError::NotFound(format!("with id {}", id))
    }

    pub fn not_found_name(name: &str) -> Self {
        CommandError::NotFound(format!("'{}'", name))
    }

    pub fn ambiguous(name: &str, matches: &[Subscription]) -> Self {
        CommandError::Ambiguous {
            name: name.to_string(),
            ids: matches.iter().filter_map(Subscription::id).collect(),
        }
    }
}

impl From<SubscriptionError> for CommandError {
    fn from(err: SubscriptionError) -> Self {
        CommandError::Validation(err.to_string())
    }
}

/// Lifts expected store failures into command errors.
///
/// Database and I/O failures stay unexpected.
pub fn classify_store_error(err: StoreError) -> anyhow::Error {
    match err {
        StoreError::NotFound { id } => CommandError::not_found_id(id).into(),
        StoreError::HasChildren { name, children } => {
            CommandError::HasChildren { name, children }.into()
        }
        other => anyhow::Error::new(other),
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_children(children: &[(i64, String)]) -> String {
    children
        .iter()
        .map(|(id, name)| format!("#{} {}", id, name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The single stderr line printed for a failed command.
pub fn error_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CommandError>() {
        Some(command_error) => format!("Error: {}", command_error),
        None => format!("Error: unexpected failure: {:#}", err),
    }
}
