//! Case-insensitive tag type for grouping subscriptions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tags that may be attached to a subscription.
pub const ALLOWED_TAGS: &[&str] = &["personal", "work", "shared", "family", "business"];

/// A tag from the fixed allow-list.
///
/// Tags are normalized to lowercase, making `Work`, `work`, and `WORK` equivalent.
///
/// # Examples
///
/// ```
/// use renewalradar::domain::Tag;
///
/// let tag = Tag::new("Family").unwrap();
/// assert_eq!(tag.as_str(), "family");
///
/// assert!(Tag::new("gaming").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String); // Always stored lowercase

/// Error returned when parsing an invalid tag.
#[derive(Debug, Clone)]
pub struct ParseTagError(String);

impl fmt::Display for ParseTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseTagError {}

impl Tag {
    /// Creates a new Tag from a string.
    ///
    /// # Errors
    ///
    /// Returns `ParseTagError` if the tag is empty or not in [`ALLOWED_TAGS`].
    pub fn new(s: &str) -> Result<Self, ParseTagError> {
        let normalized = s.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(ParseTagError("tag cannot be empty".to_string()));
        }

        if !ALLOWED_TAGS.contains(&normalized.as_str()) {
            return Err(ParseTagError(format!(
                "'{}' is not a supported tag. Allowed: {}",
                s.trim(),
                ALLOWED_TAGS.join(", ")
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized tag value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns every allowed tag, in allow-list order.
    pub fn all() -> Vec<Tag> {
        ALLOWED_TAGS.iter().map(|t| Tag(t.to_string())).collect()
    }

    /// Joins tags into the comma-separated form used for storage.
    pub fn join(tags: &[Tag]) -> String {
        tags.iter().map(Tag::as_str).collect::<Vec<_>>().join(",")
    }

    /// Splits a stored comma-separated tag list, skipping unknown entries.
    pub fn split_stored(s: &str) -> Vec<Tag> {
        s.split(',')
            .filter(|t| !t.trim().is_empty())
            .filter_map(|t| Tag::new(t).ok())
            .collect()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(\"{}\")", self.0)
    }
}

impl FromStr for Tag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn new_with_allowed_tag() {
        let tag = Tag::new("work").unwrap();
        assert_eq!(tag.to_string(), "work");
    }

    #[test]
    fn new_rejects_empty_string() {
        assert!(Tag::new("").is_err());
        assert!(Tag::new("   ").is_err());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let tag = Tag::new("  Family ").unwrap();
        assert_eq!(tag.as_str(), "family");
    }

    #[test]
    fn rejects_unlisted_tag_and_names_allowed_values() {
        let err = Tag::new("gaming").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'gaming'"));
        assert!(msg.contains("personal, work, shared, family, business"));
    }

    #[test]
    fn hashset_deduplicates_case_variants() {
        let mut set = HashSet::new();
        set.insert(Tag::new("work").unwrap());
        set.insert(Tag::new("Work").unwrap());
        set.insert(Tag::new("WORK").unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn debug_format() {
        let tag = Tag::new("shared").unwrap();
        assert_eq!(format!("{:?}", tag), "Tag(\"shared\")");
    }

    #[test]
    fn join_and_split_stored() {
        let tags = vec![Tag::new("work").unwrap(), Tag::new("shared").unwrap()];
        let stored = Tag::join(&tags);
        assert_eq!(stored, "work,shared");
        assert_eq!(Tag::split_stored(&stored), tags);
    }

    #[test]
    fn split_stored_handles_empty_and_unknown() {
        assert!(Tag::split_stored("").is_empty());
        assert_eq!(
            Tag::split_stored("work,,bogus"),
            vec![Tag::new("work").unwrap()]
        );
    }

    #[test]
    fn serde_rejects_invalid_on_deserialize() {
        let result: Result<Tag, _> = serde_json::from_str("\"gaming\"");
        assert!(result.is_err());
        let tag: Tag = serde_json::from_str("\"WORK\"").unwrap();
        assert_eq!(tag.as_str(), "work");
    }
}
