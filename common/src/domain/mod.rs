use std::fmt::Debug;
use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod entities;
pub mod slug;

pub use entities::*;
pub use slug::slugify;

// A regex for slugs: lowercase ASCII letters, digits, underscore and hyphen.
// Example: "weekly-sync-20140101" is valid; "Weekly Sync" or "a/b" are not.
pub const SLUG_SYMBOLS_REGEX: &str = r"^[a-z0-9_-]+$";

static SLUG_SYMBOLS_REGEX_COMPILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SLUG_SYMBOLS_REGEX).expect("SLUG_SYMBOLS_REGEX must be a valid regex")
});

pub fn is_eligible_slug(slug: &str) -> bool {
    SLUG_SYMBOLS_REGEX_COMPILED.is_match(slug)
}

/// URL-safe identifier of events and channels, always stored lowercase.
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 215, predicate = is_eligible_slug),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct Slug(String);

impl Slug {
    /// Appends `-suffix` to the slug.
    pub fn with_suffix(&self, suffix: impl std::fmt::Display) -> Result<Slug, SlugError> {
        Slug::try_new(format!("{}-{}", self.as_ref(), suffix))
    }
}

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub i64);

macro_rules! row_id_from_i64 {
    ($($id:ty),*) => {
        $(
            impl From<i64> for $id {
                fn from(value: i64) -> Self {
                    Self(value)
                }
            }
        )*
    };
}

row_id_from_i64!(UserId, ChannelId, LocationId, EventId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_is_lowercased_and_trimmed() {
        let slug = Slug::try_new("  Weekly-Sync ").unwrap();
        assert_eq!(slug.as_ref(), "weekly-sync");
    }

    #[test]
    fn test_slug_rejects_spaces_and_empty() {
        assert!(Slug::try_new("weekly sync").is_err());
        assert!(Slug::try_new("   ").is_err());
        assert!(Slug::try_new("a/b").is_err());
    }

    #[test]
    fn test_slug_with_suffix() {
        let slug = Slug::try_new("weekly-sync").unwrap();
        assert_eq!(
            slug.with_suffix("20140101").unwrap().as_ref(),
            "weekly-sync-20140101"
        );
    }
}
