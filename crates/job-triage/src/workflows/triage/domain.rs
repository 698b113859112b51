use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One job listing as returned by the upstream search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub company: DisplayName,
    #[serde(default)]
    pub location: DisplayName,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
}

/// Nested `{ "display_name": ... }` object used by the search API for
/// companies and locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName {
    #[serde(default)]
    pub display_name: String,
}

impl From<&str> for DisplayName {
    fn from(value: &str) -> Self {
        Self {
            display_name: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    New,
    Saved,
    Applied,
    Archived,
}

impl Category {
    pub const fn ordered() -> [Self; 4] {
        [Self::New, Self::Saved, Self::Applied, Self::Archived]
    }

    /// Categories backed by a persisted identifier set.
    pub const fn classified() -> [Self; 3] {
        [Self::Saved, Self::Applied, Self::Archived]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Saved => "saved",
            Self::Applied => "applied",
            Self::Archived => "archived",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Saved => "Saved",
            Self::Applied => "Applied",
            Self::Archived => "Archived",
        }
    }

    /// Label of the control that moves a posting into this category.
    pub const fn add_label(self) -> Option<&'static str> {
        match self {
            Self::New => None,
            Self::Saved => Some("Save"),
            Self::Applied => Some("Applied"),
            Self::Archived => Some("Archive"),
        }
    }

    /// Label of the same control once the posting already sits in this category.
    pub const fn remove_label(self) -> Option<&'static str> {
        match self {
            Self::New => None,
            Self::Saved => Some("Unsave"),
            Self::Applied => Some("Unapplied"),
            Self::Archived => Some("Unarchive"),
        }
    }

    /// Parses a category name, falling back to [`Category::New`] for anything
    /// unrecognized.
    pub fn parse_or_new(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|err: UnknownCategory| {
            tracing::warn!(%err, "falling back to the new category");
            Self::New
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|category| category.key() == normalized)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);
