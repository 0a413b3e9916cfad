use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker rendered for any field the source page did not provide.
pub const UNAVAILABLE: &str = "unavailable";

/// A user query, kept both as typed and in the form used for fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    raw: String,
    normalized: String,
}

impl SearchQuery {
    /// Lower-cases and trims the text. Empty input is legal and simply
    /// produces a search with no matches.
    pub fn normalize(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            normalized: raw.trim().to_lowercase(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// One entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub title: String,
    pub detail_link: String,
    pub image_url: Option<String>,
    pub size_info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "uri")]
pub enum MagnetLink {
    Available(String),
    Unavailable,
}

impl MagnetLink {
    pub fn as_str(&self) -> &str {
        match self {
            MagnetLink::Available(uri) => uri,
            MagnetLink::Unavailable => UNAVAILABLE,
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            MagnetLink::Available(uri) => Some(uri),
            MagnetLink::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MagnetLink::Available(_))
    }
}

impl fmt::Display for MagnetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything extracted from an item's detail page, magnet included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub info_hash: Option<String>,
    pub trackers: Vec<String>,
    pub magnet: MagnetLink,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_trims() {
        let query = SearchQuery::normalize("  Dune Messiah \n");
        assert_eq!(query.raw(), "  Dune Messiah \n");
        assert_eq!(query.normalized(), "dune messiah");
    }

    #[test]
    fn test_normalize_empty_is_legal() {
        let query = SearchQuery::normalize("   ");
        assert_eq!(query.normalized(), "");
    }

    #[test]
    fn test_unavailable_magnet_renders_sentinel() {
        assert_eq!(MagnetLink::Unavailable.to_string(), UNAVAILABLE);
        assert!(MagnetLink::Unavailable.uri().is_none());
        assert!(!MagnetLink::Unavailable.is_available());
    }
}
