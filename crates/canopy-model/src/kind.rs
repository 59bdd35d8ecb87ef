//! Type-tag vocabularies.
//!
//! Entity kinds are a closed enum: they select the admin screen, the URL
//! namespace, and the top-level sibling group. Section and item type tags
//! are open strings drawn from a fixed vocabulary; the gateway validates
//! them before any store access so the rendering layer only ever sees tags
//! it knows how to lay out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a top-level entity.
///
/// Doubles as the `{kind}` path segment of the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Product detail pages.
    Products,
    /// Industry and technology solutions.
    Solutions,
    /// Marketplace listings.
    Marketplaces,
    /// Standalone pages (homepage, about-us, pricing).
    Pages,
}

impl EntityKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [
        Self::Products,
        Self::Solutions,
        Self::Marketplaces,
        Self::Pages,
    ];

    /// The URL path segment for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Solutions => "solutions",
            Self::Marketplaces => "marketplaces",
            Self::Pages => "pages",
        }
    }

    /// Parse a URL path segment.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == segment)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a path segment names no known entity kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownEntityKind(s.to_owned()))
    }
}

/// Section type tags the rendering layer knows how to lay out.
pub const SECTION_TYPES: &[&str] = &[
    "hero",
    "features",
    "specifications",
    "pricing",
    "use_cases",
    "benefits",
    "segments",
    "technology",
    "support",
    "success_story",
    "security",
    "resources",
    "migration",
    "implementation",
    "stats",
    "faq",
    "testimonials",
    "cta",
];

/// Item type tags the rendering layer knows how to lay out.
pub const ITEM_TYPES: &[&str] = &[
    "feature_card",
    "pricing_plan",
    "specification",
    "use_case_card",
    "benefit",
    "segment",
    "stat",
    "metric",
    "timeline_phase",
    "migration_step",
    "support_feature",
    "security_feature",
    "resource_category",
    "faq_entry",
    "testimonial",
];

/// Whether `tag` is a known section type.
#[must_use]
pub fn is_section_type(tag: &str) -> bool {
    SECTION_TYPES.contains(&tag)
}

/// Whether `tag` is a known item type.
#[must_use]
pub fn is_item_type(tag: &str) -> bool {
    ITEM_TYPES.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_kind_parse_unknown() {
        assert_eq!(EntityKind::parse("blog"), None);
        assert_eq!(EntityKind::parse("Products"), None);
    }

    #[test]
    fn test_kind_from_str_error() {
        let err = "widgets".parse::<EntityKind>().unwrap_err();

        assert_eq!(err.to_string(), "Unknown entity kind: widgets");
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&EntityKind::Solutions).unwrap();

        assert_eq!(json, "\"solutions\"");
    }

    #[test]
    fn test_section_vocabulary() {
        assert!(is_section_type("hero"));
        assert!(is_section_type("pricing"));
        assert!(!is_section_type("sidebar"));
        assert!(!is_section_type(""));
    }

    #[test]
    fn test_item_vocabulary() {
        assert!(is_item_type("feature_card"));
        assert!(is_item_type("pricing_plan"));
        assert!(!is_item_type("hero"));
    }
}
