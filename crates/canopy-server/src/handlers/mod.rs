//! HTTP request handlers.

pub(crate) mod entities;
pub(crate) mod health;
pub(crate) mod items;
pub(crate) mod sections;

use canopy_engine::TreeView;
use canopy_model::{EntityKind, NodeId};
use serde::Deserialize;

use crate::error::ApiError;

/// Parse the `{kind}` path segment.
pub(crate) fn parse_kind(raw: &str) -> Result<EntityKind, ApiError> {
    EntityKind::parse(raw)
        .ok_or_else(|| ApiError::Validation(format!("unknown entity kind: {raw}")))
}

/// Parse an id path segment, naming the offending segment on failure.
pub(crate) fn parse_id(raw: &str, segment: &str) -> Result<NodeId, ApiError> {
    NodeId::parse(raw).map_err(|_| ApiError::Validation(format!("malformed {segment}: {raw}")))
}

/// Require a non-empty string field.
pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// `?all=<bool>` query: `all=true` selects the admin view.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ViewQuery {
    #[serde(default)]
    pub(crate) all: bool,
}

impl ViewQuery {
    pub(crate) fn view(&self) -> TreeView {
        if self.all {
            TreeView::Admin
        } else {
            TreeView::Public
        }
    }
}

/// Body of `PATCH …/position`.
#[derive(Debug, Deserialize)]
pub(crate) struct MoveBody {
    /// Target index within the sibling group.
    pub(crate) to: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_known() {
        assert_eq!(parse_kind("products").unwrap(), EntityKind::Products);
        assert_eq!(parse_kind("pages").unwrap(), EntityKind::Pages);
    }

    #[test]
    fn test_parse_kind_unknown_is_validation() {
        let err = parse_kind("blog").unwrap_err();

        assert!(err.to_string().contains("unknown entity kind"));
    }

    #[test]
    fn test_parse_id_malformed() {
        let err = parse_id("123", "entityId").unwrap_err();

        assert!(err.to_string().contains("malformed entityId"));
    }

    #[test]
    fn test_view_query_defaults_to_public() {
        let query: ViewQuery = serde_json::from_str("{}").unwrap();

        assert_eq!(query.view(), TreeView::Public);
    }

    #[test]
    fn test_view_query_all_selects_admin() {
        let query = ViewQuery { all: true };

        assert_eq!(query.view(), TreeView::Admin);
    }
}
