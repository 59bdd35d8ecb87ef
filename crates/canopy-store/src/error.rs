//! Store error type.
//!
//! [`StoreError`] carries a semantic [`StoreErrorKind`] plus optional node
//! context and a backend-specific source, so higher layers can match on the
//! category without knowing which backend produced it.

use canopy_model::{NodeId, NodeKind};

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Referenced row does not exist.
    NotFound,
    /// A uniqueness constraint was violated (duplicate route).
    Conflict,
    /// A row failed to decode or an input failed to encode.
    InvalidRecord,
    /// Backend is unavailable or a transaction could not complete.
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Node level the error refers to (if applicable).
    pub node: Option<NodeKind>,
    /// Node identity the error refers to (if applicable).
    pub id: Option<NodeId>,
    /// Free-form context (e.g., the conflicting route).
    pub detail: Option<String>,
    /// Backend identifier (e.g., "Sqlite", "Memory").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            node: None,
            id: None,
            detail: None,
            backend: None,
            source: None,
        }
    }

    /// Attach node context.
    #[must_use]
    pub fn with_node(mut self, node: NodeKind, id: NodeId) -> Self {
        self.node = Some(node);
        self.id = Some(id);
        self
    }

    /// Attach free-form context.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error for a node.
    #[must_use]
    pub fn not_found(node: NodeKind, id: NodeId) -> Self {
        Self::new(StoreErrorKind::NotFound).with_node(node, id)
    }

    /// Create a conflict error with context.
    #[must_use]
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Conflict).with_detail(detail)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: node id (detail)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::Conflict => "Conflict",
            StoreErrorKind::InvalidRecord => "Invalid record",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(node) = self.node {
            write!(f, ": {node}")?;
            if let Some(id) = self.id {
                write!(f, " {id}")?;
            }
        }

        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::RowNotFound => StoreErrorKind::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreErrorKind::Conflict,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreErrorKind::Unavailable,
            _ => StoreErrorKind::Other,
        };
        Self::new(kind).with_backend("Sqlite").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_simple() {
        let err = StoreError::new(StoreErrorKind::NotFound);

        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn test_display_with_node() {
        let id = NodeId::new();
        let err = StoreError::not_found(NodeKind::Section, id).with_backend("Memory");

        assert_eq!(err.to_string(), format!("[Memory] Not found: section {id}"));
    }

    #[test]
    fn test_display_conflict_detail() {
        let err = StoreError::conflict("route /solutions/retail already exists");

        assert_eq!(
            err.to_string(),
            "Conflict (route /solutions/retail already exists)"
        );
    }

    #[test]
    fn test_source_preserved() {
        let io_err = std::io::Error::other("disk gone");
        let err = StoreError::new(StoreErrorKind::Unavailable).with_source(io_err);

        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }
}
