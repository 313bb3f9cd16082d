//! Persistence module
//!
//! The document store is an optional collaborator. Whether it exists is decided
//! once at startup and exposed as a [`Persistence`] capability:
//! - `Missing`: the database module is not installed
//! - `Uninitialized`: installed, but `DATABASE_URL`/`DATABASE_NAME` are absent
//! - `Ready`: a live [`DocumentStore`] handle

mod file;

pub use file::JsonLinesStore;

use std::sync::Arc;

use crate::config::DatabaseConfig;

/// Errors raised by a document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),
}

impl StoreError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Minimal document-store surface used by the handlers
pub trait DocumentStore: Send + Sync {
    /// Database name, if the backend has one
    fn name(&self) -> &str;

    /// Insert one JSON document into `collection`
    fn insert_one(&self, collection: &str, document: &serde_json::Value) -> Result<(), StoreError>;

    /// Enumerate collection names (sorted)
    fn list_collection_names(&self) -> Result<Vec<String>, StoreError>;
}

/// Persistence capability resolved at startup
#[derive(Clone)]
pub enum Persistence {
    Missing,
    Uninitialized,
    Ready(Arc<dyn DocumentStore>),
}

impl Persistence {
    pub fn resolve(cfg: &DatabaseConfig) -> Self {
        if !cfg.enabled {
            return Self::Missing;
        }
        match (cfg.url.as_deref(), cfg.name.as_deref()) {
            (Some(url), Some(name)) if !url.is_empty() && !name.is_empty() => {
                Self::Ready(Arc::new(JsonLinesStore::open(url, name)))
            }
            _ => Self::Uninitialized,
        }
    }

    /// Short label for startup logging
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Missing => "not installed (in-memory only)",
            Self::Uninitialized => "installed but not initialized (in-memory only)",
            Self::Ready(_) => "document store",
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("Missing"),
            Self::Uninitialized => f.write_str("Uninitialized"),
            Self::Ready(store) => f.debug_tuple("Ready").field(&store.name()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(enabled: bool, url: Option<&str>, name: Option<&str>) -> DatabaseConfig {
        DatabaseConfig {
            enabled,
            url: url.map(String::from),
            name: name.map(String::from),
        }
    }

    #[test]
    fn test_resolve_missing_when_disabled() {
        let p = Persistence::resolve(&db(false, Some("/tmp/x"), Some("energy")));
        assert!(matches!(p, Persistence::Missing));
    }

    #[test]
    fn test_resolve_uninitialized_without_settings() {
        assert!(matches!(
            Persistence::resolve(&db(true, None, None)),
            Persistence::Uninitialized
        ));
        assert!(matches!(
            Persistence::resolve(&db(true, Some("/tmp/x"), None)),
            Persistence::Uninitialized
        ));
        assert!(matches!(
            Persistence::resolve(&db(true, Some(""), Some("energy"))),
            Persistence::Uninitialized
        ));
    }

    #[test]
    fn test_resolve_ready() {
        let p = Persistence::resolve(&db(true, Some("/tmp/x"), Some("energy")));
        match p {
            Persistence::Ready(store) => assert_eq!(store.name(), "energy"),
            other => panic!("expected Ready, got {other:?}"),
        }
    }
}
