//! Rendering configuration and context.
//!
//! [`Config`] holds the namespace table. [`Context`] is the explicit
//! rendering environment threaded through every creation call: it owns the
//! [`Document`] nodes are created in and the [`Scheduler`] that delivers
//! deferred lifecycle signals. There is no global default instance.
//!
//! # Example
//!
//! ```ignore
//! let ctx = Context::new(Config::default().with_namespace("ev", "urn:events"))?;
//! assert_eq!(ctx.resolve_namespace_uri("svg")?, SVG_NAMESPACE_URI);
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::Document;
use crate::error::{Error, Result};
use crate::signals::Scheduler;

pub const HTML_NAMESPACE_URI: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE_URI: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE_URI: &str = "http://www.w3.org/1999/xlink";
pub const MATHML_NAMESPACE_URI: &str = "http://www.w3.org/1998/Math/MathML";

// =============================================================================
// Config
// =============================================================================

/// Namespace table and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    namespaces: IndexMap<String, String>,
    default_namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        let namespaces = [
            ("html", HTML_NAMESPACE_URI),
            ("svg", SVG_NAMESPACE_URI),
            ("xlink", XLINK_NAMESPACE_URI),
            ("mathml", MATHML_NAMESPACE_URI),
        ]
        .into_iter()
        .map(|(name, uri)| (name.to_string(), uri.to_string()))
        .collect();

        Self {
            namespaces,
            default_namespace: "html".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a namespace name.
    pub fn with_namespace(mut self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(name.into(), uri.into());
        self
    }

    /// Namespace used for root content and component structures.
    pub fn with_default_namespace(mut self, name: impl Into<String>) -> Self {
        self.default_namespace = name.into();
        self
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .map(|(name, uri)| (name.as_str(), uri.as_str()))
    }

    pub fn resolve_namespace_uri(&self, name: &str) -> Result<&str> {
        self.namespaces
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownNamespace {
                name: name.to_string(),
            })
    }
}

// =============================================================================
// Context
// =============================================================================

struct ContextInner {
    config: Config,
    document: Document,
    scheduler: Scheduler,
    default_namespace_uri: String,
}

/// Shared rendering environment. Clones refer to the same document and
/// scheduler.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("default_namespace_uri", &self.inner.default_namespace_uri)
            .field("document", &self.inner.document)
            .field("scheduler", &self.inner.scheduler)
            .finish()
    }
}

impl Context {
    /// Build a context with a fresh document.
    ///
    /// Fails if the default namespace does not resolve.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_document(config, Document::new())
    }

    /// Build a context that creates nodes in an existing document.
    pub fn with_document(config: Config, document: Document) -> Result<Self> {
        let default_namespace_uri = config
            .resolve_namespace_uri(config.default_namespace())?
            .to_string();
        Ok(Self {
            inner: Rc::new(ContextInner {
                config,
                document,
                scheduler: Scheduler::new(),
                default_namespace_uri,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub fn default_namespace_uri(&self) -> &str {
        &self.inner.default_namespace_uri
    }

    pub fn resolve_namespace_uri(&self, name: &str) -> Result<String> {
        self.inner
            .config
            .resolve_namespace_uri(name)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespaces_resolve() {
        let config = Config::default();
        assert_eq!(config.resolve_namespace_uri("html"), Ok(HTML_NAMESPACE_URI));
        assert_eq!(config.resolve_namespace_uri("svg"), Ok(SVG_NAMESPACE_URI));
        assert_eq!(config.resolve_namespace_uri("xlink"), Ok(XLINK_NAMESPACE_URI));
    }

    #[test]
    fn test_unknown_namespace_fails_loudly() {
        let ctx = Context::new(Config::default()).unwrap();
        assert_eq!(
            ctx.resolve_namespace_uri("svgg"),
            Err(Error::UnknownNamespace {
                name: "svgg".to_string()
            })
        );
    }

    #[test]
    fn test_custom_namespace_and_default() {
        let config = Config::default()
            .with_namespace("x", "urn:x")
            .with_default_namespace("x");
        let ctx = Context::new(config).unwrap();

        assert_eq!(ctx.default_namespace_uri(), "urn:x");
        assert_eq!(ctx.resolve_namespace_uri("x").unwrap(), "urn:x");
    }

    #[test]
    fn test_context_rejects_unresolvable_default() {
        let result = Context::new(Config::default().with_default_namespace("nope"));
        assert!(matches!(result, Err(Error::UnknownNamespace { .. })));
    }
}
