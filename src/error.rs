//! Crate error type.
//!
//! Only configuration problems are errors: they surface synchronously from
//! `create` and [`mount`](crate::mount) and are not retried. Problems in
//! reactive values travel through streams as
//! [`StreamError`](crate::signals::StreamError) and never reach this type.

/// Configuration error raised while creating nodes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A namespace name has no URI in the [`Config`](crate::Config).
    #[error("unknown namespace `{name}`")]
    UnknownNamespace { name: String },

    /// An element declaration with a zero-length tag name.
    #[error("element tag name must not be empty")]
    EmptyTagName,

    /// A component was created without one of its required inputs.
    #[error("component `{component}` is missing required input `{field}`")]
    MissingInput { component: String, field: String },

    /// A node was placed somewhere it cannot go.
    #[error("invalid child: {0}")]
    InvalidChild(String),
}

pub type Result<T> = std::result::Result<T, Error>;
