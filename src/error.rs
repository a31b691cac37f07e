use thiserror::Error as ThisError;

/// Errors that can occur while handling a request or preparing an application.
#[derive(Debug, ThisError)]
pub enum Error {
    /// An access guard rejected the current identity
    #[error(transparent)]
    UserRequired(#[from] UserRequired),
    /// The store failed
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A route could not be registered
    #[error(transparent)]
    Route(#[from] RouteError),
    /// The configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A host-supplied handler failed
    #[error("handler failed: {0}")]
    Handler(String),
}

/// The current identity is not sufficient for the requested handler.
///
/// Both access guards raise this one error; the message tells the
/// "not logged in" case apart from the "missing role" case. The host
/// framework is expected to turn it into a 401/403 response.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct UserRequired {
    message: String,
}

impl UserRequired {
    /// Message used when the identity lacks a required role.
    pub const INSUFFICIENT_PERMISSIONS: &'static str = "insufficient permissions";

    /// Message used when no real user is logged in.
    pub const LOGIN_REQUIRED: &'static str = "user must be logged in";

    /// Creates a new error with a custom message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error raised by role guards.
    pub fn insufficient_permissions() -> Self {
        Self::new(Self::INSUFFICIENT_PERMISSIONS)
    }

    /// The error raised by the any-user guard.
    pub fn login_required() -> Self {
        Self::new(Self::LOGIN_REQUIRED)
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failures reported by a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StoreError {
    /// The named bag does not exist
    #[error("bag not found: {0}")]
    NoBag(String),
    /// Any other backend failure
    #[error("store backend error: {0}")]
    Backend(String),
    /// The configuration names a backend nobody registered
    #[error("unknown store backend: {0}")]
    UnknownBackend(String),
}

/// Failures while building or editing the route table.
#[derive(Debug, ThisError)]
pub enum RouteError {
    /// The compiled pattern is not a valid regular expression
    #[error("invalid route pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// The path template is malformed
    #[error("malformed path template {template:?}: {reason}")]
    Template {
        /// The offending template
        template: String,
        /// What is wrong with it
        reason: &'static str,
    },
    /// A tiddler mapping was given a path without a `{placeholder}`
    #[error("path {0:?} has no {{placeholder}} segment")]
    MissingPlaceholder(String),
}

/// Failures while loading configuration.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for [`Config`](crate::Config)
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
