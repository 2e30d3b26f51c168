//! Result and error types for SpecBind.
//!
//! The taxonomy mirrors how failures are reported back to a scenario:
//! construction problems are fatal to one page-type build, navigation and
//! element execution errors carry enough context to diagnose the step, and
//! transient driver conditions never escape the adapter boundary from an
//! existence or enabled check.

use thiserror::Error;

/// Result type for SpecBind operations
pub type SpecBindResult<T> = Result<T, SpecBindError>;

/// Errors that can occur in SpecBind
#[derive(Debug, Error)]
pub enum SpecBindError {
    /// A page or element type could not be constructed from its schema
    #[error("{message}")]
    Construction {
        /// Error message
        message: String,
    },

    /// Unknown page, wrong page after a timeout, or a page history miss
    #[error("{message}")]
    PageNavigation {
        /// Page the step asked for
        page: String,
        /// Error message
        message: String,
    },

    /// A step could not be executed against an element or property
    #[error("{message}")]
    ElementExecute {
        /// Error message
        message: String,
    },

    /// An element has no criteria that resolve to a driver locator
    #[error("Element '{element}' has no locator criteria; set at least one of Id, Name, Class, Text, TagName, XPath or CssSelector")]
    ElementLocatorMissing {
        /// Property or type name of the element
        element: String,
    },

    /// A non-transient failure reported by the wrapped automation driver
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// An argument failed validation
    #[error("{message} (parameter '{param}')")]
    InvalidArgument {
        /// Name of the failing parameter
        param: String,
        /// Error message
        message: String,
    },

    /// A bounded wait expired
    #[error("Operation timed out after {ms}ms: {message}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpecBindError {
    /// Construction error helper
    pub fn construction(message: impl Into<String>) -> Self {
        Self::Construction {
            message: message.into(),
        }
    }

    /// Navigation error helper
    pub fn navigation(page: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PageNavigation {
            page: page.into(),
            message: message.into(),
        }
    }

    /// Element execution error helper
    pub fn execute(message: impl Into<String>) -> Self {
        Self::ElementExecute {
            message: message.into(),
        }
    }

    /// Driver error helper
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Argument error helper
    pub fn invalid_argument(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Configuration error helper
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Name of the failing parameter for argument errors
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { param, .. } => Some(param),
            _ => None,
        }
    }
}
