//! Search-property control adapter (HTML controls hosted in a desktop
//! automation framework).
//!
//! Controls are found by a control type plus name/value search properties,
//! narrowed by filter properties such as `TagInstance`. Frames need no
//! switching: a frame control is simply the search scope of its document.

mod browser;
mod builder;
mod handler;
mod mock;

pub use browser::CodedUIBrowser;
pub use builder::CodedUIPageBuilder;
pub use handler::{CodedUIElementHandler, ControlFill};
pub use mock::{MockControl, MockUiAutomation};

use std::fmt;

use thiserror::Error;

use crate::result::SpecBindError;
use crate::wait::Point;

/// Browser window type
pub const BROWSER_TYPE: &str = "BrowserWindow";
/// Base control type every control is constructed from
pub const CONTROL_TYPE: &str = "UITestControl";
/// Document root type
pub const DOCUMENT_TYPE: &str = "HtmlDocument";
/// Concrete list wrapper
pub const LIST_TYPE: &str = "CodedUIListElementWrapper";

/// Filter property selecting the n-th match (1-based)
pub const TAG_INSTANCE: &str = "TagInstance";

/// Opaque handle to a live control
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlRef(pub String);

impl fmt::Display for ControlRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locator stored on CodedUI proxies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSpec {
    /// Automation control type (`Button`, `Edit`, ...), when the type has one
    pub control_type: Option<String>,
    /// Properties every match must have
    pub search_properties: Vec<(String, String)>,
    /// Properties applied after the search
    pub filter_properties: Vec<(String, String)>,
    /// Control already resolved by the automation layer (list items)
    pub resolved: Option<ControlRef>,
}

impl SearchSpec {
    /// Add or replace a search property
    pub fn set_search(&mut self, name: &str, value: impl Into<String>) {
        set(&mut self.search_properties, name, value.into());
    }

    /// Add or replace a filter property
    pub fn set_filter(&mut self, name: &str, value: impl Into<String>) {
        set(&mut self.filter_properties, name, value.into());
    }

    /// A search property value
    #[must_use]
    pub fn search(&self, name: &str) -> Option<&str> {
        get(&self.search_properties, name)
    }

    /// A filter property value
    #[must_use]
    pub fn filter(&self, name: &str) -> Option<&str> {
        get(&self.filter_properties, name)
    }

    /// Whether there is nothing to search with
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.control_type.is_none()
            && self.search_properties.is_empty()
            && self.filter_properties.is_empty()
            && self.resolved.is_none()
    }
}

fn set(properties: &mut Vec<(String, String)>, name: &str, value: String) {
    match properties.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value,
        None => properties.push((name.to_string(), value)),
    }
}

fn get<'a>(properties: &'a [(String, String)], name: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

impl fmt::Display for SearchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(control_type) = &self.control_type {
            parts.push(format!("ControlType={control_type}"));
        }
        parts.extend(self.search_properties.iter().map(|(k, v)| format!("{k}={v}")));
        parts.extend(self.filter_properties.iter().map(|(k, v)| format!("{k}~{v}")));
        f.write_str(&parts.join("; "))
    }
}

/// Errors raised by the automation layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UiError {
    /// No control matched
    #[error("control not found: {0}")]
    ControlNotFound(String),
    /// The control is no longer part of the UI tree
    #[error("control not available: {0}")]
    ControlNotAvailable(String),
    /// The control cannot be interacted with
    #[error("control not visible: {0}")]
    ControlNotVisible(String),
    /// Generic lookup failure
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other automation failure
    #[error("{0}")]
    Automation(String),
}

impl UiError {
    /// Conditions that mean "not there right now" rather than a failure
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ControlNotFound(_)
                | Self::ControlNotAvailable(_)
                | Self::ControlNotVisible(_)
                | Self::NotFound(_)
        )
    }
}

impl From<UiError> for SpecBindError {
    fn from(err: UiError) -> Self {
        Self::driver(err.to_string())
    }
}

/// Result of an automation call
pub type UiResult<T> = Result<T, UiError>;

/// The wrapped control automation API
pub trait UiAutomation {
    /// Controls under `scope` (or the window) matching the search
    fn find_controls(&self, scope: Option<&ControlRef>, spec: &SearchSpec) -> UiResult<Vec<ControlRef>>;
    /// Control type of a live control
    fn control_type(&self, control: &ControlRef) -> UiResult<String>;
    /// Property value
    fn get_property(&self, control: &ControlRef, name: &str) -> UiResult<Option<String>>;
    /// Set a property (the automation layer's way of entering data)
    fn set_property(&self, control: &ControlRef, name: &str, value: &str) -> UiResult<()>;
    /// Present and visible
    fn exists(&self, control: &ControlRef) -> UiResult<bool>;
    /// Enabled
    fn enabled(&self, control: &ControlRef) -> UiResult<bool>;
    /// Click
    fn click(&self, control: &ControlRef) -> UiResult<()>;
    /// Move the pointer over the control
    fn hover(&self, control: &ControlRef) -> UiResult<()>;
    /// Draw the automation highlight around the control
    fn draw_highlight(&self, control: &ControlRef) -> UiResult<()>;
    /// Top-left of the bounding rectangle
    fn location(&self, control: &ControlRef) -> UiResult<Point>;
    /// Load a URL in the window
    fn navigate(&self, url: &str) -> UiResult<()>;
    /// URL of the window's document
    fn uri(&self) -> UiResult<String>;
    /// Run a script in the document
    fn execute_script(&self, script: &str) -> UiResult<serde_json::Value>;
    /// Close the window
    fn close(&self) -> UiResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_case_insensitively() {
        let mut spec = SearchSpec::default();
        spec.set_search("Id", "a");
        spec.set_search("ID", "b");
        assert_eq!(spec.search_properties, vec![("Id".to_string(), "b".to_string())]);
        assert_eq!(spec.search("id"), Some("b"));
    }

    #[test]
    fn test_display() {
        let mut spec = SearchSpec {
            control_type: Some("Button".into()),
            ..SearchSpec::default()
        };
        spec.set_search("Id", "go");
        spec.set_filter(TAG_INSTANCE, "2");
        assert_eq!(spec.to_string(), "ControlType=Button; Id=go; TagInstance~2");
    }

    #[test]
    fn test_transient_classification() {
        assert!(UiError::ControlNotFound("x".into()).is_transient());
        assert!(UiError::ControlNotAvailable("x".into()).is_transient());
        assert!(!UiError::Automation("x".into()).is_transient());
    }
}
