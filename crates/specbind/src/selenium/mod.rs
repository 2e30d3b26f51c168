//! Selenium-style web driver adapter.
//!
//! The wrapped automation library is reached only through the [`WebDriver`]
//! trait: element lookups by [`By`] strategy, element reads and verbs, frame
//! switching and script execution. Everything above it (locator synthesis,
//! element resolution, the fill state machine) lives in this module.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: Transient driver conditions stop at the adapter and become
//!   plain `false` answers; anything else surfaces as a typed error
//! - **Genchi Genbutsu**: [`MockWebDriver`] runs the real adapter against an
//!   in-memory DOM instead of faking the adapter itself

mod browser;
mod builder;
mod handler;
mod mock;

pub use browser::SeleniumBrowser;
pub use builder::SeleniumPageBuilder;
pub use handler::{FillMethod, SeleniumElementHandler, KEYSTROKE_ATTEMPTS};
pub use mock::{MockChange, MockNode, MockWebDriver};

pub use crate::browser::{DriverLauncher, DriverSession};

use std::fmt;

use thiserror::Error;

use crate::locator::{How, NativeLocator};
use crate::result::SpecBindError;
use crate::wait::Point;

/// Name of the driver type in the element type registry
pub const BROWSER_TYPE: &str = "WebDriver";
/// Name of the parent element type
pub const ELEMENT_TYPE: &str = "WebElement";
/// Name of the document root type
pub const DOCUMENT_TYPE: &str = "WebDocument";
/// Name of the concrete list wrapper
pub const LIST_TYPE: &str = "WebElementList";
/// Name of the table type
pub const TABLE_TYPE: &str = "WebTable";
/// Name of the frame type
pub const FRAME_TYPE: &str = "WebFrame";

/// Element lookup strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum By {
    /// `id` attribute
    Id(String),
    /// `name` attribute
    Name(String),
    /// One class of the `class` attribute
    ClassName(String),
    /// Exact link text
    LinkText(String),
    /// Tag name
    TagName(String),
    /// XPath expression
    XPath(String),
    /// CSS selector
    CssSelector(String),
}

impl By {
    /// Strategy argument
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::Name(v)
            | Self::ClassName(v)
            | Self::LinkText(v)
            | Self::TagName(v)
            | Self::XPath(v)
            | Self::CssSelector(v) => v,
        }
    }

    /// Strategy name as the wire protocol spells it
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::ClassName(_) => "class name",
            Self::LinkText(_) => "link text",
            Self::TagName(_) => "tag name",
            Self::XPath(_) => "xpath",
            Self::CssSelector(_) => "css selector",
        }
    }
}

impl From<&NativeLocator> for By {
    fn from(native: &NativeLocator) -> Self {
        let using = native.using.clone();
        match native.how {
            How::Id => Self::Id(using),
            How::Name => Self::Name(using),
            How::ClassName => Self::ClassName(using),
            How::LinkText => Self::LinkText(using),
            How::TagName => Self::TagName(using),
            How::XPath => Self::XPath(using),
            How::CssSelector => Self::CssSelector(using),
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}: {}", self.strategy(), self.value())
    }
}

/// Opaque handle to a live element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WebElementRef(pub String);

impl fmt::Display for WebElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locator stored on Selenium proxies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeleniumLocator {
    /// Strategies tried in order until one finds an element
    pub bys: Vec<By>,
    /// Element already resolved by the driver (list items)
    pub resolved: Option<WebElementRef>,
}

impl SeleniumLocator {
    /// A locator over the given strategies
    #[must_use]
    pub fn new(bys: Vec<By>) -> Self {
        Self { bys, resolved: None }
    }

    /// A locator pinned to an element the driver already found
    #[must_use]
    pub fn pinned(bys: Vec<By>, element: WebElementRef) -> Self {
        Self {
            bys,
            resolved: Some(element),
        }
    }

    /// Whether there is nothing to search with
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bys.is_empty() && self.resolved.is_none()
    }

    /// Append a strategy unless an equal one is present
    pub fn push_unique(&mut self, by: By) {
        if !self.bys.contains(&by) {
            self.bys.push(by);
        }
    }
}

// =============================================================================
// DRIVER SURFACE
// =============================================================================

/// Errors raised by the wrapped automation driver
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// No element matched
    #[error("no such element: {0}")]
    NoSuchElement(String),
    /// The element left the DOM
    #[error("stale element reference: {0}")]
    StaleElementReference(String),
    /// The element exists but cannot be interacted with
    #[error("element not visible: {0}")]
    ElementNotVisible(String),
    /// Generic lookup failure
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other driver failure
    #[error("{0}")]
    WebDriver(String),
}

impl DriverError {
    /// Conditions that mean "not there right now" rather than a failure
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NoSuchElement(_)
                | Self::StaleElementReference(_)
                | Self::ElementNotVisible(_)
                | Self::NotFound(_)
        )
    }
}

impl From<DriverError> for SpecBindError {
    fn from(err: DriverError) -> Self {
        Self::driver(err.to_string())
    }
}

/// Result of a driver call
pub type DriverResult<T> = Result<T, DriverError>;

/// The wrapped web automation API
pub trait WebDriver {
    /// Every element matching `by` under `scope`, or under the current
    /// document when `scope` is `None`
    fn find_elements(&self, scope: Option<&WebElementRef>, by: &By) -> DriverResult<Vec<WebElementRef>>;
    /// Lower-case tag name
    fn tag_name(&self, element: &WebElementRef) -> DriverResult<String>;
    /// Attribute value
    fn attribute(&self, element: &WebElementRef, name: &str) -> DriverResult<Option<String>>;
    /// Visible text
    fn text(&self, element: &WebElementRef) -> DriverResult<String>;
    /// Rendered and visible
    fn is_displayed(&self, element: &WebElementRef) -> DriverResult<bool>;
    /// Not disabled
    fn is_enabled(&self, element: &WebElementRef) -> DriverResult<bool>;
    /// Checked or selected
    fn is_selected(&self, element: &WebElementRef) -> DriverResult<bool>;
    /// Click
    fn click(&self, element: &WebElementRef) -> DriverResult<()>;
    /// Clear an input
    fn clear(&self, element: &WebElementRef) -> DriverResult<()>;
    /// Type text
    fn send_keys(&self, element: &WebElementRef, keys: &str) -> DriverResult<()>;
    /// Move the pointer over the element
    fn hover(&self, element: &WebElementRef) -> DriverResult<()>;
    /// Top-left position
    fn location(&self, element: &WebElementRef) -> DriverResult<Point>;
    /// Load a URL
    fn navigate(&self, url: &str) -> DriverResult<()>;
    /// Current URL
    fn current_url(&self) -> DriverResult<String>;
    /// Run a script; `args` are exposed as `arguments[i]`
    fn execute_script(&self, script: &str, args: &[WebElementRef]) -> DriverResult<serde_json::Value>;
    /// Switch into a frame, or back to the top document with `None`
    fn switch_to_frame(&self, frame: Option<&WebElementRef>) -> DriverResult<()>;
    /// Quit the session
    fn close(&self) -> DriverResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_transient_classification() {
        assert!(DriverError::NoSuchElement("x".into()).is_transient());
        assert!(DriverError::StaleElementReference("x".into()).is_transient());
        assert!(DriverError::ElementNotVisible("x".into()).is_transient());
        assert!(DriverError::NotFound("x".into()).is_transient());
        assert!(!DriverError::WebDriver("x".into()).is_transient());
    }

    #[test]
    fn test_by_from_native() {
        let by = By::from(&NativeLocator::new(How::CssSelector, "div.a"));
        assert_eq!(by, By::CssSelector("div.a".into()));
        assert_eq!(by.to_string(), "By.css selector: div.a");
    }

    #[test]
    fn test_push_unique() {
        let mut locator = SeleniumLocator::default();
        assert!(locator.is_empty());
        locator.push_unique(By::Id("a".into()));
        locator.push_unique(By::Id("a".into()));
        assert_eq!(locator.bys.len(), 1);
    }

    #[test]
    fn test_session_launches_once() {
        let launches = Rc::new(Cell::new(0));
        let counter = Rc::clone(&launches);
        let session = DriverSession::lazy(move || {
            counter.set(counter.get() + 1);
            Ok(MockWebDriver::new())
        });
        assert!(!session.is_started());
        let _ = session.get().unwrap();
        let _ = session.get().unwrap();
        assert_eq!(launches.get(), 1);
        assert!(session.is_started());
    }

    #[test]
    fn test_session_launch_failure() {
        let session: DriverSession<MockWebDriver> =
            DriverSession::lazy(|| Err(SpecBindError::driver("no browser")));
        assert!(session.get().is_err());
        assert!(!session.is_started());
    }
}
