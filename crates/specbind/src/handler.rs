//! Driver capability surface for element operations.
//!
//! Each driver decides what "exists" and "enabled" mean in its automation
//! API. Existence and enabled checks never fail: transient driver conditions
//! are reported as `false`.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

use crate::proxy::ElementProxy;
use crate::result::SpecBindResult;
use crate::wait::{wait_for_condition, ElementProbe, Point, WaitConditions, Waiter};

/// One option of a combo box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComboBoxItem {
    /// Visible text
    pub text: String,
    /// Submitted value, when the control has one
    pub value: Option<String>,
}

impl ComboBoxItem {
    /// Create an item
    pub fn new(text: impl Into<String>, value: Option<String>) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }
}

/// Element-level operations a driver implements
pub trait PageElementHandler: 'static {
    /// Driver-native locator stored on proxies
    type Locator: Clone + Default + fmt::Debug + 'static;

    /// Element is present in the sense this driver uses
    fn element_exists_check(&self, element: &ElementProxy<Self::Locator>) -> bool;

    /// Element is absent
    fn element_not_exists_check(&self, element: &ElementProxy<Self::Locator>) -> bool {
        !self.element_exists_check(element)
    }

    /// Element is present and enabled
    fn element_enabled_check(&self, element: &ElementProxy<Self::Locator>) -> bool;

    /// Click
    fn click_element(&self, element: &ElementProxy<Self::Locator>) -> SpecBindResult<()>;

    /// Move the pointer over the element
    fn hover_element(&self, element: &ElementProxy<Self::Locator>) -> SpecBindResult<()>;

    /// Current value as a step would read it
    fn get_element_text(&self, element: &ElementProxy<Self::Locator>) -> SpecBindResult<Option<String>>;

    /// One named attribute
    fn get_element_attribute(
        &self,
        element: &ElementProxy<Self::Locator>,
        attribute: &str,
    ) -> SpecBindResult<Option<String>>;

    /// Enter data using the fill method for the element's control type
    fn fill_element(&self, element: &ElementProxy<Self::Locator>, data: &str) -> SpecBindResult<()>;

    /// Clear entered data
    fn clear_element(&self, element: &ElementProxy<Self::Locator>) -> SpecBindResult<()>;

    /// Screen position, `None` when the element cannot be found
    fn element_location(&self, element: &ElementProxy<Self::Locator>) -> Option<Point>;

    /// Visually mark the element; failures are logged, not raised
    fn highlight(&self, element: &ElementProxy<Self::Locator>);

    /// Resolve every item of a list wrapper into its own proxy
    fn list_items(
        &self,
        list: &Rc<ElementProxy<Self::Locator>>,
    ) -> SpecBindResult<Vec<Rc<ElementProxy<Self::Locator>>>>;

    /// Cell text of a table, header row first
    fn table_cells(&self, table: &ElementProxy<Self::Locator>) -> SpecBindResult<Vec<Vec<String>>>;

    /// Options of a combo box
    fn combo_box_items(&self, element: &ElementProxy<Self::Locator>) -> SpecBindResult<Vec<ComboBoxItem>>;

    /// Poller used by element waits
    fn waiter(&self) -> Waiter {
        Waiter::new()
    }

    /// Wait for an element condition
    fn wait_for_element(
        &self,
        element: &ElementProxy<Self::Locator>,
        condition: WaitConditions,
        timeout: Duration,
    ) -> bool
    where
        Self: Sized,
    {
        let probe = ProxyProbe {
            handler: self,
            element,
        };
        let satisfied = wait_for_condition(&probe, condition, timeout, &self.waiter());
        tracing::debug!(element = element.name(), %condition, satisfied, "element wait finished");
        satisfied
    }
}

/// Adapts a handler and one proxy to the wait probe interface
struct ProxyProbe<'a, H: PageElementHandler> {
    handler: &'a H,
    element: &'a ElementProxy<H::Locator>,
}

impl<H: PageElementHandler> ElementProbe for ProxyProbe<'_, H> {
    fn exists(&self) -> bool {
        self.handler.element_exists_check(self.element)
    }

    fn not_exists(&self) -> bool {
        self.handler.element_not_exists_check(self.element)
    }

    fn enabled(&self) -> bool {
        self.handler.element_enabled_check(self.element)
    }

    fn location(&self) -> Option<Point> {
        self.handler.element_location(self.element)
    }
}
