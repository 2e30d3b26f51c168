//! Element operations against a [`WebDriver`].
//!
//! Proxies are resolved at the moment of interaction by walking their parent
//! chain: document roots are transparent, frames are located and switched
//! into, and any other parent becomes the search scope. Pinned proxies (list
//! items) still establish their frame context before returning the element
//! the driver already found.

use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use super::{By, DriverError, DriverResult, SeleniumLocator, WebDriver, WebElementRef};
use crate::element_type::ElementKind;
use crate::handler::{ComboBoxItem, PageElementHandler};
use crate::proxy::ElementProxy;
use crate::result::{SpecBindError, SpecBindResult};
use crate::validation::parse_bool;
use crate::wait::{Point, Waiter};

/// Keystroke entry attempts before giving up
pub const KEYSTROKE_ATTEMPTS: u32 = 3;

/// Pause between keystroke attempts
const KEYSTROKE_RETRY_DELAY: Duration = Duration::from_millis(500);

const HIGHLIGHT_SCRIPT: &str = "arguments[0].style.outline = '3px solid red';";

type Proxy = ElementProxy<SeleniumLocator>;

// =============================================================================
// FILL METHOD
// =============================================================================

/// How data is entered into a control, chosen from its tag and type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMethod {
    /// `<select>`: choose the option by visible text
    Select,
    /// `<input type="checkbox">`: click when the state differs
    CheckBox,
    /// `<input type="radio">`: click twice
    RadioButton,
    /// `<input type="file">`: send the absolute file path
    FileUpload,
    /// Anything else: raw keystrokes with verification
    Keystrokes,
}

impl FillMethod {
    /// Pick the fill method for an element
    #[must_use]
    pub fn for_element(tag: &str, input_type: Option<&str>) -> Self {
        let tag = tag.to_lowercase();
        let input_type = input_type.map(str::to_lowercase);
        match (tag.as_str(), input_type.as_deref()) {
            ("select", _) => Self::Select,
            ("input", Some("checkbox")) => Self::CheckBox,
            ("input", Some("radio")) => Self::RadioButton,
            ("input", Some("file")) => Self::FileUpload,
            _ => Self::Keystrokes,
        }
    }
}

// =============================================================================
// HANDLER
// =============================================================================

/// [`PageElementHandler`] for web pages
pub struct SeleniumElementHandler<D: WebDriver> {
    driver: Rc<D>,
    waiter: Waiter,
    keystroke_delay: Duration,
}

impl<D: WebDriver> fmt::Debug for SeleniumElementHandler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeleniumElementHandler")
            .field("waiter", &self.waiter)
            .field("keystroke_delay", &self.keystroke_delay)
            .finish_non_exhaustive()
    }
}

impl<D: WebDriver> SeleniumElementHandler<D> {
    /// Handler over a running driver
    pub fn new(driver: Rc<D>) -> Self {
        Self {
            driver,
            waiter: Waiter::new(),
            keystroke_delay: KEYSTROKE_RETRY_DELAY,
        }
    }

    /// Poller used for element waits
    #[must_use]
    pub fn with_waiter(mut self, waiter: Waiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Pause between keystroke attempts
    #[must_use]
    pub const fn with_keystroke_delay(mut self, delay: Duration) -> Self {
        self.keystroke_delay = delay;
        self
    }

    /// The wrapped driver
    pub fn driver(&self) -> &Rc<D> {
        &self.driver
    }

    /// Find the live element behind a proxy
    ///
    /// # Errors
    ///
    /// `ElementLocatorMissing` when the proxy has nothing to search with;
    /// a driver error when no strategy finds the element.
    pub fn locate(&self, element: &Proxy) -> SpecBindResult<WebElementRef> {
        if element.locator().is_empty() {
            return Err(SpecBindError::ElementLocatorMissing {
                element: element.name().to_string(),
            });
        }
        self.resolve(element).map_err(SpecBindError::from)
    }

    fn resolve(&self, element: &Proxy) -> DriverResult<WebElementRef> {
        let scope = self.resolve_scope(element.parent())?;
        let locator = element.locator();
        if let Some(pinned) = &locator.resolved {
            return Ok(pinned.clone());
        }
        for by in &locator.bys {
            if let Some(found) = self.driver.find_elements(scope.as_ref(), by)?.into_iter().next() {
                return Ok(found);
            }
        }
        Err(DriverError::NoSuchElement(format!(
            "'{}' using [{}]",
            element.name(),
            locator
                .bys
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Search scope for children of `parent`; switches frames as a side effect
    fn resolve_scope(&self, parent: Option<&Rc<Proxy>>) -> DriverResult<Option<WebElementRef>> {
        let Some(parent) = parent else {
            self.driver.switch_to_frame(None)?;
            return Ok(None);
        };
        match parent.kind() {
            ElementKind::Document if parent.locator().resolved.is_none() => {
                self.resolve_scope(parent.parent())
            }
            ElementKind::Frame => {
                let frame = self.resolve(parent)?;
                self.driver.switch_to_frame(Some(&frame))?;
                Ok(None)
            }
            _ => self.resolve(parent).map(Some),
        }
    }

    /// Run a state read, folding transient conditions into `false`
    fn check(&self, element: &Proxy, read: impl FnOnce(&WebElementRef) -> DriverResult<bool>) -> bool {
        match self.resolve(element).and_then(|e| read(&e)) {
            Ok(state) => state,
            Err(err) if err.is_transient() => {
                tracing::trace!(element = element.name(), %err, "transient driver condition");
                false
            }
            Err(err) => {
                tracing::warn!(element = element.name(), %err, "driver error during state check");
                false
            }
        }
    }

    fn fill_select(&self, element: &Proxy, web: &WebElementRef, data: &str) -> SpecBindResult<()> {
        let options = self.driver.find_elements(Some(web), &By::TagName("option".into()))?;
        if self.driver.attribute(web, "multiple")?.is_some() {
            for option in &options {
                if self.driver.is_selected(option)? {
                    self.driver.click(option)?;
                }
            }
        }
        let wanted = data.trim();
        for option in &options {
            if self.driver.text(option)?.trim().eq_ignore_ascii_case(wanted) {
                self.driver.click(option)?;
                return Ok(());
            }
        }
        Err(SpecBindError::execute(format!(
            "Option '{data}' was not found in list '{}'",
            element.name()
        )))
    }

    fn fill_file(&self, web: &WebElementRef, data: &str) -> SpecBindResult<()> {
        let path = Path::new(data.trim());
        let absolute = path.canonicalize().map_err(|e| {
            SpecBindError::invalid_argument("data", format!("File '{}' cannot be uploaded: {e}", path.display()))
        })?;
        self.driver.send_keys(web, &absolute.to_string_lossy())?;
        Ok(())
    }

    /// Clear, type, read back; retried because the wrapped driver sometimes
    /// drops characters
    fn fill_keystrokes(&self, element: &Proxy, web: &WebElementRef, data: &str) -> SpecBindResult<()> {
        let mut written = None;
        for attempt in 1..=KEYSTROKE_ATTEMPTS {
            self.driver.clear(web)?;
            self.driver.send_keys(web, data)?;
            let value = self.driver.attribute(web, "value")?.unwrap_or_default();
            if value.to_lowercase() == data.to_lowercase() {
                return Ok(());
            }
            tracing::debug!(element = element.name(), attempt, expected = data, actual = %value, "keystroke entry mismatch");
            written = Some(value);
            if attempt < KEYSTROKE_ATTEMPTS {
                std::thread::sleep(self.keystroke_delay);
            }
        }
        Err(SpecBindError::driver(format!(
            "Could not enter '{data}' into '{}' after {KEYSTROKE_ATTEMPTS} attempts; field contains '{}'",
            element.name(),
            written.unwrap_or_default()
        )))
    }

    fn current_value(&self, web: &WebElementRef) -> DriverResult<Option<String>> {
        let tag = self.driver.tag_name(web)?;
        let input_type = self.driver.attribute(web, "type")?;
        match (tag.as_str(), input_type.as_deref()) {
            ("select", _) => {
                for option in self.driver.find_elements(Some(web), &By::TagName("option".into()))? {
                    if self.driver.is_selected(&option)? {
                        return self.driver.text(&option).map(Some);
                    }
                }
                Ok(None)
            }
            ("input", Some("checkbox" | "radio")) => {
                Ok(Some(self.driver.is_selected(web)?.to_string()))
            }
            ("input" | "textarea", _) => self.driver.attribute(web, "value"),
            _ => self.driver.text(web).map(Some),
        }
    }
}

impl<D: WebDriver + 'static> PageElementHandler for SeleniumElementHandler<D> {
    type Locator = SeleniumLocator;

    fn element_exists_check(&self, element: &Proxy) -> bool {
        self.check(element, |e| self.driver.is_displayed(e))
    }

    fn element_not_exists_check(&self, element: &Proxy) -> bool {
        match self.resolve(element).and_then(|e| self.driver.is_displayed(&e)) {
            Ok(displayed) => !displayed,
            Err(err) if err.is_transient() => true,
            Err(err) => {
                tracing::warn!(element = element.name(), %err, "driver error during state check");
                false
            }
        }
    }

    fn element_enabled_check(&self, element: &Proxy) -> bool {
        self.check(element, |e| self.driver.is_enabled(e))
    }

    fn click_element(&self, element: &Proxy) -> SpecBindResult<()> {
        let web = self.locate(element)?;
        tracing::debug!(element = element.name(), "click");
        self.driver.click(&web)?;
        Ok(())
    }

    fn hover_element(&self, element: &Proxy) -> SpecBindResult<()> {
        let web = self.locate(element)?;
        self.driver.hover(&web)?;
        Ok(())
    }

    fn get_element_text(&self, element: &Proxy) -> SpecBindResult<Option<String>> {
        let web = self.locate(element)?;
        Ok(self.current_value(&web)?)
    }

    fn get_element_attribute(&self, element: &Proxy, attribute: &str) -> SpecBindResult<Option<String>> {
        let web = self.locate(element)?;
        Ok(self.driver.attribute(&web, attribute)?)
    }

    fn fill_element(&self, element: &Proxy, data: &str) -> SpecBindResult<()> {
        let web = self.locate(element)?;
        let tag = self.driver.tag_name(&web)?;
        let input_type = self.driver.attribute(&web, "type")?;
        let method = FillMethod::for_element(&tag, input_type.as_deref());
        tracing::debug!(element = element.name(), ?method, "fill");
        match method {
            FillMethod::Select => self.fill_select(element, &web, data),
            FillMethod::CheckBox => {
                let wanted = parse_bool(data).unwrap_or(false);
                if self.driver.is_selected(&web)? != wanted {
                    self.driver.click(&web)?;
                }
                Ok(())
            }
            FillMethod::RadioButton => {
                self.driver.click(&web)?;
                self.driver.click(&web)?;
                Ok(())
            }
            FillMethod::FileUpload => self.fill_file(&web, data),
            FillMethod::Keystrokes => self.fill_keystrokes(element, &web, data),
        }
    }

    fn clear_element(&self, element: &Proxy) -> SpecBindResult<()> {
        let web = self.locate(element)?;
        self.driver.clear(&web)?;
        Ok(())
    }

    fn element_location(&self, element: &Proxy) -> Option<Point> {
        self.resolve(element)
            .and_then(|e| self.driver.location(&e))
            .ok()
    }

    fn highlight(&self, element: &Proxy) {
        let result = self
            .resolve(element)
            .and_then(|e| self.driver.execute_script(HIGHLIGHT_SCRIPT, &[e]));
        if let Err(err) = result {
            tracing::warn!(element = element.name(), %err, "highlight failed");
        }
    }

    fn list_items(&self, list: &Rc<Proxy>) -> SpecBindResult<Vec<Rc<Proxy>>> {
        let binding = list.list().ok_or_else(|| {
            SpecBindError::execute(format!("Property '{}' is not a list", list.name()))
        })?;
        let container = self.locate(list)?;
        let strategies = if binding.item_locator.bys.is_empty() {
            vec![By::XPath("./*".into())]
        } else {
            binding.item_locator.bys.clone()
        };

        let mut found = Vec::new();
        for by in &strategies {
            found = self.driver.find_elements(Some(&container), by)?;
            if !found.is_empty() {
                break;
            }
        }

        Ok(found
            .into_iter()
            .enumerate()
            .map(|(i, web)| {
                Rc::new(ElementProxy::new(
                    format!("{}[{}]", list.name(), i + 1),
                    binding.item_type.clone(),
                    SeleniumLocator::pinned(strategies.clone(), web),
                    Some(Rc::clone(list)),
                ))
            })
            .collect())
    }

    fn table_cells(&self, table: &Proxy) -> SpecBindResult<Vec<Vec<String>>> {
        let rows = table.table_rows().ok_or_else(|| {
            SpecBindError::execute(format!("Property '{}' is not a table", table.name()))
        })?;
        let web = self.locate(table)?;
        let first = |locator: &SeleniumLocator| locator.bys.first().cloned();
        let (Some(row_by), Some(header_by), Some(cell_by)) = (
            first(&rows.row_locator),
            first(&rows.header_cell_locator),
            first(&rows.cell_locator),
        ) else {
            return Err(SpecBindError::construction(format!(
                "Table '{}' has no row or cell locators",
                table.name()
            )));
        };

        let mut cells = Vec::new();
        for row in self.driver.find_elements(Some(&web), &row_by)? {
            let mut row_cells = self.driver.find_elements(Some(&row), &header_by)?;
            if row_cells.is_empty() {
                row_cells = self.driver.find_elements(Some(&row), &cell_by)?;
            }
            let texts = row_cells
                .iter()
                .map(|c| self.driver.text(c))
                .collect::<DriverResult<Vec<_>>>()?;
            cells.push(texts);
        }
        Ok(cells)
    }

    fn combo_box_items(&self, element: &Proxy) -> SpecBindResult<Vec<ComboBoxItem>> {
        let web = self.locate(element)?;
        let mut items = Vec::new();
        for option in self.driver.find_elements(Some(&web), &By::TagName("option".into()))? {
            items.push(ComboBoxItem::new(
                self.driver.text(&option)?,
                self.driver.attribute(&option, "value")?,
            ));
        }
        Ok(items)
    }

    fn waiter(&self) -> Waiter {
        self.waiter
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::builder::PageBuilder;
    use crate::locator::ElementLocator;
    use crate::page::{Page, PageBase};
    use crate::schema::{PageSchema, PropertySchema};
    use crate::selenium::{
        MockChange, MockNode, MockWebDriver, SeleniumPageBuilder, ELEMENT_TYPE, FRAME_TYPE,
        LIST_TYPE, TABLE_TYPE,
    };
    use crate::validation::ValidationTable;
    use crate::wait::{WaitConditions, WaitOptions};

    fn form() -> Vec<MockNode> {
        vec![
            MockNode::new("input").id("user").attr("type", "text").at(10, 10),
            MockNode::new("textarea").id("notes"),
            MockNode::new("input").id("code").attr("type", "text").attr("data-case", "upper"),
            MockNode::new("input").id("agree").attr("type", "checkbox"),
            MockNode::new("input").id("radio").attr("type", "radio").attr("name", "r"),
            MockNode::new("select").id("color").children([
                MockNode::new("option").attr("value", "r").text("Red"),
                MockNode::new("option").attr("value", "g").text("Green").selected(true),
            ]),
            MockNode::new("button").id("go").text("Go"),
            MockNode::new("button").id("off").text("Off").disabled(),
            MockNode::new("div").id("ghost").hidden(),
            MockNode::new("ul").id("items").children([
                MockNode::new("li").child(MockNode::new("span").attr("class", "name").text("one")),
                MockNode::new("li").child(MockNode::new("span").attr("class", "name").text("two")),
            ]),
            MockNode::new("table").id("grid").children([
                MockNode::new("tr").children([
                    MockNode::new("th").text("Name"),
                    MockNode::new("th").text("Age"),
                ]),
                MockNode::new("tr").children([
                    MockNode::new("td").text("Ann"),
                    MockNode::new("td").text("40"),
                ]),
            ]),
            MockNode::new("iframe").id("frame").child(MockNode::new("input").id("inner")),
            MockNode::new("a").id("docs").attr("href", "http://host/docs").text("Docs"),
        ]
    }

    fn schema() -> PageSchema {
        let by_id = |id: &str| ElementLocator::new().id(id);
        let mut schema = PageSchema::new("FormPage");
        for id in ["user", "notes", "code", "agree", "radio", "color", "go", "off", "ghost", "missing"] {
            schema = schema.with_property(PropertySchema::element(id, ELEMENT_TYPE).with_locator(by_id(id)));
        }
        schema
            .with_property(
                PropertySchema::element("items", LIST_TYPE)
                    .with_locator(by_id("items"))
                    .with_nested(
                        PageSchema::new("Item")
                            .with_locator(ElementLocator::new().tag_name("li"))
                            .with_property(
                                PropertySchema::element("Name", ELEMENT_TYPE)
                                    .with_locator(ElementLocator::new().class("name")),
                            ),
                    ),
            )
            .with_property(PropertySchema::element("grid", TABLE_TYPE).with_locator(by_id("grid")))
            .with_property(
                PropertySchema::element("docs", ELEMENT_TYPE)
                    .with_locator(by_id("docs"))
                    .with_virtual("Href", "href"),
            )
            .with_property(
                PropertySchema::element("frame", FRAME_TYPE)
                    .with_locator(by_id("frame"))
                    .with_nested(
                        PageSchema::new("FrameDoc").with_property(
                            PropertySchema::element("inner", ELEMENT_TYPE).with_locator(by_id("inner")),
                        ),
                    ),
            )
    }

    fn page() -> (Rc<MockWebDriver>, PageBase<SeleniumElementHandler<MockWebDriver>>) {
        let driver = Rc::new(MockWebDriver::with_page("http://host/form", form()));
        let handler = SeleniumElementHandler::new(Rc::clone(&driver))
            .with_keystroke_delay(Duration::from_millis(1))
            .with_waiter(Waiter::with_options(WaitOptions::new().with_poll_interval(5)));
        let builder = PageBuilder::new(SeleniumPageBuilder::new());
        let native = builder.create_page(&schema(), None).unwrap();
        (driver, PageBase::new(native, Rc::new(handler)))
    }

    mod fill_method_tests {
        use super::*;

        #[test]
        fn test_dispatch_by_tag_and_type() {
            assert_eq!(FillMethod::for_element("SELECT", None), FillMethod::Select);
            assert_eq!(FillMethod::for_element("input", Some("checkbox")), FillMethod::CheckBox);
            assert_eq!(FillMethod::for_element("input", Some("Radio")), FillMethod::RadioButton);
            assert_eq!(FillMethod::for_element("input", Some("file")), FillMethod::FileUpload);
            assert_eq!(FillMethod::for_element("textarea", None), FillMethod::Keystrokes);
            assert_eq!(FillMethod::for_element("input", Some("text")), FillMethod::Keystrokes);
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_exists_means_displayed() {
            let (_, page) = page();
            let prop = |n: &str| page.try_get_property(n).unwrap();
            assert!(prop("go").check_element_exists());
            assert!(!prop("ghost").check_element_exists());
            assert!(prop("ghost").check_element_not_exists());
            assert!(!prop("missing").check_element_exists());
            assert!(prop("missing").check_element_not_exists());
        }

        #[test]
        fn test_enabled() {
            let (_, page) = page();
            assert!(page.try_get_property("go").unwrap().check_element_enabled());
            assert!(!page.try_get_property("off").unwrap().check_element_enabled());
        }

        #[test]
        fn test_stale_element_is_not_found() {
            let (driver, page) = page();
            let items = page.try_get_property("items").unwrap().get_items().unwrap();
            driver.apply(MockChange::Remove("items".into()));
            let name = items[0].try_get_property("Name").unwrap();
            assert!(!name.check_element_exists());
        }

        #[test]
        fn test_wait_becomes_enabled() {
            let (driver, page) = page();
            driver.schedule(Duration::from_millis(20), MockChange::Enable("off".into()));
            let off = page.try_get_property("off").unwrap();
            assert!(off
                .wait_for_element_condition(WaitConditions::BecomesEnabled, Duration::from_millis(500)));
        }

        #[test]
        fn test_remains_existent_violated() {
            let (driver, page) = page();
            driver.schedule(Duration::from_millis(20), MockChange::Hide("go".into()));
            let go = page.try_get_property("go").unwrap();
            assert!(!go
                .wait_for_element_condition(WaitConditions::RemainsExistent, Duration::from_millis(150)));
        }
    }

    mod fill_tests {
        use super::*;

        #[test]
        fn test_keystrokes_replace_value() {
            let (driver, page) = page();
            let user = page.try_get_property("user").unwrap();
            user.fill_data("alice").unwrap();
            user.fill_data("bob").unwrap();
            assert_eq!(driver.value_of("user").as_deref(), Some("bob"));
            assert_eq!(user.get_current_value().unwrap().as_deref(), Some("bob"));
        }

        #[test]
        fn test_keystrokes_retry_after_dropped_input() {
            let (driver, page) = page();
            driver.drop_keystrokes(2);
            page.try_get_property("notes").unwrap().fill_data("hello").unwrap();
            assert_eq!(driver.value_of("notes").as_deref(), Some("hello"));
            let typed = driver.calls().iter().filter(|c| *c == "send_keys:notes").count();
            assert_eq!(typed, 3);
        }

        #[test]
        fn test_keystrokes_accept_non_ascii_case_change() {
            let (driver, page) = page();
            page.try_get_property("code").unwrap().fill_data("école").unwrap();
            assert_eq!(driver.value_of("code").as_deref(), Some("ÉCOLE"));
            let typed = driver.calls().iter().filter(|c| *c == "send_keys:code").count();
            assert_eq!(typed, 1);
        }

        #[test]
        fn test_keystrokes_fail_after_three_attempts() {
            let (driver, page) = page();
            driver.drop_keystrokes(3);
            let err = page.try_get_property("notes").unwrap().fill_data("hello").unwrap_err();
            assert!(matches!(err, SpecBindError::Driver { .. }));
            assert!(err.to_string().contains("3 attempts"));
        }

        #[test]
        fn test_checkbox_clicks_only_on_change() {
            let (driver, page) = page();
            let agree = page.try_get_property("agree").unwrap();
            agree.fill_data("true").unwrap();
            agree.fill_data("true").unwrap();
            assert!(driver.is_selected_by_id("agree"));
            assert_eq!(driver.calls().iter().filter(|c| *c == "click:agree").count(), 1);
            assert_eq!(agree.get_current_value().unwrap().as_deref(), Some("true"));
        }

        #[test]
        fn test_radio_clicked_twice() {
            let (driver, page) = page();
            page.try_get_property("radio").unwrap().fill_data("x").unwrap();
            assert_eq!(driver.calls().iter().filter(|c| *c == "click:radio").count(), 2);
            assert!(driver.is_selected_by_id("radio"));
        }

        #[test]
        fn test_select_by_text() {
            let (_, page) = page();
            let color = page.try_get_property("color").unwrap();
            assert_eq!(color.get_current_value().unwrap().as_deref(), Some("Green"));
            color.fill_data("red").unwrap();
            assert_eq!(color.get_current_value().unwrap().as_deref(), Some("Red"));
            assert!(color.fill_data("Blue").is_err());
            let items = color.get_combo_box_items().unwrap();
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].value.as_deref(), Some("r"));
        }

        #[test]
        fn test_fill_missing_element_is_driver_error() {
            let (_, page) = page();
            let err = page.try_get_property("missing").unwrap().fill_data("x").unwrap_err();
            assert!(err.to_string().contains("no such element"));
        }
    }

    mod structure_tests {
        use super::*;

        #[test]
        fn test_list_items_are_pinned_pages() {
            let (_, page) = page();
            let items = page.try_get_property("items").unwrap().get_items().unwrap();
            assert_eq!(items.len(), 2);
            let second = items[1].try_get_property("Name").unwrap();
            assert_eq!(second.get_current_value().unwrap().as_deref(), Some("two"));
        }

        #[test]
        fn test_table_rows_by_header() {
            let (_, page) = page();
            let rows = page.try_get_property("grid").unwrap().get_items().unwrap();
            assert_eq!(rows.len(), 1);
            let age = rows[0].try_get_property("age").unwrap();
            assert_eq!(age.get_current_value().unwrap().as_deref(), Some("40"));
        }

        #[test]
        fn test_frame_document_switches_context() {
            let (driver, page) = page();
            let frame = page.try_get_property("frame").unwrap().get_item_as_page().unwrap();
            let inner = frame.try_get_property("inner").unwrap();
            inner.fill_data("deep").unwrap();
            assert_eq!(driver.value_of("inner").as_deref(), Some("deep"));
            // Top-level lookups switch back out of the frame
            assert!(page.try_get_property("go").unwrap().check_element_exists());
        }

        #[test]
        fn test_highlight_runs_script() {
            let (driver, page) = page();
            page.try_get_property("go").unwrap().highlight();
            assert_eq!(driver.scripts().len(), 1);
        }

        #[test]
        fn test_virtual_alias_reads_base_element_attribute() {
            let (_, page) = page();
            let href = page.try_get_property("Href").unwrap();
            assert_eq!(href.get_current_value().unwrap().as_deref(), Some("http://host/docs"));
            let docs = page.try_get_property("docs").unwrap();
            assert_eq!(docs.get_current_value().unwrap().as_deref(), Some("Docs"));

            let mut table = ValidationTable::new();
            table.add("Href", "equals", "http://host/docs");
            table.add("docs", "equals", "Docs");
            assert!(table.validate_page(&page).unwrap().is_valid());

            let mut wrong = ValidationTable::new();
            wrong.add("Href", "contains", "/other");
            let result = wrong.validate_page(&page).unwrap();
            assert!(!result.is_valid());
            assert_eq!(
                result.property_results[0].actual_value.as_deref(),
                Some("http://host/docs")
            );
        }
    }
}
