//! Element operations against a [`UiAutomation`] window.
//!
//! Data entry sets the property the control type exposes for it instead of
//! typing keystrokes, so there is no read-back retry loop here.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use super::{ControlRef, SearchSpec, UiAutomation, UiError, UiResult, TAG_INSTANCE};
use crate::element_type::ElementKind;
use crate::handler::{ComboBoxItem, PageElementHandler};
use crate::proxy::ElementProxy;
use crate::result::{SpecBindError, SpecBindResult};
use crate::validation::parse_bool;
use crate::wait::{Point, Waiter};

type Proxy = ElementProxy<SearchSpec>;

/// Property that receives entered data, chosen from the live control type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFill {
    /// `Text` on edits and anything unrecognized
    Text,
    /// `SelectedItem` on combo boxes
    SelectedItem,
    /// `Checked` on check boxes
    Checked,
    /// `Selected` on radio buttons
    Selected,
    /// `FileName` on file inputs
    FileName,
}

impl ControlFill {
    /// Pick the fill property for a control type
    #[must_use]
    pub fn for_control(control_type: &str) -> Self {
        match control_type.to_lowercase().as_str() {
            "combobox" => Self::SelectedItem,
            "checkbox" => Self::Checked,
            "radiobutton" => Self::Selected,
            "fileinput" => Self::FileName,
            _ => Self::Text,
        }
    }

    /// Automation property name
    #[must_use]
    pub const fn property(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::SelectedItem => "SelectedItem",
            Self::Checked => "Checked",
            Self::Selected => "Selected",
            Self::FileName => "FileName",
        }
    }
}

/// [`PageElementHandler`] for HTML controls in a browser window
pub struct CodedUIElementHandler<A: UiAutomation> {
    automation: Rc<A>,
    waiter: Waiter,
}

impl<A: UiAutomation> fmt::Debug for CodedUIElementHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodedUIElementHandler")
            .field("waiter", &self.waiter)
            .finish_non_exhaustive()
    }
}

impl<A: UiAutomation> CodedUIElementHandler<A> {
    /// Handler over a running window
    pub fn new(automation: Rc<A>) -> Self {
        Self {
            automation,
            waiter: Waiter::new(),
        }
    }

    /// Poller used for element waits
    #[must_use]
    pub fn with_waiter(mut self, waiter: Waiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// The wrapped automation API
    pub fn automation(&self) -> &Rc<A> {
        &self.automation
    }

    /// Find the live control behind a proxy
    ///
    /// # Errors
    ///
    /// `ElementLocatorMissing` when the proxy has nothing to search with;
    /// a driver error when no control matches.
    pub fn locate(&self, element: &Proxy) -> SpecBindResult<ControlRef> {
        if element.locator().is_empty() {
            return Err(SpecBindError::ElementLocatorMissing {
                element: element.name().to_string(),
            });
        }
        self.resolve(element).map_err(SpecBindError::from)
    }

    fn resolve(&self, element: &Proxy) -> UiResult<ControlRef> {
        let locator = element.locator();
        if let Some(pinned) = &locator.resolved {
            return Ok(pinned.clone());
        }
        let scope = self.resolve_scope(element.parent())?;
        self.automation
            .find_controls(scope.as_ref(), locator)?
            .into_iter()
            .next()
            .ok_or_else(|| UiError::ControlNotFound(format!("'{}' using [{locator}]", element.name())))
    }

    /// Frames need no switching; a located frame is simply the next scope
    fn resolve_scope(&self, parent: Option<&Rc<Proxy>>) -> UiResult<Option<ControlRef>> {
        let Some(parent) = parent else {
            return Ok(None);
        };
        match parent.kind() {
            ElementKind::Document if parent.locator().resolved.is_none() => {
                self.resolve_scope(parent.parent())
            }
            _ => self.resolve(parent).map(Some),
        }
    }

    fn check(&self, element: &Proxy, read: impl FnOnce(&ControlRef) -> UiResult<bool>) -> bool {
        match self.resolve(element).and_then(|c| read(&c)) {
            Ok(state) => state,
            Err(err) if err.is_transient() => false,
            Err(err) => {
                tracing::warn!(element = element.name(), %err, "automation error during state check");
                false
            }
        }
    }

    fn children_of_type(&self, scope: &ControlRef, control_type: &str) -> UiResult<Vec<ControlRef>> {
        let spec = SearchSpec {
            control_type: Some(control_type.to_string()),
            ..SearchSpec::default()
        };
        self.automation.find_controls(Some(scope), &spec)
    }

    fn inner_text(&self, control: &ControlRef) -> UiResult<String> {
        Ok(self
            .automation
            .get_property(control, "InnerText")?
            .unwrap_or_default())
    }

    fn select_item(&self, element: &Proxy, control: &ControlRef, data: &str) -> SpecBindResult<String> {
        let wanted = data.trim();
        for item in self.children_of_type(control, "ListItem")? {
            let text = self.inner_text(&item)?;
            if text.trim().eq_ignore_ascii_case(wanted) {
                return Ok(text);
            }
        }
        Err(SpecBindError::execute(format!(
            "Option '{data}' was not found in list '{}'",
            element.name()
        )))
    }
}

fn display_bool(raw: Option<String>) -> Option<String> {
    raw.map(|v| parse_bool(&v).unwrap_or(false).to_string())
}

impl<A: UiAutomation + 'static> PageElementHandler for CodedUIElementHandler<A> {
    type Locator = SearchSpec;

    fn element_exists_check(&self, element: &Proxy) -> bool {
        self.check(element, |c| self.automation.exists(c))
    }

    fn element_not_exists_check(&self, element: &Proxy) -> bool {
        match self.resolve(element).and_then(|c| self.automation.exists(&c)) {
            Ok(exists) => !exists,
            Err(err) if err.is_transient() => true,
            Err(err) => {
                tracing::warn!(element = element.name(), %err, "automation error during state check");
                false
            }
        }
    }

    fn element_enabled_check(&self, element: &Proxy) -> bool {
        self.check(element, |c| self.automation.enabled(c))
    }

    fn click_element(&self, element: &Proxy) -> SpecBindResult<()> {
        let control = self.locate(element)?;
        tracing::debug!(element = element.name(), "click");
        self.automation.click(&control)?;
        Ok(())
    }

    fn hover_element(&self, element: &Proxy) -> SpecBindResult<()> {
        let control = self.locate(element)?;
        self.automation.hover(&control)?;
        Ok(())
    }

    fn get_element_text(&self, element: &Proxy) -> SpecBindResult<Option<String>> {
        let control = self.locate(element)?;
        let control_type = self.automation.control_type(&control)?;
        let value = match ControlFill::for_control(&control_type) {
            ControlFill::Checked => display_bool(self.automation.get_property(&control, "Checked")?),
            ControlFill::Selected => display_bool(self.automation.get_property(&control, "Selected")?),
            ControlFill::Text if !control_type.eq_ignore_ascii_case("Edit") => {
                let property = element.element_type().text_property.as_deref().unwrap_or(
                    if control_type.eq_ignore_ascii_case("Button") {
                        "DisplayText"
                    } else {
                        "InnerText"
                    },
                );
                self.automation.get_property(&control, property)?
            }
            fill => self.automation.get_property(&control, fill.property())?,
        };
        Ok(value)
    }

    fn get_element_attribute(&self, element: &Proxy, attribute: &str) -> SpecBindResult<Option<String>> {
        let control = self.locate(element)?;
        Ok(self.automation.get_property(&control, attribute)?)
    }

    fn fill_element(&self, element: &Proxy, data: &str) -> SpecBindResult<()> {
        let control = self.locate(element)?;
        let fill = ControlFill::for_control(&self.automation.control_type(&control)?);
        tracing::debug!(element = element.name(), ?fill, "fill");
        let value = match fill {
            ControlFill::Text => data.to_string(),
            ControlFill::SelectedItem => self.select_item(element, &control, data)?,
            ControlFill::Checked => {
                let checked = if parse_bool(data).unwrap_or(false) { "True" } else { "False" };
                checked.to_string()
            }
            ControlFill::Selected => "True".to_string(),
            ControlFill::FileName => {
                let path = Path::new(data.trim());
                path.canonicalize()
                    .map_err(|e| {
                        SpecBindError::invalid_argument(
                            "data",
                            format!("File '{}' cannot be uploaded: {e}", path.display()),
                        )
                    })?
                    .to_string_lossy()
                    .into_owned()
            }
        };
        self.automation.set_property(&control, fill.property(), &value)?;
        Ok(())
    }

    fn clear_element(&self, element: &Proxy) -> SpecBindResult<()> {
        let control = self.locate(element)?;
        match ControlFill::for_control(&self.automation.control_type(&control)?) {
            ControlFill::Checked => self.automation.set_property(&control, "Checked", "False")?,
            fill => self.automation.set_property(&control, fill.property(), "")?,
        }
        Ok(())
    }

    fn element_location(&self, element: &Proxy) -> Option<Point> {
        self.resolve(element)
            .and_then(|c| self.automation.location(&c))
            .ok()
    }

    fn highlight(&self, element: &Proxy) {
        if let Err(err) = self.resolve(element).and_then(|c| self.automation.draw_highlight(&c)) {
            tracing::warn!(element = element.name(), %err, "highlight failed");
        }
    }

    fn list_items(&self, list: &Rc<Proxy>) -> SpecBindResult<Vec<Rc<Proxy>>> {
        let binding = list.list().ok_or_else(|| {
            SpecBindError::execute(format!("Property '{}' is not a list", list.name()))
        })?;
        let container = self.locate(list)?;

        let mut items = Vec::new();
        for instance in 1.. {
            let mut spec = binding.item_locator.clone();
            spec.set_filter(TAG_INSTANCE, instance.to_string());
            let Some(control) = self
                .automation
                .find_controls(Some(&container), &spec)?
                .into_iter()
                .next()
            else {
                break;
            };
            spec.resolved = Some(control);
            items.push(Rc::new(ElementProxy::new(
                format!("{}[{instance}]", list.name()),
                binding.item_type.clone(),
                spec,
                Some(Rc::clone(list)),
            )));
        }
        Ok(items)
    }

    fn table_cells(&self, table: &Proxy) -> SpecBindResult<Vec<Vec<String>>> {
        let rows = table.table_rows().ok_or_else(|| {
            SpecBindError::execute(format!("Property '{}' is not a table", table.name()))
        })?;
        let control = self.locate(table)?;
        let mut cells = Vec::new();
        for row in self.automation.find_controls(Some(&control), &rows.row_locator)? {
            let mut row_cells = self.automation.find_controls(Some(&row), &rows.header_cell_locator)?;
            if row_cells.is_empty() {
                row_cells = self.automation.find_controls(Some(&row), &rows.cell_locator)?;
            }
            cells.push(
                row_cells
                    .iter()
                    .map(|c| self.inner_text(c))
                    .collect::<UiResult<Vec<_>>>()?,
            );
        }
        Ok(cells)
    }

    fn combo_box_items(&self, element: &Proxy) -> SpecBindResult<Vec<ComboBoxItem>> {
        let control = self.locate(element)?;
        let mut items = Vec::new();
        for item in self.children_of_type(&control, "ListItem")? {
            items.push(ComboBoxItem::new(
                self.inner_text(&item)?,
                self.automation.get_property(&item, "ValueAttribute")?,
            ));
        }
        Ok(items)
    }

    fn waiter(&self) -> Waiter {
        self.waiter
    }
}
