//! Search-property synthesis for HTML controls.

use crate::builder::BuilderHooks;
use crate::element_type::{ElementKind, ElementType, ElementTypeRegistry};
use crate::locator::{non_blank, ordered_native_locators, ElementLocator, How, NativeLocator};
use crate::proxy::TableRows;
use crate::result::SpecBindResult;

use super::{SearchSpec, BROWSER_TYPE, CONTROL_TYPE, DOCUMENT_TYPE, LIST_TYPE, TAG_INSTANCE};

/// Control type names paired with their automation control type
const HTML_CONTROLS: &[(&str, ElementKind, Option<&str>)] = &[
    ("HtmlButton", ElementKind::Element, Some("Button")),
    ("HtmlEdit", ElementKind::Element, Some("Edit")),
    ("HtmlDiv", ElementKind::Element, Some("Pane")),
    ("HtmlHyperlink", ElementKind::Element, Some("Hyperlink")),
    ("HtmlImage", ElementKind::Element, Some("Image")),
    ("HtmlComboBox", ElementKind::Element, Some("ComboBox")),
    ("HtmlCheckBox", ElementKind::Element, Some("CheckBox")),
    ("HtmlRadioButton", ElementKind::Element, Some("RadioButton")),
    ("HtmlFileInput", ElementKind::Element, Some("FileInput")),
    ("HtmlTable", ElementKind::Table, Some("Table")),
    ("HtmlIFrame", ElementKind::Frame, Some("IFrame")),
    ("HtmlCustom", ElementKind::Element, None),
    (CONTROL_TYPE, ElementKind::Element, None),
];

/// Builder hooks for HTML controls
#[derive(Debug)]
pub struct CodedUIPageBuilder {
    registry: ElementTypeRegistry,
}

impl Default for CodedUIPageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodedUIPageBuilder {
    /// Hooks with the standard HTML control types
    #[must_use]
    pub fn new() -> Self {
        let mut registry = ElementTypeRegistry::new(BROWSER_TYPE, CONTROL_TYPE, DOCUMENT_TYPE);
        registry.register(
            ElementType::new(DOCUMENT_TYPE, ElementKind::Document, CONTROL_TYPE).with_tag("Document"),
        );
        for (name, kind, control_type) in HTML_CONTROLS {
            let mut element_type = ElementType::new(*name, *kind, CONTROL_TYPE);
            if let Some(control_type) = control_type {
                element_type = element_type.with_tag(*control_type);
            }
            if *name == "HtmlButton" {
                element_type = element_type.with_text_property("DisplayText");
            }
            registry.register(element_type);
        }
        registry.register(ElementType::new(LIST_TYPE, ElementKind::List, CONTROL_TYPE));
        registry.register_abstract("IElementList", LIST_TYPE);
        Self { registry }
    }

    /// Register an extra control type
    pub fn register(&mut self, element_type: ElementType) {
        self.registry.register(element_type);
    }
}

impl BuilderHooks for CodedUIPageBuilder {
    type Locator = SearchSpec;

    fn registry(&self) -> &ElementTypeRegistry {
        &self.registry
    }

    fn assign_element_attributes(
        &self,
        element_type: &ElementType,
        element_name: &str,
        locator: Option<&ElementLocator>,
        native: &[NativeLocator],
        target: &mut SearchSpec,
    ) -> SpecBindResult<()> {
        if target.control_type.is_none() {
            target.control_type.clone_from(&element_type.tag);
        }

        if let Some(locator) = locator {
            assign_search_properties(element_type, locator, target);
        }

        for declared in ordered_native_locators(native) {
            let property = match declared.how {
                How::Id => "Id",
                How::Name => "Name",
                How::ClassName => "Class",
                How::LinkText => "InnerText",
                How::TagName => "TagName",
                How::XPath | How::CssSelector => {
                    tracing::debug!(
                        element = element_name,
                        how = ?declared.how,
                        "native locator has no search property equivalent; skipped"
                    );
                    continue;
                }
            };
            if target.search(property).is_none() {
                target.set_search(property, declared.using.clone());
            }
        }

        tracing::trace!(element = element_name, search = %target, "assigned search properties");
        Ok(())
    }

    fn table_row_locator(&self, _table_type: &ElementType) -> TableRows<SearchSpec> {
        let of_type = |control_type: &str| SearchSpec {
            control_type: Some(control_type.to_string()),
            ..SearchSpec::default()
        };
        TableRows {
            row_locator: of_type("Row"),
            header_cell_locator: of_type("ColumnHeader"),
            cell_locator: of_type("Cell"),
        }
    }
}

fn assign_search_properties(element_type: &ElementType, locator: &ElementLocator, target: &mut SearchSpec) {
    if let Some(id) = non_blank(&locator.id) {
        target.set_search("Id", id);
    }
    if let Some(name) = non_blank(&locator.name) {
        target.set_search("Name", name);
    }
    if let Some(tag) = non_blank(&locator.tag_name) {
        target.set_search("TagName", tag);
    }
    if let Some(class) = non_blank(&locator.class) {
        target.set_search("Class", class);
    }
    if let Some(title) = non_blank(&locator.title) {
        target.set_search("Title", title);
    }
    if let Some(input_type) = non_blank(&locator.input_type) {
        target.set_search("Type", input_type);
    }
    if let Some(alt) = non_blank(&locator.alt) {
        target.set_search("Alt", alt);
    }
    if let Some(value) = non_blank(&locator.value) {
        target.set_search("ValueAttribute", value);
    }
    if let Some(text) = non_blank(&locator.text) {
        let property = element_type.text_property.as_deref().unwrap_or("InnerText");
        target.set_search(property, text);
    }
    if let Some(url) = non_blank(&locator.url) {
        let image = element_type.tag.as_deref() == Some("Image")
            || non_blank(&locator.tag_name).is_some_and(|t| t.eq_ignore_ascii_case("img"));
        target.set_search(if image { "Src" } else { "Href" }, url);
    }
    if let Some(automation_id) = non_blank(&locator.accessibility_id) {
        target.set_search("AutomationId", automation_id);
    }
    if let Some(index) = locator.index {
        target.set_filter(TAG_INSTANCE, index.to_string());
    }
    if non_blank(&locator.xpath).is_some() || non_blank(&locator.css_selector).is_some() {
        tracing::debug!("xpath and css criteria are not used by search properties");
    }
}
