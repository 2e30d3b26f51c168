//! Runtime-bound property accessors.
//!
//! A [`PropertyData`] is bound to one property slot of one built page. It
//! is exactly one of: an element that drives the UI, a list of item pages, or
//! a plain value with no UI behind it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::builder::FactoryArgs;
use crate::handler::{ComboBoxItem, PageElementHandler};
use crate::page::{Page, PageBase, TableRowPage};
use crate::proxy::{ElementProxy, NativePage};
use crate::result::{SpecBindError, SpecBindResult};
use crate::validation::{
    ComparisonType, ItemValidation, ListComparison, ValidationResult, ValidationTable,
};
use crate::wait::WaitConditions;

// =============================================================================
// ACCESS TRAITS
// =============================================================================

/// Element operations bound to one proxy
pub trait ElementAccess {
    /// Click
    fn click(&self) -> SpecBindResult<()>;
    /// Hover
    fn hover(&self) -> SpecBindResult<()>;
    /// Enter data
    fn fill(&self, data: &str) -> SpecBindResult<()>;
    /// Clear data
    fn clear(&self) -> SpecBindResult<()>;
    /// Current value (text, or the bound attribute for virtual properties)
    fn value(&self) -> SpecBindResult<Option<String>>;
    /// Existence check
    fn exists(&self) -> bool;
    /// Non-existence check
    fn not_exists(&self) -> bool;
    /// Enabled check
    fn enabled(&self) -> bool;
    /// Wait for a condition
    fn wait_for(&self, condition: WaitConditions, timeout: Duration) -> bool;
    /// Highlight
    fn highlight(&self);
    /// Combo box options
    fn combo_box_items(&self) -> SpecBindResult<Vec<ComboBoxItem>>;
    /// The element's nested properties as a page
    fn as_page(&self) -> SpecBindResult<Rc<dyn Page>>;
}

/// List operations bound to one list or table proxy
pub trait ListAccess {
    /// Every item as a page, in UI order
    fn items(&self) -> SpecBindResult<Vec<Rc<dyn Page>>>;
    /// Whether the container exists
    fn exists(&self) -> bool;
    /// Highlight the container
    fn highlight(&self);
}

// =============================================================================
// DRIVER BINDINGS
// =============================================================================

/// An element slot bound to a handler
pub struct BoundElement<H: PageElementHandler> {
    handler: Rc<H>,
    proxy: Rc<ElementProxy<H::Locator>>,
    attribute: Option<String>,
    nested: Option<Rc<NativePage<H::Locator>>>,
}

impl<H: PageElementHandler> BoundElement<H> {
    /// Bind a proxy; `attribute` makes this a virtual property
    pub fn new(
        handler: Rc<H>,
        proxy: Rc<ElementProxy<H::Locator>>,
        attribute: Option<String>,
        nested: Option<Rc<NativePage<H::Locator>>>,
    ) -> Self {
        Self {
            handler,
            proxy,
            attribute,
            nested,
        }
    }
}

impl<H: PageElementHandler> ElementAccess for BoundElement<H> {
    fn click(&self) -> SpecBindResult<()> {
        self.handler.click_element(&self.proxy)
    }

    fn hover(&self) -> SpecBindResult<()> {
        self.handler.hover_element(&self.proxy)
    }

    fn fill(&self, data: &str) -> SpecBindResult<()> {
        self.handler.fill_element(&self.proxy, data)
    }

    fn clear(&self) -> SpecBindResult<()> {
        self.handler.clear_element(&self.proxy)
    }

    fn value(&self) -> SpecBindResult<Option<String>> {
        match &self.attribute {
            Some(attribute) => self.handler.get_element_attribute(&self.proxy, attribute),
            None => self.handler.get_element_text(&self.proxy),
        }
    }

    fn exists(&self) -> bool {
        self.handler.element_exists_check(&self.proxy)
    }

    fn not_exists(&self) -> bool {
        self.handler.element_not_exists_check(&self.proxy)
    }

    fn enabled(&self) -> bool {
        self.handler.element_enabled_check(&self.proxy)
    }

    fn wait_for(&self, condition: WaitConditions, timeout: Duration) -> bool {
        self.handler.wait_for_element(&self.proxy, condition, timeout)
    }

    fn highlight(&self) {
        self.handler.highlight(&self.proxy);
    }

    fn combo_box_items(&self) -> SpecBindResult<Vec<ComboBoxItem>> {
        self.handler.combo_box_items(&self.proxy)
    }

    fn as_page(&self) -> SpecBindResult<Rc<dyn Page>> {
        let nested = self.nested.as_ref().ok_or_else(|| {
            SpecBindError::execute(format!(
                "Property '{}' does not declare nested properties and cannot be used as a page",
                self.proxy.name()
            ))
        })?;
        Ok(Rc::new(PageBase::new(Rc::clone(nested), Rc::clone(&self.handler))))
    }
}

/// A list wrapper bound to a handler
pub struct BoundList<H: PageElementHandler> {
    handler: Rc<H>,
    proxy: Rc<ElementProxy<H::Locator>>,
}

impl<H: PageElementHandler> BoundList<H> {
    /// Bind a list proxy
    pub fn new(handler: Rc<H>, proxy: Rc<ElementProxy<H::Locator>>) -> Self {
        Self { handler, proxy }
    }
}

impl<H: PageElementHandler> ListAccess for BoundList<H> {
    fn items(&self) -> SpecBindResult<Vec<Rc<dyn Page>>> {
        let binding = self.proxy.list().ok_or_else(|| {
            SpecBindError::execute(format!("Property '{}' is not a list", self.proxy.name()))
        })?;
        let roots = self.handler.list_items(&self.proxy)?;
        tracing::trace!(list = self.proxy.name(), count = roots.len(), "resolved list items");
        roots
            .into_iter()
            .map(|root| {
                let native = binding.item_factory.create(
                    FactoryArgs {
                        parent: None,
                        root: Some(root),
                    },
                    None,
                )?;
                Ok(Rc::new(PageBase::new(native, Rc::clone(&self.handler))) as Rc<dyn Page>)
            })
            .collect()
    }

    fn exists(&self) -> bool {
        self.handler.element_exists_check(&self.proxy)
    }

    fn highlight(&self) {
        self.handler.highlight(&self.proxy);
    }
}

/// A table bound to a handler; each data row is an item keyed by header text
pub struct BoundTable<H: PageElementHandler> {
    handler: Rc<H>,
    proxy: Rc<ElementProxy<H::Locator>>,
}

impl<H: PageElementHandler> BoundTable<H> {
    /// Bind a table proxy
    pub fn new(handler: Rc<H>, proxy: Rc<ElementProxy<H::Locator>>) -> Self {
        Self { handler, proxy }
    }
}

impl<H: PageElementHandler> ListAccess for BoundTable<H> {
    fn items(&self) -> SpecBindResult<Vec<Rc<dyn Page>>> {
        let mut rows = self.handler.table_cells(&self.proxy)?.into_iter();
        let Some(headers) = rows.next() else {
            return Ok(Vec::new());
        };
        Ok(rows
            .map(|cells| Rc::new(TableRowPage::new(&headers, cells)) as Rc<dyn Page>)
            .collect())
    }

    fn exists(&self) -> bool {
        self.handler.element_exists_check(&self.proxy)
    }

    fn highlight(&self) {
        self.handler.highlight(&self.proxy);
    }
}

// =============================================================================
// PROPERTY DATA
// =============================================================================

/// A plain value slot
#[derive(Debug, Clone)]
pub struct ValueSlot {
    cell: Rc<RefCell<Option<String>>>,
    writable: bool,
}

impl ValueSlot {
    /// Wrap a value cell
    pub fn new(cell: Rc<RefCell<Option<String>>>, writable: bool) -> Self {
        Self { cell, writable }
    }
}

/// What a property is bound to
#[derive(Clone)]
pub enum PropertyKind {
    /// Drives one UI element
    Element(Rc<dyn ElementAccess>),
    /// Enumerates item pages
    List(Rc<dyn ListAccess>),
    /// Plain value
    Value(ValueSlot),
}

/// Accessor for one named property of one page
#[derive(Clone)]
pub struct PropertyData {
    name: String,
    kind: PropertyKind,
}

impl fmt::Debug for PropertyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            PropertyKind::Element(_) => "element",
            PropertyKind::List(_) => "list",
            PropertyKind::Value(_) => "value",
        };
        f.debug_struct("PropertyData")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

impl PropertyData {
    /// Bind a property
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Property name as declared
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binding
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Drives a UI element
    pub fn is_element(&self) -> bool {
        matches!(self.kind, PropertyKind::Element(_))
    }

    /// Enumerates items
    pub fn is_list(&self) -> bool {
        matches!(self.kind, PropertyKind::List(_))
    }

    fn element(&self) -> SpecBindResult<&Rc<dyn ElementAccess>> {
        match &self.kind {
            PropertyKind::Element(element) => Ok(element),
            _ => Err(SpecBindError::execute(format!(
                "Property '{}' is not an element",
                self.name
            ))),
        }
    }

    fn list(&self) -> SpecBindResult<&Rc<dyn ListAccess>> {
        match &self.kind {
            PropertyKind::List(list) => Ok(list),
            _ => Err(SpecBindError::execute(format!(
                "Property '{}' is not a list",
                self.name
            ))),
        }
    }

    /// Click the element
    pub fn click_element(&self) -> SpecBindResult<()> {
        self.element()?.click()
    }

    /// Hover over the element
    pub fn hover(&self) -> SpecBindResult<()> {
        self.element()?.hover()
    }

    /// Enter data into an element, or set a writable value
    pub fn fill_data(&self, data: &str) -> SpecBindResult<()> {
        match &self.kind {
            PropertyKind::Element(element) => element.fill(data),
            PropertyKind::Value(slot) => self.write_value(slot, Some(data.to_string())),
            PropertyKind::List(_) => Err(SpecBindError::execute(format!(
                "Property '{}' is a list and cannot be filled",
                self.name
            ))),
        }
    }

    /// Clear an element, or reset a writable value
    pub fn clear_data(&self) -> SpecBindResult<()> {
        match &self.kind {
            PropertyKind::Element(element) => element.clear(),
            PropertyKind::Value(slot) => self.write_value(slot, None),
            PropertyKind::List(_) => Err(SpecBindError::execute(format!(
                "Property '{}' is a list and cannot be cleared",
                self.name
            ))),
        }
    }

    fn write_value(&self, slot: &ValueSlot, value: Option<String>) -> SpecBindResult<()> {
        if !slot.writable {
            return Err(SpecBindError::execute(format!(
                "Property '{}' is read-only",
                self.name
            )));
        }
        *slot.cell.borrow_mut() = value;
        Ok(())
    }

    /// Current value
    pub fn get_current_value(&self) -> SpecBindResult<Option<String>> {
        match &self.kind {
            PropertyKind::Element(element) => element.value(),
            PropertyKind::Value(slot) => Ok(slot.cell.borrow().clone()),
            PropertyKind::List(_) => Err(SpecBindError::execute(format!(
                "Property '{}' is a list; use a list validation",
                self.name
            ))),
        }
    }

    /// Evaluate one rule, returning the verdict and the value observed
    pub fn validate_item(&self, validation: &ItemValidation) -> SpecBindResult<(bool, Option<String>)> {
        let rule = validation.comparison_type;
        if rule.is_state_check() {
            let observed = match rule {
                ComparisonType::Exists => self.check_element_exists(),
                ComparisonType::DoesNotExist => self.check_element_not_exists(),
                ComparisonType::Enabled => self.check_element_enabled(),
                _ => !self.check_element_enabled(),
            };
            let valid = rule.compare_state(&validation.comparison_value, observed);
            return Ok((valid, Some(observed.to_string())));
        }
        let actual = self.get_current_value()?;
        let valid = rule.compare(&validation.comparison_value, actual.as_deref());
        Ok((valid, actual))
    }

    /// Element exists; value properties always exist
    pub fn check_element_exists(&self) -> bool {
        match &self.kind {
            PropertyKind::Element(element) => element.exists(),
            PropertyKind::List(list) => list.exists(),
            PropertyKind::Value(_) => true,
        }
    }

    /// Element does not exist
    pub fn check_element_not_exists(&self) -> bool {
        match &self.kind {
            PropertyKind::Element(element) => element.not_exists(),
            PropertyKind::List(list) => !list.exists(),
            PropertyKind::Value(_) => false,
        }
    }

    /// Element is enabled; value properties count as enabled
    pub fn check_element_enabled(&self) -> bool {
        match &self.kind {
            PropertyKind::Element(element) => element.enabled(),
            PropertyKind::List(list) => list.exists(),
            PropertyKind::Value(_) => true,
        }
    }

    /// Wait for an element condition; `false` for non-elements
    pub fn wait_for_element_condition(&self, condition: WaitConditions, timeout: Duration) -> bool {
        match &self.kind {
            PropertyKind::Element(element) => element.wait_for(condition, timeout),
            _ => false,
        }
    }

    /// Highlight the element or list container
    pub fn highlight(&self) {
        match &self.kind {
            PropertyKind::Element(element) => element.highlight(),
            PropertyKind::List(list) => list.highlight(),
            PropertyKind::Value(_) => {}
        }
    }

    /// Item pages of a list
    pub fn get_items(&self) -> SpecBindResult<Vec<Rc<dyn Page>>> {
        self.list()?.items()
    }

    /// Item page at a zero-based index
    pub fn get_item_at_index(&self, index: usize) -> SpecBindResult<Option<Rc<dyn Page>>> {
        Ok(self.get_items()?.into_iter().nth(index))
    }

    /// First item matching every rule, plus the evaluation of all items
    pub fn find_item_in_list(
        &self,
        table: &ValidationTable,
    ) -> SpecBindResult<(Option<Rc<dyn Page>>, ValidationResult)> {
        let items = self.get_items()?;
        let mut results = Vec::with_capacity(items.len());
        let mut found = None;
        for item in &items {
            let result = table.validate_page(item.as_ref())?;
            if found.is_none() && result.is_valid() {
                found = Some(Rc::clone(item));
            }
            results.push(result);
        }
        Ok((
            found,
            ValidationResult::for_list(table, results, ListComparison::Contains),
        ))
    }

    /// Validate every item and combine per `comparison`
    pub fn validate_list(
        &self,
        comparison: ListComparison,
        table: &ValidationTable,
    ) -> SpecBindResult<ValidationResult> {
        let items = self.get_items()?;
        ValidationResult::validate_list(table, &items, comparison)
    }

    /// Options of a combo box element
    pub fn get_combo_box_items(&self) -> SpecBindResult<Vec<ComboBoxItem>> {
        self.element()?.combo_box_items()
    }

    /// The element's nested properties as a page
    pub fn get_item_as_page(&self) -> SpecBindResult<Rc<dyn Page>> {
        self.element()?.as_page()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeElement {
        clicks: Cell<u32>,
        text: RefCell<Option<String>>,
        present: bool,
    }

    impl ElementAccess for FakeElement {
        fn click(&self) -> SpecBindResult<()> {
            self.clicks.set(self.clicks.get() + 1);
            Ok(())
        }
        fn hover(&self) -> SpecBindResult<()> {
            Ok(())
        }
        fn fill(&self, data: &str) -> SpecBindResult<()> {
            *self.text.borrow_mut() = Some(data.to_string());
            Ok(())
        }
        fn clear(&self) -> SpecBindResult<()> {
            *self.text.borrow_mut() = None;
            Ok(())
        }
        fn value(&self) -> SpecBindResult<Option<String>> {
            Ok(self.text.borrow().clone())
        }
        fn exists(&self) -> bool {
            self.present
        }
        fn not_exists(&self) -> bool {
            !self.present
        }
        fn enabled(&self) -> bool {
            self.present
        }
        fn wait_for(&self, _condition: WaitConditions, _timeout: Duration) -> bool {
            self.present
        }
        fn highlight(&self) {}
        fn combo_box_items(&self) -> SpecBindResult<Vec<ComboBoxItem>> {
            Ok(vec![ComboBoxItem::new("One", Some("1".into()))])
        }
        fn as_page(&self) -> SpecBindResult<Rc<dyn Page>> {
            Err(SpecBindError::execute("no nested"))
        }
    }

    fn element(present: bool) -> (Rc<FakeElement>, PropertyData) {
        let fake = Rc::new(FakeElement {
            present,
            ..FakeElement::default()
        });
        let data = PropertyData::new("Name", PropertyKind::Element(fake.clone()));
        (fake, data)
    }

    fn value(initial: Option<&str>, writable: bool) -> PropertyData {
        PropertyData::new(
            "Counter",
            PropertyKind::Value(ValueSlot::new(
                Rc::new(RefCell::new(initial.map(str::to_string))),
                writable,
            )),
        )
    }

    mod kind_tests {
        use super::*;

        #[test]
        fn test_kinds_are_exclusive() {
            let (_, e) = element(true);
            assert!(e.is_element() && !e.is_list());
            let v = value(None, true);
            assert!(!v.is_element() && !v.is_list());
        }

        #[test]
        fn test_list_ops_on_element_fail() {
            let (_, e) = element(true);
            let err = e.get_items().unwrap_err();
            assert!(err.to_string().contains("is not a list"));
        }

        #[test]
        fn test_element_ops_on_value_fail() {
            let v = value(None, true);
            assert!(v.click_element().unwrap_err().to_string().contains("is not an element"));
            assert!(!v.wait_for_element_condition(WaitConditions::BecomesExistent, Duration::ZERO));
        }
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_fill_and_read() {
            let (fake, e) = element(true);
            e.fill_data("Bob").unwrap();
            assert_eq!(e.get_current_value().unwrap().as_deref(), Some("Bob"));
            e.click_element().unwrap();
            assert_eq!(fake.clicks.get(), 1);
            e.clear_data().unwrap();
            assert_eq!(e.get_current_value().unwrap(), None);
        }

        #[test]
        fn test_validate_state_rules() {
            let (_, present) = element(true);
            let (_, absent) = element(false);
            let exists = ItemValidation::new("Name", "", ComparisonType::Exists);
            let gone = ItemValidation::new("Name", "", ComparisonType::DoesNotExist);
            assert!(present.validate_item(&exists).unwrap().0);
            assert!(!absent.validate_item(&exists).unwrap().0);
            assert!(absent.validate_item(&gone).unwrap().0);
        }

        #[test]
        fn test_validate_value_rule() {
            let (_, e) = element(true);
            e.fill_data("Hello World").unwrap();
            let rule = ItemValidation::new("Name", "world", ComparisonType::EndsWith);
            let (ok, actual) = e.validate_item(&rule).unwrap();
            assert!(ok);
            assert_eq!(actual.as_deref(), Some("Hello World"));
        }

        #[test]
        fn test_combo_box_items() {
            let (_, e) = element(true);
            assert_eq!(e.get_combo_box_items().unwrap()[0].text, "One");
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_writable_value() {
            let v = value(Some("1"), true);
            v.fill_data("2").unwrap();
            assert_eq!(v.get_current_value().unwrap().as_deref(), Some("2"));
            assert!(v.check_element_exists());
            assert!(!v.check_element_not_exists());
        }

        #[test]
        fn test_read_only_value() {
            let v = value(Some("1"), false);
            let err = v.fill_data("2").unwrap_err();
            assert!(err.to_string().contains("read-only"));
            assert_eq!(v.get_current_value().unwrap().as_deref(), Some("1"));
        }
    }
}
