//! Page adapters and the name-keyed property table.
//!
//! [`PageBase`] wraps one built page and registers a [`PropertyData`] for
//! each slot once, at construction. Lookups are by normalized name: case
//! and whitespace are ignored, and the first registration of a name wins.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::element_type::ElementKind;
use crate::handler::PageElementHandler;
use crate::property::{BoundElement, BoundList, BoundTable, PropertyData, PropertyKind, ValueSlot};
use crate::proxy::{NativePage, NativeSlot};
use crate::schema::PageSchema;

/// Normalize a property or page name for lookup
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A page as the action layer sees it
pub trait Page {
    /// Page type name
    fn page_type(&self) -> &str;

    /// Schema the page was built from
    fn schema(&self) -> &PageSchema;

    /// Every property in registration order
    fn properties(&self) -> Vec<Rc<PropertyData>>;

    /// Any property by name; `None` when unknown
    fn try_get_property(&self, name: &str) -> Option<Rc<PropertyData>>;

    /// An element-like property (element or list) by name; `None` when
    /// unknown or a plain value
    fn try_get_element(&self, name: &str) -> Option<Rc<PropertyData>> {
        self.try_get_property(name)
            .filter(|p| p.is_element() || p.is_list())
    }

    /// Names of the properties matching `filter`
    fn property_names(&self, filter: &dyn Fn(&PropertyData) -> bool) -> Vec<String> {
        self.properties()
            .iter()
            .filter(|p| filter(p))
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("page_type", &self.page_type())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// PROPERTY TABLE
// =============================================================================

#[derive(Debug, Default)]
struct PropertyTable {
    ordered: Vec<Rc<PropertyData>>,
    by_name: HashMap<String, usize>,
}

impl PropertyTable {
    fn register(&mut self, property: PropertyData) {
        let key = normalize_name(property.name());
        if self.by_name.contains_key(&key) {
            tracing::trace!(property = property.name(), "duplicate property name ignored");
            return;
        }
        let _ = self.by_name.insert(key, self.ordered.len());
        self.ordered.push(Rc::new(property));
    }

    fn get(&self, name: &str) -> Option<Rc<PropertyData>> {
        self.by_name
            .get(&normalize_name(name))
            .and_then(|i| self.ordered.get(*i))
            .cloned()
    }
}

// =============================================================================
// PAGE BASE
// =============================================================================

/// A built page bound to a driver handler
pub struct PageBase<H: PageElementHandler> {
    native: Rc<NativePage<H::Locator>>,
    handler: Rc<H>,
    table: PropertyTable,
}

impl<H: PageElementHandler> fmt::Debug for PageBase<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBase")
            .field("page_type", &self.native.type_name())
            .field("properties", &self.table.ordered.len())
            .finish()
    }
}

impl<H: PageElementHandler> PageBase<H> {
    /// Wrap a built page and register its properties
    pub fn new(native: Rc<NativePage<H::Locator>>, handler: Rc<H>) -> Self {
        let table = Self::get_properties(&native, &handler);
        Self {
            native,
            handler,
            table,
        }
    }

    /// The built page
    pub fn native(&self) -> &Rc<NativePage<H::Locator>> {
        &self.native
    }

    /// The driver handler
    pub fn handler(&self) -> &Rc<H> {
        &self.handler
    }

    fn get_properties(native: &NativePage<H::Locator>, handler: &Rc<H>) -> PropertyTable {
        let mut table = PropertyTable::default();
        for slot in native.slots() {
            match slot {
                NativeSlot::Element {
                    name,
                    proxy,
                    nested,
                    virtual_properties,
                } => {
                    let kind = match proxy.kind() {
                        ElementKind::List => PropertyKind::List(Rc::new(BoundList::new(
                            Rc::clone(handler),
                            Rc::clone(proxy),
                        ))),
                        ElementKind::Table => PropertyKind::List(Rc::new(BoundTable::new(
                            Rc::clone(handler),
                            Rc::clone(proxy),
                        ))),
                        ElementKind::Element | ElementKind::Frame | ElementKind::Document => {
                            PropertyKind::Element(Rc::new(BoundElement::new(
                                Rc::clone(handler),
                                Rc::clone(proxy),
                                None,
                                nested.clone(),
                            )))
                        }
                    };
                    table.register(PropertyData::new(name.clone(), kind));

                    for alias in virtual_properties {
                        let bound = BoundElement::new(
                            Rc::clone(handler),
                            Rc::clone(proxy),
                            Some(alias.attribute.clone()),
                            None,
                        );
                        table.register(PropertyData::new(
                            alias.name.clone(),
                            PropertyKind::Element(Rc::new(bound)),
                        ));
                    }
                }
                NativeSlot::Value {
                    name,
                    cell,
                    writable,
                } => table.register(PropertyData::new(
                    name.clone(),
                    PropertyKind::Value(ValueSlot::new(Rc::clone(cell), *writable)),
                )),
            }
        }
        table
    }
}

impl<H: PageElementHandler> Page for PageBase<H> {
    fn page_type(&self) -> &str {
        self.native.type_name()
    }

    fn schema(&self) -> &PageSchema {
        self.native.schema()
    }

    fn properties(&self) -> Vec<Rc<PropertyData>> {
        self.table.ordered.clone()
    }

    fn try_get_property(&self, name: &str) -> Option<Rc<PropertyData>> {
        self.table.get(name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// TABLE ROWS
// =============================================================================

/// One data row of a table, addressed by header text
#[derive(Debug)]
pub struct TableRowPage {
    schema: PageSchema,
    table: PropertyTable,
}

impl TableRowPage {
    /// Pair header cells with data cells; extra cells are dropped
    pub fn new(headers: &[String], cells: Vec<String>) -> Self {
        let mut table = PropertyTable::default();
        for (header, cell) in headers.iter().zip(cells) {
            let slot = ValueSlot::new(Rc::new(std::cell::RefCell::new(Some(cell))), false);
            table.register(PropertyData::new(header.trim(), PropertyKind::Value(slot)));
        }
        Self {
            schema: PageSchema::new("TableRow"),
            table,
        }
    }
}

impl Page for TableRowPage {
    fn page_type(&self) -> &str {
        &self.schema.name
    }

    fn schema(&self) -> &PageSchema {
        &self.schema
    }

    fn properties(&self) -> Vec<Rc<PropertyData>> {
        self.table.ordered.clone()
    }

    fn try_get_property(&self, name: &str) -> Option<Rc<PropertyData>> {
        self.table.get(name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("User Name"), "username");
        assert_eq!(normalize_name(" LOGIN\tbutton "), "loginbutton");
    }

    #[test]
    fn test_table_row_lookup() {
        let headers = vec!["First Name".to_string(), "Age".to_string()];
        let row = TableRowPage::new(&headers, vec!["Ann".into(), "40".into(), "extra".into()]);
        let name = row.try_get_property("firstname").unwrap();
        assert_eq!(name.get_current_value().unwrap().as_deref(), Some("Ann"));
        assert!(row.try_get_element("Age").is_none());
        assert_eq!(row.properties().len(), 2);
        assert!(name.fill_data("x").is_err());
    }

    #[test]
    fn test_first_registration_wins() {
        let headers = vec!["Name".to_string(), "name".to_string()];
        let row = TableRowPage::new(&headers, vec!["first".into(), "second".into()]);
        assert_eq!(row.properties().len(), 1);
        let value = row.try_get_property("NAME").unwrap().get_current_value().unwrap();
        assert_eq!(value.as_deref(), Some("first"));
    }

    #[test]
    fn test_property_names_filter() {
        let headers = vec!["A".to_string(), "B".to_string()];
        let row = TableRowPage::new(&headers, vec!["1".into(), "2".into()]);
        let names = row.property_names(&|p| !p.is_element());
        assert_eq!(names, vec!["A", "B"]);
        assert!(row.property_names(&PropertyData::is_element).is_empty());
    }
}
