//! Page name resolution for step text.
//!
//! "the Login page", "login" and an alias such as "Sign In" all resolve to
//! the same schema. Keys are normalized names with a trailing `page`
//! stripped; the first schema registered under a key keeps it.

use std::collections::HashMap;
use std::rc::Rc;

use crate::page::normalize_name;
use crate::result::{SpecBindError, SpecBindResult};
use crate::schema::{PageModel, PageSchema};

const PAGE_SUFFIX: &str = "page";

/// Lookup key for a page name or alias
#[must_use]
pub fn page_key(name: &str) -> String {
    let normalized = normalize_name(name);
    match normalized.strip_suffix(PAGE_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => normalized,
    }
}

/// Registry of page schemas by name and alias
#[derive(Debug, Default)]
pub struct PageMapper {
    pages: HashMap<String, Rc<PageSchema>>,
    order: Vec<Rc<PageSchema>>,
}

impl PageMapper {
    /// Empty mapper
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper over a set of schemas, in order
    pub fn from_schemas(schemas: impl IntoIterator<Item = PageSchema>) -> Self {
        let mut mapper = Self::new();
        for schema in schemas {
            mapper.add(schema);
        }
        mapper
    }

    /// Register a schema under its name and aliases
    pub fn add(&mut self, schema: PageSchema) {
        let schema = Rc::new(schema);
        let names = std::iter::once(schema.name.as_str()).chain(schema.aliases.iter().map(String::as_str));
        let mut added = 0;
        for name in names {
            let key = page_key(name);
            if let Some(existing) = self.pages.get(&key) {
                tracing::debug!(
                    key = %key,
                    existing = %existing.name,
                    ignored = %schema.name,
                    "page name already mapped"
                );
                continue;
            }
            let _ = self.pages.insert(key, Rc::clone(&schema));
            added += 1;
        }
        tracing::trace!(page = %schema.name, keys = added, "page mapped");
        self.order.push(schema);
    }

    /// Register a typed page model
    pub fn add_model<T: PageModel>(&mut self) {
        self.add(T::schema());
    }

    /// Schema for a page name from step text
    #[must_use]
    pub fn get_type_from_name(&self, name: &str) -> Option<Rc<PageSchema>> {
        self.pages.get(&page_key(name)).cloned()
    }

    /// Schema for a page name, or a navigation error
    pub fn require(&self, name: &str) -> SpecBindResult<Rc<PageSchema>> {
        self.get_type_from_name(name).ok_or_else(|| {
            SpecBindError::navigation(
                name,
                format!("Cannot locate a page for name: {name}. Check page names and aliases."),
            )
        })
    }

    /// Every registered schema in registration order
    pub fn schemas(&self) -> &[Rc<PageSchema>] {
        &self.order
    }

    /// Number of lookup keys
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether nothing is mapped
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct HomePage;

    impl PageModel for HomePage {
        fn schema() -> PageSchema {
            PageSchema::new("HomePage").with_alias("Start").with_url("/")
        }
    }

    #[test]
    fn test_page_key() {
        assert_eq!(page_key("LoginPage"), "login");
        assert_eq!(page_key("the Login page"), "thelogin");
        assert_eq!(page_key("Page"), "page");
        assert_eq!(page_key("Sign In"), "signin");
    }

    #[test]
    fn test_lookup_by_name_suffix_and_alias() {
        let mut mapper = PageMapper::new();
        mapper.add(PageSchema::new("LoginPage").with_alias("Sign In"));
        assert_eq!(mapper.get_type_from_name("login").unwrap().name, "LoginPage");
        assert_eq!(mapper.get_type_from_name("Login Page").unwrap().name, "LoginPage");
        assert_eq!(mapper.get_type_from_name("sign in").unwrap().name, "LoginPage");
        assert!(mapper.get_type_from_name("logout").is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let mapper = PageMapper::from_schemas([
            PageSchema::new("Search").with_url("/a"),
            PageSchema::new("SearchPage").with_url("/b"),
        ]);
        let found = mapper.get_type_from_name("search").unwrap();
        assert_eq!(found.name, "Search");
        assert_eq!(mapper.len(), 1);
        assert_eq!(mapper.schemas().len(), 2);
    }

    #[test]
    fn test_typed_model() {
        let mut mapper = PageMapper::new();
        mapper.add_model::<HomePage>();
        assert_eq!(mapper.get_type_from_name("start").unwrap().name, "HomePage");
        assert_eq!(mapper.get_type_from_name("home").unwrap().name, "HomePage");
    }

    #[test]
    fn test_require_miss_is_navigation_error() {
        let err = PageMapper::new().require("Nowhere").unwrap_err();
        assert!(matches!(err, SpecBindError::PageNavigation { .. }));
        assert!(err.to_string().contains("Nowhere"));
    }
}
