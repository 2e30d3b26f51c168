//! Pages visited during a scenario.
//!
//! The most recent entry is the current page. Re-adding a page type moves it
//! to the end, so returning to a dialog's owner is a lookup, not a rebuild.

use std::fmt;
use std::rc::Rc;

use crate::mapper::page_key;
use crate::page::Page;
use crate::result::{SpecBindError, SpecBindResult};

/// Ordered history of page instances, one per page type
#[derive(Default)]
pub struct PageHistoryService {
    pages: Vec<Rc<dyn Page>>,
}

impl fmt::Debug for PageHistoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.pages.iter().map(|p| p.page_type()))
            .finish()
    }
}

impl PageHistoryService {
    /// Empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a page; an existing entry of the same type moves to the end
    pub fn add(&mut self, page: Rc<dyn Page>) {
        let page_type = page.page_type().to_string();
        self.pages.retain(|p| p.page_type() != page_type);
        tracing::trace!(page = %page_type, "page added to history");
        self.pages.push(page);
    }

    /// Most recent page
    pub fn current(&self) -> Option<Rc<dyn Page>> {
        self.pages.last().cloned()
    }

    /// Find a page by type name or alias, most recent first
    pub fn find_page(&self, name: &str) -> SpecBindResult<Rc<dyn Page>> {
        let key = page_key(name);
        self.pages
            .iter()
            .rev()
            .find(|page| {
                let schema = page.schema();
                page_key(page.page_type()) == key || schema.aliases.iter().any(|a| page_key(a) == key)
            })
            .cloned()
            .ok_or_else(|| {
                SpecBindError::navigation(
                    name,
                    format!(
                        "Cannot find page '{name}' in the page history. Pages in history: [{}]",
                        self.describe()
                    ),
                )
            })
    }

    /// Drop the entry for a page type; `false` when it was not present
    pub fn remove(&mut self, name: &str) -> bool {
        let key = page_key(name);
        let before = self.pages.len();
        self.pages.retain(|p| page_key(p.page_type()) != key);
        before != self.pages.len()
    }

    /// Every entry, oldest first
    pub fn get_all(&self) -> Vec<Rc<dyn Page>> {
        self.pages.clone()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.pages.clear();
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page has been recorded
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn describe(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.page_type())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::property::PropertyData;
    use crate::schema::PageSchema;
    use std::any::Any;

    struct StubPage(PageSchema);

    impl Page for StubPage {
        fn page_type(&self) -> &str {
            &self.0.name
        }

        fn schema(&self) -> &PageSchema {
            &self.0
        }

        fn properties(&self) -> Vec<Rc<PropertyData>> {
            Vec::new()
        }

        fn try_get_property(&self, _name: &str) -> Option<Rc<PropertyData>> {
            None
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn page(name: &str) -> Rc<dyn Page> {
        Rc::new(StubPage(PageSchema::new(name)))
    }

    #[test]
    fn test_readding_moves_to_end() {
        let mut history = PageHistoryService::new();
        history.add(page("HomePage"));
        history.add(page("SearchPage"));
        history.add(page("HomePage"));
        let types: Vec<_> = history.get_all().iter().map(|p| p.page_type().to_string()).collect();
        assert_eq!(types, vec!["SearchPage", "HomePage"]);
        assert_eq!(history.current().unwrap().page_type(), "HomePage");
    }

    #[test]
    fn test_find_by_name_or_alias() {
        let mut history = PageHistoryService::new();
        history.add(page("HomePage"));
        history.add(Rc::new(StubPage(PageSchema::new("ConfirmDialog").with_alias("Confirm"))));
        assert_eq!(history.find_page("home").unwrap().page_type(), "HomePage");
        assert_eq!(history.find_page("confirm").unwrap().page_type(), "ConfirmDialog");
    }

    #[test]
    fn test_miss_lists_history() {
        let mut history = PageHistoryService::new();
        history.add(page("HomePage"));
        history.add(page("SearchPage"));
        let err = history.find_page("Checkout").unwrap_err();
        assert!(matches!(err, SpecBindError::PageNavigation { .. }));
        assert!(err.to_string().contains("HomePage, SearchPage"));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut history = PageHistoryService::new();
        history.add(page("HomePage"));
        history.add(page("Dialog"));
        assert!(history.remove("dialog"));
        assert!(!history.remove("dialog"));
        assert_eq!(history.len(), 1);
        history.clear();
        assert!(history.is_empty());
        assert!(history.current().is_none());
    }
}
