//! Build-time context threaded through schema compilation.

use std::fmt;

use crate::element_type::ConstructorScope;

/// A reference to the value being built plus its static type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionData {
    /// Property or variable name, when the value has one
    pub name: Option<String>,
    /// Control or page type name
    pub type_name: String,
}

impl ExpressionData {
    /// An unnamed value of a type
    #[must_use]
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            name: None,
            type_name: type_name.into(),
        }
    }

    /// A named value of a type
    #[must_use]
    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for ExpressionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.type_name),
            None => f.write_str(&self.type_name),
        }
    }
}

/// What is being built right now, under which parent and root
#[derive(Debug, Clone)]
pub struct PageBuilderContext {
    /// Node being built
    pub current: ExpressionData,
    /// Enclosing element, if any
    pub parent: Option<ExpressionData>,
    /// Frame or list item root in effect for direct children
    pub root_locator: Option<ExpressionData>,
    /// Top-level document
    pub document: ExpressionData,
    path: Vec<String>,
}

impl PageBuilderContext {
    /// Context for a top-level page
    #[must_use]
    pub fn root(document: ExpressionData) -> Self {
        let path = vec![document.name.clone().unwrap_or_else(|| document.type_name.clone())];
        Self {
            current: document.clone(),
            parent: None,
            root_locator: None,
            document,
            path,
        }
    }

    /// Context for a child of the current node. Root locators do not carry
    /// past one level; a nested fragment scopes its own children.
    #[must_use]
    pub fn child(&self, current: ExpressionData) -> Self {
        let mut path = self.path.clone();
        path.push(current.name.clone().unwrap_or_else(|| current.type_name.clone()));
        Self {
            current,
            parent: Some(self.current.clone()),
            root_locator: None,
            document: self.document.clone(),
            path,
        }
    }

    /// Mark the current node as a frame or list boundary
    #[must_use]
    pub fn with_root_locator(mut self, root: ExpressionData) -> Self {
        self.root_locator = Some(root);
        self
    }

    /// Context used to pick constructors for children of the current node
    #[must_use]
    pub fn constructor_scope(&self) -> ConstructorScope {
        ConstructorScope {
            has_parent: true,
            has_root_locator: self.root_locator.is_some(),
        }
    }

    /// Dotted path for diagnostics, e.g. `LoginPage.Header.Logout`
    #[must_use]
    pub fn path(&self) -> String {
        self.path.join(".")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_child_tracks_parent_and_path() {
        let root = PageBuilderContext::root(ExpressionData::of_type("LoginPage"));
        let header = root.child(ExpressionData::named("Header", "HtmlDiv"));
        let logout = header.child(ExpressionData::named("Logout", "HtmlButton"));
        assert_eq!(logout.path(), "LoginPage.Header.Logout");
        assert_eq!(logout.parent.as_ref().unwrap().type_name, "HtmlDiv");
        assert_eq!(logout.document.type_name, "LoginPage");
    }

    #[test]
    fn test_root_locator_does_not_carry_past_one_level() {
        let root = PageBuilderContext::root(ExpressionData::of_type("P"));
        let frame = root
            .child(ExpressionData::named("Frame", "HtmlIFrame"))
            .with_root_locator(ExpressionData::named("Frame", "HtmlIFrame"));
        assert!(frame.constructor_scope().has_root_locator);
        let inner = frame.child(ExpressionData::named("Body", "HtmlDiv"));
        assert!(!inner.constructor_scope().has_root_locator);
        assert!(inner.constructor_scope().has_parent);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExpressionData::named("A", "B").to_string(), "A: B");
        assert_eq!(ExpressionData::of_type("B").to_string(), "B");
    }
}
