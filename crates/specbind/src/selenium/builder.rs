//! Locator synthesis for web pages.
//!
//! Id, name, class and link text each become their own strategy, tried in
//! that order. Attribute criteria (alt, url, title, type, value) fold into a
//! single XPath under the element's tag; an index selects from the matches
//! of that expression. Explicit XPath and CSS follow, then the declared
//! native locators.

use crate::builder::BuilderHooks;
use crate::element_type::{ElementKind, ElementType, ElementTypeRegistry};
use crate::locator::{non_blank, ordered_native_locators, ElementLocator, NativeLocator};
use crate::proxy::TableRows;
use crate::result::{SpecBindError, SpecBindResult};

use super::{
    By, SeleniumLocator, BROWSER_TYPE, DOCUMENT_TYPE, ELEMENT_TYPE, FRAME_TYPE, LIST_TYPE,
    TABLE_TYPE,
};

/// Builder hooks for the web driver
#[derive(Debug)]
pub struct SeleniumPageBuilder {
    registry: ElementTypeRegistry,
}

impl Default for SeleniumPageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SeleniumPageBuilder {
    /// Hooks with the standard web control types
    #[must_use]
    pub fn new() -> Self {
        let mut registry = ElementTypeRegistry::new(BROWSER_TYPE, ELEMENT_TYPE, DOCUMENT_TYPE);
        registry.register(ElementType::new(DOCUMENT_TYPE, ElementKind::Document, ELEMENT_TYPE));
        registry.register(ElementType::new(ELEMENT_TYPE, ElementKind::Element, ELEMENT_TYPE));
        registry.register(ElementType::new(LIST_TYPE, ElementKind::List, ELEMENT_TYPE));
        registry.register(
            ElementType::new(TABLE_TYPE, ElementKind::Table, ELEMENT_TYPE).with_tag("table"),
        );
        registry.register(
            ElementType::new(FRAME_TYPE, ElementKind::Frame, ELEMENT_TYPE).with_tag("iframe"),
        );
        registry.register_abstract("IWebElement", ELEMENT_TYPE);
        registry.register_abstract("IElementList", LIST_TYPE);
        Self { registry }
    }

    /// Register an extra control type
    pub fn register(&mut self, element_type: ElementType) {
        self.registry.register(element_type);
    }
}

impl BuilderHooks for SeleniumPageBuilder {
    type Locator = SeleniumLocator;

    fn registry(&self) -> &ElementTypeRegistry {
        &self.registry
    }

    fn assign_element_attributes(
        &self,
        element_type: &ElementType,
        element_name: &str,
        locator: Option<&ElementLocator>,
        native: &[NativeLocator],
        target: &mut SeleniumLocator,
    ) -> SpecBindResult<()> {
        let tag = locator
            .and_then(|l| non_blank(&l.tag_name))
            .or(element_type.tag.as_deref());

        if let Some(locator) = locator {
            for by in derived_locators(locator, tag, element_name)? {
                target.push_unique(by);
            }
        }

        for declared in ordered_native_locators(native) {
            target.push_unique(By::from(declared));
        }

        if target.bys.is_empty() {
            if let Some(tag) = tag {
                target.push_unique(By::TagName(tag.to_string()));
            }
        }

        tracing::trace!(
            element = element_name,
            strategies = target.bys.len(),
            "assigned web locators"
        );
        Ok(())
    }

    fn table_row_locator(&self, _table_type: &ElementType) -> TableRows<SeleniumLocator> {
        TableRows {
            row_locator: SeleniumLocator::new(vec![By::TagName("tr".into())]),
            header_cell_locator: SeleniumLocator::new(vec![By::TagName("th".into())]),
            cell_locator: SeleniumLocator::new(vec![By::TagName("td".into())]),
        }
    }
}

/// Strategies derived from declarative criteria, in precedence order
fn derived_locators(
    locator: &ElementLocator,
    tag: Option<&str>,
    element_name: &str,
) -> SpecBindResult<Vec<By>> {
    let mut bys = Vec::new();
    if let Some(id) = non_blank(&locator.id) {
        bys.push(By::Id(id.to_string()));
    }
    if let Some(name) = non_blank(&locator.name) {
        bys.push(By::Name(name.to_string()));
    }
    if let Some(class) = non_blank(&locator.class) {
        bys.push(By::ClassName(class.to_string()));
    }
    if let Some(text) = non_blank(&locator.text) {
        bys.push(By::LinkText(text.to_string()));
    }

    if let Some(xpath) = synthesized_xpath(locator, tag, element_name)? {
        bys.push(By::XPath(xpath));
    }
    if let Some(xpath) = non_blank(&locator.xpath) {
        bys.push(By::XPath(xpath.to_string()));
    }
    if let Some(css) = non_blank(&locator.css_selector) {
        bys.push(By::CssSelector(css.to_string()));
    }
    if bys.is_empty() {
        if let Some(tag) = non_blank(&locator.tag_name) {
            bys.push(By::TagName(tag.to_string()));
        }
    }
    Ok(bys)
}

/// XPath built from attribute criteria and the index
///
/// # Errors
///
/// Attribute predicates need a concrete node test; without a tag name the
/// build fails.
pub(crate) fn synthesized_xpath(
    locator: &ElementLocator,
    tag: Option<&str>,
    element_name: &str,
) -> SpecBindResult<Option<String>> {
    let mut predicates = Vec::new();
    if let Some(alt) = non_blank(&locator.alt) {
        predicates.push(format!("@alt={}", xpath_literal(alt)));
    }
    if let Some(url) = non_blank(&locator.url) {
        let attribute = if tag.is_some_and(|t| t.eq_ignore_ascii_case("img")) {
            "src"
        } else {
            "href"
        };
        predicates.push(format!("@{attribute}={}", xpath_literal(url)));
    }
    if let Some(title) = non_blank(&locator.title) {
        predicates.push(format!("@title={}", xpath_literal(title)));
    }
    if let Some(input_type) = non_blank(&locator.input_type) {
        predicates.push(format!("@type={}", xpath_literal(input_type)));
    }
    if let Some(value) = non_blank(&locator.value) {
        predicates.push(format!("@value={}", xpath_literal(value)));
    }

    if predicates.is_empty() {
        return Ok(locator.index.map(|index| {
            format!("(.//{})[{index}]", tag.unwrap_or("*"))
        }));
    }

    let Some(tag) = tag else {
        return Err(SpecBindError::construction(format!(
            "Element '{element_name}' declares attribute criteria ({}) but is missing TagName; \
             set TagName so an XPath can be built",
            predicates.join(", ")
        )));
    };

    let expression = format!(".//{tag}[{}]", predicates.join(" and "));
    Ok(Some(match locator.index {
        Some(index) => format!("({expression})[{index}]"),
        None => expression,
    }))
}

/// Quote a string for use inside an XPath expression
pub(crate) fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::builder::PageBuilder;
    use crate::locator::How;
    use crate::schema::{PageSchema, PropertySchema};
    use proptest::prelude::*;

    fn element() -> ElementType {
        ElementType::new(ELEMENT_TYPE, ElementKind::Element, ELEMENT_TYPE)
    }

    fn assign(locator: &ElementLocator, native: &[NativeLocator]) -> SpecBindResult<SeleniumLocator> {
        let hooks = SeleniumPageBuilder::new();
        let mut target = SeleniumLocator::default();
        hooks.assign_element_attributes(&element(), "Test", Some(locator), native, &mut target)?;
        Ok(target)
    }

    mod precedence_tests {
        use super::*;

        #[test]
        fn test_each_simple_criterion_is_its_own_strategy() {
            let locator = ElementLocator::new()
                .id("go")
                .name("submit")
                .class("btn")
                .text("Go");
            let target = assign(&locator, &[]).unwrap();
            assert_eq!(
                target.bys,
                vec![
                    By::Id("go".into()),
                    By::Name("submit".into()),
                    By::ClassName("btn".into()),
                    By::LinkText("Go".into()),
                ]
            );
        }

        #[test]
        fn test_native_locators_follow_and_dedupe() {
            let locator = ElementLocator::new().id("go");
            let native = vec![
                NativeLocator::new(How::CssSelector, "#go").with_priority(2),
                NativeLocator::new(How::Id, "go").with_priority(1),
                NativeLocator::new(How::Name, "n").with_priority(0),
            ];
            let target = assign(&locator, &native).unwrap();
            assert_eq!(
                target.bys,
                vec![
                    By::Id("go".into()),
                    By::Name("n".into()),
                    By::CssSelector("#go".into()),
                ]
            );
        }

        #[test]
        fn test_tag_only_falls_back_to_tag_name() {
            let target = assign(&ElementLocator::new().tag_name("h1"), &[]).unwrap();
            assert_eq!(target.bys, vec![By::TagName("h1".into())]);
        }

        #[test]
        fn test_explicit_xpath_and_css() {
            let locator = ElementLocator::new().xpath("//div").css_selector("div > p");
            let target = assign(&locator, &[]).unwrap();
            assert_eq!(
                target.bys,
                vec![By::XPath("//div".into()), By::CssSelector("div > p".into())]
            );
        }
    }

    mod xpath_tests {
        use super::*;

        #[test]
        fn test_alt_and_url_on_image() {
            let locator = ElementLocator::new().tag_name("img").alt("Logo").url("/logo.png");
            let xpath = synthesized_xpath(&locator, Some("img"), "Logo").unwrap().unwrap();
            assert_eq!(xpath, ".//img[@alt='Logo' and @src='/logo.png']");
        }

        #[test]
        fn test_url_on_link_is_href() {
            let locator = ElementLocator::new().url("/home");
            let xpath = synthesized_xpath(&locator, Some("a"), "Home").unwrap().unwrap();
            assert_eq!(xpath, ".//a[@href='/home']");
        }

        #[test]
        fn test_index_wraps_group() {
            let locator = ElementLocator::new().input_type("checkbox").index(2);
            let xpath = synthesized_xpath(&locator, Some("input"), "Box").unwrap().unwrap();
            assert_eq!(xpath, "(.//input[@type='checkbox'])[2]");
        }

        #[test]
        fn test_index_without_predicates() {
            let locator = ElementLocator::new().index(3);
            let xpath = synthesized_xpath(&locator, Some("li"), "Item").unwrap().unwrap();
            assert_eq!(xpath, "(.//li)[3]");
        }

        #[test]
        fn test_missing_tag_name() {
            let locator = ElementLocator::new().title("Help");
            let err = synthesized_xpath(&locator, None, "HelpLink").unwrap_err();
            assert!(matches!(err, SpecBindError::Construction { .. }));
            assert!(err.to_string().contains("missing TagName"));
            assert!(err.to_string().contains("HelpLink"));
        }

        #[test]
        fn test_literal_quoting() {
            assert_eq!(xpath_literal("plain"), "'plain'");
            assert_eq!(xpath_literal("it's"), "\"it's\"");
            assert_eq!(
                xpath_literal(r#"a'b"c"#),
                r#"concat('a', "'", 'b"c')"#
            );
        }
    }

    mod build_tests {
        use super::*;

        #[test]
        fn test_build_is_cached_and_idempotent() {
            let builder = PageBuilder::new(SeleniumPageBuilder::new());
            let schema = PageSchema::new("LoginPage").with_property(
                PropertySchema::element("UserName", ELEMENT_TYPE)
                    .with_locator(ElementLocator::new().id("user")),
            );
            let first = builder.create_page(&schema, None).unwrap();
            let second = builder.create_page(&schema, None).unwrap();
            assert_eq!(builder.compile_count(), 1);
            assert_eq!(
                first.element("UserName").unwrap().locator(),
                second.element("UserName").unwrap().locator()
            );
        }

        #[test]
        fn test_missing_tag_fails_build() {
            let builder = PageBuilder::new(SeleniumPageBuilder::new());
            let schema = PageSchema::new("Broken").with_property(
                PropertySchema::element("Help", ELEMENT_TYPE)
                    .with_locator(ElementLocator::new().alt("?")),
            );
            let err = builder.create_factory(&schema).unwrap_err();
            assert!(err.to_string().contains("missing TagName"));
            assert!(!builder.is_cached("Broken"));
        }
    }

    proptest! {
        #[test]
        fn prop_image_xpath_uses_src(alt in "[A-Za-z0-9 ]{1,16}", url in "[a-z0-9/._-]{1,24}") {
            prop_assume!(!alt.trim().is_empty() && !url.trim().is_empty());
            let locator = ElementLocator::new().tag_name("img").alt(alt).url(url);
            let target = assign(&locator, &[]).unwrap();
            let xpath = target
                .bys
                .iter()
                .find_map(|b| match b {
                    By::XPath(x) => Some(x.clone()),
                    _ => None,
                })
                .unwrap();
            prop_assert!(xpath.contains("@alt="));
            prop_assert!(xpath.contains("@src="));
            prop_assert!(!xpath.contains("@href="));
        }
    }
}
