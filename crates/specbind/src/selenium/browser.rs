//! Web browser session.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::{DriverSession, SeleniumElementHandler, SeleniumPageBuilder, WebDriver};
use crate::browser::{Browser, PageCache};
use crate::page::Page;
use crate::result::SpecBindResult;
use crate::schema::PageSchema;
use crate::wait::Waiter;

/// A [`Browser`] over a lazily started [`WebDriver`]
pub struct SeleniumBrowser<D: WebDriver + 'static> {
    session: DriverSession<D>,
    handler: OnceCell<Rc<SeleniumElementHandler<D>>>,
    pages: PageCache<SeleniumPageBuilder>,
    base_url: String,
    waiter: Waiter,
    keystroke_delay: Option<Duration>,
}

impl<D: WebDriver + 'static> fmt::Debug for SeleniumBrowser<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeleniumBrowser")
            .field("session", &self.session)
            .field("pages", &self.pages)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl<D: WebDriver + 'static> SeleniumBrowser<D> {
    /// Browser over a driver session
    pub fn new(session: DriverSession<D>, base_url: impl Into<String>) -> Self {
        Self {
            session,
            handler: OnceCell::new(),
            pages: PageCache::new(SeleniumPageBuilder::new()),
            base_url: base_url.into(),
            waiter: Waiter::new(),
            keystroke_delay: None,
        }
    }

    /// Poller handed to the element handler
    #[must_use]
    pub fn with_waiter(mut self, waiter: Waiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Pause between keystroke attempts
    #[must_use]
    pub const fn with_keystroke_delay(mut self, delay: Duration) -> Self {
        self.keystroke_delay = Some(delay);
        self
    }

    /// Page builder and instance cache
    pub fn pages(&self) -> &PageCache<SeleniumPageBuilder> {
        &self.pages
    }

    /// Whether the driver has been started
    pub fn is_started(&self) -> bool {
        self.session.is_started()
    }

    /// The element handler, starting the driver on first use
    pub fn handler(&self) -> SpecBindResult<Rc<SeleniumElementHandler<D>>> {
        if let Some(handler) = self.handler.get() {
            return Ok(Rc::clone(handler));
        }
        let mut handler = SeleniumElementHandler::new(self.session.get()?).with_waiter(self.waiter);
        if let Some(delay) = self.keystroke_delay {
            handler = handler.with_keystroke_delay(delay);
        }
        let handler = Rc::new(handler);
        let _ = self.handler.set(Rc::clone(&handler));
        Ok(handler)
    }
}

impl<D: WebDriver + 'static> Browser for SeleniumBrowser<D> {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn navigate(&self, url: &str) -> SpecBindResult<()> {
        self.session.get()?.navigate(url)?;
        Ok(())
    }

    fn page(&self, schema: &PageSchema) -> SpecBindResult<Rc<dyn Page>> {
        self.pages.page(schema, &self.handler()?)
    }

    fn current_url(&self) -> SpecBindResult<String> {
        Ok(self.session.get()?.current_url()?)
    }

    fn execute_script(&self, script: &str) -> SpecBindResult<serde_json::Value> {
        Ok(self.session.get()?.execute_script(script, &[])?)
    }

    fn close(&self) -> SpecBindResult<()> {
        self.pages.clear();
        if self.session.is_started() {
            tracing::info!("closing browser session");
            self.session.get()?.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cookie::CookieDirective;
    use crate::locator::ElementLocator;
    use crate::result::SpecBindError;
    use crate::schema::PropertySchema;
    use crate::selenium::{MockNode, MockWebDriver, ELEMENT_TYPE};
    use std::collections::HashMap;

    fn login_schema() -> PageSchema {
        PageSchema::new("LoginPage").with_url("/login").with_property(
            PropertySchema::element("User Name", ELEMENT_TYPE)
                .with_locator(ElementLocator::new().id("user")),
        )
    }

    fn browser() -> (Rc<MockWebDriver>, SeleniumBrowser<MockWebDriver>) {
        let driver = Rc::new(
            MockWebDriver::new()
                .with_route("http://host/login", vec![MockNode::new("input").id("user")]),
        );
        let browser = SeleniumBrowser::new(DriverSession::started(Rc::clone(&driver)), "http://host");
        (driver, browser)
    }

    #[test]
    fn test_go_to_page_and_fill() {
        let (driver, browser) = browser();
        let page = browser.go_to_page(&login_schema(), &HashMap::new()).unwrap();
        assert_eq!(driver.current_url().unwrap(), "http://host/login");
        page.try_get_property("username").unwrap().fill_data("ann").unwrap();
        assert_eq!(driver.value_of("user").as_deref(), Some("ann"));
    }

    #[test]
    fn test_ensure_on_page() {
        let (_, browser) = browser();
        let err = browser.ensure_on_page(&login_schema()).unwrap_err();
        assert!(matches!(err, SpecBindError::PageNavigation { .. }));
        assert!(err.to_string().contains("about:blank"));
        browser.navigate("http://host/login?next=%2F").unwrap();
        assert!(browser.ensure_on_page(&login_schema()).is_ok());
    }

    #[test]
    fn test_page_instances_cached() {
        let (_, browser) = browser();
        let first = browser.page(&login_schema()).unwrap();
        let second = browser.page(&login_schema()).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(browser.pages().builder().compile_count(), 1);
    }

    #[test]
    fn test_page_without_url_cannot_be_navigated() {
        let (_, browser) = browser();
        let err = browser
            .go_to_page(&PageSchema::new("Dialog"), &HashMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("does not declare a URL"));
    }

    #[test]
    fn test_cookie_script() {
        let (driver, browser) = browser();
        browser
            .add_cookie(&CookieDirective::new("session", "abc"))
            .unwrap();
        browser.clear_cookies().unwrap();
        let scripts = driver.scripts();
        assert!(scripts[0].starts_with("document.cookie = \"session=abc"));
        assert_eq!(scripts.len(), 2);
    }

    #[test]
    fn test_driver_started_lazily() {
        let browser = SeleniumBrowser::new(
            DriverSession::lazy(|| Ok(MockWebDriver::new())),
            "http://host",
        );
        assert!(!browser.is_started());
        browser.close().unwrap();
        assert!(!browser.is_started());
        let _ = browser.current_url().unwrap();
        assert!(browser.is_started());
    }

    #[test]
    fn test_close_quits_driver() {
        let (driver, browser) = browser();
        let _ = browser.page(&login_schema()).unwrap();
        browser.close().unwrap();
        assert!(driver.is_closed());
        assert!(browser.pages().is_empty());
    }
}
