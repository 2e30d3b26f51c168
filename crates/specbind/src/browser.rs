//! Browser abstraction shared by the driver adapters.
//!
//! A [`Browser`] owns one automation session: it navigates, recognises which
//! page it is on, and hands out page adapters. Page instances are cached per
//! schema name for the lifetime of the session; elements stay lazy, so a
//! cached page is always safe to reuse.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::builder::{BuilderHooks, PageBuilder};
use crate::cookie::CookieDirective;
use crate::handler::PageElementHandler;
use crate::navigation::UriHelper;
use crate::page::{Page, PageBase};
use crate::result::{SpecBindError, SpecBindResult};
use crate::schema::PageSchema;

/// Expires every cookie visible to the current document
const CLEAR_COOKIES_SCRIPT: &str = "document.cookie.split(';').forEach(function (c) { \
    document.cookie = c.replace(/^ +/, '').replace(/=.*/, '=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/'); });";

/// One automation session
pub trait Browser {
    /// Base URL relative page URLs are resolved against
    fn base_url(&self) -> &str;

    /// Load a URL
    fn navigate(&self, url: &str) -> SpecBindResult<()>;

    /// The page adapter for a schema, built on first use
    fn page(&self, schema: &PageSchema) -> SpecBindResult<Rc<dyn Page>>;

    /// URL currently shown
    fn current_url(&self) -> SpecBindResult<String>;

    /// Run a script in the current document
    fn execute_script(&self, script: &str) -> SpecBindResult<serde_json::Value>;

    /// End the session
    fn close(&self) -> SpecBindResult<()>;

    /// Navigate to a page's URL, filling template parameters
    fn go_to_page(
        &self,
        schema: &PageSchema,
        params: &HashMap<String, String>,
    ) -> SpecBindResult<Rc<dyn Page>> {
        let navigation = schema.navigation.as_ref().ok_or_else(|| {
            SpecBindError::navigation(
                &schema.name,
                format!(
                    "Page '{}' does not declare a URL and cannot be navigated to directly",
                    schema.name
                ),
            )
        })?;
        let url = UriHelper::navigation_url(navigation, self.base_url(), params)?;
        tracing::info!(page = %schema.name, %url, "navigating to page");
        self.navigate(&url)?;
        self.page(schema)
    }

    /// Whether the browser currently shows the page. Pages without a URL
    /// and framed pages are always considered current.
    fn is_on_page(&self, schema: &PageSchema) -> SpecBindResult<bool> {
        match (&schema.navigation, &schema.frame) {
            (Some(navigation), None) => {
                let current = self.current_url()?;
                UriHelper::is_match(navigation, self.base_url(), &current)
            }
            _ => Ok(true),
        }
    }

    /// The page adapter, or a navigation error when the browser is elsewhere
    fn ensure_on_page(&self, schema: &PageSchema) -> SpecBindResult<Rc<dyn Page>> {
        if !self.is_on_page(schema)? {
            let current = self.current_url().unwrap_or_default();
            let expected = schema
                .navigation
                .as_ref()
                .map(|n| n.url.clone())
                .unwrap_or_default();
            return Err(SpecBindError::navigation(
                &schema.name,
                format!(
                    "The browser is not on page '{}'. Current URL: '{current}', expected URL: '{expected}'",
                    schema.name
                ),
            ));
        }
        self.page(schema)
    }

    /// Set a cookie through a `document.cookie` assignment
    fn add_cookie(&self, cookie: &CookieDirective) -> SpecBindResult<()> {
        let script = cookie.to_script()?;
        tracing::debug!(cookie = %cookie.name, "setting cookie");
        self.execute_script(&script).map(|_| ())
    }

    /// Expire all cookies of the current document
    fn clear_cookies(&self) -> SpecBindResult<()> {
        self.execute_script(CLEAR_COOKIES_SCRIPT).map(|_| ())
    }
}

impl fmt::Debug for dyn Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser")
            .field("base_url", &self.base_url())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// DRIVER SESSION
// =============================================================================

/// Starts a driver on first use
pub type DriverLauncher<D> = Box<dyn Fn() -> Result<D, SpecBindError>>;

/// A lazily started driver; single-threaded by construction
pub struct DriverSession<D> {
    driver: OnceCell<Rc<D>>,
    launcher: DriverLauncher<D>,
}

impl<D> fmt::Debug for DriverSession<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverSession")
            .field("started", &self.is_started())
            .finish()
    }
}

impl<D> DriverSession<D> {
    /// A session started by `launcher` the first time it is needed
    pub fn lazy(launcher: impl Fn() -> Result<D, SpecBindError> + 'static) -> Self {
        Self {
            driver: OnceCell::new(),
            launcher: Box::new(launcher),
        }
    }

    /// A session over an already running driver
    pub fn started(driver: Rc<D>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(driver);
        Self {
            driver: cell,
            launcher: Box::new(|| Err(SpecBindError::driver("driver already started"))),
        }
    }

    /// Whether the driver has been launched
    pub fn is_started(&self) -> bool {
        self.driver.get().is_some()
    }

    /// The driver, launching it if needed
    pub fn get(&self) -> Result<Rc<D>, SpecBindError> {
        if let Some(driver) = self.driver.get() {
            return Ok(Rc::clone(driver));
        }
        tracing::info!("starting driver session");
        let driver = Rc::new((self.launcher)()?);
        let _ = self.driver.set(Rc::clone(&driver));
        Ok(driver)
    }
}

// =============================================================================
// PAGE CACHE
// =============================================================================

/// Page builder plus the per-session page instance cache
pub struct PageCache<B: BuilderHooks> {
    builder: PageBuilder<B>,
    pages: RefCell<HashMap<String, Rc<dyn Page>>>,
}

impl<B: BuilderHooks + fmt::Debug> fmt::Debug for PageCache<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCache")
            .field("builder", &self.builder)
            .field("pages", &self.pages.borrow().len())
            .finish()
    }
}

impl<B: BuilderHooks> PageCache<B> {
    /// Create an empty cache over driver hooks
    pub fn new(hooks: B) -> Self {
        Self {
            builder: PageBuilder::new(hooks),
            pages: RefCell::new(HashMap::new()),
        }
    }

    /// The page builder
    pub fn builder(&self) -> &PageBuilder<B> {
        &self.builder
    }

    /// Cached page for the schema, or build and cache it
    pub fn page<E>(&self, schema: &PageSchema, handler: &Rc<E>) -> SpecBindResult<Rc<dyn Page>>
    where
        E: PageElementHandler<Locator = B::Locator>,
    {
        if let Some(page) = self.pages.borrow().get(&schema.name) {
            return Ok(Rc::clone(page));
        }
        let native = self.builder.create_page(schema, None)?;
        let page: Rc<dyn Page> = Rc::new(PageBase::new(native, Rc::clone(handler)));
        tracing::debug!(page = %schema.name, "page instance created");
        let _ = self
            .pages
            .borrow_mut()
            .insert(schema.name.clone(), Rc::clone(&page));
        Ok(page)
    }

    /// Number of cached page instances
    pub fn len(&self) -> usize {
        self.pages.borrow().len()
    }

    /// Whether no page has been built yet
    pub fn is_empty(&self) -> bool {
        self.pages.borrow().is_empty()
    }

    /// Drop every cached page instance (compiled factories are kept)
    pub fn clear(&self) {
        self.pages.borrow_mut().clear();
    }
}
