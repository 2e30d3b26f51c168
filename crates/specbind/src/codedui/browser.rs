//! Browser window session.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use super::{CodedUIElementHandler, CodedUIPageBuilder, UiAutomation};
use crate::browser::{Browser, DriverSession, PageCache};
use crate::page::Page;
use crate::result::SpecBindResult;
use crate::schema::PageSchema;
use crate::wait::Waiter;

/// A [`Browser`] over a lazily launched browser window
pub struct CodedUIBrowser<A: UiAutomation + 'static> {
    session: DriverSession<A>,
    handler: OnceCell<Rc<CodedUIElementHandler<A>>>,
    pages: PageCache<CodedUIPageBuilder>,
    base_url: String,
    waiter: Waiter,
}

impl<A: UiAutomation + 'static> fmt::Debug for CodedUIBrowser<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodedUIBrowser")
            .field("session", &self.session)
            .field("pages", &self.pages)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl<A: UiAutomation + 'static> CodedUIBrowser<A> {
    /// Browser over a window session
    pub fn new(session: DriverSession<A>, base_url: impl Into<String>) -> Self {
        Self {
            session,
            handler: OnceCell::new(),
            pages: PageCache::new(CodedUIPageBuilder::new()),
            base_url: base_url.into(),
            waiter: Waiter::new(),
        }
    }

    /// Poller handed to the element handler
    #[must_use]
    pub fn with_waiter(mut self, waiter: Waiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Page builder and instance cache
    pub fn pages(&self) -> &PageCache<CodedUIPageBuilder> {
        &self.pages
    }

    /// The element handler, launching the window on first use
    pub fn handler(&self) -> SpecBindResult<Rc<CodedUIElementHandler<A>>> {
        if let Some(handler) = self.handler.get() {
            return Ok(Rc::clone(handler));
        }
        let handler = Rc::new(CodedUIElementHandler::new(self.session.get()?).with_waiter(self.waiter));
        let _ = self.handler.set(Rc::clone(&handler));
        Ok(handler)
    }
}

impl<A: UiAutomation + 'static> Browser for CodedUIBrowser<A> {
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
        Ok(self.session.get()?.uri()?)
    }

    fn execute_script(&self, script: &str) -> SpecBindResult<serde_json::Value> {
        Ok(self.session.get()?.execute_script(script)?)
    }

    fn close(&self) -> SpecBindResult<()> {
        self.pages.clear();
        if self.session.is_started() {
            tracing::info!("closing browser window");
            self.session.get()?.close()?;
        }
        Ok(())
    }
}
