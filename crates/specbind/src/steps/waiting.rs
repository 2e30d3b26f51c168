//! Waiting steps.

use std::rc::Rc;
use std::time::Duration;

use super::StepContext;
use crate::actions::{WaitForElementAction, WaitForElementContext, WaitForPageAction, WaitForPageContext};
use crate::page::Page;
use crate::result::SpecBindResult;

/// Steps that block until the UI settles
#[derive(Debug, Clone, Copy)]
pub struct WaitingSteps<'a> {
    context: &'a StepContext,
}

impl<'a> WaitingSteps<'a> {
    /// Steps over a scenario
    pub const fn new(context: &'a StepContext) -> Self {
        Self { context }
    }

    /// I wait for the {page} page; it becomes the current page
    pub fn wait_for_page(&self, page_name: &str, timeout: Option<Duration>) -> SpecBindResult<Rc<dyn Page>> {
        let mut context = WaitForPageContext::new(page_name);
        context.timeout = timeout;
        self.context.perform_and_switch(&WaitForPageAction, &context)
    }

    /// I wait for {element} to {condition}
    pub fn wait_for_element(
        &self,
        property_name: &str,
        condition: &str,
        timeout: Option<Duration>,
    ) -> SpecBindResult<()> {
        let mut context = WaitForElementContext::new(property_name, condition.parse()?);
        context.timeout = timeout;
        self.context.perform(&WaitForElementAction, &context).map(|_| ())
    }
}

#[cfg(all(test, feature = "selenium"))]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::actions::fixture::HOME_URL;
    use crate::selenium::MockChange;
    use crate::steps::tests::context;

    #[test]
    fn test_wait_for_page_switches() {
        let (_, ctx) = context();
        ctx.env().browser().navigate(HOME_URL).unwrap();
        let page = WaitingSteps::new(&ctx).wait_for_page("Start", None).unwrap();
        assert_eq!(page.page_type(), "HomePage");
        assert_eq!(ctx.current_page().unwrap().page_type(), "HomePage");
        assert_eq!(ctx.env().history().len(), 1);
    }

    #[test]
    fn test_wait_for_element_condition_text() {
        let (driver, ctx) = context();
        let _ = crate::steps::CommonPageSteps::new(&ctx).given_navigate_to_page("Home").unwrap();
        driver.schedule(Duration::from_millis(10), MockChange::Hide("go".into()));
        WaitingSteps::new(&ctx)
            .wait_for_element("Go", "become non-existent", Some(Duration::from_millis(500)))
            .unwrap();
        let err = WaitingSteps::new(&ctx)
            .wait_for_element("Go", "turn purple", None)
            .unwrap_err();
        assert_eq!(err.param_name(), Some("condition"));
    }
}
