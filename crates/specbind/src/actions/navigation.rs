//! Page-level actions.

use super::{
    millis, Action, ActionEnv, ActionOutput, ActionResult, CloseDialogContext, PageAction,
    PageNavigationContext, WaitForPageContext,
};
use crate::result::{SpecBindError, SpecBindResult};
use crate::wait::CancellationToken;

/// Navigate to a page, or require the browser to already show it
#[derive(Debug, Clone, Copy, Default)]
pub struct PageNavigationAction;

impl Action for PageNavigationAction {
    type Context = PageNavigationContext;

    fn name(&self) -> &'static str {
        "PageNavigation"
    }

    fn execute(&self, env: &ActionEnv, context: &PageNavigationContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let schema = env.mapper().require(&context.page_name)?;
            let page = match context.page_action {
                PageAction::NavigateToPage => env.browser().go_to_page(&schema, &context.parameters)?,
                PageAction::EnsureOnPage => env.browser().ensure_on_page(&schema)?,
            };
            Ok(Some(ActionOutput::Page(page)))
        };
        run().into()
    }
}

/// Block until the browser shows a page or the page timeout expires
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitForPageAction;

impl Action for WaitForPageAction {
    type Context = WaitForPageContext;

    fn name(&self) -> &'static str {
        "WaitForPage"
    }

    fn execute(&self, env: &ActionEnv, context: &WaitForPageContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let schema = env.mapper().require(&context.page_name)?;
            let timeout = context.timeout.unwrap_or(env.settings().page_timeout);
            let token = CancellationToken::cancel_after(timeout);
            loop {
                match env.browser().is_on_page(&schema) {
                    Ok(true) => return Ok(Some(ActionOutput::Page(env.browser().page(&schema)?))),
                    Ok(false) => {}
                    Err(err) => tracing::debug!(page = %schema.name, %err, "page check failed"),
                }
                if token.is_cancelled() {
                    break;
                }
                std::thread::sleep(env.settings().poll_interval);
            }
            let current = env.browser().current_url().unwrap_or_default();
            Err(SpecBindError::navigation(
                &schema.name,
                format!(
                    "The browser did not reach page '{}' within {}ms. Current URL: '{current}'",
                    schema.name,
                    millis(timeout)
                ),
            ))
        };
        run().into()
    }
}

/// Drop a dialog page from the history. Outputs the page that is now most
/// recent, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloseDialogAction;

impl Action for CloseDialogAction {
    type Context = CloseDialogContext;

    fn name(&self) -> &'static str {
        "CloseDialog"
    }

    fn execute(&self, env: &ActionEnv, context: &CloseDialogContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let dialog = env.history().find_page(&context.page_name)?;
            let _ = env.history_mut().remove(dialog.page_type());
            tracing::info!(page = dialog.page_type(), "dialog closed");
            Ok(env.history().current().map(ActionOutput::Page))
        };
        run().into()
    }
}
