//! Runs actions between their pre- and post-actions.

use std::fmt;

use super::{Action, ActionContext, ActionEnv, ActionResult, HighlightMode};
use crate::result::SpecBindResult;

/// Runs before an action; an error fails the action without running it
pub trait PreAction {
    /// Inspect or prepare the scenario
    fn perform_pre_action(&self, env: &ActionEnv, context: &dyn ActionContext) -> SpecBindResult<()>;
}

/// Runs after an action, whatever its outcome
pub trait PostAction {
    /// Observe the outcome
    fn perform_post_action(&self, env: &ActionEnv, context: &dyn ActionContext, result: &ActionResult);
}

// =============================================================================
// DEFAULT HOOKS
// =============================================================================

/// Highlights the target element when highlight mode is on
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightPreAction;

impl PreAction for HighlightPreAction {
    fn perform_pre_action(&self, env: &ActionEnv, context: &dyn ActionContext) -> SpecBindResult<()> {
        if env.settings().highlight_mode != HighlightMode::Full {
            return Ok(());
        }
        let target = context
            .property_name()
            .zip(env.current_page())
            .and_then(|(name, page)| page.try_get_element(name));
        if let Some(element) = target {
            element.highlight();
        }
        Ok(())
    }
}

/// Sets the cookies a page declares before a page action
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePreAction;

impl PreAction for CookiePreAction {
    fn perform_pre_action(&self, env: &ActionEnv, context: &dyn ActionContext) -> SpecBindResult<()> {
        let Some(schema) = context
            .target_page()
            .and_then(|name| env.mapper().get_type_from_name(name))
        else {
            return Ok(());
        };
        for cookie in &schema.cookies {
            env.browser().add_cookie(cookie)?;
        }
        Ok(())
    }
}

/// Records pages reached by page actions in the history
#[derive(Debug, Clone, Copy, Default)]
pub struct PageHistoryPostAction;

impl PostAction for PageHistoryPostAction {
    fn perform_post_action(&self, env: &ActionEnv, context: &dyn ActionContext, result: &ActionResult) {
        if context.target_page().is_none() {
            return;
        }
        if let Some(page) = result.page() {
            env.history_mut().add(page);
        }
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Runs actions between their hooks
#[derive(Default)]
pub struct ActionPipelineService {
    pre_actions: Vec<Box<dyn PreAction>>,
    post_actions: Vec<Box<dyn PostAction>>,
}

impl fmt::Debug for ActionPipelineService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionPipelineService")
            .field("pre_actions", &self.pre_actions.len())
            .field("post_actions", &self.post_actions.len())
            .finish()
    }
}

impl ActionPipelineService {
    /// Pipeline without hooks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with highlighting, page cookies and page history
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with_pre_action(HighlightPreAction)
            .with_pre_action(CookiePreAction)
            .with_post_action(PageHistoryPostAction)
    }

    /// Append a pre-action
    #[must_use]
    pub fn with_pre_action(mut self, pre_action: impl PreAction + 'static) -> Self {
        self.pre_actions.push(Box::new(pre_action));
        self
    }

    /// Append a post-action
    #[must_use]
    pub fn with_post_action(mut self, post_action: impl PostAction + 'static) -> Self {
        self.post_actions.push(Box::new(post_action));
        self
    }

    /// Run one action
    pub fn perform_action<A: Action>(&self, env: &ActionEnv, action: &A, context: &A::Context) -> ActionResult {
        tracing::debug!(action = action.name(), ?context, "performing action");
        for pre_action in &self.pre_actions {
            if let Err(err) = pre_action.perform_pre_action(env, context) {
                tracing::warn!(action = action.name(), %err, "pre-action failed");
                return ActionResult::failure(err);
            }
        }

        let result = action.execute(env, context);

        for post_action in &self.post_actions {
            post_action.perform_post_action(env, context, &result);
        }
        match result.error() {
            None => tracing::info!(action = action.name(), "action succeeded"),
            Some(err) => tracing::warn!(action = action.name(), %err, "action failed"),
        }
        result
    }
}
