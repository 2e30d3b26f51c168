//! Navigation and interaction steps.

use std::rc::Rc;

use super::{StepContext, StepTable};
use crate::actions::{
    ActionOutput, ButtonClickAction, CloseDialogAction, CloseDialogContext, ElementContext,
    GetElementAsPageAction, GetListItemByCriteriaAction, GetListItemByIndexAction,
    HoverOverElementAction, ListItemByCriteriaContext, ListItemByIndexContext, PageAction,
    PageNavigationAction, PageNavigationContext,
};
use crate::page::Page;
use crate::result::SpecBindResult;
use crate::validation::ValidationTable;

/// Steps that move between pages and press things
#[derive(Debug, Clone, Copy)]
pub struct CommonPageSteps<'a> {
    context: &'a StepContext,
}

impl<'a> CommonPageSteps<'a> {
    /// Steps over a scenario
    pub const fn new(context: &'a StepContext) -> Self {
        Self { context }
    }

    /// Given I navigate to the {page} page
    pub fn given_navigate_to_page(&self, page_name: &str) -> SpecBindResult<Rc<dyn Page>> {
        self.navigate(PageNavigationContext::new(page_name, PageAction::NavigateToPage))
    }

    /// Given I navigate to the {page} page with parameters. Header cells
    /// name the URL parameters and the first row holds their values.
    pub fn given_navigate_to_page_with_arguments(
        &self,
        page_name: &str,
        arguments: &StepTable,
    ) -> SpecBindResult<Rc<dyn Page>> {
        let mut context = PageNavigationContext::new(page_name, PageAction::NavigateToPage);
        if let Some(values) = arguments.rows().first() {
            for (name, value) in arguments.headers().iter().zip(values) {
                context = context.with_parameter(name.trim(), value.as_str());
            }
        }
        self.navigate(context)
    }

    /// Given I am on the {page} page
    pub fn given_ensure_on_page(&self, page_name: &str) -> SpecBindResult<Rc<dyn Page>> {
        self.navigate(PageNavigationContext::new(page_name, PageAction::EnsureOnPage))
    }

    /// Given I return to the {page} page; the page must be in the history
    pub fn given_return_to_page(&self, page_name: &str) -> SpecBindResult<Rc<dyn Page>> {
        let page = self.context.env().history().find_page(page_name)?;
        self.context.env().set_current_page(Rc::clone(&page));
        Ok(page)
    }

    /// When I close the {page} dialog; the page it was opened over becomes
    /// current again
    pub fn when_i_close_dialog(&self, page_name: &str) -> SpecBindResult<()> {
        let output = self
            .context
            .perform(&CloseDialogAction, &CloseDialogContext::new(page_name))?;
        if let Some(ActionOutput::Page(previous)) = output {
            self.context.env().set_current_page(previous);
        }
        Ok(())
    }

    /// When I choose {element}
    pub fn when_i_choose(&self, property_name: &str) -> SpecBindResult<()> {
        self.context
            .perform(&ButtonClickAction, &ElementContext::new(property_name))
            .map(|_| ())
    }

    /// When I hover over {element}
    pub fn when_i_hover_over(&self, property_name: &str) -> SpecBindResult<()> {
        self.context
            .perform(&HoverOverElementAction, &ElementContext::new(property_name))
            .map(|_| ())
    }

    /// Given I navigate to the {element} element; its nested properties
    /// become the current page
    pub fn given_navigate_to_element(&self, property_name: &str) -> SpecBindResult<Rc<dyn Page>> {
        self.context
            .perform_and_switch(&GetElementAsPageAction, &ElementContext::new(property_name))
    }

    /// Given I navigate to item {n} in the {list} list
    pub fn given_navigate_to_list_item(&self, index: usize, property_name: &str) -> SpecBindResult<Rc<dyn Page>> {
        self.context.perform_and_switch(
            &GetListItemByIndexAction,
            &ListItemByIndexContext::new(property_name, index),
        )
    }

    /// Given I navigate to the {list} list item matching criteria
    pub fn given_navigate_to_list_item_by_criteria(
        &self,
        property_name: &str,
        criteria: &StepTable,
    ) -> SpecBindResult<Rc<dyn Page>> {
        let validations = ValidationTable::from_step_table(criteria)?;
        self.context.perform_and_switch(
            &GetListItemByCriteriaAction,
            &ListItemByCriteriaContext::new(property_name, validations),
        )
    }

    fn navigate(&self, context: PageNavigationContext) -> SpecBindResult<Rc<dyn Page>> {
        self.context.perform_and_switch(&PageNavigationAction, &context)
    }
}
