//! Step Bindings
//!
//! The glue between scenario text and the action pipeline. Step classes
//! ([`CommonPageSteps`], [`DataSteps`], [`WaitingSteps`]) translate one step
//! into one or more actions; [`StepRegistry`] routes step text to them by
//! regular expression.

mod common;
mod data;
mod registry;
mod waiting;

pub use common::CommonPageSteps;
pub use data::DataSteps;
pub use registry::{StepHandler, StepRegistry};
pub use waiting::WaitingSteps;

use std::rc::Rc;

use crate::actions::{Action, ActionEnv, ActionOutput, ActionPipelineService, ActionSettings};
use crate::browser::Browser;
use crate::config::SpecBindConfig;
use crate::mapper::PageMapper;
use crate::page::{normalize_name, Page};
use crate::result::{SpecBindError, SpecBindResult};

// =============================================================================
// STEP TABLE
// =============================================================================

/// A table attached to a step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StepTable {
    /// Table with the given header row
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row
    #[must_use]
    pub fn with_row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_row(row);
        self
    }

    /// Append a data row in place
    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Parse Gherkin pipe syntax; the first row is the header
    pub fn parse(text: &str) -> SpecBindResult<Self> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let inner = line
                    .strip_prefix('|')
                    .and_then(|l| l.strip_suffix('|'))
                    .ok_or_else(|| {
                        SpecBindError::invalid_argument("table", format!("'{line}' is not a table row"))
                    })?;
                Ok::<_, SpecBindError>(inner.split('|').map(|cell| cell.trim().to_string()).collect::<Vec<_>>())
            });
        let headers = lines
            .next()
            .ok_or_else(|| SpecBindError::invalid_argument("table", "A table needs a header row"))??;
        let mut table = Self::new(headers);
        for row in lines {
            let row = row?;
            if row.len() != table.headers.len() {
                return Err(SpecBindError::invalid_argument(
                    "table",
                    format!(
                        "Row has {} cells but the header has {}",
                        row.len(),
                        table.headers.len()
                    ),
                ));
            }
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Header cells as written
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of a column; header case and whitespace are ignored
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        let key = normalize_name(name);
        self.headers.iter().position(|h| normalize_name(h) == key)
    }

    /// Cell of a row by column name
    #[must_use]
    pub fn cell<'a>(&self, row: &'a [String], column: &str) -> Option<&'a str> {
        self.column(column)
            .and_then(|i| row.get(i))
            .map(String::as_str)
    }

    /// Index of a required column
    pub fn require_column(&self, name: &str) -> SpecBindResult<usize> {
        self.column(name).ok_or_else(|| {
            SpecBindError::execute(format!(
                "The table must contain a '{name}' column; found: {}",
                self.headers.join(", ")
            ))
        })
    }
}

// =============================================================================
// STEP CONTEXT
// =============================================================================

/// Scenario state shared by every step
#[derive(Debug)]
pub struct StepContext {
    env: ActionEnv,
    pipeline: ActionPipelineService,
}

impl StepContext {
    /// Scenario over a browser session with the default pipeline
    pub fn new(browser: Rc<dyn Browser>, mapper: Rc<PageMapper>, settings: ActionSettings) -> Self {
        Self::with_pipeline(
            ActionEnv::new(browser, mapper, settings),
            ActionPipelineService::with_defaults(),
        )
    }

    /// Scenario configured from `config`
    pub fn from_config(browser: Rc<dyn Browser>, mapper: Rc<PageMapper>, config: &SpecBindConfig) -> Self {
        Self::new(browser, mapper, config.action_settings())
    }

    /// Scenario with an explicit pipeline
    pub const fn with_pipeline(env: ActionEnv, pipeline: ActionPipelineService) -> Self {
        Self { env, pipeline }
    }

    /// Action environment
    pub const fn env(&self) -> &ActionEnv {
        &self.env
    }

    /// Page the scenario is on
    pub fn current_page(&self) -> Option<Rc<dyn Page>> {
        self.env.current_page()
    }

    /// Run an action through the pipeline, failing on a failed result
    pub fn perform<A: Action>(&self, action: &A, context: &A::Context) -> SpecBindResult<Option<ActionOutput>> {
        self.pipeline.perform_action(&self.env, action, context).check_result()
    }

    /// Run an action that yields a page and make that page current
    pub fn perform_and_switch<A: Action>(&self, action: &A, context: &A::Context) -> SpecBindResult<Rc<dyn Page>> {
        let page = self.pipeline.perform_action(&self.env, action, context).check_page()?;
        self.env.set_current_page(Rc::clone(&page));
        Ok(page)
    }

    /// End the scenario: forget pages and close the browser
    pub fn close(&self) -> SpecBindResult<()> {
        self.env.history_mut().clear();
        self.env.browser().close()
    }
}
