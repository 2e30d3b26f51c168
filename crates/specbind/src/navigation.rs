//! URL templates and page recognition.
//!
//! Page URLs are templates with `{param}` placeholders. The same template
//! doubles as the pattern used to decide whether the browser is on the page,
//! unless the page declares an explicit pattern.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::result::{SpecBindError, SpecBindResult};
use crate::schema::PageNavigation;

/// Matches one `{param}` placeholder
const PLACEHOLDER: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// URL helpers for page navigation
#[derive(Debug, Clone, Copy, Default)]
pub struct UriHelper;

impl UriHelper {
    /// Substitute `{param}` placeholders. Parameter names match ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` naming the first placeholder with no value.
    pub fn fill_template(template: &str, params: &HashMap<String, String>) -> SpecBindResult<String> {
        let placeholder = placeholder_regex()?;
        let mut filled = String::with_capacity(template.len());
        let mut last = 0;
        for caps in placeholder.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = params
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name.as_str()))
                .map(|(_, v)| v)
                .ok_or_else(|| {
                    SpecBindError::invalid_argument(
                        "params",
                        format!(
                            "No value supplied for URL parameter '{}' in '{template}'",
                            name.as_str()
                        ),
                    )
                })?;
            filled.push_str(&template[last..whole.start()]);
            filled.push_str(value);
            last = whole.end();
        }
        filled.push_str(&template[last..]);
        Ok(filled)
    }

    /// Resolve a possibly relative URL against the application base URL
    #[must_use]
    pub fn qualify(base: &str, url: &str) -> String {
        if url.contains("://") || base.trim().is_empty() {
            return url.to_string();
        }
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }

    /// Full navigation URL for a page
    ///
    /// # Errors
    ///
    /// Fails when a template parameter has no value.
    pub fn navigation_url(
        navigation: &PageNavigation,
        base: &str,
        params: &HashMap<String, String>,
    ) -> SpecBindResult<String> {
        let filled = Self::fill_template(&navigation.url, params)?;
        Ok(if navigation.is_absolute {
            filled
        } else {
            Self::qualify(base, &filled)
        })
    }

    /// Pattern recognising the page's URL.
    ///
    /// An explicit pattern is used as written. Otherwise the template is
    /// escaped, each placeholder matches one path segment, and a trailing
    /// slash, query or fragment is tolerated. Matching ignores case.
    ///
    /// # Errors
    ///
    /// Returns `Config` when an explicit pattern is not a valid regex.
    pub fn url_regex(navigation: &PageNavigation, base: &str) -> SpecBindResult<Regex> {
        let pattern = match &navigation.url_pattern {
            Some(explicit) => explicit.clone(),
            None => {
                let full = if navigation.is_absolute {
                    navigation.url.clone()
                } else {
                    Self::qualify(base, &navigation.url)
                };
                let body = template_to_pattern(full.trim_end_matches('/'))?;
                let anchor = if full.contains("://") { "^" } else { "" };
                format!("{anchor}{body}/?(?:[?#].*)?$")
            }
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SpecBindError::config(format!("Invalid URL pattern '{pattern}': {e}")))
    }

    /// Whether `current` is the page's URL
    ///
    /// # Errors
    ///
    /// Fails when the page's pattern does not compile.
    pub fn is_match(navigation: &PageNavigation, base: &str, current: &str) -> SpecBindResult<bool> {
        Ok(Self::url_regex(navigation, base)?.is_match(current))
    }
}

fn placeholder_regex() -> SpecBindResult<Regex> {
    Regex::new(PLACEHOLDER).map_err(|e| SpecBindError::config(e.to_string()))
}

fn template_to_pattern(template: &str) -> SpecBindResult<String> {
    let placeholder = placeholder_regex()?;
    let mut pattern = String::new();
    let mut last = 0;
    for m in placeholder.find_iter(template) {
        pattern.push_str(&regex::escape(&template[last..m.start()]));
        pattern.push_str("[^/?#]+");
        last = m.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    Ok(pattern)
}
