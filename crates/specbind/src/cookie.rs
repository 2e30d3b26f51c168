//! Cookie directives and the `document.cookie` script builder.
//!
//! Pages may declare cookies that must be present before they are visited.
//! Browsers apply them by running the script produced here.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::result::{SpecBindError, SpecBindResult};

/// Cookie date format (RFC 1123 style, always GMT)
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A cookie a page wants set before it is used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieDirective {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Path, `/` when absent
    #[serde(default)]
    pub path: Option<String>,
    /// Domain; a port suffix is stripped
    #[serde(default)]
    pub domain: Option<String>,
    /// Expiration
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag
    #[serde(default)]
    pub secure: bool,
}

impl CookieDirective {
    /// Create a session cookie for the root path
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            expires: None,
            secure: false,
        }
    }

    /// Build the script that sets this cookie
    pub fn to_script(&self) -> SpecBindResult<String> {
        CookieBuilder::set_cookie_script(
            &self.name,
            &self.value,
            self.path.as_deref(),
            self.expires,
            self.domain.as_deref(),
            self.secure,
        )
    }
}

/// Builds JavaScript cookie assignments
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieBuilder;

impl CookieBuilder {
    /// Create a `document.cookie = "..."` assignment.
    ///
    /// # Errors
    ///
    /// Fails with an argument error on parameter `name` when the name contains
    /// `;`, `"` or `\`, and on `path` or `domain` when either contains a quote
    /// or backslash.
    pub fn set_cookie_script(
        name: &str,
        value: &str,
        path: Option<&str>,
        expires: Option<DateTime<Utc>>,
        domain: Option<&str>,
        secure: bool,
    ) -> SpecBindResult<String> {
        if name.contains(';') {
            return Err(SpecBindError::invalid_argument(
                "name",
                "Cookie name cannot contain ';'",
            ));
        }
        for (param, text) in [("name", Some(name)), ("path", path), ("domain", domain)] {
            if let Some(c) = text.and_then(|t| t.chars().find(|c| matches!(c, '"' | '\\'))) {
                return Err(SpecBindError::invalid_argument(
                    param,
                    format!("Cookie {param} cannot contain '{c}'"),
                ));
            }
        }

        let mut cookie = format!("{}={}", name.trim(), escape_value(value));
        if let Some(expires) = expires {
            cookie.push_str("; expires=");
            cookie.push_str(&format_cookie_date(expires));
        }
        cookie.push_str("; path=");
        cookie.push_str(path.filter(|p| !p.trim().is_empty()).unwrap_or("/"));
        if let Some(domain) = domain.map(strip_port).filter(|d| !d.is_empty()) {
            cookie.push_str("; domain=");
            cookie.push_str(domain);
        }
        if secure {
            cookie.push_str("; secure");
        }

        Ok(format!("document.cookie = \"{cookie}\";"))
    }
}

/// Format an expiration; the representable extremes clamp to the epoch and
/// to the last second of year 9999.
#[must_use]
pub fn format_cookie_date(expires: DateTime<Utc>) -> String {
    if expires.timestamp() <= 0 {
        return "Thu, 01 Jan 1970 00:00:00 GMT".to_string();
    }
    if expires.year() > 9999 {
        return "Fri, 31 Dec 9999 23:59:59 GMT".to_string();
    }
    expires.format(COOKIE_DATE_FORMAT).to_string()
}

fn strip_port(domain: &str) -> &str {
    let domain = domain.trim();
    if let Some(rest) = domain.strip_prefix('[') {
        // IPv6 literal: keep the bracketed host
        return rest
            .find(']')
            .map_or(domain, |end| &domain[..end + 2]);
    }
    match domain.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => domain,
    }
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            escaped.push(char::from(byte));
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    escaped
}
