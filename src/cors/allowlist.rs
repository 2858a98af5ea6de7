//! Origin allow-list: parsing the configured pattern list and matching
//! request origins against it.
//!
//! Patterns are either the universal wildcard `*`, an exact origin
//! string, or a glob such as `https://*.stackblitz.io`. Matching never
//! fails: a pattern that cannot be compiled is logged and skipped.

use regex::Regex;
use tracing::warn;

/// Outcome of matching a request origin against the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginMatch {
    /// The allow-list contains `*`; any origin is permitted.
    Wildcard,
    /// The request origin matched a pattern; echo it back verbatim.
    Exact(String),
    /// No pattern matched; the `Access-Control-Allow-Origin` header
    /// must not be set.
    NoMatch,
}

impl OriginMatch {
    /// Whether the origin is allowed at all.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, OriginMatch::NoMatch)
    }
}

/// Ordered list of origin patterns parsed from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    patterns: Vec<String>,
}

impl AllowList {
    /// Parse the comma-separated allow-list string.
    ///
    /// A bare `*` yields the single-element list `["*"]`; otherwise the
    /// string is split on commas, elements are trimmed, and empty
    /// elements are dropped, preserving order.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let patterns = if raw == "*" {
            vec!["*".to_string()]
        } else {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };
        Self { patterns }
    }

    /// Whether the universal wildcard appears anywhere in the list.
    pub fn allows_any(&self) -> bool {
        self.patterns.iter().any(|p| p == "*")
    }

    /// The parsed patterns, in configuration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Match a request origin against the allow-list.
    ///
    /// The universal wildcard wins regardless of whether an `Origin`
    /// header was sent. Otherwise patterns are tried in order and the
    /// first match wins: exact string equality for literal patterns,
    /// glob semantics for patterns containing `*`. An absent origin
    /// with no universal wildcard is `NoMatch`, as is an empty list.
    pub fn match_origin(&self, origin: Option<&str>) -> OriginMatch {
        if self.allows_any() {
            return OriginMatch::Wildcard;
        }

        let origin = match origin {
            Some(o) => o,
            None => return OriginMatch::NoMatch,
        };

        for pattern in &self.patterns {
            if pattern.contains('*') {
                match compile_pattern(pattern) {
                    Some(re) if re.is_match(origin) => {
                        return OriginMatch::Exact(origin.to_string());
                    }
                    Some(_) => {}
                    None => {
                        warn!(pattern = %pattern, "skipping uncompilable origin pattern");
                    }
                }
            } else if pattern == origin {
                return OriginMatch::Exact(origin.to_string());
            }
        }

        OriginMatch::NoMatch
    }
}

/// Compile a glob origin pattern into an anchored regex.
///
/// Every non-wildcard segment is regex-escaped, each `*` becomes `.*`,
/// and the result is anchored at both ends. Returns `None` if the
/// assembled expression is rejected by the regex engine.
pub fn compile_pattern(pattern: &str) -> Option<Regex> {
    let escaped = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{escaped}$")).ok()
}
