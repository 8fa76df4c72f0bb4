//! Compiled path patterns.
//!
//! A rule's `match.path` string is compiled once, at load time, into a
//! [`PathPattern`]: a sequence of segments matched against the request path
//! segment by segment. Four segment forms are supported:
//!
//! - **static** - `users`, matched literally
//! - **parameter** - `{id}`, matches any single non-empty segment and
//!   captures it under the given name
//! - **regex** - `<v[0-9]+>`, the segment must match the anchored regular
//!   expression between the angle brackets
//! - **wildcard** - `*` or `*rest`, must be the final segment; matches zero
//!   or more remaining segments (captured under the given name, if any)
//!
//! ## Specificity
//!
//! Overlapping patterns are resolved by a documented total order, compared
//! at the first segment where two patterns differ in kind:
//! static beats parameter beats regex beats wildcard. If one pattern is a
//! prefix of the other, the longer one wins. Remaining ties fall back to
//! the raw pattern text, so the ordering is deterministic for any rule set.

use gatehouse_core::GatehouseError;
use regex::Regex;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One compiled pattern segment.
#[derive(Debug, Clone)]
enum Segment {
    /// Literal segment.
    Static(String),
    /// `{name}` - single-segment capture.
    Param(String),
    /// `<regex>` - anchored regular expression over one segment.
    Regex(Regex),
    /// `*` or `*name` - trailing catch-all.
    Wildcard(Option<String>),
}

impl Segment {
    /// Specificity rank; lower is more specific.
    const fn rank(&self) -> u8 {
        match self {
            Self::Static(_) => 0,
            Self::Param(_) => 1,
            Self::Regex(_) => 2,
            Self::Wildcard(_) => 3,
        }
    }
}

/// A compiled, matchable path pattern.
///
/// # Example
///
/// ```
/// use gatehouse_rule::PathPattern;
///
/// let pattern = PathPattern::compile("/users/{id}/posts").unwrap();
/// let params = pattern.matches("/users/123/posts").unwrap();
/// assert_eq!(params.get("id").map(String::as_str), Some("123"));
/// assert!(pattern.matches("/users/123").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: SmallVec<[Segment; 8]>,
}

impl PathPattern {
    /// Compiles a pattern string.
    ///
    /// Fails with a `Config` error on an empty parameter name, an unclosed
    /// regex delimiter, an invalid regular expression, a wildcard that is
    /// not the final segment, or a wildcard capture name with characters
    /// outside `[A-Za-z0-9_]`.
    pub fn compile(pattern: &str) -> Result<Self, GatehouseError> {
        let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments: SmallVec<[Segment; 8]> = SmallVec::new();

        for (index, part) in parts.iter().enumerate() {
            let segment = if let Some(name) =
                part.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
            {
                if name.is_empty() {
                    return Err(GatehouseError::config(format!(
                        "pattern {pattern:?}: parameter segment has no name"
                    )));
                }
                Segment::Param(name.to_string())
            } else if let Some(inner) = part.strip_prefix('<') {
                let Some(inner) = inner.strip_suffix('>') else {
                    return Err(GatehouseError::config(format!(
                        "pattern {pattern:?}: unclosed regex segment {part:?}"
                    )));
                };
                let regex = Regex::new(&format!("^(?:{inner})$")).map_err(|err| {
                    GatehouseError::config(format!(
                        "pattern {pattern:?}: invalid regex segment {part:?}: {err}"
                    ))
                })?;
                Segment::Regex(regex)
            } else if let Some(name) = part.strip_prefix('*') {
                if index + 1 != parts.len() {
                    return Err(GatehouseError::config(format!(
                        "pattern {pattern:?}: wildcard must be the final segment"
                    )));
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(GatehouseError::config(format!(
                        "pattern {pattern:?}: invalid wildcard name {name:?}"
                    )));
                }
                let name = (!name.is_empty()).then(|| name.to_string());
                Segment::Wildcard(name)
            } else {
                Segment::Static((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Returns the raw pattern text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Tests a request path against this pattern.
    ///
    /// Returns the captured parameters on a match, `None` otherwise. The
    /// test is side-effect-free and safe to call concurrently.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = HashMap::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(index)?;
                    params.insert(name.clone(), (*value).to_string());
                }
                Segment::Regex(regex) => {
                    let value = parts.get(index)?;
                    if !regex.is_match(value) {
                        return None;
                    }
                }
                Segment::Wildcard(name) => {
                    // Matches zero or more remaining segments.
                    if let Some(name) = name {
                        params.insert(name.clone(), parts[index.min(parts.len())..].join("/"));
                    }
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Compares two patterns by specificity.
    ///
    /// `Less` means `self` is more specific and wins the tie-break. This is
    /// a total order: segment kind at the first difference, then segment
    /// count (longer wins), then raw pattern text.
    #[must_use]
    pub fn cmp_specificity(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            let ordering = a.rank().cmp(&b.rank());
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        other
            .segments
            .len()
            .cmp(&self.segments.len())
            .then_with(|| self.raw.cmp(&other.raw))
    }
}
