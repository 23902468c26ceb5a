//! Path template parsing and matching.
//!
//! # Responsibilities
//! - Parse templates such as `/repos/{VCS}/{CloneURLEscaped:[^/]+}`
//! - Match a template against the start of a path, capturing placeholders
//! - Expand a template from placeholder values
//!
//! # Design Decisions
//! - Placeholders default to `[^/]+` (one non-empty segment)
//! - Matching is case-sensitive and purely textual
//! - A template matches a prefix; callers decide whether a remainder is allowed

use std::fmt;
use std::fmt::Write as _;

use regex::Regex;

use super::error::RouteError;

/// Constraint used for placeholders that do not declare one.
pub const DEFAULT_PLACEHOLDER_PATTERN: &str = "[^/]+";

/// One piece of a parsed template.
#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Placeholder {
        name: String,
        pattern: String,
        /// `pattern` anchored at both ends, for validating built values.
        anchored: Regex,
    },
}

/// A parsed path template with a compiled prefix matcher.
#[derive(Clone)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
    prefix: Regex,
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathPattern")
            .field("template", &self.template)
            .field("regex", &self.prefix.as_str())
            .finish_non_exhaustive()
    }
}

impl PathPattern {
    /// Parses a template containing `{Name}` or `{Name:regex}` placeholders.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let segments = parse_segments(template)?;
        Self::from_segments(template.to_string(), segments)
    }

    fn from_segments(template: String, segments: Vec<Segment>) -> Result<Self, RouteError> {
        let mut source = String::from("^");
        for segment in &segments {
            match segment {
                Segment::Literal(text) => source.push_str(&regex::escape(text)),
                Segment::Placeholder { name, pattern, .. } => {
                    write!(source, "(?P<{name}>{pattern})").ok();
                }
            }
        }
        let prefix = Regex::new(&source).map_err(|e| RouteError::Pattern {
            template: template.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            template,
            segments,
            prefix,
        })
    }

    /// Returns the template this pattern was parsed from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns a pattern for `self` followed by `child`.
    pub fn join(&self, child: &PathPattern) -> Result<PathPattern, RouteError> {
        let template = format!("{}{}", self.template, child.template);
        let segments = self
            .segments
            .iter()
            .chain(child.segments.iter())
            .cloned()
            .collect();
        Self::from_segments(template, segments)
    }

    /// Matches the start of `path`.
    ///
    /// Returns the raw placeholder captures and the unmatched remainder.
    pub fn match_prefix<'p>(&self, path: &'p str) -> Option<(Vec<(String, String)>, &'p str)> {
        let captures = self.prefix.captures(path)?;
        let whole = captures.get(0)?;

        let values = self
            .placeholders()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Some((values, &path[whole.end()..]))
    }

    /// Matches the whole of `path`.
    pub fn full_match(&self, path: &str) -> Option<Vec<(String, String)>> {
        match self.match_prefix(path)? {
            (values, "") => Some(values),
            _ => None,
        }
    }

    /// Substitutes placeholder values into the template.
    ///
    /// `value_for` supplies the already-escaped value of each placeholder.
    /// Values that do not satisfy their placeholder's constraint are rejected.
    pub fn expand<F>(&self, mut value_for: F) -> Result<String, RouteError>
    where
        F: FnMut(&str) -> Result<String, RouteError>,
    {
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, anchored, .. } => {
                    let value = value_for(name)?;
                    if !anchored.is_match(&value) {
                        return Err(RouteError::InvalidVariable {
                            variable: name.clone(),
                            value,
                        });
                    }
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>, RouteError> {
    let invalid = |reason: &str| RouteError::Pattern {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices();

    while let Some((start, c)) = chars.next() {
        match c {
            '{' => {
                // Braces may nest inside a placeholder's regex.
                let mut depth = 1;
                let mut end = None;
                for (i, c) in chars.by_ref() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(i);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let end = end.ok_or_else(|| invalid("unbalanced braces"))?;

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let placeholder = parse_placeholder(&template[start + 1..end]);
                segments.push(placeholder.map_err(|r| invalid(r.as_str()))?);
            }
            '}' => return Err(invalid("unbalanced braces")),
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_placeholder(inner: &str) -> Result<Segment, String> {
    let (name, pattern) = inner
        .split_once(':')
        .map_or((inner, DEFAULT_PLACEHOLDER_PATTERN), |(n, p)| (n, p));

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid placeholder name {name:?}"));
    }
    if pattern.is_empty() {
        return Err(format!("empty pattern for placeholder {name:?}"));
    }

    let anchored = Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| format!("placeholder {name:?}: {e}"))?;

    Ok(Segment::Placeholder {
        name: name.to_string(),
        pattern: pattern.to_string(),
        anchored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert_eq!(pattern.full_match("/"), Some(vec![]));
        assert!(pattern.full_match("/x").is_none());
        assert_eq!(pattern.placeholders().count(), 0);
    }

    #[test]
    fn test_prefix_match_with_placeholders() {
        let pattern = PathPattern::parse("/repos/{VCS}/{CloneURLEscaped:[^/]+}").unwrap();
        let (values, rest) = pattern.match_prefix("/repos/git/a$b/commits/abc").unwrap();
        assert_eq!(
            values,
            vec![
                ("VCS".to_string(), "git".to_string()),
                ("CloneURLEscaped".to_string(), "a$b".to_string()),
            ]
        );
        assert_eq!(rest, "/commits/abc");
        assert!(pattern.match_prefix("/repos/git").is_none());
        assert!(pattern.match_prefix("/other/git/x").is_none());
    }

    #[test]
    fn test_optional_suffix_placeholder() {
        let pattern = PathPattern::parse("/tree{Path:(?:/.*)*}").unwrap();
        assert_eq!(
            pattern.full_match("/tree"),
            Some(vec![("Path".to_string(), String::new())])
        );
        assert_eq!(
            pattern.full_match("/tree/a/b"),
            Some(vec![("Path".to_string(), "/a/b".to_string())])
        );
        assert!(pattern.full_match("/treetop").is_none());
    }

    #[test]
    fn test_nested_braces_in_constraint() {
        let pattern = PathPattern::parse("/commits/{CommitID:[0-9a-f]{6,40}}").unwrap();
        assert!(pattern.full_match("/commits/abc123").is_some());
        assert!(pattern.full_match("/commits/xyz").is_none());
    }

    #[test]
    fn test_join() {
        let parent = PathPattern::parse("/repos/{VCS}").unwrap();
        let child = PathPattern::parse("/tags/{Tag}").unwrap();
        let joined = parent.join(&child).unwrap();
        assert_eq!(joined.template(), "/repos/{VCS}/tags/{Tag}");
        assert_eq!(joined.placeholders().collect::<Vec<_>>(), vec!["VCS", "Tag"]);
        assert!(joined.full_match("/repos/git/tags/v1").is_some());
    }

    #[test]
    fn test_expand() {
        let pattern = PathPattern::parse("/branches/{Branch}").unwrap();
        let url = pattern.expand(|_| Ok("main".to_string())).unwrap();
        assert_eq!(url, "/branches/main");

        let err = pattern.expand(|_| Ok(String::new())).unwrap_err();
        assert!(matches!(err, RouteError::InvalidVariable { .. }));

        let err = pattern.expand(|_| Ok("a/b".to_string())).unwrap_err();
        assert!(matches!(err, RouteError::InvalidVariable { .. }));
    }

    #[test]
    fn test_invalid_templates() {
        assert!(PathPattern::parse("/a/{B").is_err());
        assert!(PathPattern::parse("/a/B}").is_err());
        assert!(PathPattern::parse("/a/{}").is_err());
        assert!(PathPattern::parse("/a/{B:(}").is_err());
    }
}
