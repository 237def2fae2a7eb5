//! # Regex Wrapper

use core::fmt::{Debug, Formatter};

use crate::errors::{PCError, PCResult};
use crate::spanning::SpanLexer;

/// A pattern, labeled with the regex engine it should be compiled with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RegexWrapperPattern {
    /// Compile with [`regex::Regex`].
    Basic(String),

    /// Compile with [`fancy_regex::Regex`].
    Fancy(String),

    /// Try [`regex::Regex`] first; fall back to [`fancy_regex::Regex`].
    Adaptive(String),
}

impl From<&str> for RegexWrapperPattern {
    fn from(pattern: &str) -> Self {
        Self::Adaptive(pattern.to_string())
    }
}

impl From<String> for RegexWrapperPattern {
    fn from(pattern: String) -> Self {
        Self::Adaptive(pattern)
    }
}

impl RegexWrapperPattern {
    /// The pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(p) | Self::Fancy(p) | Self::Adaptive(p) => p,
        }
    }

    /// Compile the pattern.
    ///
    /// ## Returns
    /// A compiled [`RegexWrapper`]; or [`PCError::ModelLoad`] for an invalid pattern.
    pub fn compile(&self) -> PCResult<RegexWrapper> {
        let invalid = |err: &dyn core::fmt::Display| {
            PCError::ModelLoad(format!("invalid pattern {:?}: {err}", self.as_str()))
        };

        match self {
            Self::Basic(p) => regex::Regex::new(p)
                .map(RegexWrapper::Basic)
                .map_err(|e| invalid(&e)),
            Self::Fancy(p) => fancy_regex::Regex::new(p)
                .map(RegexWrapper::Fancy)
                .map_err(|e| invalid(&e)),
            Self::Adaptive(p) => match regex::Regex::new(p) {
                Ok(re) => Ok(RegexWrapper::Basic(re)),
                Err(_) => fancy_regex::Regex::new(p)
                    .map(RegexWrapper::Fancy)
                    .map_err(|e| invalid(&e)),
            },
        }
    }
}

/// A compiled regex, on either engine.
#[derive(Clone)]
pub enum RegexWrapper {
    /// A [`regex::Regex`].
    Basic(regex::Regex),

    /// A [`fancy_regex::Regex`].
    Fancy(fancy_regex::Regex),
}

impl Debug for RegexWrapper {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("RegexWrapper")
            .field("fancy", &self.is_fancy())
            .field("pattern", &self.as_str())
            .finish()
    }
}

impl PartialEq for RegexWrapper {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.is_fancy() == other.is_fancy() && self.as_str() == other.as_str()
    }
}

impl RegexWrapper {
    /// The pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(re) => re.as_str(),
            Self::Fancy(re) => re.as_str(),
        }
    }

    /// Is this compiled with [`fancy_regex`]?
    pub fn is_fancy(&self) -> bool {
        matches!(self, Self::Fancy(_))
    }

    /// Find the first match starting at or after `start`.
    ///
    /// ## Returns
    /// The match bounds, relative to `text`; or the [`fancy_regex`] runtime
    /// error, such as an exceeded backtrack limit.
    pub fn find_at(
        &self,
        text: &str,
        start: usize,
    ) -> Result<Option<(usize, usize)>, fancy_regex::Error> {
        match self {
            Self::Basic(re) => Ok(re.find_at(text, start).map(|m| (m.start(), m.end()))),
            Self::Fancy(re) => Ok(re
                .find_from_pos(text, start)?
                .map(|m| (m.start(), m.end()))),
        }
    }
}

impl SpanLexer for RegexWrapper {
    fn next_span(
        &self,
        text: &str,
        offset: usize,
    ) -> Option<(usize, usize)> {
        next_non_empty(text, offset, |pos| self.find_at(text, pos))
    }
}

/// Find the next non-empty match at or after `offset`.
///
/// Empty matches are stepped over one char at a time. A failed search (a
/// [`fancy_regex`] backtrack limit) steps over the char at its start position,
/// leaving it to the enclosing gap, and scanning resumes at the next char.
/// Each failed char costs at most one backtrack-limited search.
fn next_non_empty<F, E>(
    text: &str,
    offset: usize,
    mut find: F,
) -> Option<(usize, usize)>
where
    F: FnMut(usize) -> Result<Option<(usize, usize)>, E>,
    E: core::fmt::Display,
{
    let mut pos = offset;
    while pos <= text.len() {
        let step_from = match find(pos) {
            Ok(Some((start, end))) if start < end => return Some((start, end)),
            Ok(Some((start, _))) => start,
            Ok(None) => return None,
            Err(err) => {
                log::debug!("span search failed at {pos}: {err}");
                pos
            }
        };
        pos = step_from + text[step_from..].chars().next()?.len_utf8();
    }
    None
}
