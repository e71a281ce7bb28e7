//! Source locations attached to errors and match sites.

use std::fmt;
use std::sync::Arc;

/// A half-open byte range in the source the front-end compiled from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Identifies a pattern match in the compiled program.
///
/// Reported by inexhaustive-match errors so the failure can be traced back
/// to the expression that had no applicable case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSite {
    name: Arc<str>,
    span: Option<Span>,
}

impl MatchSite {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        MatchSite {
            name: name.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

impl fmt::Display for MatchSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} ({span})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
