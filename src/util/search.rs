/*!
Types and routines that support the search APIs of a [`Regex`](crate::Regex).

The principal type is [`Input`], which bundles a [`Target`] with the span of
it that should be searched. [`Span`] is a simple `start..end` pair of offsets
and [`MatchError`] describes the ways in which a search can fail.
*/

use core::ops::Range;

use crate::target::Target;

/// The parameters of a regex search.
///
/// An `Input` is a [`Target`] plus the span of offsets within it that a
/// search should consider. By default, the span is the whole target. Offsets
/// are in the target's own units.
///
/// Anchors are evaluated relative to the span, not the whole target: `^`
/// (without multi-line mode) matches only at the span's start.
///
/// # Example
///
/// ```
/// use xml_regex::{Input, Regex};
///
/// let re = Regex::new("^b")?;
/// let input = Input::new("ab").range(1..2);
/// assert!(re.search(&input, None));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Input<'h, T: ?Sized> {
    haystack: &'h T,
    span: Span,
}

impl<'h, T: ?Sized + Target> Input<'h, T> {
    /// Create a new search configuration for the given target.
    #[inline]
    pub fn new(haystack: &'h T) -> Input<'h, T> {
        Input { haystack, span: haystack.span() }
    }

    /// Set the span for this search.
    ///
    /// The span is checked when a search is executed. A span that is not
    /// contained in the target, or does not fall on character boundaries,
    /// results in a [`MatchError::InvalidSpan`].
    #[inline]
    pub fn span<S: Into<Span>>(mut self, span: S) -> Input<'h, T> {
        self.span = span.into();
        self
    }

    /// Like `span`, but accepts any range instead.
    #[inline]
    pub fn range(self, range: Range<usize>) -> Input<'h, T> {
        self.span(range)
    }

    /// Return the target of this search.
    #[inline]
    pub fn haystack(&self) -> &'h T {
        self.haystack
    }

    /// Return the span of this search.
    #[inline]
    pub fn get_span(&self) -> Span {
        self.span
    }

    /// Return the start offset of this search.
    #[inline]
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// Return the end offset of this search.
    #[inline]
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Returns an error if the span of this search is not valid for its
    /// target.
    pub(crate) fn validate(&self) -> Result<(), MatchError> {
        let bounds = self.haystack.span();
        let Span { start, end } = self.span;
        if start > end
            || start < bounds.start
            || end > bounds.end
            || !self.haystack.is_boundary(start)
            || !self.haystack.is_boundary(end)
        {
            return Err(MatchError::InvalidSpan { start, end });
        }
        Ok(())
    }
}

impl<'h, T: ?Sized> Clone for Input<'h, T> {
    fn clone(&self) -> Input<'h, T> {
        *self
    }
}

impl<'h, T: ?Sized> Copy for Input<'h, T> {}

impl<'h, T: ?Sized> core::fmt::Debug for Input<'h, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Input").field("span", &self.span).finish()
    }
}

impl<'h, T: ?Sized + Target> From<&'h T> for Input<'h, T> {
    fn from(haystack: &'h T) -> Input<'h, T> {
        Input::new(haystack)
    }
}

/// A representation of a span reported by a regex engine.
///
/// A span corresponds to the starting and ending offsets, in the target's
/// units, of a contiguous region of text. Like a range, the start is
/// inclusive and the end is exclusive.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    /// The start offset of the span, inclusive.
    pub start: usize,
    /// The end offset of the span, exclusive.
    pub end: usize,
}

impl Span {
    /// Returns this span as a range.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        Range::from(*self)
    }

    /// Returns true when this span is empty. That is, when `start >= end`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns the length of this span.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

impl core::ops::Index<Span> for str {
    type Output = str;

    #[inline]
    fn index(&self, index: Span) -> &str {
        &self[index.range()]
    }
}

impl core::ops::Index<Span> for [char] {
    type Output = [char];

    #[inline]
    fn index(&self, index: Span) -> &[char] {
        &self[index.range()]
    }
}

impl From<Range<usize>> for Span {
    #[inline]
    fn from(range: Range<usize>) -> Span {
        Span { start: range.start, end: range.end }
    }
}

impl From<Span> for Range<usize> {
    #[inline]
    fn from(span: Span) -> Range<usize> {
        Range { start: span.start, end: span.end }
    }
}

/// An error that occurred during a search.
///
/// None of these errors can occur for a pattern produced by this crate's
/// parser and a well formed search. They indicate a malformed token tree
/// handed to [`Regex::from_token`](crate::Regex::from_token) or a bad span.
/// The infallible search routines panic when one occurs. The `try_` routines
/// return it.
///
/// A search that fails with an error leaves nothing behind in the regex: the
/// session it used is discarded with the rest of its scratch state.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MatchError {
    /// A backreference or conditional named a capturing group that does not
    /// exist in the pattern.
    InvalidGroup {
        /// The group that was named.
        group: usize,
        /// The number of groups in the pattern, including group `0`.
        group_len: usize,
    },
    /// The span of the search does not fit the target, or does not fall on
    /// character boundaries.
    InvalidSpan {
        /// The start of the invalid span.
        start: usize,
        /// The end of the invalid span.
        end: usize,
    },
}

impl std::error::Error for MatchError {}

impl core::fmt::Display for MatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            MatchError::InvalidGroup { group, group_len } => write!(
                f,
                "pattern refers to group {}, but it only has {} groups",
                group, group_len,
            ),
            MatchError::InvalidSpan { start, end } => write!(
                f,
                "invalid search span {}..{} for the given target",
                start, end,
            ),
        }
    }
}
