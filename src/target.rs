/*!
Read-only views over the text being matched.

The matching engine never looks at the representation of its input. Instead,
it works through the [`Target`] trait, which decodes characters forward and
backward from an offset and compares regions of text, optionally without
regard to case. Offsets are expressed in the target's own units: `char`
indices for a `[char]` buffer, byte offsets for a `str` and cursor indices for
a [`CursorTarget`].

Three implementations are provided:

* `[char]`, a contiguous buffer of code points.
* `str`, where offsets are UTF-8 byte offsets and must fall on character
  boundaries.
* [`CursorTarget`], which wraps any [`CharCursor`], a bidirectional cursor
  over text that need not be stored contiguously.
*/

use core::cell::RefCell;

use alloc::collections::VecDeque;

use crate::{syntax::unicode, util::search::Span};

/// A uniform view over the text being matched.
///
/// Implementors only need to provide [`Target::span`],
/// [`Target::char_after`], [`Target::char_before`] and
/// [`Target::is_boundary`]. The region comparisons have default
/// implementations in terms of those, which implementations may override
/// with something faster.
pub trait Target {
    /// The span of valid offsets in this target. Usually this is
    /// `0..len`, but cursors may begin at a non-zero index.
    fn span(&self) -> Span;

    /// Decode the character starting at `at`, provided that it ends at or
    /// before `limit`. Returns the character and the offset just past it.
    fn char_after(&self, at: usize, limit: usize) -> Option<(char, usize)>;

    /// Decode the character ending at `at`, provided that it starts at or
    /// after `start`. Returns the character and the offset at which it
    /// starts.
    fn char_before(&self, at: usize, start: usize) -> Option<(char, usize)>;

    /// Returns true if and only if `at` is a valid offset into this target,
    /// i.e., within its span and on a character boundary.
    fn is_boundary(&self, at: usize) -> bool;

    /// Returns the UTF-8 encoding of this target when it is stored that way.
    /// Substring searches use this to run on bytes.
    fn as_utf8(&self) -> Option<&[u8]> {
        None
    }

    /// Compare `literal` with the text starting at `at`, without reading at
    /// or past `limit`. On success, returns the offset just past the
    /// matched region.
    fn region_matches(
        &self,
        ignore_case: bool,
        at: usize,
        limit: usize,
        literal: &[char],
    ) -> Option<usize> {
        let mut at = at;
        for &expected in literal {
            let (ch, next) = self.char_after(at, limit)?;
            if !chars_match(ignore_case, ch, expected) {
                return None;
            }
            at = next;
        }
        Some(at)
    }

    /// Compare `literal` with the text ending at `at`, without reading
    /// before `start`. On success, returns the offset at which the matched
    /// region begins.
    fn region_matches_back(
        &self,
        ignore_case: bool,
        at: usize,
        start: usize,
        literal: &[char],
    ) -> Option<usize> {
        let mut at = at;
        for &expected in literal.iter().rev() {
            let (ch, prev) = self.char_before(at, start)?;
            if !chars_match(ignore_case, ch, expected) {
                return None;
            }
            at = prev;
        }
        Some(at)
    }

    /// Compare the text in `region` with the text starting at `at`, without
    /// reading at or past `limit`. This is how backreferences are matched.
    fn region_matches_self(
        &self,
        ignore_case: bool,
        at: usize,
        limit: usize,
        region: Span,
    ) -> Option<usize> {
        let (mut at, mut pos) = (at, region.start);
        while pos < region.end {
            let (expected, next_pos) = self.char_after(pos, region.end)?;
            let (ch, next) = self.char_after(at, limit)?;
            if !chars_match(ignore_case, ch, expected) {
                return None;
            }
            at = next;
            pos = next_pos;
        }
        Some(at)
    }

    /// Like [`Target::region_matches_self`], but compares the text ending
    /// at `at`, walking backward.
    fn region_matches_self_back(
        &self,
        ignore_case: bool,
        at: usize,
        start: usize,
        region: Span,
    ) -> Option<usize> {
        let (mut at, mut pos) = (at, region.end);
        while pos > region.start {
            let (expected, prev_pos) = self.char_before(pos, region.start)?;
            let (ch, prev) = self.char_before(at, start)?;
            if !chars_match(ignore_case, ch, expected) {
                return None;
            }
            at = prev;
            pos = prev_pos;
        }
        Some(at)
    }
}

/// Compare two characters, optionally with simple case folding.
#[inline]
pub(crate) fn chars_match(ignore_case: bool, ch: char, expected: char) -> bool {
    ch == expected || (ignore_case && unicode::eq_ignore_case(ch, expected))
}

impl Target for [char] {
    fn span(&self) -> Span {
        Span { start: 0, end: self.len() }
    }

    #[inline]
    fn char_after(&self, at: usize, limit: usize) -> Option<(char, usize)> {
        if at < limit && at < self.len() {
            Some((self[at], at + 1))
        } else {
            None
        }
    }

    #[inline]
    fn char_before(&self, at: usize, start: usize) -> Option<(char, usize)> {
        if at > start && at <= self.len() {
            Some((self[at - 1], at - 1))
        } else {
            None
        }
    }

    fn is_boundary(&self, at: usize) -> bool {
        at <= self.len()
    }

    fn region_matches(
        &self,
        ignore_case: bool,
        at: usize,
        limit: usize,
        literal: &[char],
    ) -> Option<usize> {
        let end = at.checked_add(literal.len())?;
        if end > limit || end > self.len() {
            return None;
        }
        let found = &self[at..end];
        let same = if ignore_case {
            found.iter().zip(literal).all(|(&a, &b)| chars_match(true, a, b))
        } else {
            found == literal
        };
        if same {
            Some(end)
        } else {
            None
        }
    }
}

impl Target for str {
    fn span(&self) -> Span {
        Span { start: 0, end: self.len() }
    }

    #[inline]
    fn char_after(&self, at: usize, limit: usize) -> Option<(char, usize)> {
        let ch = self.get(at..limit)?.chars().next()?;
        Some((ch, at + ch.len_utf8()))
    }

    #[inline]
    fn char_before(&self, at: usize, start: usize) -> Option<(char, usize)> {
        let ch = self.get(start..at)?.chars().next_back()?;
        Some((ch, at - ch.len_utf8()))
    }

    fn is_boundary(&self, at: usize) -> bool {
        self.is_char_boundary(at)
    }

    fn as_utf8(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

/// A bidirectional cursor over text.
///
/// This is the least demanding text representation: all the engine needs is
/// to move to an index and read the character there. Indices run from
/// `begin_index` (inclusive) to `end_index` (exclusive), one per character.
pub trait CharCursor {
    /// The first valid index.
    fn begin_index(&self) -> usize;

    /// One past the last valid index.
    fn end_index(&self) -> usize;

    /// Move this cursor to `index` and return the character there. Returns
    /// `None` when `index` is not in `begin_index..end_index`.
    fn set_index(&mut self, index: usize) -> Option<char>;
}

impl CharCursor for VecDeque<char> {
    fn begin_index(&self) -> usize {
        0
    }

    fn end_index(&self) -> usize {
        self.len()
    }

    fn set_index(&mut self, index: usize) -> Option<char> {
        self.get(index).copied()
    }
}

/// A [`Target`] backed by a [`CharCursor`].
///
/// The cursor is moved as the engine reads characters, so it lives in a
/// `RefCell`. A `CursorTarget` therefore cannot be shared between threads,
/// which is fine since a target is only ever used by one search at a time.
///
/// # Example
///
/// ```
/// use std::collections::VecDeque;
///
/// use xml_regex::{target::CursorTarget, Regex};
///
/// let mut text: VecDeque<char> = "bc".chars().collect();
/// text.push_front('a');
///
/// let re = Regex::new("ab+c")?;
/// assert!(re.matches(&CursorTarget::new(text)));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct CursorTarget<C> {
    cursor: RefCell<C>,
    begin: usize,
    end: usize,
}

impl<C: CharCursor> CursorTarget<C> {
    /// Wrap the given cursor.
    pub fn new(cursor: C) -> CursorTarget<C> {
        let (begin, end) = (cursor.begin_index(), cursor.end_index());
        CursorTarget { cursor: RefCell::new(cursor), begin, end }
    }

    /// Unwrap this target, returning the cursor.
    pub fn into_inner(self) -> C {
        self.cursor.into_inner()
    }
}

impl<C: CharCursor> Target for CursorTarget<C> {
    fn span(&self) -> Span {
        Span { start: self.begin, end: self.end }
    }

    #[inline]
    fn char_after(&self, at: usize, limit: usize) -> Option<(char, usize)> {
        if at < self.begin || at >= limit.min(self.end) {
            return None;
        }
        let ch = self.cursor.borrow_mut().set_index(at)?;
        Some((ch, at + 1))
    }

    #[inline]
    fn char_before(&self, at: usize, start: usize) -> Option<(char, usize)> {
        if at <= start.max(self.begin) || at > self.end {
            return None;
        }
        let ch = self.cursor.borrow_mut().set_index(at - 1)?;
        Some((ch, at - 1))
    }

    fn is_boundary(&self, at: usize) -> bool {
        self.begin <= at && at <= self.end
    }
}
