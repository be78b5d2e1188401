/*!
Substring search for the literal parts of a pattern.

A [`FixedString`] searches a [`Target`] for a single literal string. It is
used in two ways: when a whole pattern is a literal, it finds matches without
running the backtracking VM at all, and when a pattern merely contains a
literal that every match must include, it rules out targets that do not
contain it before any match is attempted.
*/

use alloc::{boxed::Box, string::String};

use memchr::memmem;

use crate::{
    syntax::unicode,
    target::{chars_match, Target},
    util::search::Span,
};

/// The number of buckets in the shift table.
const SHIFT_LEN: usize = 256;

/// A literal string search.
///
/// Targets stored as UTF-8 are searched case sensitively with `memchr`'s
/// `memmem`. Everything else is searched with Horspool's variant of
/// Boyer-Moore, walking the target one character at a time. Its shift table
/// is indexed by a hash of each character's case folded form, so that a
/// case insensitive search can use the same table.
#[derive(Clone, Debug)]
pub(crate) struct FixedString {
    chars: Box<[char]>,
    fold: bool,
    shift: Box<[usize; SHIFT_LEN]>,
    finder: memmem::Finder<'static>,
}

impl FixedString {
    /// Create a search for `chars`. When `fold` is true, characters are
    /// compared with simple case folding.
    pub(crate) fn new(chars: &[char], fold: bool) -> FixedString {
        let len = chars.len();
        let mut shift = Box::new([len.max(1); SHIFT_LEN]);
        for (i, &ch) in chars.iter().enumerate().take(len.saturating_sub(1)) {
            shift[bucket(fold, ch)] = len - 1 - i;
        }
        let needle: String = chars.iter().collect();
        let finder = memmem::Finder::new(needle.as_bytes()).into_owned();
        FixedString { chars: chars.into(), fold, shift, finder }
    }

    /// Find the leftmost occurrence of the literal in `start..limit`.
    pub(crate) fn find<T: ?Sized + Target>(
        &self,
        target: &T,
        start: usize,
        limit: usize,
    ) -> Option<Span> {
        if !self.fold {
            if let Some(bytes) = target.as_utf8() {
                return self.find_utf8(bytes, start, limit);
            }
        }
        self.find_horspool(target, start, limit)
    }

    fn find_utf8(&self, bytes: &[u8], start: usize, limit: usize) -> Option<Span> {
        let i = self.finder.find(bytes.get(start..limit)?)?;
        let start = start + i;
        Some(Span { start, end: start + self.finder.needle().len() })
    }

    fn find_horspool<T: ?Sized + Target>(
        &self,
        target: &T,
        start: usize,
        limit: usize,
    ) -> Option<Span> {
        let last = match self.chars.last() {
            None => return Some(Span { start, end: start }),
            Some(&last) => last,
        };
        // The window is at..end and always holds as many characters as the
        // literal.
        let mut at = start;
        let mut end = advance(target, start, limit, self.chars.len())?;
        loop {
            let (ch, _) = target.char_before(end, at)?;
            if chars_match(self.fold, ch, last)
                && target
                    .region_matches_back(self.fold, end, at, &self.chars)
                    .is_some()
            {
                return Some(Span { start: at, end });
            }
            let shift = self.shift[bucket(self.fold, ch)];
            end = advance(target, end, limit, shift)?;
            at = advance(target, at, limit, shift)?;
        }
    }

    /// Returns the heap memory, in bytes, used by this search.
    pub(crate) fn memory_usage(&self) -> usize {
        self.chars.len() * core::mem::size_of::<char>()
            + SHIFT_LEN * core::mem::size_of::<usize>()
            + self.finder.needle().len()
    }
}

/// Move forward `count` characters from `at`, without passing `limit`.
fn advance<T: ?Sized + Target>(
    target: &T,
    mut at: usize,
    limit: usize,
    count: usize,
) -> Option<usize> {
    for _ in 0..count {
        at = target.char_after(at, limit)?.1;
    }
    Some(at)
}

/// The shift table bucket of a character. Characters that are equal under
/// simple case folding share a bucket.
fn bucket(fold: bool, ch: char) -> usize {
    let ch = if fold {
        unicode::simple_lower(unicode::simple_upper(ch))
    } else {
        ch
    };
    ch as usize % SHIFT_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn find_chars(needle: &str, fold: bool, haystack: &str) -> Option<(usize, usize)> {
        let fs = FixedString::new(&chars(needle), fold);
        let haystack = chars(haystack);
        fs.find(&haystack[..], 0, haystack.len()).map(|sp| (sp.start, sp.end))
    }

    #[test]
    fn horspool() {
        assert_eq!(Some((4, 7)), find_chars("abc", false, "xabdabcabc"));
        assert_eq!(None, find_chars("abc", false, "xabdab"));
        assert_eq!(Some((0, 2)), find_chars("aa", false, "aaaa"));
        assert_eq!(Some((2, 4)), find_chars("ba", false, "aabab"));
        assert_eq!(Some((0, 0)), find_chars("", false, "abc"));
        assert_eq!(None, find_chars("abcd", false, "abc"));
        assert_eq!(Some((1, 3)), find_chars("βγ", false, "αβγ"));
    }

    #[test]
    fn horspool_fold() {
        assert_eq!(Some((1, 4)), find_chars("abc", true, "xAbC"));
        assert_eq!(None, find_chars("abc", false, "xAbC"));
        assert_eq!(Some((2, 5)), find_chars("ΣAB", true, "xxσab"));
    }

    #[test]
    fn utf8() {
        let fs = FixedString::new(&chars("βγ"), false);
        let haystack = "αβγ αβγ";
        let span = fs.find(haystack, 0, haystack.len()).unwrap();
        assert_eq!("βγ", &haystack[span]);
        assert_eq!(2..6, span.range());
        let span = fs.find(haystack, 6, haystack.len()).unwrap();
        assert_eq!(9..13, span.range());
        assert_eq!(None, fs.find(haystack, 6, 12));
    }

    #[test]
    fn utf8_fold_walks_chars() {
        let fs = FixedString::new(&chars("ab"), true);
        let haystack = "éAB";
        assert_eq!(Some(2..4), fs.find(haystack, 0, haystack.len()).map(|s| s.range()));
    }

    #[test]
    fn respects_span() {
        assert_eq!(None, FixedString::new(&chars("bc"), false).find(&chars("abcd")[..], 2, 4));
        let haystack = chars("abcbc");
        let fs = FixedString::new(&chars("bc"), false);
        assert_eq!(Some(3..5), fs.find(&haystack[..], 2, 5).map(|s| s.range()));
    }
}
