/*!
Zero-width anchor assertions and their predicates.

An anchor is tested at an offset of a [`Target`], relative to the span being
searched: the start and limit of the search act as the edges of the text.
*/

use crate::{
    syntax::unicode::{self, WordType},
    target::Target,
    util::options::Options,
};

/// A zero-width assertion about the text surrounding an offset.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Anchor {
    /// `^`: the start of the search, or with multi-line mode, the position
    /// after a line terminator, provided that position is not the end.
    StartLine,
    /// `$`: the end of the search, or the position before a final line
    /// terminator or final `\r\n`. With multi-line mode, the position before
    /// any line terminator.
    EndLine,
    /// `\A`: the start of the search.
    StartText,
    /// `\Z`: like `$` without multi-line mode.
    EndTextOptionalNewline,
    /// `\z`: the end of the search.
    EndText,
    /// `\b`: a boundary between a word and a non-word.
    WordBoundary,
    /// `\B`: not a word boundary.
    NotWordBoundary,
    /// `\<`: the start of a word.
    WordStart,
    /// `\>`: the end of a word.
    WordEnd,
}

impl Anchor {
    /// The character that names this anchor in a rendered pattern.
    pub fn as_char(self) -> char {
        match self {
            Anchor::StartLine => '^',
            Anchor::EndLine => '$',
            Anchor::StartText => 'A',
            Anchor::EndTextOptionalNewline => 'Z',
            Anchor::EndText => 'z',
            Anchor::WordBoundary => 'b',
            Anchor::NotWordBoundary => 'B',
            Anchor::WordStart => '<',
            Anchor::WordEnd => '>',
        }
    }

    /// Test this anchor at `at`, where `start..limit` is the span of the
    /// search.
    pub fn matches<T: ?Sized + Target>(
        self,
        target: &T,
        start: usize,
        limit: usize,
        at: usize,
        opts: Options,
    ) -> bool {
        match self {
            Anchor::StartLine => {
                if opts.is_multi_line() {
                    at == start
                        || (at > start
                            && at < limit
                            && is_line_terminator_before(target, start, at))
                } else {
                    at == start
                }
            }
            Anchor::EndLine => {
                if opts.is_multi_line() {
                    at == limit
                        || target
                            .char_after(at, limit)
                            .map_or(false, |(ch, _)| unicode::is_line_terminator(ch))
                } else {
                    is_end_or_final_newline(target, limit, at)
                }
            }
            Anchor::StartText => at == start,
            Anchor::EndTextOptionalNewline => {
                is_end_or_final_newline(target, limit, at)
            }
            Anchor::EndText => at == limit,
            Anchor::WordBoundary => {
                if start == limit {
                    return false;
                }
                let after = word_type_at(target, start, limit, at, opts);
                if after == WordType::Ignore {
                    return false;
                }
                after != word_type_before(target, start, limit, at, opts)
            }
            Anchor::NotWordBoundary => {
                if start == limit {
                    return true;
                }
                let after = word_type_at(target, start, limit, at, opts);
                after == WordType::Ignore
                    || after == word_type_before(target, start, limit, at, opts)
            }
            Anchor::WordStart => {
                if start == limit || at == limit {
                    return false;
                }
                word_type_at(target, start, limit, at, opts) == WordType::Letter
                    && word_type_before(target, start, limit, at, opts)
                        == WordType::Other
            }
            Anchor::WordEnd => {
                if start == limit || at == start {
                    return false;
                }
                word_type_at(target, start, limit, at, opts) == WordType::Other
                    && word_type_before(target, start, limit, at, opts)
                        == WordType::Letter
            }
        }
    }
}

fn is_line_terminator_before<T: ?Sized + Target>(
    target: &T,
    start: usize,
    at: usize,
) -> bool {
    target
        .char_before(at, start)
        .map_or(false, |(ch, _)| unicode::is_line_terminator(ch))
}

/// True at the limit, before a line terminator that ends the text, or before
/// a `\r\n` that ends the text.
fn is_end_or_final_newline<T: ?Sized + Target>(
    target: &T,
    limit: usize,
    at: usize,
) -> bool {
    if at == limit {
        return true;
    }
    match target.char_after(at, limit) {
        Some((ch, next)) if next == limit => unicode::is_line_terminator(ch),
        Some(('\r', next)) => {
            target.char_after(next, limit) == Some(('\n', limit))
        }
        _ => false,
    }
}

/// The word type of the character at `at`. Offsets outside the search are
/// treated as non-word characters.
fn word_type_at<T: ?Sized + Target>(
    target: &T,
    start: usize,
    limit: usize,
    at: usize,
    opts: Options,
) -> WordType {
    if at < start {
        return WordType::Other;
    }
    match target.char_after(at, limit) {
        None => WordType::Other,
        Some((ch, _)) => unicode::word_type(ch, opts),
    }
}

/// The word type of the closest character before `at` that is not ignored.
fn word_type_before<T: ?Sized + Target>(
    target: &T,
    start: usize,
    limit: usize,
    at: usize,
    opts: Options,
) -> WordType {
    let mut at = at.min(limit);
    while let Some((ch, prev)) = target.char_before(at, start) {
        match unicode::word_type(ch, opts) {
            WordType::Ignore => at = prev,
            ty => return ty,
        }
    }
    WordType::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! testanchor {
        ($anchor:expr, $haystack:expr, $at:expr) => {
            testanchor!($anchor, $haystack, $at, Options::empty())
        };
        ($anchor:expr, $haystack:expr, $at:expr, $opts:expr) => {{
            let haystack: &str = $haystack;
            $anchor.matches(haystack, 0, haystack.len(), $at, $opts)
        }};
    }

    #[test]
    fn start_line() {
        let m = Options::MULTI_LINE;
        assert!(testanchor!(Anchor::StartLine, "a\nb", 0));
        assert!(!testanchor!(Anchor::StartLine, "a\nb", 2));
        assert!(testanchor!(Anchor::StartLine, "a\nb", 2, m));
        // Not after a trailing line terminator.
        assert!(!testanchor!(Anchor::StartLine, "a\n", 2, m));
        assert!(testanchor!(Anchor::StartLine, "a\u{2028}b", 4, m));
    }

    #[test]
    fn end_line() {
        let m = Options::MULTI_LINE;
        assert!(testanchor!(Anchor::EndLine, "ab", 2));
        assert!(testanchor!(Anchor::EndLine, "ab\n", 2));
        assert!(testanchor!(Anchor::EndLine, "ab\r\n", 2));
        assert!(testanchor!(Anchor::EndLine, "ab\r\n", 3));
        assert!(!testanchor!(Anchor::EndLine, "ab\r\n", 1));
        assert!(!testanchor!(Anchor::EndLine, "a\nb", 1));
        assert!(testanchor!(Anchor::EndLine, "a\nb", 1, m));
        assert!(testanchor!(Anchor::EndTextOptionalNewline, "ab\n", 2, m));
        assert!(!testanchor!(Anchor::EndText, "ab\n", 2));
        assert!(testanchor!(Anchor::EndText, "ab\n", 3));
    }

    #[test]
    fn text_anchors_are_relative_to_search() {
        let t = "xaby";
        assert!(Anchor::StartText.matches(t, 1, 3, 1, Options::empty()));
        assert!(!Anchor::StartText.matches(t, 1, 3, 0, Options::empty()));
        assert!(Anchor::EndText.matches(t, 1, 3, 3, Options::empty()));
    }

    #[test]
    fn word_boundary() {
        assert!(testanchor!(Anchor::WordBoundary, "ab cd", 0));
        assert!(testanchor!(Anchor::WordBoundary, "ab cd", 2));
        assert!(!testanchor!(Anchor::WordBoundary, "ab cd", 1));
        assert!(testanchor!(Anchor::WordBoundary, "ab cd", 5));
        assert!(!testanchor!(Anchor::WordBoundary, "", 0));
        assert!(testanchor!(Anchor::NotWordBoundary, "", 0));
        assert!(testanchor!(Anchor::NotWordBoundary, "ab cd", 1));
        assert!(!testanchor!(Anchor::NotWordBoundary, "ab cd", 3));
    }

    #[test]
    fn word_boundary_ignores_marks() {
        let w = Options::UNICODE_WORD_BOUNDARY;
        // e followed by a combining acute accent.
        let t = "e\u{0301}x";
        assert!(!testanchor!(Anchor::WordBoundary, t, 1, w));
        assert!(!testanchor!(Anchor::WordBoundary, t, 3, w));
        assert!(testanchor!(Anchor::NotWordBoundary, t, 3, w));
    }

    #[test]
    fn word_start_and_end() {
        assert!(testanchor!(Anchor::WordStart, "ab cd", 0));
        assert!(testanchor!(Anchor::WordStart, "ab cd", 3));
        assert!(!testanchor!(Anchor::WordStart, "ab cd", 2));
        assert!(!testanchor!(Anchor::WordStart, "ab cd", 5));
        assert!(testanchor!(Anchor::WordEnd, "ab cd", 2));
        assert!(!testanchor!(Anchor::WordEnd, "ab cd", 0));
        assert!(testanchor!(Anchor::WordEnd, "ab cd", 5));
        assert!(!testanchor!(Anchor::WordEnd, "ab cd", 3));
    }
}
