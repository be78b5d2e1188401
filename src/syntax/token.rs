use core::fmt::{self, Write};

use alloc::{boxed::Box, string::String, vec::Vec};

use crate::{
    syntax::{class::ClassSet, unicode},
    util::{look::Anchor, options::Options},
};

/// A token tree describing the syntax of a pattern.
///
/// Token trees are usually produced by the [`Parser`](crate::syntax::Parser),
/// but they can also be built by hand and compiled with
/// [`Regex::from_token`](crate::Regex::from_token).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// Matches the empty string.
    Empty,
    /// A single literal character.
    Char(char),
    /// A literal string of at least two characters.
    String(Vec<char>),
    /// Any character except line terminators, unless single-line mode is
    /// enabled.
    Dot,
    /// A character class. When `negated` is true, this matches any
    /// character not in `set`.
    Class {
        /// The characters in the class.
        set: ClassSet,
        /// Whether the class is negated.
        negated: bool,
    },
    /// A zero-width anchor.
    Anchor(Anchor),
    /// A sequence of tokens matched one after the other.
    Concat(Vec<Token>),
    /// Alternatives, tried left to right.
    Union(Vec<Token>),
    /// Repetition of a sub-expression.
    Repeat {
        /// The repeated expression.
        child: Box<Token>,
        /// The minimum number of repetitions.
        min: u32,
        /// The maximum number of repetitions, or `None` if unbounded.
        max: Option<u32>,
        /// Whether more repetitions are preferred over fewer.
        greedy: bool,
    },
    /// A group. When `index` is `Some`, the group is capturing.
    Group {
        /// The capture index of this group, starting at `1`.
        index: Option<usize>,
        /// The grouped expression.
        child: Box<Token>,
    },
    /// A reference to the text matched by a capturing group.
    Backref(usize),
    /// A lookahead or lookbehind assertion.
    Look {
        /// The kind of lookaround.
        kind: LookKind,
        /// The asserted expression.
        child: Box<Token>,
    },
    /// An independent (atomic) group.
    Independent(Box<Token>),
    /// A group that sets and clears options for the scope of its body.
    Modifier {
        /// Options to set.
        add: Options,
        /// Options to clear.
        remove: Options,
        /// The body of the group.
        child: Box<Token>,
    },
    /// A conditional: match `yes` if the condition holds and `no` (or
    /// nothing) otherwise.
    Condition {
        /// The condition.
        condition: Condition,
        /// The branch taken when the condition holds.
        yes: Box<Token>,
        /// The branch taken otherwise.
        no: Option<Box<Token>>,
    },
}

/// The kind of a lookaround assertion.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LookKind {
    /// `(?=...)`
    Ahead,
    /// `(?!...)`
    NegativeAhead,
    /// `(?<=...)`
    Behind,
    /// `(?<!...)`
    NegativeBehind,
}

impl LookKind {
    /// Returns true for lookbehind assertions.
    pub fn is_behind(self) -> bool {
        self == LookKind::Behind || self == LookKind::NegativeBehind
    }

    /// Returns true for negative assertions.
    pub fn is_negated(self) -> bool {
        self == LookKind::NegativeAhead || self == LookKind::NegativeBehind
    }

    fn opener(self) -> &'static str {
        match self {
            LookKind::Ahead => "(?=",
            LookKind::NegativeAhead => "(?!",
            LookKind::Behind => "(?<=",
            LookKind::NegativeBehind => "(?<!",
        }
    }
}

/// The condition of a [`Token::Condition`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Condition {
    /// Holds when the given capturing group participated in the match so
    /// far.
    Group(usize),
    /// Holds when the given lookaround assertion (a [`Token::Look`])
    /// succeeds.
    Look(Box<Token>),
}

/// The outcome of analyzing which characters can begin a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FirstChar {
    /// Every match begins with a character in the computed set.
    Terminal,
    /// The expression can match without consuming a character, so whatever
    /// follows it also contributes to the set.
    Continue,
    /// A match can begin with any character.
    Any,
}

/// The set of characters that can begin a match.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FirstChars {
    set: ClassSet,
}

impl FirstChars {
    /// Create an empty set.
    pub fn new() -> FirstChars {
        FirstChars::default()
    }

    /// The characters in this set.
    pub fn set(&self) -> &ClassSet {
        &self.set
    }

    /// Returns true if a match could begin with the given character.
    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        self.set.contains(ch)
    }

    fn push_char(&mut self, ch: char, opts: Options) {
        if opts.is_case_insensitive() {
            self.set.union(&ClassSet::single(ch).case_fold());
        } else {
            self.set.push_char(ch);
        }
    }
}

impl Token {
    /// Build a concatenation, flattening nested concatenations, dropping
    /// empty tokens and merging adjacent literals into strings.
    pub fn concat(children: Vec<Token>) -> Token {
        let mut flat: Vec<Token> = Vec::with_capacity(children.len());
        let mut literal: Vec<char> = Vec::new();
        let mut stack: Vec<Token> = children.into_iter().rev().collect();
        while let Some(tok) = stack.pop() {
            match tok {
                Token::Empty => {}
                Token::Concat(inner) => stack.extend(inner.into_iter().rev()),
                Token::Char(ch) => literal.push(ch),
                Token::String(s) => literal.extend(s),
                tok => {
                    flush_literal(&mut literal, &mut flat);
                    flat.push(tok);
                }
            }
        }
        flush_literal(&mut literal, &mut flat);
        match flat.len() {
            0 => Token::Empty,
            1 => flat.pop().unwrap_or(Token::Empty),
            _ => Token::Concat(flat),
        }
    }

    /// Build an alternation. A single alternative is returned as is.
    pub fn union(mut alternates: Vec<Token>) -> Token {
        if alternates.len() == 1 {
            alternates.pop().unwrap_or(Token::Empty)
        } else {
            Token::Union(alternates)
        }
    }

    /// Build a literal from a string.
    pub fn literal(s: &str) -> Token {
        Token::concat(s.chars().map(Token::Char).collect())
    }

    /// Build a repetition.
    pub fn repeat(child: Token, min: u32, max: Option<u32>, greedy: bool) -> Token {
        Token::Repeat { child: Box::new(child), min, max, greedy }
    }

    /// Build a capturing group.
    pub fn capture(index: usize, child: Token) -> Token {
        Token::Group { index: Some(index), child: Box::new(child) }
    }

    /// Build a non-capturing group.
    pub fn group(child: Token) -> Token {
        Token::Group { index: None, child: Box::new(child) }
    }

    /// Build a lookaround assertion.
    pub fn look(kind: LookKind, child: Token) -> Token {
        Token::Look { kind, child: Box::new(child) }
    }

    /// Build a character class.
    pub fn class(set: ClassSet, negated: bool) -> Token {
        Token::Class { set, negated }
    }

    /// The number of capturing groups in this tree, including the implicit
    /// group `0`. This is one more than the largest group index.
    pub fn group_len(&self) -> usize {
        let mut len = 1;
        self.walk(&mut |tok| {
            if let Token::Group { index: Some(i), .. } = *tok {
                len = len.max(i + 1);
            }
        });
        len
    }

    /// Returns true if this tree refers back to captured text, either with
    /// a backreference or a conditional on a group.
    pub fn has_backrefs(&self) -> bool {
        let mut found = false;
        self.walk(&mut |tok| match *tok {
            Token::Backref(_)
            | Token::Condition { condition: Condition::Group(_), .. } => {
                found = true
            }
            _ => {}
        });
        found
    }

    /// Call `f` on every token in this tree, in pre-order.
    fn walk<F: FnMut(&Token)>(&self, f: &mut F) {
        let mut stack = vec![self];
        while let Some(tok) = stack.pop() {
            f(tok);
            match *tok {
                Token::Concat(ref ts) | Token::Union(ref ts) => {
                    stack.extend(ts.iter().rev())
                }
                Token::Repeat { ref child, .. }
                | Token::Group { ref child, .. }
                | Token::Look { ref child, .. }
                | Token::Independent(ref child)
                | Token::Modifier { ref child, .. } => stack.push(child),
                Token::Condition { ref condition, ref yes, ref no } => {
                    if let Some(ref no) = *no {
                        stack.push(no);
                    }
                    stack.push(yes);
                    if let Condition::Look(ref look) = *condition {
                        stack.push(look);
                    }
                }
                _ => {}
            }
        }
    }

    /// The minimum number of characters consumed by any match of this
    /// expression.
    pub fn min_len(&self) -> usize {
        match *self {
            Token::Empty
            | Token::Anchor(_)
            | Token::Backref(_)
            | Token::Look { .. } => 0,
            Token::Char(_) | Token::Dot | Token::Class { .. } => 1,
            Token::String(ref s) => s.len(),
            Token::Concat(ref ts) => {
                ts.iter().fold(0usize, |sum, t| sum.saturating_add(t.min_len()))
            }
            Token::Union(ref ts) => {
                ts.iter().map(|t| t.min_len()).min().unwrap_or(0)
            }
            Token::Repeat { ref child, min, .. } => {
                (min as usize).saturating_mul(child.min_len())
            }
            Token::Group { ref child, .. }
            | Token::Independent(ref child)
            | Token::Modifier { ref child, .. } => child.min_len(),
            Token::Condition { ref yes, ref no, .. } => {
                let no = no.as_ref().map_or(0, |no| no.min_len());
                yes.min_len().min(no)
            }
        }
    }

    /// Add the characters that can begin a match of this expression to
    /// `chars`, and classify the result.
    ///
    /// When this returns [`FirstChar::Terminal`], every match begins with a
    /// character in `chars`. When it returns [`FirstChar::Any`], nothing is
    /// known and `chars` should be discarded.
    pub fn analyze_first_char(
        &self,
        opts: Options,
        chars: &mut FirstChars,
    ) -> FirstChar {
        match *self {
            Token::Concat(ref ts) => {
                for t in ts {
                    let ret = t.analyze_first_char(opts, chars);
                    if ret != FirstChar::Continue {
                        return ret;
                    }
                }
                FirstChar::Continue
            }
            Token::Union(ref ts) => {
                let mut has_empty = ts.is_empty();
                for t in ts {
                    match t.analyze_first_char(opts, chars) {
                        FirstChar::Any => return FirstChar::Any,
                        FirstChar::Continue => has_empty = true,
                        FirstChar::Terminal => {}
                    }
                }
                if has_empty {
                    FirstChar::Continue
                } else {
                    FirstChar::Terminal
                }
            }
            Token::Condition { ref yes, ref no, .. } => {
                let ret = yes.analyze_first_char(opts, chars);
                if ret == FirstChar::Any {
                    return ret;
                }
                let no = match *no {
                    None => return FirstChar::Continue,
                    Some(ref no) => no.analyze_first_char(opts, chars),
                };
                if no == FirstChar::Any {
                    FirstChar::Any
                } else if ret == FirstChar::Continue || no == FirstChar::Continue
                {
                    FirstChar::Continue
                } else {
                    FirstChar::Terminal
                }
            }
            Token::Repeat { ref child, min, .. } => {
                match child.analyze_first_char(opts, chars) {
                    FirstChar::Any => FirstChar::Any,
                    FirstChar::Terminal if min > 0 => FirstChar::Terminal,
                    _ => FirstChar::Continue,
                }
            }
            Token::Empty
            | Token::Anchor(_)
            | Token::Look { .. } => FirstChar::Continue,
            Token::Char(ch) => {
                chars.push_char(ch, opts);
                FirstChar::Terminal
            }
            Token::String(ref s) => match s.first() {
                None => FirstChar::Continue,
                Some(&ch) => {
                    chars.push_char(ch, opts);
                    FirstChar::Terminal
                }
            },
            Token::Dot | Token::Backref(_) => FirstChar::Any,
            Token::Class { ref set, negated: true } => {
                // The complement is a superset of what a negated class
                // matches, with or without case folding.
                let mut complement = set.clone();
                complement.negate();
                chars.set.union(&complement);
                FirstChar::Terminal
            }
            Token::Class { ref set, negated: false } => {
                if opts.is_case_insensitive() {
                    chars.set.union(&set.case_fold());
                } else {
                    chars.set.union(set);
                }
                FirstChar::Terminal
            }
            Token::Group { ref child, .. } | Token::Independent(ref child) => {
                child.analyze_first_char(opts, chars)
            }
            Token::Modifier { add, remove, ref child } => {
                let opts = opts.union(add).difference(remove);
                child.analyze_first_char(opts, chars)
            }
        }
    }

    /// Find the longest literal string that every match of this expression
    /// must contain, along with the options in effect where it occurs.
    ///
    /// Only literals reachable through concatenations and groups are
    /// considered. Single characters are never returned.
    pub fn find_fixed_string(&self, opts: Options) -> Option<(Vec<char>, Options)> {
        match *self {
            Token::String(ref s) => Some((s.clone(), opts)),
            Token::Concat(ref ts) => {
                let mut best: Option<(Vec<char>, Options)> = None;
                for t in ts {
                    if let Some(found) = t.find_fixed_string(opts) {
                        let longer = match best {
                            None => true,
                            Some((ref b, _)) => b.len() < found.0.len(),
                        };
                        if longer {
                            best = Some(found);
                        }
                    }
                }
                best
            }
            Token::Group { ref child, .. } | Token::Independent(ref child) => {
                child.find_fixed_string(opts)
            }
            Token::Modifier { add, remove, ref child } => {
                child.find_fixed_string(opts.union(add).difference(remove))
            }
            _ => None,
        }
    }

    /// Render this tree as a pattern that parses back into an equivalent
    /// tree under the given options.
    pub fn render(&self, opts: Options) -> String {
        let mut out = String::new();
        // Writing to a String never fails.
        let _ = self.write(&mut out, opts);
        out
    }

    fn write(&self, out: &mut String, opts: Options) -> fmt::Result {
        match *self {
            Token::Empty => Ok(()),
            Token::Char(ch) => write_char(out, ch, opts),
            Token::String(ref s) => {
                for &ch in s {
                    write_char(out, ch, opts)?;
                }
                Ok(())
            }
            Token::Dot => out.write_char('.'),
            Token::Class { ref set, negated } => write_class(out, set, negated),
            Token::Anchor(anchor) => match anchor {
                Anchor::StartLine | Anchor::EndLine => {
                    out.write_char(anchor.as_char())
                }
                _ => write!(out, "\\{}", anchor.as_char()),
            },
            Token::Concat(ref ts) => {
                for t in ts {
                    if let Token::Union(_) = *t {
                        write_grouped(out, t, opts)?;
                    } else {
                        t.write(out, opts)?;
                    }
                }
                Ok(())
            }
            Token::Union(ref ts) => {
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        out.write_char('|')?;
                    }
                    t.write(out, opts)?;
                }
                Ok(())
            }
            Token::Repeat { ref child, min, max, greedy } => {
                if child.is_atom() {
                    child.write(out, opts)?;
                } else {
                    write_grouped(out, child, opts)?;
                }
                match (min, max) {
                    (0, None) => out.write_char('*')?,
                    (1, None) => out.write_char('+')?,
                    (0, Some(1)) => out.write_char('?')?,
                    (n, None) => write!(out, "{{{},}}", n)?,
                    (n, Some(m)) if n == m => write!(out, "{{{}}}", n)?,
                    (n, Some(m)) => write!(out, "{{{},{}}}", n, m)?,
                }
                if !greedy {
                    out.write_char('?')?;
                }
                Ok(())
            }
            Token::Group { index: Some(_), ref child } => {
                out.write_char('(')?;
                child.write(out, opts)?;
                out.write_char(')')
            }
            Token::Group { index: None, ref child } => {
                write_grouped(out, child, opts)
            }
            Token::Backref(n) => write!(out, "\\{}", n),
            Token::Look { kind, ref child } => {
                out.write_str(kind.opener())?;
                child.write(out, opts)?;
                out.write_char(')')
            }
            Token::Independent(ref child) => {
                out.write_str("(?>")?;
                child.write(out, opts)?;
                out.write_char(')')
            }
            Token::Modifier { add, remove, ref child } => {
                write!(out, "(?{}", add)?;
                if !remove.is_empty() {
                    write!(out, "-{}", remove)?;
                }
                out.write_char(':')?;
                child.write(out, opts)?;
                out.write_char(')')
            }
            Token::Condition { ref condition, ref yes, ref no } => {
                out.write_str("(?")?;
                match *condition {
                    Condition::Group(n) => write!(out, "({})", n)?,
                    Condition::Look(ref look) => look.write(out, opts)?,
                }
                if let Token::Union(_) = **yes {
                    write_grouped(out, yes, opts)?;
                } else {
                    yes.write(out, opts)?;
                }
                if let Some(ref no) = *no {
                    out.write_char('|')?;
                    if let Token::Union(_) = **no {
                        write_grouped(out, no, opts)?;
                    } else {
                        no.write(out, opts)?;
                    }
                }
                out.write_char(')')
            }
        }
    }

    /// Whether a quantifier can be applied directly to the rendering of
    /// this token.
    fn is_atom(&self) -> bool {
        match *self {
            Token::Char(_)
            | Token::Dot
            | Token::Class { .. }
            | Token::Backref(_)
            | Token::Group { .. }
            | Token::Look { .. }
            | Token::Independent(_)
            | Token::Modifier { .. }
            | Token::Condition { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render(Options::empty()))
    }
}

fn flush_literal(literal: &mut Vec<char>, into: &mut Vec<Token>) {
    match literal.len() {
        0 => {}
        1 => into.push(Token::Char(literal[0])),
        _ => into.push(Token::String(literal.clone())),
    }
    literal.clear();
}

fn write_grouped(out: &mut String, tok: &Token, opts: Options) -> fmt::Result {
    out.write_str("(?:")?;
    tok.write(out, opts)?;
    out.write_char(')')
}

fn write_char(out: &mut String, ch: char, opts: Options) -> fmt::Result {
    match ch {
        '\\' | '|' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}'
        | '.' | '^' | '$' => {
            out.write_char('\\')?;
            out.write_char(ch)
        }
        '#' if opts.contains(Options::EXTENDED) => out.write_str("\\#"),
        ' ' if opts.contains(Options::EXTENDED) => out.write_str("\\x{20}"),
        _ => write_escaped(out, ch),
    }
}

fn write_class(out: &mut String, set: &ClassSet, negated: bool) -> fmt::Result {
    // An empty class cannot be written, so write its complement instead.
    let (full, negated) = if set.is_empty() {
        (Some(ClassSet::full()), !negated)
    } else {
        (None, negated)
    };
    let set = full.as_ref().unwrap_or(set);
    out.write_char('[')?;
    if negated {
        out.write_char('^')?;
    }
    for r in set.ranges() {
        write_class_char(out, r.start())?;
        if r.end() != r.start() {
            out.write_char('-')?;
            write_class_char(out, r.end())?;
        }
    }
    out.write_char(']')
}

fn write_class_char(out: &mut String, ch: char) -> fmt::Result {
    match ch {
        '\\' | '[' | ']' | '^' | '-' | ',' => {
            out.write_char('\\')?;
            out.write_char(ch)
        }
        _ => write_escaped(out, ch),
    }
}

fn write_escaped(out: &mut String, ch: char) -> fmt::Result {
    match ch {
        '\t' => out.write_str("\\t"),
        '\n' => out.write_str("\\n"),
        '\r' => out.write_str("\\r"),
        '\x0C' => out.write_str("\\f"),
        '\x1B' => out.write_str("\\e"),
        ch if ch.is_control()
            || ch.is_whitespace() && ch != ' '
            || unicode::is_line_terminator(ch)
            || unicode::is_noncharacter(ch) =>
        {
            write!(out, "\\x{{{:X}}}", ch as u32)
        }
        _ => out.write_char(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::class::ClassRange;

    fn class(start: char, end: char) -> Token {
        Token::class(ClassSet::new(vec![ClassRange::new(start, end)]), false)
    }

    #[test]
    fn concat_merges_literals() {
        let tok = Token::concat(vec![
            Token::Char('a'),
            Token::Empty,
            Token::Concat(vec![Token::Char('b'), Token::Dot]),
            Token::literal("cd"),
            Token::Char('e'),
        ]);
        assert_eq!(
            Token::Concat(vec![
                Token::String(vec!['a', 'b']),
                Token::Dot,
                Token::String(vec!['c', 'd', 'e']),
            ]),
            tok
        );
        assert_eq!(Token::Empty, Token::concat(vec![]));
        assert_eq!(Token::Char('x'), Token::literal("x"));
    }

    #[test]
    fn min_len() {
        let tok = Token::concat(vec![
            Token::literal("ab"),
            Token::repeat(Token::Char('c'), 2, Some(5), true),
            Token::Union(vec![Token::literal("xyz"), Token::Char('q')]),
            Token::look(LookKind::Ahead, Token::literal("zzzz")),
            Token::Condition {
                condition: Condition::Group(1),
                yes: Box::new(Token::literal("yes")),
                no: None,
            },
        ]);
        assert_eq!(2 + 2 + 1, tok.min_len());
        assert_eq!(0, Token::Union(vec![]).min_len());
    }

    #[test]
    fn first_char_terminal() {
        let tok = Token::concat(vec![
            Token::repeat(Token::Char('a'), 0, None, true),
            Token::Union(vec![Token::Char('b'), class('x', 'z')]),
        ]);
        let mut chars = FirstChars::new();
        let ret = tok.analyze_first_char(Options::empty(), &mut chars);
        assert_eq!(FirstChar::Terminal, ret);
        assert!(chars.contains('a'));
        assert!(chars.contains('b'));
        assert!(chars.contains('y'));
        assert!(!chars.contains('c'));
    }

    #[test]
    fn first_char_case_insensitive() {
        let tok = Token::literal("ab");
        let mut chars = FirstChars::new();
        let ret = tok.analyze_first_char(Options::CASE_INSENSITIVE, &mut chars);
        assert_eq!(FirstChar::Terminal, ret);
        assert!(chars.contains('A'));
        assert!(chars.contains('a'));
        assert!(!chars.contains('b'));

        let tok = class('j', 'k');
        let mut chars = FirstChars::new();
        let ret = tok.analyze_first_char(Options::CASE_INSENSITIVE, &mut chars);
        assert_eq!(FirstChar::Terminal, ret);
        assert!(chars.contains('J'));
        assert!(chars.contains('\u{212A}'));
        assert!(!chars.contains('l'));
    }

    #[test]
    fn first_char_any_dominates_union() {
        let tok = Token::concat(vec![
            Token::Union(vec![Token::Empty, Token::Dot]),
            Token::Char('x'),
        ]);
        let mut chars = FirstChars::new();
        let ret = tok.analyze_first_char(Options::empty(), &mut chars);
        assert_eq!(FirstChar::Any, ret);

        let tok = Token::concat(vec![
            Token::repeat(Token::Dot, 0, None, true),
            Token::Char('x'),
        ]);
        let mut chars = FirstChars::new();
        let ret = tok.analyze_first_char(Options::empty(), &mut chars);
        assert_eq!(FirstChar::Any, ret);
    }

    #[test]
    fn fixed_string_prefers_longest() {
        let tok = Token::concat(vec![
            Token::literal("ab"),
            Token::Dot,
            Token::capture(1, Token::literal("cde")),
            Token::repeat(Token::literal("wxyz1"), 0, None, true),
        ]);
        let (s, opts) = tok.find_fixed_string(Options::empty()).unwrap();
        assert_eq!(vec!['c', 'd', 'e'], s);
        assert_eq!(Options::empty(), opts);

        let tok = Token::Modifier {
            add: Options::CASE_INSENSITIVE,
            remove: Options::empty(),
            child: Box::new(Token::literal("abc")),
        };
        let (_, opts) = tok.find_fixed_string(Options::empty()).unwrap();
        assert!(opts.is_case_insensitive());

        assert!(Token::Char('a').find_fixed_string(Options::empty()).is_none());
    }

    #[test]
    fn render() {
        let tok = Token::concat(vec![
            Token::capture(
                1,
                Token::Union(vec![Token::literal("a.b"), Token::Char('c')]),
            ),
            Token::repeat(Token::literal("de"), 2, Some(3), false),
            class('x', 'z'),
            Token::Anchor(Anchor::WordBoundary),
            Token::Backref(1),
        ]);
        assert_eq!(r"(a\.b|c)(?:de){2,3}?[x-z]\b\1", tok.to_string());

        let tok = Token::Class { set: ClassSet::empty(), negated: false };
        assert_eq!("[^\\x{0}-\\x{10FFFF}]", tok.to_string());

        let tok = Token::literal("a\u{FFFE}\u{2028}\u{FDD0}é");
        assert_eq!("a\\x{FFFE}\\x{2028}\\x{FDD0}é", tok.to_string());
    }

    #[test]
    fn group_count_and_backrefs() {
        let tok = Token::concat(vec![
            Token::capture(1, Token::Char('a')),
            Token::look(LookKind::Ahead, Token::capture(3, Token::Dot)),
        ]);
        assert_eq!(4, tok.group_len());
        assert!(!tok.has_backrefs());

        let tok = Token::Condition {
            condition: Condition::Group(1),
            yes: Box::new(Token::Empty),
            no: None,
        };
        assert!(tok.has_backrefs());
        assert_eq!(1, Token::Dot.group_len());
    }
}
