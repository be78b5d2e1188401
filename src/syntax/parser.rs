use alloc::{boxed::Box, string::String, vec::Vec};

use crate::{
    syntax::{
        class::{ClassRange, ClassSet},
        error::{Error, ErrorKind},
        token::{Condition, LookKind, Token},
        unicode,
    },
    util::{look::Anchor, options::Options},
};

/// The default limit on how deeply groups may be nested.
const DEFAULT_NEST_LIMIT: u32 = 250;

/// Option letters that may appear in a modifier group such as `(?i-s:..)`.
const MODIFIER_LETTERS: &str = "imsxuw";

/// Virama signs, which join the letter after them to a grapheme (`\g`).
const VIRAMAS: &[char] = &[
    '\u{094D}', '\u{09CD}', '\u{0A4D}', '\u{0ACD}', '\u{0B4D}', '\u{0BCD}',
    '\u{0C4D}', '\u{0CCD}', '\u{0D4D}', '\u{0E3A}', '\u{0F84}',
];

/// A parser that turns pattern text into a [`Token`] tree.
///
/// The options given to the parser decide the dialect. With
/// [`Options::XML_SCHEMA`], only the syntax of XML Schema regular expressions
/// is accepted: `^` and `$` are ordinary characters, and lookaround,
/// backreferences, lazy quantifiers, anchors and `(?` groups are rejected.
/// Otherwise, a Perl-like syntax is accepted.
///
/// # Example
///
/// ```
/// use xml_regex::{syntax::{Parser, Token}, Options};
///
/// let tok = Parser::new().parse("ab|c")?;
/// assert_eq!(Token::Union(vec![Token::literal("ab"), Token::Char('c')]), tok);
///
/// let xml = Parser::new().options(Options::XML_SCHEMA);
/// assert!(xml.parse("a(?=b)").is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Parser {
    options: Options,
    nest_limit: u32,
}

impl Parser {
    /// Create a new parser with no options set.
    pub fn new() -> Parser {
        Parser { options: Options::empty(), nest_limit: DEFAULT_NEST_LIMIT }
    }

    /// Set the options that are in effect at the start of the pattern.
    pub fn options(mut self, options: Options) -> Parser {
        self.options = options;
        self
    }

    /// Set the maximum nesting depth of groups. Patterns that nest deeper
    /// fail to parse.
    pub fn nest_limit(mut self, limit: u32) -> Parser {
        self.nest_limit = limit;
        self
    }

    /// Parse the given pattern into a token tree.
    pub fn parse(&self, pattern: &str) -> Result<Token, Error> {
        ParserI {
            pattern,
            pos: 0,
            opts: self.options,
            nest_limit: self.nest_limit,
            depth: 0,
            groups: 0,
            backrefs: Vec::new(),
        }
        .parse()
    }
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

/// The state of a single parse.
struct ParserI<'p> {
    pattern: &'p str,
    /// Byte offset of the next character.
    pos: usize,
    /// The options in effect at `pos`.
    opts: Options,
    nest_limit: u32,
    depth: u32,
    /// The number of capturing groups opened so far.
    groups: usize,
    /// Group references seen so far, with their offsets. These are checked
    /// once all groups are known.
    backrefs: Vec<(usize, usize)>,
}

/// An item inside a bracketed class.
enum ClassItem {
    Char(char),
    Set(ClassSet),
}

impl<'p> ParserI<'p> {
    fn parse(mut self) -> Result<Token, Error> {
        let tok = self.parse_alternation()?;
        if !self.is_eof() {
            // The only way to stop early is an unbalanced ')'.
            return Err(self.error(ErrorKind::GroupUnopened));
        }
        for &(group, offset) in &self.backrefs {
            if group == 0 || group > self.groups {
                return Err(Error::new(ErrorKind::BackrefUndefined(group), offset));
            }
        }
        Ok(tok)
    }

    fn char(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.char() {
            self.pos += c.len_utf8();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.pattern.len()
    }

    fn peek_is(&self, prefix: &str) -> bool {
        self.pattern[self.pos..].starts_with(prefix)
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.pos)
    }

    fn is_xml(&self) -> bool {
        self.opts.is_xml_schema()
    }

    /// In extended mode, skip whitespace and `#` comments.
    fn skip_space(&mut self) {
        if !self.opts.contains(Options::EXTENDED) {
            return;
        }
        while let Some(c) = self.char() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.char() {
                    self.bump();
                    if unicode::is_line_terminator(c) {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Parse the body of a group or of the whole pattern. It may begin with
    /// `(?flags)`, which applies to every alternative that follows.
    fn parse_alternation(&mut self) -> Result<Token, Error> {
        let flags = match self.parse_option_group()? {
            None => return self.parse_branches(),
            Some(flags) => flags,
        };
        let (add, remove) = flags;
        let saved = self.opts;
        self.opts = saved.union(add).difference(remove);
        let child = self.parse_branches();
        self.opts = saved;
        Ok(Token::Modifier { add, remove, child: Box::new(child?) })
    }

    /// If the position is at a group that only sets options, such as
    /// `(?i)` or `(?m-s)`, parse it and return the options to set and to
    /// clear. Otherwise the position is left alone.
    fn parse_option_group(
        &mut self,
    ) -> Result<Option<(Options, Options)>, Error> {
        if self.is_xml() || !self.peek_is("(?") {
            return Ok(None);
        }
        let start = self.pos;
        self.pos += 2;
        match self.char() {
            Some(c) if c == '-' || MODIFIER_LETTERS.contains(c) => {}
            _ => {
                self.pos = start;
                return Ok(None);
            }
        }
        let (add, remove, end) = self.parse_flags()?;
        if end != ')' {
            self.pos = start;
            return Ok(None);
        }
        Ok(Some((add, remove)))
    }

    fn parse_branches(&mut self) -> Result<Token, Error> {
        let mut alts = vec![self.parse_branch()?];
        while self.char() == Some('|') {
            self.bump();
            alts.push(self.parse_branch()?);
        }
        Ok(Token::union(alts))
    }

    fn parse_branch(&mut self) -> Result<Token, Error> {
        let mut items = vec![];
        loop {
            self.skip_space();
            match self.char() {
                None | Some('|') | Some(')') => break,
                Some(_) => {}
            }
            let atom = self.parse_atom()?;
            items.push(self.parse_quantifier(atom)?);
        }
        Ok(Token::concat(items))
    }

    fn parse_atom(&mut self) -> Result<Token, Error> {
        let c = match self.char() {
            None => return Err(self.error(ErrorKind::RepetitionMissing)),
            Some(c) => c,
        };
        match c {
            '(' => self.parse_group(),
            '[' => self.parse_class(),
            '\\' => self.parse_escape(),
            '*' | '+' | '?' | '{' => Err(self.error(ErrorKind::RepetitionMissing)),
            ']' | '}' if self.is_xml() => {
                Err(self.error(ErrorKind::XmlSchemaUnsupported))
            }
            '.' => {
                self.bump();
                if self.is_xml() {
                    let set = ClassSet::new(vec![
                        ClassRange::new('\n', '\n'),
                        ClassRange::new('\r', '\r'),
                    ]);
                    Ok(Token::class(set, true))
                } else {
                    Ok(Token::Dot)
                }
            }
            '^' if !self.is_xml() => {
                self.bump();
                Ok(Token::Anchor(Anchor::StartLine))
            }
            '$' if !self.is_xml() => {
                self.bump();
                Ok(Token::Anchor(Anchor::EndLine))
            }
            c => {
                self.bump();
                Ok(Token::Char(c))
            }
        }
    }

    fn parse_quantifier(&mut self, atom: Token) -> Result<Token, Error> {
        self.skip_space();
        let (min, max) = match self.char() {
            Some('*') => {
                self.bump();
                (0, None)
            }
            Some('+') => {
                self.bump();
                (1, None)
            }
            Some('?') => {
                self.bump();
                (0, Some(1))
            }
            Some('{') => self.parse_counted()?,
            _ => return Ok(atom),
        };
        let mut greedy = true;
        if self.char() == Some('?') {
            if self.is_xml() {
                return Err(self.error(ErrorKind::XmlSchemaUnsupported));
            }
            self.bump();
            greedy = false;
        }
        self.skip_space();
        match self.char() {
            Some('*') | Some('+') | Some('?') | Some('{') => {
                Err(self.error(ErrorKind::RepetitionMissing))
            }
            _ => Ok(Token::repeat(atom, min, max, greedy)),
        }
    }

    /// Parse `{n}`, `{n,}` or `{n,m}`, starting at the `{`.
    fn parse_counted(&mut self) -> Result<(u32, Option<u32>), Error> {
        let start = self.pos;
        self.bump();
        let min = match self.parse_decimal()? {
            None => return Err(self.error(ErrorKind::RepetitionCountUnclosed)),
            Some(min) => min,
        };
        let max = if self.char() == Some(',') {
            self.bump();
            self.parse_decimal()?
        } else {
            Some(min)
        };
        if self.char() != Some('}') {
            return Err(self.error(ErrorKind::RepetitionCountUnclosed));
        }
        self.bump();
        if max.map_or(false, |max| min > max) {
            return Err(Error::new(ErrorKind::RepetitionCountInvalid, start));
        }
        Ok((min, max))
    }

    fn parse_decimal(&mut self) -> Result<Option<u32>, Error> {
        let start = self.pos;
        let mut n: Option<u32> = None;
        while let Some(d) = self.char().and_then(|c| c.to_digit(10)) {
            n = n
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|n| n.checked_add(d))
                .map(Some)
                .ok_or_else(|| {
                    Error::new(ErrorKind::RepetitionCountOverflow, start)
                })?;
            self.bump();
        }
        Ok(n)
    }

    fn parse_group(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.depth += 1;
        if self.depth > self.nest_limit {
            return Err(self.error(ErrorKind::NestLimitExceeded(self.nest_limit)));
        }
        self.bump();
        let tok = if self.char() == Some('?') {
            if self.is_xml() {
                return Err(self.error(ErrorKind::XmlSchemaUnsupported));
            }
            self.bump();
            self.parse_special_group(start)?
        } else {
            self.groups += 1;
            let index = self.groups;
            Token::capture(index, self.parse_alternation()?)
        };
        if self.char() != Some(')') {
            return Err(Error::new(ErrorKind::GroupUnclosed, start));
        }
        self.bump();
        self.depth -= 1;
        Ok(tok)
    }

    /// Parse the body of a group that begins with `(?`. The position is just
    /// after the `?`. The closing `)` is left for the caller.
    fn parse_special_group(&mut self, start: usize) -> Result<Token, Error> {
        let c = match self.char() {
            None => return Err(Error::new(ErrorKind::GroupUnclosed, start)),
            Some(c) => c,
        };
        match c {
            ':' => {
                self.bump();
                Ok(Token::group(self.parse_alternation()?))
            }
            '=' => {
                self.bump();
                self.parse_look(LookKind::Ahead)
            }
            '!' => {
                self.bump();
                self.parse_look(LookKind::NegativeAhead)
            }
            '<' => {
                self.bump();
                match self.char() {
                    Some('=') => {
                        self.bump();
                        self.parse_look(LookKind::Behind)
                    }
                    Some('!') => {
                        self.bump();
                        self.parse_look(LookKind::NegativeBehind)
                    }
                    _ => Err(self.error(ErrorKind::GroupFlagUnrecognized('<'))),
                }
            }
            '>' => {
                self.bump();
                Ok(Token::Independent(Box::new(self.parse_alternation()?)))
            }
            '#' => {
                while let Some(c) = self.char() {
                    if c == ')' {
                        break;
                    }
                    self.bump();
                }
                Ok(Token::Empty)
            }
            '[' => self.parse_class_operation(),
            '(' => self.parse_conditional(start),
            _ => self.parse_modifier(start),
        }
    }

    fn parse_look(&mut self, kind: LookKind) -> Result<Token, Error> {
        Ok(Token::look(kind, self.parse_alternation()?))
    }

    fn parse_modifier(&mut self, start: usize) -> Result<Token, Error> {
        let (add, remove, end) = self.parse_flags()?;
        if end == ')' {
            return Err(Error::new(ErrorKind::GroupFlagsMisplaced, start));
        }
        let saved = self.opts;
        self.opts = saved.union(add).difference(remove);
        let child = self.parse_alternation();
        self.opts = saved;
        Ok(Token::Modifier { add, remove, child: Box::new(child?) })
    }

    /// Parse option letters up to and including a `:` or `)`. Returns the
    /// options to set, the options to clear and the terminator.
    fn parse_flags(&mut self) -> Result<(Options, Options, char), Error> {
        let (mut add, mut remove) = (Options::empty(), Options::empty());
        let mut negate = false;
        loop {
            let c = match self.char() {
                None => return Err(self.error(ErrorKind::GroupFlagsUnclosed)),
                Some(c) => c,
            };
            match c {
                ':' | ')' => {
                    self.bump();
                    return Ok((add, remove, c));
                }
                '-' if !negate => negate = true,
                c if MODIFIER_LETTERS.contains(c) => {
                    let opt = Options::from_letter(c).map_err(|_| {
                        self.error(ErrorKind::GroupFlagUnrecognized(c))
                    })?;
                    if negate {
                        remove |= opt;
                    } else {
                        add |= opt;
                    }
                }
                c => return Err(self.error(ErrorKind::GroupFlagUnrecognized(c))),
            }
            self.bump();
        }
    }

    /// Parse `(?[..]op[..]...)`, where each `op` is `-`, `+` or `&`. The
    /// position is at the first `[`. The closing `)` is left for the caller.
    /// The result is always a positive class.
    fn parse_class_operation(&mut self) -> Result<Token, Error> {
        let mut set = positive(self.parse_class()?);
        loop {
            let op = match self.char() {
                Some(')') => break,
                Some(op) if op == '-' || op == '+' || op == '&' => op,
                _ => return Err(self.error(ErrorKind::ClassSetOperationInvalid)),
            };
            self.bump();
            if self.char() != Some('[') {
                return Err(self.error(ErrorKind::ClassSetOperationInvalid));
            }
            let other = positive(self.parse_class()?);
            match op {
                '-' => set.subtract(&other),
                '+' => set.union(&other),
                _ => set.intersect(&other),
            }
        }
        Ok(Token::class(set, false))
    }

    /// Parse `(?(cond)yes|no)`. The position is at the `(` of the
    /// condition.
    fn parse_conditional(&mut self, start: usize) -> Result<Token, Error> {
        let cond_start = self.pos;
        self.bump();
        let condition = match self.char() {
            Some(c) if c.is_ascii_digit() => {
                let n = self
                    .parse_decimal()
                    .map_err(|_| Error::new(ErrorKind::ConditionInvalid, cond_start))?
                    .unwrap_or(0) as usize;
                if n == 0 || self.char() != Some(')') {
                    return Err(Error::new(ErrorKind::ConditionInvalid, cond_start));
                }
                self.bump();
                self.backrefs.push((n, cond_start));
                Condition::Group(n)
            }
            Some('?') => {
                self.pos = cond_start;
                match self.parse_group()? {
                    tok @ Token::Look { .. } => Condition::Look(Box::new(tok)),
                    _ => {
                        return Err(Error::new(
                            ErrorKind::ConditionInvalid,
                            cond_start,
                        ))
                    }
                }
            }
            _ => return Err(Error::new(ErrorKind::ConditionInvalid, cond_start)),
        };
        let (yes, no) = match self.parse_branches()? {
            Token::Union(mut alts) => {
                if alts.len() != 2 {
                    return Err(Error::new(ErrorKind::ConditionInvalid, start));
                }
                let no = alts.pop();
                let yes = alts.pop();
                match (yes, no) {
                    (Some(yes), Some(no)) => (yes, Some(Box::new(no))),
                    _ => unreachable!("union has two alternatives"),
                }
            }
            yes => (yes, None),
        };
        Ok(Token::Condition { condition, yes: Box::new(yes), no })
    }

    fn parse_escape(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.bump();
        let c = match self.char() {
            None => return Err(Error::new(ErrorKind::EscapeUnexpectedEof, start)),
            Some(c) => c,
        };
        if let Some(set) = self.parse_class_escape(c)? {
            return Ok(Token::class(set, false));
        }
        if !self.is_xml() {
            let anchor = match c {
                'A' => Some(Anchor::StartText),
                'Z' => Some(Anchor::EndTextOptionalNewline),
                'z' => Some(Anchor::EndText),
                'b' => Some(Anchor::WordBoundary),
                'B' => Some(Anchor::NotWordBoundary),
                '<' => Some(Anchor::WordStart),
                '>' => Some(Anchor::WordEnd),
                _ => None,
            };
            if let Some(anchor) = anchor {
                self.bump();
                return Ok(Token::Anchor(anchor));
            }
            if let Some(n) = c.to_digit(10) {
                self.bump();
                let n = n as usize;
                self.backrefs.push((n, start));
                return Ok(Token::Backref(n));
            }
            match c {
                'X' => {
                    self.bump();
                    return Ok(combining_sequence());
                }
                'g' => {
                    self.bump();
                    return Ok(grapheme());
                }
                _ => {}
            }
        }
        Ok(Token::Char(self.parse_char_escape(start)?))
    }

    /// If `c` begins a class escape such as `\d` or `\p{L}`, parse it and
    /// return its set. Negated escapes are returned as their complement.
    fn parse_class_escape(&mut self, c: char) -> Result<Option<ClassSet>, Error> {
        if c == 'c' && self.is_control_escape() {
            return Ok(None);
        }
        let mut set = match c.to_ascii_lowercase() {
            'd' | 'w' | 's' | 'i' | 'c' => {
                self.bump();
                self.perl_class(c.to_ascii_lowercase())
            }
            'p' => {
                self.bump();
                self.parse_property()?
            }
            _ => return Ok(None),
        };
        if c.is_ascii_uppercase() {
            set.negate();
        }
        Ok(Some(set))
    }

    /// Whether the position is at the `c` of a control escape like `\cJ`.
    /// Outside of XML Schema mode, `\c` followed by one of `@A-Z[\]^_` is
    /// a control character rather than the XML name class.
    fn is_control_escape(&self) -> bool {
        !self.is_xml()
            && match self.pattern[self.pos + 1..].chars().next() {
                Some(c) => ('@'..='_').contains(&c),
                None => false,
            }
    }

    fn perl_class(&self, c: char) -> ClassSet {
        let xml = self.is_xml();
        let uni = self.opts.contains(Options::UNICODE_CLASSES);
        match c {
            'd' if xml || uni => unicode::perl_digit(),
            'd' => ascii(&[('0', '9')]),
            'w' if xml => unicode::xml_word(),
            'w' if uni => unicode::perl_word(),
            'w' => ascii(&[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')]),
            's' if xml => ascii(&[(' ', ' '), ('\t', '\n'), ('\r', '\r')]),
            's' if uni => unicode::perl_space(),
            's' => ascii(&[(' ', ' '), ('\t', '\n'), ('\x0C', '\r')]),
            'i' => unicode::xml_name_start(),
            'c' => unicode::xml_name_char(),
            _ => unreachable!("not a class escape: {:?}", c),
        }
    }

    /// Parse `{Name}` after `\p` or `\P`.
    fn parse_property(&mut self) -> Result<ClassSet, Error> {
        let start = self.pos;
        if self.char() != Some('{') {
            return Err(self.error(ErrorKind::PropertyMalformed));
        }
        self.bump();
        let mut name = String::new();
        loop {
            match self.char() {
                None => return Err(Error::new(ErrorKind::PropertyMalformed, start)),
                Some('}') => break,
                Some(c) => name.push(c),
            }
            self.bump();
        }
        self.bump();
        if name.is_empty() {
            return Err(Error::new(ErrorKind::PropertyMalformed, start));
        }
        unicode::property(&name)
            .ok_or_else(|| Error::new(ErrorKind::PropertyUnknown, start))
    }

    /// Parse an escape that denotes a single character. The position is just
    /// after the backslash, which is at `start`.
    fn parse_char_escape(&mut self, start: usize) -> Result<char, Error> {
        let c = match self.char() {
            None => return Err(Error::new(ErrorKind::EscapeUnexpectedEof, start)),
            Some(c) => c,
        };
        self.bump();
        match c {
            'n' => return Ok('\n'),
            'r' => return Ok('\r'),
            't' => return Ok('\t'),
            '\\' | '|' | '.' | '?' | '*' | '+' | '(' | ')' | '{' | '}' | '-'
            | '[' | ']' | '^' => return Ok(c),
            _ => {}
        }
        if self.is_xml() {
            return Err(Error::new(ErrorKind::EscapeUnrecognized(c), start));
        }
        match c {
            'f' => Ok('\x0C'),
            'e' => Ok('\x1B'),
            'x' if self.char() == Some('{') => {
                self.bump();
                let cp = self.parse_hex(1, 6, start)?;
                if self.char() != Some('}') {
                    return Err(Error::new(ErrorKind::EscapeHexInvalid, start));
                }
                self.bump();
                Ok(cp)
            }
            'x' => self.parse_hex(2, 2, start),
            'u' => self.parse_hex(4, 4, start),
            'v' => self.parse_hex(6, 6, start),
            'c' => match self.char() {
                Some(ctl) if ('@'..='_').contains(&ctl) => {
                    self.bump();
                    Ok(char::from(ctl as u8 - 0x40))
                }
                _ => Err(Error::new(ErrorKind::EscapeUnrecognized(c), start)),
            },
            c if c.is_ascii_punctuation() || c == ' ' => Ok(c),
            c => Err(Error::new(ErrorKind::EscapeUnrecognized(c), start)),
        }
    }

    fn parse_hex(
        &mut self,
        min: usize,
        max: usize,
        start: usize,
    ) -> Result<char, Error> {
        let mut value: u32 = 0;
        let mut count = 0;
        while count < max {
            match self.char().and_then(|c| c.to_digit(16)) {
                None => break,
                Some(d) => value = value * 16 + d,
            }
            self.bump();
            count += 1;
        }
        if count < min {
            return Err(Error::new(ErrorKind::EscapeHexInvalid, start));
        }
        core::char::from_u32(value)
            .ok_or_else(|| Error::new(ErrorKind::EscapeHexInvalid, start))
    }

    /// Parse a bracketed class, starting at the `[`.
    fn parse_class(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.bump();
        let negated = if self.char() == Some('^') {
            self.bump();
            true
        } else {
            false
        };
        let mut set = ClassSet::empty();
        let mut subtract: Option<ClassSet> = None;
        let mut first = true;
        loop {
            let c = match self.char() {
                None => return Err(Error::new(ErrorKind::ClassUnclosed, start)),
                Some(c) => c,
            };
            match c {
                ']' if first && self.is_xml() => {
                    return Err(self.error(ErrorKind::ClassEmpty));
                }
                ']' if !first => {
                    self.bump();
                    break;
                }
                '-' if self.peek_is("-[") => {
                    if first {
                        return Err(self.error(ErrorKind::ClassEmpty));
                    }
                    self.bump();
                    subtract = Some(positive(self.parse_class()?));
                    if self.char() != Some(']') {
                        return Err(Error::new(ErrorKind::ClassUnclosed, start));
                    }
                    self.bump();
                    break;
                }
                '[' if self.is_xml() => {
                    return Err(self.error(ErrorKind::XmlSchemaUnsupported));
                }
                '[' if self.peek_is("[:") => set.union(&self.parse_posix()?),
                ',' if self.opts.contains(Options::SPECIAL_COMMA) => self.bump(),
                _ => self.parse_class_range(&mut set)?,
            }
            first = false;
        }
        match subtract {
            None => Ok(Token::class(set, negated)),
            Some(sub) => {
                if negated {
                    set.negate();
                }
                set.subtract(&sub);
                Ok(Token::class(set, false))
            }
        }
    }

    /// Parse one class item, or a range of two items, into `set`.
    fn parse_class_range(&mut self, set: &mut ClassSet) -> Result<(), Error> {
        let start = self.pos;
        let lo = match self.parse_class_item()? {
            ClassItem::Set(s) => {
                set.union(&s);
                return Ok(());
            }
            ClassItem::Char(lo) => lo,
        };
        let is_range = self.char() == Some('-')
            && !self.peek_is("-]")
            && !self.peek_is("-[")
            && self.pattern.len() > self.pos + 1;
        if !is_range {
            set.push_char(lo);
            return Ok(());
        }
        self.bump();
        let hi = match self.parse_class_item()? {
            ClassItem::Set(_) => {
                return Err(Error::new(ErrorKind::ClassRangeLiteral, start))
            }
            ClassItem::Char(hi) => hi,
        };
        if lo > hi {
            return Err(Error::new(ErrorKind::ClassRangeInvalid, start));
        }
        set.push_range(lo, hi);
        Ok(())
    }

    fn parse_class_item(&mut self) -> Result<ClassItem, Error> {
        let start = self.pos;
        match self.char() {
            None => Err(self.error(ErrorKind::ClassUnclosed)),
            Some('\\') => {
                self.bump();
                let c = match self.char() {
                    None => {
                        return Err(Error::new(
                            ErrorKind::EscapeUnexpectedEof,
                            start,
                        ))
                    }
                    Some(c) => c,
                };
                if let Some(set) = self.parse_class_escape(c)? {
                    return Ok(ClassItem::Set(set));
                }
                Ok(ClassItem::Char(self.parse_char_escape(start)?))
            }
            Some(c) => {
                self.bump();
                Ok(ClassItem::Char(c))
            }
        }
    }

    /// Parse a POSIX class such as `[:alpha:]` or `[:^digit:]`.
    fn parse_posix(&mut self) -> Result<ClassSet, Error> {
        let start = self.pos;
        let rest = &self.pattern[self.pos + 2..];
        let end = match rest.find(":]") {
            None => return Err(self.error(ErrorKind::ClassPosixUnknown)),
            Some(end) => end,
        };
        let (negated, name) = match rest[..end].strip_prefix('^') {
            Some(name) => (true, name),
            None => (false, &rest[..end]),
        };
        let mut set = match posix_class(name) {
            None => return Err(Error::new(ErrorKind::ClassPosixUnknown, start)),
            Some(ranges) => ascii(ranges),
        };
        if negated {
            set.negate();
        }
        self.pos += 2 + end + 2;
        Ok(set)
    }
}

fn ascii(ranges: &[(char, char)]) -> ClassSet {
    ClassSet::new(ranges.iter().map(|&(s, e)| ClassRange::new(s, e)))
}

/// The characters matched by a class token, as a positive set.
fn positive(tok: Token) -> ClassSet {
    match tok {
        Token::Class { mut set, negated } => {
            if negated {
                set.negate();
            }
            set
        }
        _ => unreachable!("class parser returns a class"),
    }
}

/// `\X`: a character that is not a mark, followed by any number of marks.
fn combining_sequence() -> Token {
    let marks = unicode::marks();
    let mut base = marks.clone();
    base.negate();
    Token::group(Token::concat(vec![
        Token::class(base, false),
        Token::repeat(Token::class(marks, false), 0, None, true),
    ]))
}

/// `\g`: an optional base character followed by any number of combining
/// characters, where a virama combines together with the letter after it.
fn grapheme() -> Token {
    let mut combiner = unicode::marks();
    combiner.push_range('\u{1160}', '\u{11FF}');
    combiner.push_range('\u{FF9E}', '\u{FF9F}');
    let virama = ClassSet::new(VIRAMAS.iter().map(|&c| ClassRange::new(c, c)));
    let joined = Token::concat(vec![
        Token::class(virama, false),
        Token::class(unicode::letters(), false),
    ]);
    Token::group(Token::concat(vec![
        Token::repeat(
            Token::class(unicode::grapheme_base(), false),
            0,
            Some(1),
            true,
        ),
        Token::repeat(
            Token::union(vec![joined, Token::class(combiner, false)]),
            0,
            None,
            true,
        ),
    ]))
}

fn posix_class(name: &str) -> Option<&'static [(char, char)]> {
    let ranges: &'static [(char, char)] = match name {
        "alnum" => &[('0', '9'), ('A', 'Z'), ('a', 'z')],
        "alpha" => &[('A', 'Z'), ('a', 'z')],
        "ascii" => &[('\x00', '\x7F')],
        "blank" => &[('\t', '\t'), (' ', ' ')],
        "cntrl" => &[('\x00', '\x1F'), ('\x7F', '\x7F')],
        "digit" => &[('0', '9')],
        "graph" => &[('!', '~')],
        "lower" => &[('a', 'z')],
        "print" => &[(' ', '~')],
        "punct" => &[('!', '/'), (':', '@'), ('[', '`'), ('{', '~')],
        "space" => &[('\t', '\r'), (' ', ' ')],
        "upper" => &[('A', 'Z')],
        "word" => &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')],
        "xdigit" => &[('0', '9'), ('A', 'F'), ('a', 'f')],
        _ => return None,
    };
    Some(ranges)
}
