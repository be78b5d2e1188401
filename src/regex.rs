use alloc::{string::String, vec};

use core::ops::Range;

use once_cell::sync::OnceCell;

use crate::{
    backtrack::{self, Cache, Program},
    error::Error,
    syntax::{unicode, FirstChar, FirstChars, Parser, Token},
    target::Target,
    util::{
        captures::Captures,
        options::Options,
        pool::Pool,
        prefilter::FixedString,
        primitives::NonMaxUsize,
        search::{Input, MatchError, Span},
    },
};

/// A compiled pattern.
///
/// A `Regex` owns a token tree, usually parsed from pattern text, and the
/// options it was built with. The first search compiles the tree into a
/// backtracking [`Program`] and analyzes it to choose a search strategy.
/// The results are kept for the lifetime of the regex, or until
/// [`Regex::set_pattern`] replaces the pattern.
///
/// # Searching
///
/// A search reports whether the pattern matches anywhere in the span of a
/// [`Target`]. Matches are found the way Perl finds them: the leftmost
/// starting offset wins, and among matches starting there, the first one
/// found by trying alternatives in order and repetitions greedily (or
/// lazily) wins. This is not the longest match.
///
/// With [`Options::XML_SCHEMA`], a pattern must instead match the whole
/// span. This is the semantics of the `pattern` facet of XML Schema.
///
/// # Synchronization and cloning
///
/// A search needs mutable scratch space, a [`Cache`]. A regex holds one
/// cache that is lent to one search at a time. A search that finds it busy,
/// because another thread is using it, creates a throwaway cache instead of
/// waiting. To control this explicitly, use [`Regex::search_with`].
///
/// # Example
///
/// ```
/// use xml_regex::Regex;
///
/// let re = Regex::new(r"(a|ab)(c|bcd)(d*)")?;
/// let mut caps = re.create_captures();
/// assert!(re.captures("abcd", &mut caps));
/// assert_eq!(Some(0..4), caps.get_group(0).map(|s| s.range()));
/// assert_eq!(Some(0..1), caps.get_group(1).map(|s| s.range()));
/// assert_eq!(Some(1..4), caps.get_group(2).map(|s| s.range()));
/// assert_eq!(Some(4..4), caps.get_group(3).map(|s| s.range()));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Regex {
    /// The pattern text. For a regex built from a token tree, this is the
    /// rendering of the tree.
    pattern: String,
    token: Token,
    options: Options,
    /// The number of groups, including group 0.
    group_len: usize,
    /// Whether capture slots are needed even when the caller does not ask
    /// for them: backreferences and conditionals read them.
    has_backrefs: bool,
    /// The compiled program and search strategy, built on first use.
    prepared: OnceCell<Prepared>,
    pool: Pool<Cache>,
}

/// Everything derived from the token tree that a search needs.
#[derive(Clone, Debug)]
struct Prepared {
    program: Program,
    /// The minimum number of characters in a match.
    min_len: usize,
    /// When the pattern can only match a few characters at its start, the
    /// set of those characters.
    first_chars: Option<FirstChars>,
    /// A literal that every match contains.
    prefilter: Option<FixedString>,
    /// Set when the whole pattern is a literal. The program never runs.
    fixed_only: Option<FixedString>,
    /// Whether the program begins with a greedy `.*`.
    dot_star: bool,
}

impl Regex {
    /// Parse the given pattern and build a regex with no options set.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_regex::Regex;
    ///
    /// let re = Regex::new("a.*b")?;
    /// assert!(re.matches("xaxbx"));
    /// assert!(!re.matches("xbxax"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Regex::builder().build(pattern)
    }

    /// Parse the given pattern and build a regex with the options named by
    /// the given letters.
    ///
    /// See [`Options::parse`] for the letters.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_regex::Regex;
    ///
    /// let re = Regex::with_options("[a-z]+@[a-z]+", "X")?;
    /// assert!(re.matches("me@example"));
    /// // In XML Schema mode, the whole text must match.
    /// assert!(!re.matches("mail me@example"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_options(pattern: &str, options: &str) -> Result<Regex, Error> {
        let options = Options::parse(options).map_err(Error::option)?;
        Regex::builder()
            .configure(Regex::config().options(options))
            .build(pattern)
    }

    /// Build a regex from a token tree. The tree is not validated: a
    /// backreference to a group that does not exist is reported when a
    /// search reaches it.
    pub fn from_token(token: Token, options: Options) -> Regex {
        Regex::builder()
            .configure(Regex::config().options(options))
            .build_from_token(token)
    }

    /// Return a default configuration for a `Regex`.
    pub fn config() -> Config {
        Config::new()
    }

    /// Return a builder for configuring the construction of a `Regex`.
    pub fn builder() -> Builder {
        Builder::new()
    }

    fn from_parts(pattern: String, token: Token, options: Options) -> Regex {
        let create: fn() -> Cache = Cache::new;
        Regex {
            pattern,
            group_len: token.group_len(),
            has_backrefs: token.has_backrefs(),
            token,
            options,
            prepared: OnceCell::new(),
            pool: Pool::new(create),
        }
    }

    /// Replace the pattern and options of this regex.
    ///
    /// Everything computed for the previous pattern is dropped. On error,
    /// this regex is left unchanged.
    pub fn set_pattern(
        &mut self,
        pattern: &str,
        options: &str,
    ) -> Result<(), Error> {
        *self = Regex::with_options(pattern, options)?;
        Ok(())
    }

    /// Return the pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Return the letters of the options this regex was built with.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_regex::Regex;
    ///
    /// let re = Regex::with_options("a", "mi")?;
    /// assert_eq!("im", re.options());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn options(&self) -> String {
        self.options.to_string()
    }

    /// Return the options this regex was built with.
    pub fn get_options(&self) -> Options {
        self.options
    }

    /// Return the token tree of this regex.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// The number of capturing groups in the pattern, including group `0`,
    /// which is the whole match.
    pub fn group_len(&self) -> usize {
        self.group_len
    }

    /// Create a set of captures sized for this regex.
    pub fn create_captures(&self) -> Captures {
        Captures::with_group_len(self.group_len)
    }

    /// Create a new cache for use with [`Regex::search_with`].
    pub fn create_cache(&self) -> Cache {
        Cache::new()
    }

    /// Return the compiled program, compiling it first if needed.
    pub fn program(&self) -> &Program {
        &self.prepared().program
    }

    /// Returns the heap memory, in bytes, used by this regex's compiled
    /// program and search strategy. This is zero before the first search.
    pub fn memory_usage(&self) -> usize {
        match self.prepared.get() {
            None => 0,
            Some(p) => {
                p.program.memory_usage()
                    + p.prefilter.as_ref().map_or(0, |f| f.memory_usage())
                    + p.fixed_only.as_ref().map_or(0, |f| f.memory_usage())
            }
        }
    }
}

impl Regex {
    /// Returns true if this regex matches anywhere in the target. With
    /// [`Options::XML_SCHEMA`], it must match the whole target.
    ///
    /// # Panics
    ///
    /// This panics if the search fails with a [`MatchError`]. Use
    /// [`Regex::try_search`] to handle that instead.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_regex::Regex;
    ///
    /// let re = Regex::new("a(?=b)")?;
    /// // Every kind of target is searched the same way.
    /// let chars: Vec<char> = "xab".chars().collect();
    /// assert!(re.matches("xab"));
    /// assert!(re.matches(&chars[..]));
    /// assert!(!re.matches("xac"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn matches<T: ?Sized + Target>(&self, target: &T) -> bool {
        self.search(&Input::new(target), None)
    }

    /// Returns true if this regex matches in the given range of the target.
    ///
    /// The range acts as the whole text: anchors such as `^` and `\A` match
    /// at its start and lookbehind never looks before it.
    ///
    /// # Panics
    ///
    /// This panics if the range is not valid for the target, or if the
    /// search fails with any other [`MatchError`].
    pub fn matches_range<T: ?Sized + Target>(
        &self,
        target: &T,
        range: Range<usize>,
    ) -> bool {
        self.search(&Input::new(target).range(range), None)
    }

    /// Search the target and record the spans of the capturing groups of
    /// the match in `caps`. Returns true if a match was found. When no
    /// match is found, every group in `caps` is unset.
    ///
    /// # Panics
    ///
    /// This panics if the search fails with a [`MatchError`].
    pub fn captures<T: ?Sized + Target>(
        &self,
        target: &T,
        caps: &mut Captures,
    ) -> bool {
        self.search(&Input::new(target), Some(caps))
    }

    /// Like [`Regex::captures`], but searches only the given range.
    ///
    /// # Panics
    ///
    /// This panics if the range is not valid for the target, or if the
    /// search fails with any other [`MatchError`].
    pub fn captures_range<T: ?Sized + Target>(
        &self,
        target: &T,
        range: Range<usize>,
        caps: &mut Captures,
    ) -> bool {
        self.search(&Input::new(target).range(range), Some(caps))
    }

    /// Execute a search, optionally recording capture spans.
    ///
    /// # Panics
    ///
    /// This panics if the search fails with a [`MatchError`].
    pub fn search<T: ?Sized + Target>(
        &self,
        input: &Input<'_, T>,
        caps: Option<&mut Captures>,
    ) -> bool {
        match self.try_search(input, caps) {
            Ok(matched) => matched,
            Err(err) => panic!("{}", err),
        }
    }

    /// Execute a search, optionally recording capture spans, and return an
    /// error instead of panicking when the search fails.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_regex::{Input, MatchError, Regex};
    ///
    /// let re = Regex::new("b")?;
    /// let input = Input::new("abc").range(1..5);
    /// assert_eq!(
    ///     Err(MatchError::InvalidSpan { start: 1, end: 5 }),
    ///     re.try_search(&input, None),
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_search<T: ?Sized + Target>(
        &self,
        input: &Input<'_, T>,
        caps: Option<&mut Captures>,
    ) -> Result<bool, MatchError> {
        let mut guard = self.pool.get();
        let result = self.search_with(&mut guard, input, caps);
        if result.is_err() {
            guard.discard();
        }
        result
    }

    /// Execute a search with the given cache.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_regex::{Input, Regex};
    ///
    /// let re = Regex::new(r"(\w+)@(\w+)")?;
    /// let (mut cache, mut caps) = (re.create_cache(), re.create_captures());
    /// let input = Input::new("mail me@example");
    /// assert!(re.search_with(&mut cache, &input, Some(&mut caps))?);
    /// assert_eq!(Some(5..7), caps.get_group(1).map(|s| s.range()));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn search_with<T: ?Sized + Target>(
        &self,
        cache: &mut Cache,
        input: &Input<'_, T>,
        caps: Option<&mut Captures>,
    ) -> Result<bool, MatchError> {
        input.validate()?;
        let prepared = self.prepared();
        match caps {
            Some(caps) => {
                caps.reset(self.group_len);
                let span = self.search_imp(
                    prepared,
                    cache,
                    input,
                    Some(caps.slots_mut()),
                )?;
                match span {
                    None => {
                        caps.clear();
                        Ok(false)
                    }
                    Some(span) => {
                        caps.set_group(0, span);
                        Ok(true)
                    }
                }
            }
            None if self.has_backrefs => {
                let mut slots = vec![None; self.group_len * 2];
                let span =
                    self.search_imp(prepared, cache, input, Some(&mut slots))?;
                Ok(span.is_some())
            }
            None => {
                let span = self.search_imp(prepared, cache, input, None)?;
                Ok(span.is_some())
            }
        }
    }

    fn prepared(&self) -> &Prepared {
        self.prepared.get_or_init(|| Prepared::new(&self.token, self.options))
    }

    /// Find the span of the leftmost match, choosing a strategy based on
    /// what was learned about the pattern when it was prepared.
    fn search_imp<T: ?Sized + Target>(
        &self,
        prepared: &Prepared,
        cache: &mut Cache,
        input: &Input<'_, T>,
        mut slots: Option<&mut [Option<NonMaxUsize>]>,
    ) -> Result<Option<Span>, MatchError> {
        let (target, start, limit) = (input.haystack(), input.start(), input.end());
        let opts = self.options;
        // Offsets are at least as dense as characters, so a window with
        // fewer offsets than the minimum length has too few characters.
        if limit - start < prepared.min_len {
            trace!("span {}..{} is shorter than any match", start, limit);
            return Ok(None);
        }
        let prog = &prepared.program;
        let mut try_at = |at: usize| -> Result<Option<Span>, MatchError> {
            let slots = slots.as_mut().map(|s| &mut **s);
            let end =
                backtrack::run(prog, cache, target, start, limit, at, opts, slots)?;
            Ok(end.map(|end| Span { start: at, end }))
        };

        if opts.is_xml_schema() {
            trace!("whole span search at {}", start);
            return try_at(start);
        }
        if let Some(ref fixed) = prepared.fixed_only {
            trace!("literal search in {}..{}", start, limit);
            return Ok(fixed.find(target, start, limit));
        }
        if let Some(ref pre) = prepared.prefilter {
            if pre.find(target, start, limit).is_none() {
                trace!("required literal not found in {}..{}", start, limit);
                return Ok(None);
            }
        }
        let last = limit - prepared.min_len;
        if prepared.dot_star {
            if opts.is_single_line() {
                trace!("leading .* in single line mode, trying {}", start);
                return try_at(start);
            }
            // A leading `.*` can only start a match at the beginning of the
            // span or of a line. Anywhere else, starting one character
            // earlier would have matched too.
            let mut at = start;
            let mut previous_is_eol = true;
            loop {
                if previous_is_eol {
                    if let Some(span) = try_at(at)? {
                        return Ok(Some(span));
                    }
                }
                match target.char_after(at, limit) {
                    Some((ch, next)) if next <= last => {
                        previous_is_eol = unicode::is_line_terminator(ch);
                        at = next;
                    }
                    _ => return Ok(None),
                }
            }
        }
        let mut at = start;
        loop {
            let next = target.char_after(at, limit);
            let candidate = match (prepared.first_chars.as_ref(), next) {
                (Some(chars), Some((ch, _))) => chars.contains(ch),
                (Some(_), None) => false,
                (None, _) => true,
            };
            if candidate {
                if let Some(span) = try_at(at)? {
                    return Ok(Some(span));
                }
            }
            match next {
                Some((_, next)) if next <= last => at = next,
                _ => return Ok(None),
            }
        }
    }
}

impl Prepared {
    fn new(token: &Token, opts: Options) -> Prepared {
        let program = Program::new(token);
        let min_len = token.min_len();

        let mut first_chars = None;
        if !opts.contains(Options::NO_FIRST_CHAR) && !opts.is_xml_schema() {
            let mut chars = FirstChars::new();
            if token.analyze_first_char(opts, &mut chars) == FirstChar::Terminal
            {
                first_chars = Some(chars);
            }
        }

        let mut fixed_only = None;
        let mut prefilter = None;
        if !opts.contains(Options::NO_FIXED_STRING) && !opts.is_xml_schema() {
            if let Some(literal) = program.fixed_literal() {
                let fold = opts.is_case_insensitive();
                fixed_only = Some(FixedString::new(literal, fold));
            } else if let Some((literal, at)) = token.find_fixed_string(opts) {
                if literal.len() >= 2 {
                    let fold = at.is_case_insensitive();
                    prefilter = Some(FixedString::new(&literal, fold));
                }
            }
        }

        let dot_star = program.starts_with_dot_star();
        debug!(
            "prepared program: {} ops, {} closures, min length {}, \
             first chars: {}, literal only: {}, required literal: {}, \
             leading dot star: {}",
            program.len(),
            program.closure_len(),
            min_len,
            first_chars.is_some(),
            fixed_only.is_some(),
            prefilter.is_some(),
            dot_star,
        );
        Prepared { program, min_len, first_chars, prefilter, fixed_only, dot_star }
    }
}

impl Clone for Regex {
    fn clone(&self) -> Regex {
        let create: fn() -> Cache = Cache::new;
        Regex {
            pattern: self.pattern.clone(),
            token: self.token.clone(),
            options: self.options,
            group_len: self.group_len,
            has_backrefs: self.has_backrefs,
            prepared: self.prepared.clone(),
            pool: Pool::new(create),
        }
    }
}

impl PartialEq for Regex {
    fn eq(&self, other: &Regex) -> bool {
        self.pattern == other.pattern && self.options == other.options
    }
}

impl Eq for Regex {}

impl core::hash::Hash for Regex {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
        self.options.hash(state);
    }
}

/// Renders the token tree, which parses back into an equivalent pattern.
impl core::fmt::Display for Regex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.token.render(self.options))
    }
}

/// The configuration used to build a [`Regex`].
///
/// Each option corresponds to one of the [`Options`] flags. A configuration
/// is usually built up from [`Regex::config`] and handed to
/// [`Builder::configure`].
///
/// # Example
///
/// ```
/// use xml_regex::Regex;
///
/// let re = Regex::builder()
///     .configure(Regex::config().case_insensitive(true).multi_line(true))
///     .build("^b")?;
/// assert!(re.matches("a\nB"));
/// assert_eq!("im", re.options());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Config {
    // All knobs are options so that we can distinguish between "default" and
    // "not set." See the 'overwrite' method.
    case_insensitive: Option<bool>,
    multi_line: Option<bool>,
    single_line: Option<bool>,
    extended: Option<bool>,
    unicode_classes: Option<bool>,
    unicode_word_boundary: Option<bool>,
    fixed_string: Option<bool>,
    first_char: Option<bool>,
    xml_schema: Option<bool>,
    special_comma: Option<bool>,
    nest_limit: Option<u32>,
}

impl Config {
    /// Return a new default configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Set every option flag from the given set of options.
    pub fn options(self, opts: Options) -> Config {
        Config {
            case_insensitive: Some(opts.contains(Options::CASE_INSENSITIVE)),
            multi_line: Some(opts.contains(Options::MULTI_LINE)),
            single_line: Some(opts.contains(Options::SINGLE_LINE)),
            extended: Some(opts.contains(Options::EXTENDED)),
            unicode_classes: Some(opts.contains(Options::UNICODE_CLASSES)),
            unicode_word_boundary: Some(
                opts.contains(Options::UNICODE_WORD_BOUNDARY),
            ),
            fixed_string: Some(!opts.contains(Options::NO_FIXED_STRING)),
            first_char: Some(!opts.contains(Options::NO_FIRST_CHAR)),
            xml_schema: Some(opts.contains(Options::XML_SCHEMA)),
            special_comma: Some(opts.contains(Options::SPECIAL_COMMA)),
            ..self
        }
    }

    /// Compare characters with simple case folding. (`i`)
    pub fn case_insensitive(self, yes: bool) -> Config {
        Config { case_insensitive: Some(yes), ..self }
    }

    /// Let `^` and `$` match at embedded line boundaries. (`m`)
    pub fn multi_line(self, yes: bool) -> Config {
        Config { multi_line: Some(yes), ..self }
    }

    /// Let `.` match line terminators. (`s`)
    pub fn single_line(self, yes: bool) -> Config {
        Config { single_line: Some(yes), ..self }
    }

    /// Ignore whitespace and `#` comments in the pattern. (`x`)
    pub fn extended(self, yes: bool) -> Config {
        Config { extended: Some(yes), ..self }
    }

    /// Use Unicode categories for `\w`, `\d`, `\s` and `\b`. (`u`)
    pub fn unicode_classes(self, yes: bool) -> Config {
        Config { unicode_classes: Some(yes), ..self }
    }

    /// Compute word boundaries with the general category algorithm. (`w`)
    pub fn unicode_word_boundary(self, yes: bool) -> Config {
        Config { unicode_word_boundary: Some(yes), ..self }
    }

    /// Enable the literal search optimizations. Disabling them is `F`.
    ///
    /// This is enabled by default.
    pub fn fixed_string(self, yes: bool) -> Config {
        Config { fixed_string: Some(yes), ..self }
    }

    /// Enable the first character filter. Disabling it is `H`.
    ///
    /// This is enabled by default.
    pub fn first_char(self, yes: bool) -> Config {
        Config { first_char: Some(yes), ..self }
    }

    /// Use XML Schema syntax and require matches to span the whole text.
    /// (`X`)
    pub fn xml_schema(self, yes: bool) -> Config {
        Config { xml_schema: Some(yes), ..self }
    }

    /// Let a comma separate the items of a character class. (`,`)
    pub fn special_comma(self, yes: bool) -> Config {
        Config { special_comma: Some(yes), ..self }
    }

    /// Set how deeply groups may be nested in a pattern.
    pub fn nest_limit(self, limit: u32) -> Config {
        Config { nest_limit: Some(limit), ..self }
    }

    pub fn get_case_insensitive(&self) -> bool {
        self.case_insensitive.unwrap_or(false)
    }

    pub fn get_multi_line(&self) -> bool {
        self.multi_line.unwrap_or(false)
    }

    pub fn get_single_line(&self) -> bool {
        self.single_line.unwrap_or(false)
    }

    pub fn get_extended(&self) -> bool {
        self.extended.unwrap_or(false)
    }

    pub fn get_unicode_classes(&self) -> bool {
        self.unicode_classes.unwrap_or(false)
    }

    pub fn get_unicode_word_boundary(&self) -> bool {
        self.unicode_word_boundary.unwrap_or(false)
    }

    pub fn get_fixed_string(&self) -> bool {
        self.fixed_string.unwrap_or(true)
    }

    pub fn get_first_char(&self) -> bool {
        self.first_char.unwrap_or(true)
    }

    pub fn get_xml_schema(&self) -> bool {
        self.xml_schema.unwrap_or(false)
    }

    pub fn get_special_comma(&self) -> bool {
        self.special_comma.unwrap_or(false)
    }

    pub fn get_nest_limit(&self) -> Option<u32> {
        self.nest_limit
    }

    /// Return the option flags of this configuration.
    pub fn get_options(&self) -> Options {
        let mut opts = Options::empty();
        opts.set(Options::CASE_INSENSITIVE, self.get_case_insensitive());
        opts.set(Options::MULTI_LINE, self.get_multi_line());
        opts.set(Options::SINGLE_LINE, self.get_single_line());
        opts.set(Options::EXTENDED, self.get_extended());
        opts.set(Options::UNICODE_CLASSES, self.get_unicode_classes());
        opts.set(
            Options::UNICODE_WORD_BOUNDARY,
            self.get_unicode_word_boundary(),
        );
        opts.set(Options::NO_FIXED_STRING, !self.get_fixed_string());
        opts.set(Options::NO_FIRST_CHAR, !self.get_first_char());
        opts.set(Options::XML_SCHEMA, self.get_xml_schema());
        opts.set(Options::SPECIAL_COMMA, self.get_special_comma());
        opts
    }

    /// Overwrite the default configuration such that the options in `o` are
    /// always used. If an option in `o` is not set, then the corresponding
    /// option in `self` is used. If it's not set in `self` either, then it
    /// remains not set.
    pub(crate) fn overwrite(&self, o: Config) -> Config {
        Config {
            case_insensitive: o.case_insensitive.or(self.case_insensitive),
            multi_line: o.multi_line.or(self.multi_line),
            single_line: o.single_line.or(self.single_line),
            extended: o.extended.or(self.extended),
            unicode_classes: o.unicode_classes.or(self.unicode_classes),
            unicode_word_boundary: o
                .unicode_word_boundary
                .or(self.unicode_word_boundary),
            fixed_string: o.fixed_string.or(self.fixed_string),
            first_char: o.first_char.or(self.first_char),
            xml_schema: o.xml_schema.or(self.xml_schema),
            special_comma: o.special_comma.or(self.special_comma),
            nest_limit: o.nest_limit.or(self.nest_limit),
        }
    }
}

/// A builder for a [`Regex`].
///
/// This pairs a [`Config`] with the ways a regex can be built: from pattern
/// text or from a token tree.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Builder {
        Builder { config: Config::default() }
    }

    /// Parse the given pattern and build a regex from it.
    pub fn build(&self, pattern: &str) -> Result<Regex, Error> {
        let options = self.config.get_options();
        debug!("building regex with options {:?}: {}", options, pattern);
        let mut parser = Parser::new().options(options);
        if let Some(limit) = self.config.get_nest_limit() {
            parser = parser.nest_limit(limit);
        }
        let token = parser.parse(pattern).map_err(Error::syntax)?;
        Ok(Regex::from_parts(String::from(pattern), token, options))
    }

    /// Build a regex from a token tree.
    pub fn build_from_token(&self, token: Token) -> Regex {
        let options = self.config.get_options();
        let pattern = token.render(options);
        Regex::from_parts(pattern, token, options)
    }

    /// Apply the given configuration. Options not set in `config` keep
    /// their current values.
    pub fn configure(&mut self, config: Config) -> &mut Builder {
        self.config = self.config.overwrite(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloc::{borrow::ToOwned, vec::Vec};

    fn group(caps: &Captures, i: usize) -> Option<Range<usize>> {
        caps.get_group(i).map(|s| s.range())
    }

    #[test]
    fn oibits() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Regex>();
        assert_sync::<Regex>();
        assert_send::<Cache>();
    }

    #[test]
    fn strategies_agree() {
        // The same patterns with every optimization enabled and disabled.
        let patterns = &[
            "abc", "ab+c", ".*c", "(?:x|y)z", "a[bc]d", r"\bcd", "x?c",
        ];
        let haystacks = &["", "abc", "xxabbc", "ab\ncd", "yz", "acd", "zz c"];
        for p in patterns {
            let fast = Regex::new(p).unwrap();
            let slow = Regex::with_options(p, "FH").unwrap();
            for h in haystacks {
                let (mut c1, mut c2) = (fast.create_captures(), slow.create_captures());
                assert_eq!(
                    slow.captures(*h, &mut c2),
                    fast.captures(*h, &mut c1),
                    "pattern {:?} on {:?}",
                    p,
                    h
                );
                assert_eq!(c2, c1, "pattern {:?} on {:?}", p, h);
            }
        }
    }

    #[test]
    fn prepared_strategy() {
        let re = Regex::new("abc").unwrap();
        let p = re.prepared();
        assert!(p.fixed_only.is_some());
        assert!(p.prefilter.is_none());

        let re = Regex::new("x+abc").unwrap();
        let p = re.prepared();
        assert!(p.fixed_only.is_none());
        let found = p.prefilter.as_ref().and_then(|f| f.find("zabcx", 0, 5));
        assert_eq!(Some(Span::from(1..4)), found);
        assert!(p.first_chars.as_ref().map_or(false, |c| c.contains('x')));
        assert_eq!(4, p.min_len);

        let re = Regex::with_options("x+abc", "X").unwrap();
        let p = re.prepared();
        assert!(p.prefilter.is_none());
        assert!(p.first_chars.is_none());

        let re = Regex::new(".*abc").unwrap();
        assert!(re.prepared().dot_star);
    }

    #[test]
    fn literal_only_search() {
        let re = Regex::new("bc").unwrap();
        let mut caps = re.create_captures();
        assert!(re.captures("abcbc", &mut caps));
        assert_eq!(Some(1..3), group(&caps, 0));
        assert!(re.captures_range("abcbc", 2..5, &mut caps));
        assert_eq!(Some(3..5), group(&caps, 0));
        assert!(!re.captures("acb", &mut caps));
        assert_eq!(None, group(&caps, 0));

        let re = Regex::with_options("bc", "i").unwrap();
        assert!(re.matches("aBC"));
    }

    #[test]
    fn dot_star_lines() {
        let re = Regex::new(".*b").unwrap();
        let mut caps = re.create_captures();
        assert!(re.captures("a\nxb", &mut caps));
        assert_eq!(Some(2..4), group(&caps, 0));
        let re = Regex::with_options(".*b", "s").unwrap();
        assert!(re.captures("a\nxb", &mut caps));
        assert_eq!(Some(0..4), group(&caps, 0));
        let re = Regex::new(".*").unwrap();
        assert!(re.captures("", &mut caps));
        assert_eq!(Some(0..0), group(&caps, 0));
        assert!(re.captures("\n", &mut caps));
        assert_eq!(Some(0..0), group(&caps, 0));
        // The first character of a match may be a line terminator.
        let re = Regex::new(".*\nb").unwrap();
        assert!(re.captures("a\nb", &mut caps));
        assert_eq!(Some(0..3), group(&caps, 0));
        assert!(re.captures("\nb", &mut caps));
        assert_eq!(Some(0..2), group(&caps, 0));
    }

    #[test]
    fn whole_span_mode() {
        let re = Regex::with_options("ab|abc", "X").unwrap();
        assert!(re.matches("abc"));
        assert!(re.matches("ab"));
        assert!(!re.matches("abcd"));
        assert!(re.matches_range("xabcx", 1..4));
        let re = Regex::with_options("", "X").unwrap();
        assert!(re.matches(""));
        assert!(!re.matches("a"));
        let re = Regex::with_options("abc", "X").unwrap();
        assert!(!re.matches("xabc"));
    }

    #[test]
    fn backrefs_without_captures() {
        let re = Regex::new(r"(a)\1").unwrap();
        assert!(re.matches("xaa"));
        assert!(!re.matches("ab"));
    }

    #[test]
    fn invalid_group_is_an_error() {
        let token =
            Token::concat(vec![Token::Char('a'), Token::Backref(2)]);
        let re = Regex::from_token(token, Options::empty());
        let err = re.try_search(&Input::new("aa"), None).unwrap_err();
        assert_eq!(MatchError::InvalidGroup { group: 2, group_len: 1 }, err);
        // The regex is still usable.
        let re2 = Regex::new("a").unwrap();
        assert!(re2.matches("a"));
        assert_eq!(Err(err), re.try_search(&Input::new("ab"), None));
    }

    #[test]
    #[should_panic]
    fn invalid_span_panics() {
        let re = Regex::new("a").unwrap();
        re.matches_range("a", 0..2);
    }

    #[test]
    fn invalid_span_boundary() {
        let re = Regex::new("a").unwrap();
        let input = Input::new("éa").range(1..3);
        assert_eq!(
            Err(MatchError::InvalidSpan { start: 1, end: 3 }),
            re.try_search(&input, None)
        );
    }

    #[test]
    fn set_pattern_replaces_everything() {
        let mut re = Regex::new("a").unwrap();
        assert!(re.matches("a"));
        assert!(re.memory_usage() > 0);
        re.set_pattern("(b)(c)", "i").unwrap();
        assert_eq!(0, re.memory_usage());
        assert_eq!("(b)(c)", re.pattern());
        assert_eq!("i", re.options());
        assert_eq!(3, re.group_len());
        assert!(!re.matches("a"));
        assert!(re.matches("BC"));

        assert!(re.set_pattern("(", "").is_err());
        assert_eq!("(b)(c)", re.pattern());
    }

    #[test]
    fn equality_and_display() {
        let a = Regex::with_options("a+b", "i").unwrap();
        let b = Regex::with_options("a+b", "i").unwrap();
        let c = Regex::with_options("a+b", "").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, a.clone());
        assert_eq!("a+b", a.to_string());

        let re = Regex::from_token(Token::literal("a.b"), Options::empty());
        assert_eq!(r"a\.b", re.pattern());
        assert!(re.matches("a.b"));
        assert!(!re.matches("axb"));
    }

    #[test]
    fn config_overwrite() {
        let mut builder = Regex::builder();
        builder.configure(Regex::config().case_insensitive(true));
        builder.configure(Regex::config().multi_line(true));
        let re = builder.build("a").unwrap();
        assert_eq!("im", re.options());
        builder.configure(Regex::config().options(Options::SINGLE_LINE));
        assert_eq!("s", builder.build("a").unwrap().options());
        builder.configure(Regex::config().fixed_string(false));
        assert_eq!("sF", builder.build("a").unwrap().options());
    }

    #[test]
    fn nest_limit() {
        let pattern = "(".repeat(10) + &")".repeat(10);
        let mut builder = Regex::builder();
        builder.configure(Regex::config().nest_limit(5));
        assert!(builder.build(&pattern).is_err());
        builder.configure(Regex::config().nest_limit(50));
        assert!(builder.build(&pattern).is_ok());
    }

    #[test]
    fn concurrent_searches() {
        let re = std::sync::Arc::new(Regex::new(r"(\w+)\s(\w+)").unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let re = re.clone();
                std::thread::spawn(move || {
                    let text = alloc::format!("word{} other{}", i, i);
                    let mut caps = re.create_captures();
                    for _ in 0..100 {
                        assert!(re.captures(&*text, &mut caps));
                        let want = alloc::format!("other{}", i);
                        let span = caps.get_group(2).unwrap();
                        assert_eq!(want, text[span.range()].to_owned());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
