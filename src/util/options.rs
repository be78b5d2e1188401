/*!
The option bitmask that controls how a pattern is parsed, compiled and
matched.

Options can be written as a string of single letters, e.g., `"imX"`. The
[`Options`] type parses and renders that form, and supports the usual set
operations. Inline modifier groups such as `(?i:...)` set and clear bits of
this same mask for the scope of their body.
*/

use core::fmt;

/// A set of pattern options.
///
/// This is a small bitset. The empty set is the default.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Options {
    bits: u16,
}

impl Options {
    /// Case insensitive matching, using simple case folding. (`i`)
    pub const CASE_INSENSITIVE: Options = Options { bits: 1 << 1 };
    /// `.` matches line terminators too. (`s`)
    pub const SINGLE_LINE: Options = Options { bits: 1 << 2 };
    /// `^` and `$` match at embedded line boundaries. (`m`)
    pub const MULTI_LINE: Options = Options { bits: 1 << 3 };
    /// Whitespace and `#` comments in the pattern are ignored. (`x`)
    pub const EXTENDED: Options = Options { bits: 1 << 4 };
    /// `\w`, `\d`, `\s` and `\b` use Unicode categories. (`u`)
    pub const UNICODE_CLASSES: Options = Options { bits: 1 << 5 };
    /// Word boundaries are computed with the general category algorithm.
    /// (`w`)
    pub const UNICODE_WORD_BOUNDARY: Options = Options { bits: 1 << 6 };
    /// Disables the first character filter. (`H`)
    pub const NO_FIRST_CHAR: Options = Options { bits: 1 << 7 };
    /// Disables the fixed string pre-scan. (`F`)
    pub const NO_FIXED_STRING: Options = Options { bits: 1 << 8 };
    /// XML Schema syntax with whole-string matching. (`X`)
    pub const XML_SCHEMA: Options = Options { bits: 1 << 9 };
    /// A comma separates items inside a character class. (`,`)
    pub const SPECIAL_COMMA: Options = Options { bits: 1 << 10 };

    /// Every option paired with its letter, in canonical rendering order.
    const LETTERS: &'static [(char, Options)] = &[
        ('i', Options::CASE_INSENSITIVE),
        ('m', Options::MULTI_LINE),
        ('s', Options::SINGLE_LINE),
        ('x', Options::EXTENDED),
        ('u', Options::UNICODE_CLASSES),
        ('w', Options::UNICODE_WORD_BOUNDARY),
        ('F', Options::NO_FIXED_STRING),
        ('H', Options::NO_FIRST_CHAR),
        ('X', Options::XML_SCHEMA),
        (',', Options::SPECIAL_COMMA),
    ];

    /// Create an empty set of options.
    pub fn empty() -> Options {
        Options { bits: 0 }
    }

    /// Parse a string of option letters.
    ///
    /// An error is returned for any letter that does not name an option.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_regex::Options;
    ///
    /// let opts = Options::parse("im")?;
    /// assert!(opts.contains(Options::CASE_INSENSITIVE));
    /// assert!(opts.contains(Options::MULTI_LINE));
    /// assert!(!opts.contains(Options::SINGLE_LINE));
    /// assert_eq!("im", opts.to_string());
    ///
    /// assert!(Options::parse("iq").is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(letters: &str) -> Result<Options, UnknownOption> {
        let mut opts = Options::empty();
        for ch in letters.chars() {
            opts = opts.union(Options::from_letter(ch)?);
        }
        Ok(opts)
    }

    /// Return the option named by a single letter.
    pub fn from_letter(letter: char) -> Result<Options, UnknownOption> {
        Options::LETTERS
            .iter()
            .find(|&&(ch, _)| ch == letter)
            .map(|&(_, opt)| opt)
            .ok_or(UnknownOption { letter })
    }

    /// Returns true if and only if no option is set.
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns true if and only if every option in `other` is set in `self`.
    pub fn contains(self, other: Options) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Returns the options set in either `self` or `other`.
    pub fn union(self, other: Options) -> Options {
        Options { bits: self.bits | other.bits }
    }

    /// Returns the options set in `self` but not in `other`.
    pub fn difference(self, other: Options) -> Options {
        Options { bits: self.bits & !other.bits }
    }

    /// Returns the options set in both `self` and `other`.
    pub fn intersection(self, other: Options) -> Options {
        Options { bits: self.bits & other.bits }
    }

    /// Set or clear every option in `other`.
    pub fn set(&mut self, other: Options, yes: bool) {
        if yes {
            *self = self.union(other);
        } else {
            *self = self.difference(other);
        }
    }

    pub(crate) fn is_case_insensitive(self) -> bool {
        self.contains(Options::CASE_INSENSITIVE)
    }

    pub(crate) fn is_single_line(self) -> bool {
        self.contains(Options::SINGLE_LINE)
    }

    pub(crate) fn is_multi_line(self) -> bool {
        self.contains(Options::MULTI_LINE)
    }

    pub(crate) fn is_xml_schema(self) -> bool {
        self.contains(Options::XML_SCHEMA)
    }
}

impl core::ops::BitOr for Options {
    type Output = Options;

    fn bitor(self, rhs: Options) -> Options {
        self.union(rhs)
    }
}

impl core::ops::BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Options) {
        *self = self.union(rhs);
    }
}

impl core::str::FromStr for Options {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Options, UnknownOption> {
        Options::parse(s)
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &(ch, opt) in Options::LETTERS {
            if self.contains(opt) {
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Options({:?})", self.to_string())
    }
}

/// An error that occurs when an option string contains an unrecognized
/// letter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownOption {
    letter: char,
}

impl UnknownOption {
    /// The letter that did not name an option.
    pub fn letter(&self) -> char {
        self.letter
    }
}

impl std::error::Error for UnknownOption {}

impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown option: '{}'", self.letter)
    }
}
