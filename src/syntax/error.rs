/// An error that occurred while parsing a pattern.
///
/// The error records what went wrong and the byte offset in the pattern at
/// which the parser noticed it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

/// The kind of error that occurred while parsing a pattern.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The pattern ended in the middle of an escape sequence.
    EscapeUnexpectedEof,
    /// An unrecognized escape sequence.
    EscapeUnrecognized(char),
    /// A hexadecimal escape was malformed or did not name a valid code
    /// point.
    EscapeHexInvalid,
    /// A `\p{..}` or `\P{..}` named an unknown property.
    PropertyUnknown,
    /// A `\p` or `\P` escape was not followed by a braced name.
    PropertyMalformed,
    /// A group was opened but never closed.
    GroupUnclosed,
    /// A `)` did not close any group.
    GroupUnopened,
    /// An unrecognized group form, e.g., `(?Q`.
    GroupFlagUnrecognized(char),
    /// A modifier group did not end with `:`.
    GroupFlagsUnclosed,
    /// A group such as `(?i)` that only sets options, somewhere other than
    /// the start of a group.
    GroupFlagsMisplaced,
    /// A character class was opened but never closed.
    ClassUnclosed,
    /// A character class with nothing in it.
    ClassEmpty,
    /// A class range whose start is greater than its end.
    ClassRangeInvalid,
    /// A class range whose bound is not a single character, e.g., `[\d-z]`.
    ClassRangeLiteral,
    /// An unknown POSIX class name, e.g., `[:alphabet:]`.
    ClassPosixUnknown,
    /// A class set operation `(?[..]-[..])` with an operand that is not a
    /// class or an operator other than `-`, `+` or `&`.
    ClassSetOperationInvalid,
    /// A quantifier with nothing before it to repeat.
    RepetitionMissing,
    /// A counted repetition that was not closed or not a number.
    RepetitionCountUnclosed,
    /// A counted repetition whose minimum exceeds its maximum.
    RepetitionCountInvalid,
    /// A repetition count too big to represent.
    RepetitionCountOverflow,
    /// A backreference to a group that does not exist, or to group `0`.
    BackrefUndefined(usize),
    /// A conditional whose condition is neither a group number nor a
    /// lookaround, or that has more than two branches.
    ConditionInvalid,
    /// A construct that XML Schema regular expressions do not have.
    XmlSchemaUnsupported,
    /// Groups were nested more deeply than the configured limit.
    NestLimitExceeded(u32),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Error {
        Error { kind, offset }
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Return the byte offset in the pattern at which this error occurred.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "error at offset {}: {}", self.offset, self.kind)
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use self::ErrorKind::*;

        match *self {
            EscapeUnexpectedEof => write!(f, "incomplete escape sequence"),
            EscapeUnrecognized(c) => {
                write!(f, "unrecognized escape sequence '\\{}'", c)
            }
            EscapeHexInvalid => write!(f, "invalid hexadecimal escape"),
            PropertyUnknown => write!(f, "unknown Unicode property"),
            PropertyMalformed => {
                write!(f, "expected a braced Unicode property name")
            }
            GroupUnclosed => write!(f, "unclosed group"),
            GroupUnopened => write!(f, "unopened group"),
            GroupFlagUnrecognized(c) => {
                write!(f, "unrecognized group flag '{}'", c)
            }
            GroupFlagsUnclosed => write!(f, "expected ':' after group flags"),
            GroupFlagsMisplaced => {
                write!(f, "option group must be at the start of a group")
            }
            ClassUnclosed => write!(f, "unclosed character class"),
            ClassEmpty => write!(f, "empty character class"),
            ClassRangeInvalid => {
                write!(f, "invalid character class range, start > end")
            }
            ClassRangeLiteral => {
                write!(f, "invalid range boundary, must be a literal")
            }
            ClassPosixUnknown => write!(f, "unknown POSIX class name"),
            ClassSetOperationInvalid => {
                write!(f, "invalid character class operation")
            }
            RepetitionMissing => {
                write!(f, "repetition operator missing expression")
            }
            RepetitionCountUnclosed => {
                write!(f, "unclosed or malformed counted repetition")
            }
            RepetitionCountInvalid => write!(
                f,
                "invalid repetition count range, \
                 the start must be <= the end",
            ),
            RepetitionCountOverflow => {
                write!(f, "repetition count is too large")
            }
            BackrefUndefined(n) => {
                write!(f, "backreference to undefined group {}", n)
            }
            ConditionInvalid => write!(f, "invalid conditional"),
            XmlSchemaUnsupported => write!(
                f,
                "construct is not allowed in XML Schema regular expressions",
            ),
            NestLimitExceeded(limit) => write!(
                f,
                "exceed the maximum number of nested groups ({})",
                limit,
            ),
        }
    }
}
