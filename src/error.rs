use crate::{syntax, util::options::UnknownOption};

/// An error that can occur while building a [`Regex`](crate::Regex).
///
/// This error does not provide many introspection capabilities. There are
/// generally only two things you can do with it:
///
/// * Obtain a human readable message via its `std::fmt::Display` impl.
/// * Access the underlying [`syntax::Error`] or [`UnknownOption`] from its
/// `source` method via the `std::error::Error` trait.
///
/// Errors that occur while searching are reported separately, as a
/// [`MatchError`](crate::MatchError).
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that occurred while building a regex.
#[derive(Clone, Debug)]
enum ErrorKind {
    /// The pattern could not be parsed.
    Syntax(syntax::Error),
    /// An option string contained a letter that does not name an option.
    Option(UnknownOption),
}

impl Error {
    fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// If this error was caused by a malformed pattern, return the
    /// underlying syntax error.
    pub fn syntax_error(&self) -> Option<&syntax::Error> {
        match *self.kind() {
            ErrorKind::Syntax(ref err) => Some(err),
            ErrorKind::Option(_) => None,
        }
    }

    pub(crate) fn syntax(err: syntax::Error) -> Error {
        Error { kind: ErrorKind::Syntax(err) }
    }

    pub(crate) fn option(err: UnknownOption) -> Error {
        Error { kind: ErrorKind::Option(err) }
    }
}

impl From<syntax::Error> for Error {
    fn from(err: syntax::Error) -> Error {
        Error::syntax(err)
    }
}

impl From<UnknownOption> for Error {
    fn from(err: UnknownOption) -> Error {
        Error::option(err)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.kind() {
            ErrorKind::Syntax(ref err) => Some(err),
            ErrorKind::Option(ref err) => Some(err),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self.kind() {
            ErrorKind::Syntax(_) => write!(f, "error parsing pattern"),
            ErrorKind::Option(ref err) => {
                write!(f, "invalid options: {}", err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use crate::Regex;

    #[test]
    fn sources() {
        let err = Regex::new("a(").unwrap_err();
        assert!(err.syntax_error().is_some());
        assert!(err.source().is_some());
        assert_eq!("error parsing pattern", err.to_string());

        let err = Regex::with_options("a", "iq").unwrap_err();
        assert!(err.syntax_error().is_none());
        assert!(err.to_string().contains('q'), "{}", err);
    }
}
