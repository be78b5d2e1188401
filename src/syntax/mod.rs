/*!
Pattern syntax: the token tree, character classes and a parser.

A [`Token`] tree is what the compiler in [`backtrack`](crate::backtrack)
consumes. Trees are usually produced by [`Parser`], but they may be built by
hand too. Besides describing a pattern, a token tree answers the questions
the search driver asks before compiling anything: the minimum length of a
match ([`Token::min_len`]), which characters a match can begin with
([`Token::analyze_first_char`]) and which literal string every match must
contain ([`Token::find_fixed_string`]).
*/

pub use self::{
    class::{ClassRange, ClassSet},
    error::{Error, ErrorKind},
    parser::Parser,
    token::{Condition, FirstChar, FirstChars, LookKind, Token},
};

mod class;
mod error;
mod parser;
mod token;
pub(crate) mod unicode;
