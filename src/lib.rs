/*!
A backtracking regex engine for the `pattern` facet of XML Schema.

This crate compiles patterns written in the regular expression dialect of
XML Schema, extended with the Perl constructs most engines support
(lookaround, independent groups, backreferences, conditionals, inline
modifiers and lazy quantifiers), into a small program that is executed by a
backtracking virtual machine.

# Overview

The main type is [`Regex`]. A regex is built from pattern text with
[`Regex::new`] or [`Regex::with_options`], or from a hand built
[`syntax::Token`] tree with [`Regex::from_token`]. Options are identified by
single letters (see [`Options::parse`]) or set one at a time with a
[`Config`].

Text is searched through the [`target::Target`] trait, so the same regex
searches a `str`, a `[char]` buffer or any bidirectional cursor wrapped in a
[`target::CursorTarget`]. Offsets are always in the units of the target:
bytes for a `str`, characters otherwise.

# Example: searching

```
use xml_regex::Regex;

let re = Regex::new(r"(\d{4})-(\d{2})-(\d{2})")?;
let mut caps = re.create_captures();
assert!(re.captures("due 2021-06-30", &mut caps));
assert_eq!(Some(4..14), caps.get_group(0).map(|s| s.range()));
assert_eq!(Some(4..8), caps.get_group(1).map(|s| s.range()));

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Example: validating a schema facet

In XML Schema mode, enabled with the `X` option, a pattern must match the
whole text and the Perl extensions are rejected.

```
use xml_regex::Regex;

let re = Regex::with_options(r"\p{Lu}{2}\d{3}", "X")?;
assert!(re.matches("AB123"));
assert!(!re.matches("xAB123"));
assert!(Regex::with_options(r"a(?=b)", "X").is_err());

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Example: searching characters

```
use xml_regex::{Input, Regex};

let re = Regex::with_options("straße", "i")?;
let text: Vec<char> = "STRAßE und Weg".chars().collect();
let input = Input::new(&text[..]).range(0..6);
assert!(re.search(&input, None));

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Crate features

* **logging** - When enabled, the `log` crate is used to emit messages about
compilation and the search strategy chosen for each regex. This is disabled
by default.
*/

#[cfg(not(any(
    target_pointer_width = "16",
    target_pointer_width = "32",
    target_pointer_width = "64"
)))]
compile_error!("xml-regex currently not supported on non-{16,32,64}");

extern crate alloc;

pub use crate::{
    error::Error,
    regex::{Builder, Config, Regex},
    util::{
        captures::Captures,
        options::{Options, UnknownOption},
        search::{Input, MatchError, Span},
    },
};

#[macro_use]
mod macros;

pub mod backtrack;
mod error;
mod regex;
pub mod syntax;
pub mod target;
pub mod util;
