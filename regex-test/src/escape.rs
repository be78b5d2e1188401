/// Return a printable form of the given text, with control characters and
/// backslashes escaped. Non-ASCII characters are left as they are.
pub fn escape(s: &str) -> String {
    let mut escaped = String::new();
    for ch in s.chars() {
        escape_char(ch, &mut escaped);
    }
    escaped
}

/// Interpret the escapes `\\`, `\n`, `\r`, `\t`, `\xNN` and `\u{N...}` in
/// the given text. Anything that is not a valid escape is left as is.
pub fn unescape(s: &str) -> String {
    #[derive(Clone, Debug, Eq, PartialEq)]
    enum State {
        /// The state after seeing a `\`.
        Escape,
        /// The state after seeing a `\x`.
        HexFirst,
        /// The state after seeing a `\x[0-9A-Fa-f]`.
        HexSecond(char),
        /// The state after seeing a `\u`.
        BraceOpen,
        /// The state inside the braces of `\u{`, with the digits so far.
        BraceDigits(String),
        /// Default state.
        Literal,
    }

    let mut out = String::new();
    let mut state = State::Literal;
    for c in s.chars() {
        state = match state {
            State::Escape => match c {
                '\\' => {
                    out.push('\\');
                    State::Literal
                }
                'n' => {
                    out.push('\n');
                    State::Literal
                }
                'r' => {
                    out.push('\r');
                    State::Literal
                }
                't' => {
                    out.push('\t');
                    State::Literal
                }
                'x' => State::HexFirst,
                'u' => State::BraceOpen,
                c => {
                    out.push('\\');
                    out.push(c);
                    State::Literal
                }
            },
            State::HexFirst => match c {
                '0'..='9' | 'A'..='F' | 'a'..='f' => State::HexSecond(c),
                c => {
                    out.push_str("\\x");
                    out.push(c);
                    State::Literal
                }
            },
            State::HexSecond(first) => match c {
                '0'..='9' | 'A'..='F' | 'a'..='f' => {
                    let ordinal = format!("{}{}", first, c);
                    let byte = u8::from_str_radix(&ordinal, 16).unwrap();
                    out.push(char::from(byte));
                    State::Literal
                }
                c => {
                    out.push_str("\\x");
                    out.push(first);
                    out.push(c);
                    State::Literal
                }
            },
            State::BraceOpen => match c {
                '{' => State::BraceDigits(String::new()),
                c => {
                    out.push_str("\\u");
                    out.push(c);
                    State::Literal
                }
            },
            State::BraceDigits(mut digits) => match c {
                '0'..='9' | 'A'..='F' | 'a'..='f' if digits.len() < 6 => {
                    digits.push(c);
                    State::BraceDigits(digits)
                }
                '}' => {
                    let cp = u32::from_str_radix(&digits, 16)
                        .ok()
                        .and_then(char::from_u32);
                    match cp {
                        Some(ch) => out.push(ch),
                        None => {
                            out.push_str("\\u{");
                            out.push_str(&digits);
                            out.push('}');
                        }
                    }
                    State::Literal
                }
                c => {
                    out.push_str("\\u{");
                    out.push_str(&digits);
                    out.push(c);
                    State::Literal
                }
            },
            State::Literal => match c {
                '\\' => State::Escape,
                c => {
                    out.push(c);
                    State::Literal
                }
            },
        };
    }
    match state {
        State::Escape => out.push('\\'),
        State::HexFirst => out.push_str("\\x"),
        State::HexSecond(c) => {
            out.push_str("\\x");
            out.push(c);
        }
        State::BraceOpen => out.push_str("\\u"),
        State::BraceDigits(digits) => {
            out.push_str("\\u{");
            out.push_str(&digits);
        }
        State::Literal => {}
    }
    out
}

/// Adds the given codepoint to the given string, escaping it if necessary.
fn escape_char(cp: char, into: &mut String) {
    match cp {
        '\n' => into.push_str(r"\n"),
        '\r' => into.push_str(r"\r"),
        '\t' => into.push_str(r"\t"),
        '\\' => into.push_str(r"\\"),
        cp if cp.is_control() => {
            into.push_str(&format!(r"\u{{{:X}}}", u32::from(cp)))
        }
        cp => into.push(cp),
    }
}
