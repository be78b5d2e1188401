use quickcheck::quickcheck;

use xml_regex::{
    syntax::Parser, target::CursorTarget, Input, Options, Regex, Span,
};

/// Random strings rarely contain anything a pattern looks for, so the
/// properties below first map their input onto a small alphabet.
const ALPHABET: &[char] = &['a', 'b', 'c', 'A', 'é', '\n'];

/// Patterns exercising every kind of token. Each one parses without
/// options.
const PATTERNS: &[&str] = &[
    "abc",
    "a+b",
    "(a|ab)(c|bcd)?",
    ".*b",
    r"\ba\w*",
    "(?i:ab)c",
    "a(?=b)",
    "(?<=a)b",
    "(?<!a)b",
    r"(a)\1",
    "[^a]+",
    "^b",
    "a$",
    "(?m:^b)",
    "(?>a+)b",
    "(?:é|a){2}",
    "b*?c",
    "(a)?(?(1)b|c)",
    "[a-c-[b]]+",
    r"\p{Ll}{2,3}",
];

fn small(s: &str) -> String {
    s.chars().map(|c| ALPHABET[c as usize % ALPHABET.len()]).collect()
}

/// Return the spans of every group after searching the given text.
fn spans(re: &Regex, text: &str) -> Vec<Option<Span>> {
    let mut caps = re.create_captures();
    re.captures(text, &mut caps);
    caps.iter().collect()
}

/// Like `spans`, but searches the text as a slice of characters.
fn char_spans(re: &Regex, chars: &[char]) -> Vec<Option<Span>> {
    let mut caps = re.create_captures();
    re.captures(chars, &mut caps);
    caps.iter().collect()
}

/// Convert a span of byte offsets in `text` into character offsets.
fn to_chars(text: &str, span: Span) -> Span {
    let start = text[..span.start].chars().count();
    let end = start + text[span.range()].chars().count();
    Span { start, end }
}

quickcheck! {
    fn prop_literal_search_agrees_with_program(
        literal: String,
        text: String
    ) -> bool {
        let (literal, text) = (small(&literal), small(&text));
        if literal.is_empty() {
            return true;
        }
        for &(fast, slow) in &[("", "F"), ("i", "iF")] {
            let fast = Regex::with_options(&literal, fast).unwrap();
            let slow = Regex::with_options(&literal, slow).unwrap();
            if spans(&fast, &text) != spans(&slow, &text) {
                return false;
            }
        }
        true
    }

    fn prop_optimizations_do_not_change_matches(text: String) -> bool {
        let text = small(&text);
        PATTERNS.iter().all(|p| {
            let fast = Regex::new(p).unwrap();
            let slow = Regex::with_options(p, "FH").unwrap();
            spans(&fast, &text) == spans(&slow, &text)
        })
    }

    fn prop_targets_agree(text: String) -> bool {
        let text = small(&text);
        let chars: Vec<char> = text.chars().collect();
        PATTERNS.iter().all(|p| {
            let re = Regex::new(p).unwrap();
            let from_str: Vec<Option<Span>> = spans(&re, &text)
                .into_iter()
                .map(|s| s.map(|s| to_chars(&text, s)))
                .collect();
            from_str == char_spans(&re, &chars)
        })
    }

    fn prop_compile_is_deterministic(text: String) -> bool {
        let text = small(&text);
        PATTERNS.iter().all(|p| {
            let token = Parser::new().parse(p).unwrap();
            let re1 = Regex::from_token(token.clone(), Options::empty());
            let re2 = Regex::from_token(token, Options::empty());
            format!("{:?}", re1.program()) == format!("{:?}", re2.program())
                && spans(&re1, &text) == spans(&re2, &text)
        })
    }

    fn prop_rendered_pattern_is_equivalent(text: String) -> bool {
        let text = small(&text);
        PATTERNS.iter().all(|p| {
            let re = Regex::new(p).unwrap();
            let rendered = Regex::new(&re.to_string()).unwrap();
            spans(&re, &text) == spans(&rendered, &text)
        })
    }

    fn prop_empty_loops_terminate(text: String) -> bool {
        let text = small(&text);
        ["(a?)*", "(a*)*", "(?:a|)*", "(a?)+?b?", "(?:(?=a)|b)*"]
            .iter()
            .all(|p| {
                let re = Regex::new(p).unwrap();
                let mut caps = re.create_captures();
                re.captures(&*text, &mut caps) && caps.start(0) == Some(0)
            })
    }

    fn prop_whole_span_mode_is_anchored(text: String) -> bool {
        let text = small(&text);
        let re = Regex::with_options("[abcAé\n]*a", "X").unwrap();
        re.matches(&*text) == text.ends_with('a')
    }
}

#[test]
fn cursor_target() {
    use std::collections::VecDeque;

    let re = Regex::new(r"(\w+)@(\w+)").unwrap();
    let deque: VecDeque<char> = "mail é@x me@example".chars().collect();
    let target = CursorTarget::new(deque);
    let mut caps = re.create_captures();
    assert!(re.captures(&target, &mut caps));
    assert_eq!(Some(9..19), caps.get_group(0).map(|s| s.range()));
    assert_eq!(Some(12..19), caps.get_group(2).map(|s| s.range()));

    // Searching a range leaves the offsets absolute.
    assert!(re.captures_range(&target, 0..15, &mut caps));
    assert_eq!(Some(9..15), caps.get_group(0).map(|s| s.range()));
}

#[test]
fn search_with_reuses_cache() {
    let re = Regex::new(r"(\d+)(?:\.(\d+))?").unwrap();
    let mut cache = re.create_cache();
    let mut caps = re.create_captures();
    for (text, want) in &[("v1.25", Some(1..5)), ("v2", Some(1..2)), ("v", None)]
    {
        let input = Input::new(*text);
        let matched = re.search_with(&mut cache, &input, Some(&mut caps));
        assert_eq!(Ok(want.is_some()), matched);
        assert_eq!(*want, caps.get_group(0).map(|s| s.range()));
    }
    assert_eq!(None, caps.get_group(2));
}

#[test]
fn xml_schema_examples() {
    let facets: &[(&str, &[&str], &[&str])] = &[
        (r"\d{5}(-\d{4})?", &["12345", "12345-6789"], &["1234", "12345-"]),
        (r"[A-Z]{2}", &["AB"], &["ab", "ABC", ""]),
        (r"\i\c*", &["_a-b.c", "x"], &["1a", "-"]),
        (r"[\p{L}-[\p{Lu}]]+", &["abc", "ßé"], &["aBc"]),
        (r".+", &["a b"], &["a\nb", ""]),
        (r"\s+", &[" \t\n"], &["\u{A0}"]),
        (r"$a^", &["$a^"], &["a"]),
    ];
    for &(pattern, good, bad) in facets {
        let re = Regex::with_options(pattern, "X").unwrap();
        for text in good {
            assert!(re.matches(*text), "{:?} should match {:?}", pattern, text);
        }
        for text in bad {
            assert!(!re.matches(*text), "{:?} matched {:?}", pattern, text);
        }
    }
}
