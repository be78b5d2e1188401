use std::collections::VecDeque;

use ret::{
    Captures as TestCaptures, CompiledRegex, Match, RegexTest, TestResult,
    TestRunner,
};
use xml_regex::{
    target::{CursorTarget, Target},
    Captures, Input, Regex,
};

use crate::{suite, Result};

/// Tests the default configuration, where the search strategy is chosen
/// from what each pattern allows.
#[test]
fn default() -> Result<()> {
    TestRunner::new()?.test_iter(suite()?.iter(), compiler("")).assert();
    Ok(())
}

/// Tests with the literal and first character filters disabled, so that
/// every candidate offset is tried by the VM.
#[test]
fn no_filters() -> Result<()> {
    TestRunner::new()?.test_iter(suite()?.iter(), compiler("FH")).assert();
    Ok(())
}

fn compiler(
    extra: &'static str,
) -> impl FnMut(&RegexTest) -> Result<CompiledRegex> {
    move |test| {
        let options = format!("{}{}", test.options(), extra);
        let re = Regex::with_options(test.regex(), &options)?;
        Ok(CompiledRegex::compiled(move |test| run_test(&re, test)))
    }
}

fn run_test(re: &Regex, test: &RegexTest) -> Vec<TestResult> {
    let text = test.input();
    let chars: Vec<char> = text.chars().collect();
    let cursor =
        CursorTarget::new(chars.iter().copied().collect::<VecDeque<char>>());

    let mut results = vec![];
    results.extend(run_target(re, test, text, &Units::Bytes(text), "str"));
    results.extend(run_target(re, test, &chars[..], &Units::Chars, "chars"));
    results.extend(run_target(re, test, &cursor, &Units::Chars, "cursor"));
    results
}

fn run_target<T: ?Sized + Target>(
    re: &Regex,
    test: &RegexTest,
    target: &T,
    units: &Units<'_>,
    name: &str,
) -> Vec<TestResult> {
    let range = match test.range() {
        None => target.span().range(),
        Some(r) => units.to_target(r.start)..units.to_target(r.end),
    };

    let is_match = if re.matches_range(target, range.clone()) {
        TestResult::matched()
    } else {
        TestResult::no_match()
    };
    let is_match = is_match.name(&format!("{}/matches", name));

    let mut caps = re.create_captures();
    re.captures_range(target, range.clone(), &mut caps);
    let captures = TestResult::captures(convert_captures(&caps, units))
        .name(&format!("{}/captures", name));

    // Searching with a used cache and stale captures must not leak state
    // from the previous search.
    let mut cache = re.create_cache();
    let input = Input::new(target).range(range);
    let span = match re.search_with(&mut cache, &input, Some(&mut caps)) {
        Err(err) => panic!("search failed: {}", err),
        Ok(_) => convert_captures(&caps, units).and_then(|c| c.get_match()),
    };
    let span =
        TestResult::span(span).name(&format!("{}/search_with", name));

    vec![is_match, captures, span]
}

fn convert_captures(caps: &Captures, units: &Units<'_>) -> Option<TestCaptures> {
    if !caps.is_match() {
        return None;
    }
    Some(TestCaptures::new(caps.iter().map(|group| {
        group.map(|span| Match {
            start: units.from_target(span.start),
            end: units.from_target(span.end),
        })
    })))
}

/// How the offsets of a target relate to the character offsets used in
/// test data.
enum Units<'a> {
    /// Target offsets are character offsets.
    Chars,
    /// Target offsets are byte offsets into this text.
    Bytes(&'a str),
}

impl<'a> Units<'a> {
    fn to_target(&self, at: usize) -> usize {
        match *self {
            Units::Chars => at,
            Units::Bytes(text) => text
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(text.len()))
                .nth(at)
                .expect("character offset in bounds"),
        }
    }

    fn from_target(&self, at: usize) -> usize {
        match *self {
            Units::Chars => at,
            Units::Bytes(text) => text[..at].chars().count(),
        }
    }
}
