/*!
Infrastructure for running regex tests described in TOML files.

Each file holds an array of tests under the `tests` key. A test names a
pattern, the option letters to build it with, an input and what a search of
that input should report:

```toml
[[tests]]
name = "lazy"
regex = 'a+?'
input = "baaa"
span = [1, 2]

[[tests]]
name = "group"
regex = '(a)|b'
input = "b"
captures = [[0, 1], []]

[[tests]]
name = "xml"
regex = '\d+'
options = "X"
input = "12a"
match = false
```

All offsets are character offsets into the input, so that every kind of
target a regex engine supports can be checked against the same expectations.
Converting them to whatever offsets the engine reports is the job of the
code under test.
*/

use std::borrow::Borrow;
use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

mod escape;

const ENV_REGEX_TEST: &str = "REGEX_TEST";

/// A collection of regex tests.
#[derive(Clone, Debug, Deserialize)]
pub struct RegexTests {
    tests: Vec<RegexTest>,
    #[serde(skip)]
    seen: HashSet<String>,
}

/// A regex test describes the inputs and expected outputs of a regex search.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegexTest {
    #[serde(default)]
    name: String,
    #[serde(skip)]
    full_name: String,
    regex: String,
    input: String,
    #[serde(default)]
    options: String,
    range: Option<[usize; 2]>,
    #[serde(rename = "match")]
    is_match: Option<bool>,
    span: Option<Match>,
    captures: Option<Captures>,
    #[serde(default = "default_true")]
    compiles: bool,
    #[serde(default)]
    unescape: bool,
}

/// Match represents a single match span, from start to end, represented via
/// character offsets.
#[derive(Clone, Copy, Deserialize, Eq, PartialEq)]
#[serde(from = "[usize; 2]")]
pub struct Match {
    /// The starting offset of the match.
    pub start: usize,
    /// The ending offset of the match.
    pub end: usize,
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

impl From<[usize; 2]> for Match {
    fn from([start, end]: [usize; 2]) -> Match {
        Match { start, end }
    }
}

/// Captures represents the spans of every group in a match, where group 0
/// is the overall match. A group that did not participate is `None`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(from = "CapturesFormat")]
pub struct Captures(Vec<Option<Match>>);

impl RegexTests {
    /// Create a new empty collection of regex tests.
    pub fn new() -> RegexTests {
        RegexTests { tests: vec![], seen: HashSet::new() }
    }

    /// Load all of the TOML encoded tests in `data` into this collection.
    /// The full name of each test is the given group name joined to the
    /// test's name with a `/`. Unnamed tests are numbered.
    pub fn load_slice(&mut self, group_name: &str, data: &[u8]) -> Result<()> {
        let mut index = 1;
        let mut tests: RegexTests =
            toml::from_slice(&data).context("error decoding TOML")?;
        for t in &mut tests.tests {
            if t.name.is_empty() {
                t.name = format!("{}", index);
                index += 1;
            }
            t.full_name = format!("{}/{}", group_name, t.name);
            if t.unescape {
                t.input = crate::escape::unescape(&t.input);
            }

            t.validate().with_context(|| {
                format!("error loading test '{}'", t.full_name())
            })?;
            if self.seen.contains(t.full_name()) {
                bail!("found duplicate tests for name '{}'", t.full_name());
            }
            self.seen.insert(t.full_name().to_string());
        }
        self.tests.extend(tests.tests);
        Ok(())
    }

    /// Return an iterator over all regex tests that have been loaded. The
    /// order of the iterator corresponds to the order in which the tests were
    /// loaded.
    pub fn iter(&self) -> RegexTestsIter {
        RegexTestsIter { it: self.tests.iter() }
    }
}

impl Captures {
    /// Create a new set of captures from the spans of each group, starting
    /// with group 0.
    pub fn new<I: IntoIterator<Item = Option<Match>>>(it: I) -> Captures {
        Captures(it.into_iter().collect())
    }

    /// Return the span of the overall match.
    pub fn get_match(&self) -> Option<Match> {
        self.0.get(0).copied().flatten()
    }
}

impl RegexTest {
    fn validate(&self) -> Result<()> {
        if self.is_match == Some(false)
            && (self.span.is_some() || self.captures.is_some())
        {
            bail!("a test that does not match cannot have spans");
        }
        if self.compiles && self.is_match.is_none() && !self.has_spans() {
            bail!("one of 'match', 'span' or 'captures' must be set");
        }
        if let Some(ref caps) = self.captures {
            if caps.get_match().is_none() {
                bail!("the first group of 'captures' must be set");
            }
            if let Some(span) = self.span {
                if caps.get_match() != Some(span) {
                    bail!("'span' and the first group of 'captures' differ");
                }
            }
        }
        let len = self.input.chars().count();
        if let Some([start, end]) = self.range {
            if start > end || end > len {
                bail!("range {}..{} is invalid for the input", start, end);
            }
        }
        let spans = self.span.iter().copied().chain(
            self.captures.iter().flat_map(|caps| caps.0.iter().flatten().copied()),
        );
        for m in spans {
            if m.start > m.end || m.end > len {
                bail!("span {:?} is invalid for the input", m);
            }
        }
        Ok(())
    }

    fn has_spans(&self) -> bool {
        self.span.is_some() || self.captures.is_some()
    }

    /// The full name of this test, which is formed by joining the group
    /// name and the test name with a `/`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Return the pattern of this test.
    pub fn regex(&self) -> &str {
        &self.regex
    }

    /// Return the text that this test searches.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Return the option letters the pattern is built with.
    pub fn options(&self) -> &str {
        &self.options
    }

    /// Return the range of the input to search, in characters. When this
    /// is `None`, the whole input is searched.
    pub fn range(&self) -> Option<std::ops::Range<usize>> {
        self.range.map(|[start, end]| start..end)
    }

    /// Returns true if the search is expected to find a match.
    pub fn is_match(&self) -> bool {
        self.is_match.unwrap_or_else(|| self.has_spans())
    }

    /// Return the expected span of the match, if one is given. When no match
    /// is expected, this returns `Some(None)`.
    pub fn span(&self) -> Option<Option<Match>> {
        if !self.is_match() {
            return Some(None);
        }
        match (self.span, &self.captures) {
            (Some(span), _) => Some(Some(span)),
            (None, Some(caps)) => Some(caps.get_match()),
            (None, None) => None,
        }
    }

    /// Return the expected captures, if they are given. When no match is
    /// expected, this returns `Some(None)`.
    pub fn captures(&self) -> Option<Option<Captures>> {
        if !self.is_match() {
            return Some(None);
        }
        self.captures.clone().map(Some)
    }

    /// Returns true if the pattern is expected to build successfully.
    pub fn compiles(&self) -> bool {
        self.compiles
    }
}

/// A regex compiled by the implementation under test, as a closure that
/// runs a test and reports what it found.
pub struct CompiledRegex {
    matcher: Box<dyn Fn(&RegexTest) -> Vec<TestResult>>,
}

impl CompiledRegex {
    /// Provide a closure that executes a search of the given test's input
    /// and returns one or more results.
    pub fn compiled<F: Fn(&RegexTest) -> Vec<TestResult> + 'static>(
        matcher: F,
    ) -> CompiledRegex {
        CompiledRegex { matcher: Box::new(matcher) }
    }
}

impl std::fmt::Debug for CompiledRegex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("CompiledRegex").finish()
    }
}

/// The result of executing a single search.
#[derive(Clone, Debug)]
pub struct TestResult {
    name: String,
    kind: TestResultKind,
}

#[derive(Clone, Debug)]
enum TestResultKind {
    /// Only whether a match was found.
    Matched(bool),
    /// The span of the match found.
    Span(Option<Match>),
    /// The captures of the match found.
    Captures(Option<Captures>),
}

impl TestResult {
    /// Create a test result that indicates a match was found.
    pub fn matched() -> TestResult {
        TestResult { name: String::new(), kind: TestResultKind::Matched(true) }
    }

    /// Create a test result that indicates no match was found.
    pub fn no_match() -> TestResult {
        TestResult {
            name: String::new(),
            kind: TestResultKind::Matched(false),
        }
    }

    /// Create a test result that reports the span of the match found, if
    /// any.
    pub fn span(span: Option<Match>) -> TestResult {
        TestResult { name: String::new(), kind: TestResultKind::Span(span) }
    }

    /// Create a test result that reports the captures of the match found,
    /// if any.
    pub fn captures(caps: Option<Captures>) -> TestResult {
        TestResult {
            name: String::new(),
            kind: TestResultKind::Captures(caps),
        }
    }

    /// Set the name of this test result.
    ///
    /// When a single regex test produces several results, for example one
    /// for each kind of target searched, names make failures easier to
    /// trace.
    pub fn name(mut self, name: &str) -> TestResult {
        self.name = name.to_string();
        self
    }
}

/// A runner for executing regex tests.
///
/// Call `test_iter` on an iterator of `RegexTest`s, and then `assert` once
/// done. If any tests failed, then `assert` panics with an error message
/// containing every failure.
///
/// If the `REGEX_TEST` environment variable is set, it holds a comma
/// separated list of substrings. A test whose full name contains none of
/// them is skipped, except that substrings starting with a `-` exclude the
/// tests whose full names contain the rest. The last substring that a test
/// name contains decides.
#[derive(Debug)]
pub struct TestRunner {
    include: Vec<IncludePattern>,
    results: RegexTestResults,
}

#[derive(Debug)]
struct IncludePattern {
    exclude: bool,
    substring: String,
}

impl TestRunner {
    /// Create a new runner for executing tests, with the filters given in
    /// the `REGEX_TEST` environment variable.
    pub fn new() -> Result<TestRunner> {
        let mut runner =
            TestRunner { include: vec![], results: RegexTestResults::new() };
        for substring in read_env(ENV_REGEX_TEST)?.split(',') {
            let substring = substring.trim();
            if substring.is_empty() {
                continue;
            }
            let (exclude, substring) = match substring.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, substring),
            };
            runner
                .include
                .push(IncludePattern { exclude, substring: substring.to_string() });
        }
        Ok(runner)
    }

    /// Assert that all tests run have passed.
    ///
    /// If any tests have failed, then a panic occurs with a report of all
    /// failures.
    pub fn assert(&mut self) {
        self.results.assert();
    }

    /// Run all of the given tests.
    pub fn test_iter<I, T>(
        &mut self,
        it: I,
        mut compile: impl FnMut(
            &RegexTest,
        ) -> Result<
            CompiledRegex,
            Box<dyn std::error::Error>,
        >,
    ) -> &mut TestRunner
    where
        I: IntoIterator<Item = T>,
        T: Borrow<RegexTest>,
    {
        for test in it {
            let test = test.borrow();
            if self.should_skip(test) {
                self.results.skip += 1;
                continue;
            }
            self.test(test, &mut compile);
        }
        self
    }

    /// Run a single test, recording its results. Failures are reported when
    /// `assert` is called.
    fn test(
        &mut self,
        test: &RegexTest,
        compile: impl FnOnce(
            &RegexTest,
        ) -> Result<
            CompiledRegex,
            Box<dyn std::error::Error>,
        >,
    ) {
        let compiled = match safe(|| compile(test)) {
            Err(msg) => {
                let kind = RegexTestFailureKind::Panic { during: "compiling", msg };
                self.results.fail(test, "", kind);
                return;
            }
            Ok(Ok(compiled)) => compiled,
            Ok(Err(err)) => {
                if !test.compiles() {
                    self.results.pass += 1;
                } else {
                    let kind =
                        RegexTestFailureKind::CompileError { err: err.to_string() };
                    self.results.fail(test, "", kind);
                }
                return;
            }
        };
        if !test.compiles() {
            self.results.fail(test, "", RegexTestFailureKind::NoCompileError);
            return;
        }
        let results = match safe(|| (compiled.matcher)(test)) {
            Ok(results) => results,
            Err(msg) => {
                let kind = RegexTestFailureKind::Panic { during: "searching", msg };
                self.results.fail(test, "", kind);
                return;
            }
        };
        for result in results {
            let failure = match result.kind {
                TestResultKind::Matched(matched) => {
                    if matched != test.is_match() {
                        Some(RegexTestFailureKind::IsMatch)
                    } else {
                        None
                    }
                }
                TestResultKind::Span(got) => match test.span() {
                    Some(expected) if expected != got => {
                        Some(RegexTestFailureKind::Span { got })
                    }
                    None if got.is_some() != test.is_match() => {
                        Some(RegexTestFailureKind::IsMatch)
                    }
                    _ => None,
                },
                TestResultKind::Captures(ref got) => {
                    let got_span = got.as_ref().and_then(|c| c.get_match());
                    match (test.captures(), test.span()) {
                        (Some(ref expected), _) if expected != got => {
                            Some(RegexTestFailureKind::Captures {
                                got: got.clone(),
                            })
                        }
                        (None, Some(expected)) if expected != got_span => {
                            Some(RegexTestFailureKind::Span { got: got_span })
                        }
                        (None, None) if got.is_some() != test.is_match() => {
                            Some(RegexTestFailureKind::IsMatch)
                        }
                        _ => None,
                    }
                }
            };
            match failure {
                None => self.results.pass += 1,
                Some(kind) => self.results.fail(test, &result.name, kind),
            }
        }
    }

    /// Return true if and only if the given test should be skipped.
    fn should_skip(&self, test: &RegexTest) -> bool {
        // With only exclusions, a test runs unless it is excluded. Otherwise
        // it must contain at least one of the included substrings.
        let mut skip = self.include.iter().any(|pat| !pat.exclude);
        for pat in &self.include {
            if test.full_name().contains(&pat.substring) {
                skip = pat.exclude;
            }
        }
        skip
    }
}

/// Counts of passed and skipped results, along with every failure.
#[derive(Debug)]
struct RegexTestResults {
    pass: usize,
    skip: usize,
    fail: Vec<RegexTestFailure>,
}

/// A test that failed along with the reason why.
#[derive(Debug)]
struct RegexTestFailure {
    test: RegexTest,
    result_name: String,
    kind: RegexTestFailureKind,
}

/// Describes the nature of the failed test.
#[derive(Debug)]
enum RegexTestFailureKind {
    /// This occurs when the test expected a match (or didn't expect a match),
    /// but the actual regex implementation didn't match (or did match).
    IsMatch,
    /// The span of the match found differs from the one expected.
    Span { got: Option<Match> },
    /// Like Span, but for capturing groups.
    Captures { got: Option<Captures> },
    /// This occurs when the test expected the regex to fail to compile, but it
    /// compiled successfully.
    NoCompileError,
    /// This occurs when the test expected the regex to compile successfully,
    /// but it failed to compile.
    CompileError { err: String },
    /// A panic occurred while compiling or searching. If possible, the panic
    /// message is captured.
    Panic { during: &'static str, msg: String },
}

impl RegexTestResults {
    fn new() -> RegexTestResults {
        RegexTestResults { pass: 0, skip: 0, fail: vec![] }
    }

    fn fail(
        &mut self,
        test: &RegexTest,
        result_name: &str,
        kind: RegexTestFailureKind,
    ) {
        self.fail.push(RegexTestFailure {
            test: test.clone(),
            result_name: result_name.to_string(),
            kind,
        });
    }

    fn assert(&self) {
        if self.fail.is_empty() {
            return;
        }
        let failures = self
            .fail
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<String>>()
            .join("\n\n");
        panic!(
            "found {} failures ({} passed, {} skipped):\n{}\n{}\n{}\n\n\
             Set the REGEX_TEST environment variable to filter tests, \n\
             e.g., REGEX_TEST=foo,-foo2 runs every test whose name contains \n\
             foo but not foo2\n\n",
            self.fail.len(),
            self.pass,
            self.skip,
            "~".repeat(79),
            failures.trim(),
            "~".repeat(79),
        )
    }
}

impl std::fmt::Display for RegexTestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.result_name.is_empty() {
            write!(f, "{}: ", self.test.full_name())?;
        } else {
            write!(f, "{} ({}): ", self.test.full_name(), self.result_name)?;
        }
        write!(
            f,
            "{}\n\
             pattern:     {:?}\n\
             options:     {:?}\n\
             input:       \"{}\"",
            self.kind.fmt(&self.test)?,
            self.test.regex(),
            self.test.options(),
            escape::escape(self.test.input()),
        )?;
        if let Some(range) = self.test.range() {
            write!(f, "\nrange:       {:?}", range)?;
        }
        Ok(())
    }
}

impl RegexTestFailureKind {
    fn fmt(&self, test: &RegexTest) -> Result<String, std::fmt::Error> {
        use std::fmt::Write;

        let mut buf = String::new();
        match *self {
            RegexTestFailureKind::IsMatch => {
                if test.is_match() {
                    write!(buf, "expected match, but none found")?;
                } else {
                    write!(buf, "expected no match, but found a match")?;
                }
            }
            RegexTestFailureKind::Span { ref got } => {
                write!(
                    buf,
                    "did not find expected match\n\
                     expected: {:?}\n     \
                     got: {:?}",
                    test.span().flatten(),
                    got,
                )?;
            }
            RegexTestFailureKind::Captures { ref got } => {
                write!(
                    buf,
                    "did not find expected captures\n\
                     expected: {:?}\n     \
                     got: {:?}",
                    test.captures().flatten(),
                    got,
                )?;
            }
            RegexTestFailureKind::NoCompileError => {
                write!(buf, "expected regex to NOT compile, but it did")?;
            }
            RegexTestFailureKind::CompileError { ref err } => {
                write!(buf, "expected regex to compile, failed: {}", err)?;
            }
            RegexTestFailureKind::Panic { during, ref msg } => {
                write!(buf, "got unexpected panic while {}:\n{}", during, msg)?;
            }
        }
        Ok(buf)
    }
}

/// An iterator over regex tests.
#[derive(Debug)]
pub struct RegexTestsIter<'a> {
    it: std::slice::Iter<'a, RegexTest>,
}

impl<'a> Iterator for RegexTestsIter<'a> {
    type Item = &'a RegexTest;

    fn next(&mut self) -> Option<&'a RegexTest> {
        self.it.next()
    }
}

/// The 'captures' key as written in TOML. TOML has no 'null' value, so an
/// empty array stands for a group that did not participate.
#[derive(Deserialize)]
struct CapturesFormat(Vec<MaybeMatch>);

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
enum MaybeMatch {
    None([usize; 0]),
    Some([usize; 2]),
}

impl From<CapturesFormat> for Captures {
    fn from(data: CapturesFormat) -> Captures {
        Captures(
            data.0
                .into_iter()
                .map(|m| match m {
                    MaybeMatch::None(_) => None,
                    MaybeMatch::Some(offsets) => Some(Match::from(offsets)),
                })
                .collect(),
        )
    }
}

/// Read the environment variable given. If it doesn't exist, then return an
/// empty string.
fn read_env(var: &str) -> Result<String> {
    match std::env::var_os(var) {
        None => Ok(String::new()),
        Some(val) => val.into_string().map_err(|os| {
            anyhow::anyhow!("invalid UTF-8 in env var {}={:?}", var, os)
        }),
    }
}

fn safe<T, F>(fun: F) -> Result<T, String>
where
    F: FnOnce() -> T,
{
    use std::panic;

    panic::catch_unwind(panic::AssertUnwindSafe(fun)).map_err(|any_err| {
        // panic and assert produce &str or String
        if let Some(&s) = any_err.downcast_ref::<&str>() {
            s.to_owned()
        } else if let Some(s) = any_err.downcast_ref::<String>() {
            s.to_owned()
        } else {
            "UNABLE TO SHOW RESULT OF PANIC.".to_owned()
        }
    })
}

/// A function to set some boolean fields to a default of 'true'. We use a
/// function so that we can hand a path to it to Serde.
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(data: &str) -> Result<RegexTests> {
        let mut tests = RegexTests::new();
        tests.load_slice("test", data.as_bytes())?;
        Ok(tests)
    }

    #[test]
    fn expectations() {
        let tests = load(
            r#"
[[tests]]
regex = 'a'
input = "ba"
span = [1, 2]

[[tests]]
regex = '(a)|b'
input = "b"
captures = [[0, 1], []]

[[tests]]
name = "none"
regex = 'a'
input = "b"
match = false
"#,
        )
        .unwrap();
        let tests: Vec<&RegexTest> = tests.iter().collect();
        assert_eq!("test/1", tests[0].full_name());
        assert_eq!(Some(Some(Match { start: 1, end: 2 })), tests[0].span());
        assert_eq!(None, tests[0].captures());

        assert_eq!("test/2", tests[1].full_name());
        assert!(tests[1].is_match());
        assert_eq!(Some(Some(Match { start: 0, end: 1 })), tests[1].span());
        let want = Captures::new(vec![Some(Match { start: 0, end: 1 }), None]);
        assert_eq!(Some(Some(want)), tests[1].captures());

        assert_eq!("test/none", tests[2].full_name());
        assert_eq!(Some(None), tests[2].span());
        assert_eq!(Some(None), tests[2].captures());
    }

    #[test]
    fn invalid_tests() {
        assert!(load("[[tests]]\nregex = 'a'\ninput = 'a'\n").is_err());
        assert!(load(
            "[[tests]]\nregex = 'a'\ninput = 'a'\nmatch = false\nspan = [0, 1]\n"
        )
        .is_err());
        assert!(
            load("[[tests]]\nregex = 'a'\ninput = 'a'\nspan = [0, 2]\n").is_err()
        );
        assert!(load(
            "[[tests]]\nregex = 'a'\ninput = 'ab'\nrange = [1, 0]\nmatch = true\n"
        )
        .is_err());
        assert!(load(
            "[[tests]]\nname = 'x'\nregex = 'a'\ninput = 'a'\nmatch = true\n\
             [[tests]]\nname = 'x'\nregex = 'a'\ninput = 'a'\nmatch = true\n"
        )
        .is_err());
    }

    #[test]
    fn unescaped_input() {
        let tests = load(
            r#"
[[tests]]
regex = 'a'
input = 'a\nb'
unescape = true
match = true
"#,
        )
        .unwrap();
        let test = tests.iter().next().unwrap();
        assert_eq!("a\nb", test.input());
    }

    #[test]
    fn runner_filters() {
        let tests = load(
            r#"
[[tests]]
name = "keep"
regex = 'a'
input = "a"
match = true

[[tests]]
name = "drop"
regex = 'a'
input = "a"
match = true
"#,
        )
        .unwrap();
        let mut runner = TestRunner::new().unwrap();
        runner.include = vec![IncludePattern {
            exclude: true,
            substring: "drop".to_string(),
        }];
        runner.test_iter(tests.iter(), |_| {
            Ok(CompiledRegex::compiled(|_| vec![TestResult::matched()]))
        });
        assert_eq!(1, runner.results.pass);
        assert_eq!(1, runner.results.skip);
        runner.assert();
    }

    #[test]
    fn runner_reports_failures() {
        let tests = load(
            r#"
[[tests]]
name = "compiles"
regex = 'a'
input = "a"
compiles = false

[[tests]]
name = "span"
regex = 'a'
input = "ba"
span = [1, 2]
"#,
        )
        .unwrap();
        let mut runner = TestRunner::new().unwrap();
        runner.include.clear();
        runner.test_iter(tests.iter(), |_| {
            Ok(CompiledRegex::compiled(|_| {
                vec![TestResult::span(Some(Match { start: 0, end: 1 }))
                    .name("str")]
            }))
        });
        assert_eq!(0, runner.results.pass);
        assert_eq!(2, runner.results.fail.len());
        let report = runner.results.fail[1].to_string();
        assert!(report.starts_with("test/span (str): "), "{}", report);
    }
}
