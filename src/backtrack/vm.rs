use alloc::{vec, vec::Vec};

use crate::{
    backtrack::program::{Op, OpCondition, Program},
    syntax::unicode,
    target::{chars_match, Target},
    util::{
        options::Options,
        primitives::{NonMaxUsize, OpID},
        search::{MatchError, Span},
        sparse_set::SparseSet,
    },
};

type Slot = Option<NonMaxUsize>;

/// The mutable scratch space used by the backtracking VM.
///
/// A cache holds the stack of choice points and the per-closure sets of
/// visited offsets. It is not tied to any particular program: it is resized
/// as needed at the start of every match attempt, so one cache can be reused
/// with any number of programs. Reusing a cache avoids reallocating its
/// stack for every search.
///
/// A [`Regex`](crate::Regex) keeps a cache of its own, so a cache only needs
/// to be created explicitly to use
/// [`Regex::search_with`](crate::Regex::search_with).
#[derive(Clone, Debug, Default)]
pub struct Cache {
    /// Choice points and the undo log of capture slots.
    stack: Vec<Frame>,
    /// Capture undo entries lifted out of a sub-match that just succeeded.
    kept: Vec<Frame>,
    /// For each closure, the offsets (relative to the start of the search)
    /// at which it has been entered during the current attempt.
    visited: Vec<SparseSet>,
}

impl Cache {
    /// Create a new empty cache.
    pub fn new() -> Cache {
        Cache { stack: vec![], kept: vec![], visited: vec![] }
    }

    /// Prepare this cache for a match attempt with the given program.
    fn reset(&mut self, prog: &Program) {
        self.stack.clear();
        self.kept.clear();
        if self.visited.len() < prog.closure_len() {
            self.visited.resize_with(prog.closure_len(), || SparseSet::new(0));
        }
        for set in self.visited.iter_mut() {
            set.clear();
        }
    }

    /// Returns the heap memory, in bytes, used by this cache.
    pub fn memory_usage(&self) -> usize {
        use core::mem::size_of;

        (self.stack.capacity() + self.kept.capacity()) * size_of::<Frame>()
            + self.visited.capacity() * size_of::<SparseSet>()
            + self.visited.iter().map(|s| s.memory_usage()).sum::<usize>()
    }
}

/// An entry on the backtracking stack.
#[derive(Clone, Debug)]
enum Frame {
    /// A closure or question that may still take its other branch.
    Repeat { op: OpID, at: usize },
    /// A union that may still try the alternates after `index`.
    Alternate { op: OpID, index: usize, at: usize },
    /// Restore a capture slot to its previous value.
    Capture { slot: usize, old: Slot },
    /// A sub-match in progress: a lookaround, an independent group, a
    /// modifier group or the condition of a conditional. The saved offset,
    /// direction and options are those in effect before it began.
    Sub { op: OpID, at: usize, reverse: bool, opts: Options },
}

/// The outcome of executing one operation.
#[derive(Clone, Copy, Debug)]
enum Step {
    Continue,
    Fail,
    Match(usize),
}

/// Run `prog` once, starting at offset `at` of `target`, where
/// `start..limit` is the span of the search.
///
/// On success, the offset at which the match ends is returned. When `slots`
/// is given, it is cleared and then filled in with the capture offsets of
/// the match. In XML Schema mode, a match must end at `limit`.
pub(crate) fn run<T: ?Sized + Target>(
    prog: &Program,
    cache: &mut Cache,
    target: &T,
    start: usize,
    limit: usize,
    at: usize,
    opts: Options,
    mut slots: Option<&mut [Slot]>,
) -> Result<Option<usize>, MatchError> {
    cache.reset(prog);
    if let Some(ref mut slots) = slots {
        for slot in slots.iter_mut() {
            *slot = None;
        }
    }
    let Cache { ref mut stack, ref mut kept, ref mut visited } = *cache;
    let mut vm = Vm {
        prog,
        target,
        start,
        limit,
        whole: opts.is_xml_schema(),
        stack,
        kept,
        visited,
        slots,
        op: prog.start(),
        at,
        reverse: false,
        opts,
        depth: 0,
    };
    vm.run()
}

/// The state of a single match attempt.
///
/// Concatenation is a walk along `next` links. Every decision that may have
/// to be revisited pushes a frame, and a failure pops frames until one
/// offers another way forward. Sub-matches (lookaround and friends) run on
/// the same stack: a `Sub` frame marks where each one began, and `depth`
/// counts how many are in progress, so that reaching the end of a
/// sub-program can be told apart from reaching the end of the program.
struct Vm<'a, T: ?Sized> {
    prog: &'a Program,
    target: &'a T,
    start: usize,
    limit: usize,
    whole: bool,
    stack: &'a mut Vec<Frame>,
    kept: &'a mut Vec<Frame>,
    visited: &'a mut [SparseSet],
    slots: Option<&'a mut [Slot]>,
    op: Option<OpID>,
    at: usize,
    reverse: bool,
    opts: Options,
    depth: usize,
}

impl<'a, T: ?Sized + Target> Vm<'a, T> {
    fn run(&mut self) -> Result<Option<usize>, MatchError> {
        loop {
            let step = match self.op {
                None => self.accept(),
                Some(id) => self.step(id)?,
            };
            match step {
                Step::Continue => {}
                Step::Match(end) => return Ok(Some(end)),
                Step::Fail => {
                    if !self.backtrack() {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Execute the operation `id` at the current offset.
    fn step(&mut self, id: OpID) -> Result<Step, MatchError> {
        let prog = self.prog;
        match *prog.op(id) {
            Op::Char { ch, next } => {
                let ci = self.opts.is_case_insensitive();
                match self.next_char() {
                    Some((c, at)) if chars_match(ci, c, ch) => {
                        self.at = at;
                        self.op = next;
                    }
                    _ => return Ok(Step::Fail),
                }
            }
            Op::Range { ref set, ref folded, negated, next } => {
                let (c, at) = match self.next_char() {
                    None => return Ok(Step::Fail),
                    Some(x) => x,
                };
                let set = match *folded {
                    Some(ref folded) if self.opts.is_case_insensitive() => {
                        folded
                    }
                    _ => set,
                };
                let found = set.contains(c);
                if found == negated {
                    return Ok(Step::Fail);
                }
                self.at = at;
                self.op = next;
            }
            Op::Dot { next } => match self.next_char() {
                Some((c, at))
                    if self.opts.is_single_line()
                        || !unicode::is_line_terminator(c) =>
                {
                    self.at = at;
                    self.op = next;
                }
                _ => return Ok(Step::Fail),
            },
            Op::String { ref chars, next } => {
                let ci = self.opts.is_case_insensitive();
                let at = if self.reverse {
                    self.target.region_matches_back(ci, self.at, self.start, chars)
                } else {
                    self.target.region_matches(ci, self.at, self.limit, chars)
                };
                match at {
                    None => return Ok(Step::Fail),
                    Some(at) => {
                        self.at = at;
                        self.op = next;
                    }
                }
            }
            Op::Anchor { anchor, next } => {
                let (start, limit) = (self.start, self.limit);
                if !anchor.matches(self.target, start, limit, self.at, self.opts)
                {
                    return Ok(Step::Fail);
                }
                self.op = next;
            }
            Op::Backref { group, next } => {
                let region = match self.group_span(group)? {
                    None => return Ok(Step::Fail),
                    Some(region) => region,
                };
                let ci = self.opts.is_case_insensitive();
                let at = if self.reverse {
                    self.target.region_matches_self_back(
                        ci, self.at, self.start, region,
                    )
                } else {
                    self.target.region_matches_self(
                        ci, self.at, self.limit, region,
                    )
                };
                match at {
                    None => return Ok(Step::Fail),
                    Some(at) => {
                        self.at = at;
                        self.op = next;
                    }
                }
            }
            Op::Union { ref alternates } => {
                let first = match alternates.first() {
                    None => return Ok(Step::Fail),
                    Some(&first) => first,
                };
                if alternates.len() > 1 {
                    self.stack.push(Frame::Alternate {
                        op: id,
                        index: 0,
                        at: self.at,
                    });
                }
                self.op = first;
            }
            Op::Closure { id: cid, child, greedy, next } => {
                // Entering the same closure twice at one offset means the
                // body matched the empty string. Going around again cannot
                // lead anywhere new.
                if !self.visited[cid].insert(self.at - self.start) {
                    return Ok(Step::Fail);
                }
                self.stack.push(Frame::Repeat { op: id, at: self.at });
                self.op = if greedy { Some(child) } else { next };
            }
            Op::Question { child, greedy, next } => {
                self.stack.push(Frame::Repeat { op: id, at: self.at });
                self.op = if greedy { child } else { next };
            }
            Op::CaptureStart { group, next } => {
                self.set_slot(group * 2);
                self.op = next;
            }
            Op::CaptureEnd { group, next } => {
                self.set_slot(group * 2 + 1);
                self.op = next;
            }
            Op::Look { kind, child, .. } => {
                self.push_sub(id);
                self.reverse = kind.is_behind();
                self.op = child;
            }
            Op::Independent { child, .. } => {
                self.push_sub(id);
                self.op = child;
            }
            Op::Modifier { add, remove, child, .. } => {
                self.push_sub(id);
                self.opts = self.opts.union(add).difference(remove);
                self.op = child;
            }
            Op::Condition { ref condition, yes, no } => match *condition {
                OpCondition::Group(group) => {
                    self.op = match self.group_span(group)? {
                        Some(_) => yes,
                        None => no,
                    };
                }
                OpCondition::Look(child) => {
                    self.push_sub(id);
                    self.op = child;
                }
            },
            Op::Fail => return Ok(Step::Fail),
        }
        Ok(Step::Continue)
    }

    /// Handle reaching the end of the current (sub-)program.
    fn accept(&mut self) -> Step {
        if self.depth == 0 {
            if self.whole && self.at != self.limit {
                return Step::Fail;
            }
            return Step::Match(self.at);
        }
        // The sub-match succeeded. Its choice points are dropped, which
        // makes it atomic, but the capture slots it set must still be
        // restored if something before it is backtracked into.
        let kept_start = self.kept.len();
        let (op, at, reverse, opts) = loop {
            match self.stack.pop() {
                Some(Frame::Sub { op, at, reverse, opts }) => {
                    break (op, at, reverse, opts)
                }
                Some(frame @ Frame::Capture { .. }) => self.kept.push(frame),
                Some(_) => {}
                None => unreachable!("sub-match without a frame"),
            }
        };
        self.depth -= 1;
        self.reverse = reverse;
        self.opts = opts;
        let end = self.at;
        let step = self.resume_sub(op, at, end, true, kept_start);
        self.kept.truncate(kept_start);
        step
    }

    /// Pop frames until one offers another way forward. Returns false when
    /// the stack is exhausted.
    fn backtrack(&mut self) -> bool {
        let prog = self.prog;
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Capture { slot, old } => {
                    if let Some(ref mut slots) = self.slots {
                        slots[slot] = old;
                    }
                }
                Frame::Repeat { op, at } => {
                    self.at = at;
                    self.op = match *prog.op(op) {
                        Op::Closure { child, greedy, next, .. } => {
                            if greedy {
                                next
                            } else {
                                Some(child)
                            }
                        }
                        Op::Question { child, greedy, next } => {
                            if greedy {
                                next
                            } else {
                                child
                            }
                        }
                        ref op => unreachable!("repeat frame for {:?}", op),
                    };
                    return true;
                }
                Frame::Alternate { op, index, at } => {
                    let alternates = match *prog.op(op) {
                        Op::Union { ref alternates } => alternates,
                        ref op => unreachable!("alternate frame for {:?}", op),
                    };
                    let index = index + 1;
                    if index + 1 < alternates.len() {
                        self.stack.push(Frame::Alternate { op, index, at });
                    }
                    self.at = at;
                    self.op = alternates[index];
                    return true;
                }
                Frame::Sub { op, at, reverse, opts } => {
                    self.depth -= 1;
                    self.reverse = reverse;
                    self.opts = opts;
                    let kept_start = self.kept.len();
                    if let Step::Continue =
                        self.resume_sub(op, at, at, false, kept_start)
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Continue after the sub-match begun by `op` at offset `at` has either
    /// matched, ending at `end`, or failed.
    ///
    /// Capture undo entries lifted out of a successful sub-match are in
    /// `kept[kept_start..]`, most recent first.
    fn resume_sub(
        &mut self,
        op: OpID,
        at: usize,
        end: usize,
        matched: bool,
        kept_start: usize,
    ) -> Step {
        let prog = self.prog;
        match *prog.op(op) {
            Op::Look { kind, next, .. } => {
                if matched == kind.is_negated() {
                    if matched {
                        self.undo_kept(kept_start);
                    }
                    return Step::Fail;
                }
                self.restore_kept(kept_start);
                self.at = at;
                self.op = next;
            }
            Op::Independent { next, .. } | Op::Modifier { next, .. } => {
                if !matched {
                    return Step::Fail;
                }
                self.restore_kept(kept_start);
                self.at = end;
                self.op = next;
            }
            Op::Condition { yes, no, .. } => {
                self.restore_kept(kept_start);
                self.at = at;
                self.op = if matched { yes } else { no };
            }
            ref op => unreachable!("sub frame for {:?}", op),
        }
        Step::Continue
    }

    /// Put lifted capture undo entries back on the stack, oldest first.
    fn restore_kept(&mut self, kept_start: usize) {
        while self.kept.len() > kept_start {
            if let Some(frame) = self.kept.pop() {
                self.stack.push(frame);
            }
        }
    }

    /// Apply lifted capture undo entries, most recent first.
    fn undo_kept(&mut self, kept_start: usize) {
        for frame in self.kept.drain(kept_start..) {
            if let Frame::Capture { slot, old } = frame {
                if let Some(ref mut slots) = self.slots {
                    slots[slot] = old;
                }
            }
        }
    }

    fn push_sub(&mut self, op: OpID) {
        self.stack.push(Frame::Sub {
            op,
            at: self.at,
            reverse: self.reverse,
            opts: self.opts,
        });
        self.depth += 1;
    }

    fn set_slot(&mut self, slot: usize) {
        let at = self.at;
        if let Some(ref mut slots) = self.slots {
            if let Some(old) = slots.get(slot).copied() {
                self.stack.push(Frame::Capture { slot, old });
                slots[slot] = NonMaxUsize::new(at);
            }
        }
    }

    /// Return the span most recently captured by `group`, if it has
    /// participated so far.
    fn group_span(&self, group: usize) -> Result<Option<Span>, MatchError> {
        let slots = match self.slots {
            None => {
                return Err(MatchError::InvalidGroup { group, group_len: 0 })
            }
            Some(ref slots) => slots,
        };
        let group_len = slots.len() / 2;
        if group == 0 || group >= group_len {
            return Err(MatchError::InvalidGroup { group, group_len });
        }
        match (slots[group * 2], slots[group * 2 + 1]) {
            (Some(s), Some(e)) if s.get() <= e.get() => {
                Ok(Some(Span { start: s.get(), end: e.get() }))
            }
            _ => Ok(None),
        }
    }

    /// Read the next character in the current direction.
    #[inline(always)]
    fn next_char(&self) -> Option<(char, usize)> {
        if self.reverse {
            self.target.char_before(self.at, self.start)
        } else {
            self.target.char_after(self.at, self.limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{syntax::Parser, util::options::Options};

    fn compile(pattern: &str, opts: &str) -> (Program, Options) {
        let opts = Options::parse(opts).unwrap();
        let token = Parser::new().options(opts).parse(pattern).unwrap();
        (Program::new(&token), opts)
    }

    /// Search for the leftmost match, returning the spans of all groups.
    fn find(
        pattern: &str,
        opts: &str,
        haystack: &str,
    ) -> Option<Vec<Option<(usize, usize)>>> {
        let token = Parser::new()
            .options(Options::parse(opts).unwrap())
            .parse(pattern)
            .unwrap();
        let (prog, opts) = compile(pattern, opts);
        let mut cache = Cache::new();
        let mut slots = vec![None; token.group_len() * 2];
        for at in 0..=haystack.len() {
            if !haystack.is_char_boundary(at) {
                continue;
            }
            let end = run(
                &prog,
                &mut cache,
                haystack,
                0,
                haystack.len(),
                at,
                opts,
                Some(&mut slots),
            )
            .unwrap();
            if let Some(end) = end {
                let mut groups = vec![Some((at, end))];
                for pair in slots.chunks(2).skip(1) {
                    groups.push(match (pair[0], pair[1]) {
                        (Some(s), Some(e)) => Some((s.get(), e.get())),
                        _ => None,
                    });
                }
                return Some(groups);
            }
        }
        None
    }

    fn span(pattern: &str, haystack: &str) -> Option<(usize, usize)> {
        find(pattern, "", haystack).and_then(|groups| groups[0])
    }

    #[test]
    fn leftmost_first_alternation() {
        let groups = find("(a|ab)(c|bcd)(d*)", "", "abcd").unwrap();
        assert_eq!(
            vec![Some((0, 4)), Some((0, 1)), Some((1, 4)), Some((4, 4))],
            groups
        );
    }

    #[test]
    fn greedy_and_lazy() {
        assert_eq!(Some((0, 5)), span("a.*b", "axbxb"));
        assert_eq!(Some((0, 3)), span("a.*?b", "axbxb"));
        assert_eq!(Some((0, 3)), span("a{1,3}", "aaaa"));
        assert_eq!(Some((0, 1)), span("a{1,3}?", "aaaa"));
        assert_eq!(Some((0, 0)), span("a??", "a"));
        assert_eq!(Some((0, 2)), span("a+?b", "ab"));
    }

    #[test]
    fn zero_width_closures_terminate() {
        assert_eq!(Some((0, 0)), span("(a?)*", ""));
        assert_eq!(Some((0, 3)), span("(a?)*", "aaa"));
        assert_eq!(Some((0, 0)), span("(?:)*", "x"));
        assert_eq!(Some((0, 2)), span("(?:a*)*b", "ab"));
        assert_eq!(Some((0, 0)), span("(?:\\b)*", "ab"));
    }

    #[test]
    fn capture_rollback() {
        let groups = find("(a)(b)?", "", "a").unwrap();
        assert_eq!(vec![Some((0, 1)), Some((0, 1)), None], groups);

        // The first alternative sets group 1 before failing.
        let groups = find("(?:(a)x|ay)", "", "ay").unwrap();
        assert_eq!(vec![Some((0, 2)), None], groups);
    }

    #[test]
    fn lookaround() {
        assert_eq!(Some((0, 1)), span("a(?=b)", "ab"));
        assert_eq!(None, span("a(?=b)", "ac"));
        assert_eq!(Some((0, 1)), span("a(?!b)", "ac"));
        assert_eq!(Some((1, 2)), span("(?<=a)b", "ab"));
        assert_eq!(None, span("(?<=a)b", "cb"));
        assert_eq!(Some((3, 4)), span("(?<!a)b", "ab b"));
        assert_eq!(Some((2, 3)), span("(?<=a.)c", "abc"));
    }

    #[test]
    fn lookaround_captures() {
        // Captures made inside a positive lookahead survive.
        let groups = find("(?=(a))a", "", "a").unwrap();
        assert_eq!(vec![Some((0, 1)), Some((0, 1))], groups);
        // Captures made inside a negative lookahead that matched are undone.
        let groups = find("(?:(?!(a)b)a|(x))", "", "ab x").unwrap();
        assert_eq!(vec![Some((3, 4)), None, Some((3, 4))], groups);
        // Lookbehind walks backward, but captures are still start..end.
        let groups = find("(?<=(ab))c", "", "abc").unwrap();
        assert_eq!(vec![Some((2, 3)), Some((0, 2))], groups);
    }

    #[test]
    fn independent_group_is_atomic() {
        assert_eq!(None, span("(?>a*)a", "aaaa"));
        assert_eq!(Some((0, 4)), span("(?>a*)", "aaaa"));
        assert_eq!(Some((0, 2)), span("(?>a|ab)c", "acx"));
        assert_eq!(Some((0, 3)), span("(?>ab|a)c", "abc"));
        assert_eq!(None, span("(?>a|ab)c", "abc"));
    }

    #[test]
    fn independent_group_captures_are_undone() {
        // The independent group sets group 1, then the match fails after it
        // and the alternative that does not use it wins.
        let groups = find("(?:(?>(a))x|ay)", "", "ay").unwrap();
        assert_eq!(vec![Some((0, 2)), None], groups);
    }

    #[test]
    fn modifiers() {
        assert_eq!(Some((0, 2)), span("(?i:a)b", "Ab"));
        assert_eq!(None, span("(?i:a)b", "AB"));
        assert_eq!(Some((0, 3)), span("a(?s:.)b", "a\nb"));
        assert_eq!(None, span("a.b", "a\nb"));
        assert_eq!(Some((0, 2)), find("(?-i:a)b", "i", "aB").and_then(|g| g[0]));
        assert_eq!(None, find("(?-i:a)b", "i", "AB").and_then(|g| g[0]));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(Some((0, 3)), find("abc", "i", "AbC").and_then(|g| g[0]));
        assert_eq!(Some((0, 1)), find("[a-c]", "i", "B").and_then(|g| g[0]));
        assert_eq!(Some((0, 1)), find("[^a-c]", "i", "D").and_then(|g| g[0]));
        assert_eq!(None, find("[^a-c]", "i", "B").and_then(|g| g[0]));
        assert_eq!(Some((0, 2)), find(r"(a)\1", "i", "aA").and_then(|g| g[0]));
    }

    #[test]
    fn case_insensitive_classes_agree_with_literals() {
        let kelvin = "\u{212A}";
        for text in &["k", "K", kelvin] {
            for pattern in &[r"\x{212A}", r"[\x{212A}]", "k", "[k]", "[j-l]"] {
                let got = find(pattern, "i", text).and_then(|g| g[0]);
                assert_eq!(
                    Some((0, text.len())),
                    got,
                    "{:?} on {:?}",
                    pattern,
                    text
                );
            }
        }
        assert_eq!(None, find("[^b]", "i", "B").and_then(|g| g[0]));
        assert_eq!(None, find("[^B]", "i", "b").and_then(|g| g[0]));
        let first = |p: &str, text: &str| find(p, "i", text).and_then(|g| g[0]);
        assert_eq!(Some((0, 2)), first(r"[^\x{212A}]", "\u{3C3}"));
        assert_eq!(None, first(r"[^\x{212A}]", "k"));
        assert_eq!(Some((0, 2)), first(r"[\x{3A3}]", "\u{3C2}"));
    }

    #[test]
    fn backrefs() {
        assert_eq!(Some((0, 2)), span(r"(a)\1", "aa"));
        assert_eq!(None, span(r"(a)\1", "ab"));
        // An unset group never matches.
        assert_eq!(None, span(r"(?:(a)|b)\1", "b"));
        assert_eq!(Some((1, 6)), span(r"(ab)x\1", "zabxab"));
    }

    #[test]
    fn conditionals() {
        assert_eq!(Some((0, 2)), span("^(a)?(?(1)b|c)", "ab"));
        assert_eq!(Some((0, 1)), span("^(a)?(?(1)b|c)", "c"));
        assert_eq!(None, span("^(a)?(?(1)b|c)", "ac"));
        assert_eq!(Some((0, 2)), span("^(?(?=a)ab|cd)", "ab"));
        assert_eq!(Some((0, 2)), span("^(?(?=a)ab|cd)", "cd"));
        assert_eq!(None, span("^(?(?=a)ab|cd)", "ad"));
        assert_eq!(Some((0, 1)), span("^(?(?!a)c)", "c"));
    }

    #[test]
    fn anchors_and_multi_line() {
        assert_eq!(None, span("^b", "a\nb"));
        assert_eq!(Some((2, 3)), find("^b", "m", "a\nb").and_then(|g| g[0]));
        assert_eq!(Some((0, 1)), span("a$", "a\n"));
        assert_eq!(None, span("a\\z", "a\n"));
        assert_eq!(Some((2, 4)), span("\\bbc\\b", "a bc d"));
    }

    #[test]
    fn whole_string_mode() {
        let (prog, opts) = compile("a+", "X");
        let mut cache = Cache::new();
        assert_eq!(Ok(Some(3)), run(&prog, &mut cache, "aaa", 0, 3, 0, opts, None));
        assert_eq!(Ok(None), run(&prog, &mut cache, "aab", 0, 3, 0, opts, None));
        // Backtracking gives back characters until the end is reached.
        let (prog, opts) = compile("a*a{2}", "X");
        assert_eq!(Ok(Some(4)), run(&prog, &mut cache, "aaaa", 0, 4, 0, opts, None));
    }

    #[test]
    fn char_targets() {
        let (prog, opts) = compile("(?<=b)c+", "");
        let haystack: Vec<char> = "abccd".chars().collect();
        let mut cache = Cache::new();
        let end = run(&prog, &mut cache, &haystack[..], 0, 5, 2, opts, None);
        assert_eq!(Ok(Some(4)), end);
    }

    #[test]
    fn missing_groups_are_errors() {
        let token = crate::syntax::Token::concat(vec![
            crate::syntax::Token::Char('a'),
            crate::syntax::Token::Backref(3),
        ]);
        let prog = Program::new(&token);
        let mut cache = Cache::new();
        let mut slots = vec![None; 2];
        let err = run(
            &prog,
            &mut cache,
            "aa",
            0,
            2,
            0,
            Options::empty(),
            Some(&mut slots),
        )
        .unwrap_err();
        assert_eq!(MatchError::InvalidGroup { group: 3, group_len: 1 }, err);

        let err =
            run(&prog, &mut cache, "aa", 0, 2, 0, Options::empty(), None)
                .unwrap_err();
        assert_eq!(MatchError::InvalidGroup { group: 3, group_len: 0 }, err);

        // The cache is usable again after an error.
        let prog = Program::new(&crate::syntax::Token::Char('a'));
        let end = run(&prog, &mut cache, "a", 0, 1, 0, Options::empty(), None);
        assert_eq!(Ok(Some(1)), end);
    }

    #[test]
    fn search_span_bounds_lookaround() {
        let (prog, opts) = compile("(?<=a)b", "");
        let mut cache = Cache::new();
        // The `a` lies before the start of the search, so it is not seen.
        assert_eq!(Ok(None), run(&prog, &mut cache, "ab", 1, 2, 1, opts, None));
        assert_eq!(Ok(Some(2)), run(&prog, &mut cache, "ab", 0, 2, 1, opts, None));
    }
}
