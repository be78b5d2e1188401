use alloc::{boxed::Box, vec::Vec};

use crate::{
    backtrack::compiler::Compiler,
    syntax::{ClassSet, LookKind, Token},
    util::{
        look::Anchor,
        options::Options,
        primitives::{ClosureID, OpID},
    },
};

/// A single operation in a compiled [`Program`].
///
/// Concatenation has no operation of its own: every operation that can be
/// followed by something else has a `next` link, and `None` means the end of
/// the (sub-)program has been reached. Operations that own a sub-program
/// (closures, lookaround, independent groups and so on) link to its first
/// operation with a `child` link.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Op {
    /// Match one literal character.
    Char { ch: char, next: Option<OpID> },
    /// Match a literal string.
    String { chars: Box<[char]>, next: Option<OpID> },
    /// Match one character in (or, when negated, not in) a set. `folded`
    /// is the closure of `set` under case folding, used in place of `set`
    /// when matching case insensitively. It is `None` when folding adds
    /// nothing.
    Range {
        set: ClassSet,
        folded: Option<ClassSet>,
        negated: bool,
        next: Option<OpID>,
    },
    /// Match one character other than a line terminator. In single-line
    /// mode, any character.
    Dot { next: Option<OpID> },
    /// Assert a zero-width condition.
    Anchor { anchor: Anchor, next: Option<OpID> },
    /// Match the text most recently captured by a group.
    Backref { group: usize, next: Option<OpID> },
    /// Try each alternate in order. Alternates already lead to the
    /// operation that follows the union, so it has no `next` of its own.
    Union { alternates: Vec<Option<OpID>> },
    /// Unbounded repetition. The child sub-program leads back to this
    /// operation. `id` identifies the closure for zero-width loop
    /// detection.
    Closure { id: ClosureID, child: OpID, greedy: bool, next: Option<OpID> },
    /// Zero or one repetition. The child sub-program leads to `next`.
    Question { child: Option<OpID>, greedy: bool, next: Option<OpID> },
    /// Record the start of a capturing group.
    CaptureStart { group: usize, next: Option<OpID> },
    /// Record the end of a capturing group.
    CaptureEnd { group: usize, next: Option<OpID> },
    /// A lookaround assertion over a sub-program that ends with `None`.
    Look { kind: LookKind, child: Option<OpID>, next: Option<OpID> },
    /// An independent group. The first way in which the sub-program
    /// matches is the only one ever tried.
    Independent { child: Option<OpID>, next: Option<OpID> },
    /// Run the sub-program with options set and cleared. Like an
    /// independent group, the sub-program is never backtracked into.
    Modifier {
        add: Options,
        remove: Options,
        child: Option<OpID>,
        next: Option<OpID>,
    },
    /// Continue with `yes` if the condition holds, and with `no` otherwise.
    /// Both branches already lead to the operation following the
    /// conditional.
    Condition { condition: OpCondition, yes: Option<OpID>, no: Option<OpID> },
    /// Never matches.
    Fail,
}

/// The condition of an [`Op::Condition`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OpCondition {
    /// Holds when the group has participated in the match so far.
    Group(usize),
    /// Holds when the sub-program, a single lookaround operation, matches.
    Look(Option<OpID>),
}

impl Op {
    /// The operation that follows this one, for operations that have a
    /// single successor.
    pub fn next(&self) -> Option<OpID> {
        match *self {
            Op::Char { next, .. }
            | Op::String { next, .. }
            | Op::Range { next, .. }
            | Op::Dot { next }
            | Op::Anchor { next, .. }
            | Op::Backref { next, .. }
            | Op::Closure { next, .. }
            | Op::Question { next, .. }
            | Op::CaptureStart { next, .. }
            | Op::CaptureEnd { next, .. }
            | Op::Look { next, .. }
            | Op::Independent { next, .. }
            | Op::Modifier { next, .. } => next,
            Op::Union { .. } | Op::Condition { .. } | Op::Fail => None,
        }
    }
}

/// A compiled pattern: an arena of operations linked by index.
///
/// A program is built from a [`Token`] tree once and is immutable after
/// that, so it can be shared freely between threads. Executing it requires
/// a [`Cache`](crate::backtrack::Cache).
///
/// Closures are the only operations that can be reached again from their
/// own child, so every cycle in the graph passes through a closure.
#[derive(Clone)]
pub struct Program {
    pub(crate) ops: Vec<Op>,
    pub(crate) start: Option<OpID>,
    pub(crate) closure_len: usize,
}

impl Program {
    /// Compile the given token tree.
    ///
    /// # Panics
    ///
    /// This panics if the program would need more than [`OpID::LIMIT`]
    /// operations.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_regex::{backtrack::Program, syntax::Token};
    ///
    /// let prog = Program::new(&Token::literal("abc"));
    /// assert_eq!(1, prog.len());
    /// assert_eq!(Some(&['a', 'b', 'c'][..]), prog.fixed_literal());
    /// ```
    pub fn new(token: &Token) -> Program {
        Compiler::new().compile(token)
    }

    /// The first operation of this program, or `None` if the program
    /// matches the empty string and nothing else is needed.
    pub fn start(&self) -> Option<OpID> {
        self.start
    }

    /// Return the operation with the given identifier.
    ///
    /// # Panics
    ///
    /// This panics if the identifier is not from this program.
    pub fn op(&self, id: OpID) -> &Op {
        &self.ops[id]
    }

    /// Return all operations in this program.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// The number of operations in this program.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if this program has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The number of closures in this program. Each needs its own set of
    /// visited offsets while searching.
    pub fn closure_len(&self) -> usize {
        self.closure_len
    }

    /// If this whole program is a single literal, return it.
    pub fn fixed_literal(&self) -> Option<&[char]> {
        match *self.op(self.start?) {
            Op::Char { ref ch, next: None } => Some(core::slice::from_ref(ch)),
            Op::String { ref chars, next: None } => Some(chars),
            _ => None,
        }
    }

    /// Returns true if this program starts with a greedy `.*`.
    ///
    /// Such a program can only match at the start of the search or, unless
    /// `.` matches line terminators, at the start of a line.
    pub fn starts_with_dot_star(&self) -> bool {
        let start = match self.start {
            None => return false,
            Some(start) => start,
        };
        match *self.op(start) {
            Op::Closure { child, greedy: true, .. } => match *self.op(child) {
                Op::Dot { next } => next == Some(start),
                _ => false,
            },
            _ => false,
        }
    }

    /// Returns the heap memory, in bytes, used by this program.
    pub fn memory_usage(&self) -> usize {
        let mut usage = self.ops.len() * core::mem::size_of::<Op>();
        for op in &self.ops {
            usage += match *op {
                Op::String { ref chars, .. } => {
                    chars.len() * core::mem::size_of::<char>()
                }
                Op::Range { ref set, ref folded, .. } => {
                    let len = set.ranges().len()
                        + folded.as_ref().map_or(0, |f| f.ranges().len());
                    len * 2 * core::mem::size_of::<char>()
                }
                Op::Union { ref alternates } => {
                    alternates.len() * core::mem::size_of::<Option<OpID>>()
                }
                _ => 0,
            };
        }
        usage
    }
}

impl core::fmt::Debug for Program {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "backtrack::Program(")?;
        for (i, op) in self.ops.iter().enumerate() {
            let status = if Some(i) == self.start.map(|id| id.as_usize()) {
                '>'
            } else {
                ' '
            };
            writeln!(f, "{}{:06}: {:?}", status, i, op)?;
        }
        writeln!(f, "closures: {}", self.closure_len)?;
        writeln!(f, ")")?;
        Ok(())
    }
}
