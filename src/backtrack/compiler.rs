use alloc::vec::Vec;

use crate::{
    backtrack::program::{Op, OpCondition, Program},
    syntax::{Condition, Token},
    util::primitives::{ClosureID, OpID},
};

/// Translates a token tree into a [`Program`].
///
/// Every token is compiled together with the operation that should follow
/// it, so a concatenation is compiled from its last element to its first.
/// In reverse mode, used for the bodies of lookbehind assertions, the
/// elements are compiled in the opposite order, so that the program walks
/// the text backward.
#[derive(Debug)]
pub(crate) struct Compiler {
    ops: Vec<Op>,
    closure_len: usize,
}

impl Compiler {
    pub(crate) fn new() -> Compiler {
        Compiler { ops: Vec::new(), closure_len: 0 }
    }

    pub(crate) fn compile(mut self, token: &Token) -> Program {
        let start = self.c(token, None, false);
        debug!(
            "compiled program with {} operations and {} closures",
            self.ops.len(),
            self.closure_len,
        );
        Program { ops: self.ops, start, closure_len: self.closure_len }
    }

    fn add(&mut self, op: Op) -> OpID {
        let id = OpID::must(self.ops.len());
        self.ops.push(op);
        id
    }

    /// Reserve a slot for an operation that must be referred to before it
    /// can be built. The slot must be filled in with `patch`.
    fn reserve(&mut self) -> OpID {
        self.add(Op::Fail)
    }

    fn patch(&mut self, id: OpID, op: Op) {
        self.ops[id] = op;
    }

    /// Compile `tok` followed by `next`, returning the first operation of
    /// the result. `None` is returned only when `tok` matches the empty
    /// string without any operation and `next` is `None`.
    fn c(
        &mut self,
        tok: &Token,
        next: Option<OpID>,
        reverse: bool,
    ) -> Option<OpID> {
        match *tok {
            Token::Empty => next,
            Token::Char(ch) => Some(self.add(Op::Char { ch, next })),
            Token::String(ref s) => Some(self.add(Op::String {
                chars: s.clone().into_boxed_slice(),
                next,
            })),
            Token::Dot => Some(self.add(Op::Dot { next })),
            Token::Class { ref set, negated } => {
                let folded = Some(set.case_fold()).filter(|f| f != set);
                Some(self.add(Op::Range {
                    set: set.clone(),
                    folded,
                    negated,
                    next,
                }))
            }
            Token::Anchor(anchor) => Some(self.add(Op::Anchor { anchor, next })),
            Token::Backref(group) => Some(self.add(Op::Backref { group, next })),
            Token::Concat(ref ts) => {
                let mut next = next;
                if reverse {
                    for t in ts {
                        next = self.c(t, next, reverse);
                    }
                } else {
                    for t in ts.iter().rev() {
                        next = self.c(t, next, reverse);
                    }
                }
                next
            }
            Token::Union(ref ts) => {
                let alternates =
                    ts.iter().map(|t| self.c(t, next, reverse)).collect();
                Some(self.add(Op::Union { alternates }))
            }
            Token::Repeat { ref child, min, max, greedy } => {
                self.c_repeat(child, min, max, greedy, next, reverse)
            }
            Token::Group { index: None, ref child } => {
                self.c(child, next, reverse)
            }
            Token::Group { index: Some(group), ref child } => {
                // In reverse, the end of the group is reached first.
                if reverse {
                    let start = self.add(Op::CaptureStart { group, next });
                    let body = self.c(child, Some(start), reverse);
                    Some(self.add(Op::CaptureEnd { group, next: body }))
                } else {
                    let end = self.add(Op::CaptureEnd { group, next });
                    let body = self.c(child, Some(end), reverse);
                    Some(self.add(Op::CaptureStart { group, next: body }))
                }
            }
            Token::Look { kind, ref child } => {
                let child = self.c(child, None, kind.is_behind());
                Some(self.add(Op::Look { kind, child, next }))
            }
            Token::Independent(ref child) => {
                let child = self.c(child, None, reverse);
                Some(self.add(Op::Independent { child, next }))
            }
            Token::Modifier { add, remove, ref child } => {
                let child = self.c(child, None, reverse);
                Some(self.add(Op::Modifier { add, remove, child, next }))
            }
            Token::Condition { ref condition, ref yes, ref no } => {
                let condition = match *condition {
                    Condition::Group(n) => OpCondition::Group(n),
                    Condition::Look(ref look) => {
                        OpCondition::Look(self.c(look, None, reverse))
                    }
                };
                let yes = self.c(yes, next, reverse);
                let no = match *no {
                    None => next,
                    Some(ref no) => self.c(no, next, reverse),
                };
                Some(self.add(Op::Condition { condition, yes, no }))
            }
        }
    }

    /// Compile a repetition.
    ///
    /// `X{n}` is unrolled into `n` copies. `X{n,m}` becomes `n` copies
    /// followed by `m - n` nested optional copies, so that `X{2,5}` is
    /// compiled like `XX(X(XX?)?)?`. `X{n,}` becomes `n` copies followed by
    /// a closure.
    fn c_repeat(
        &mut self,
        child: &Token,
        min: u32,
        max: Option<u32>,
        greedy: bool,
        next: Option<OpID>,
        reverse: bool,
    ) -> Option<OpID> {
        let mut tail = match max {
            Some(max) => {
                let mut tail = next;
                for _ in min..max {
                    let body = self.c(child, tail, reverse);
                    tail = Some(self.add(Op::Question { child: body, greedy, next }));
                }
                tail
            }
            None => {
                let id = self.reserve();
                let closure = ClosureID::must(self.closure_len);
                self.closure_len += 1;
                // An empty body leads straight back to the closure, which
                // then fails since it was already entered at that offset.
                let body = self.c(child, Some(id), reverse).unwrap_or(id);
                self.patch(
                    id,
                    Op::Closure { id: closure, child: body, greedy, next },
                );
                Some(id)
            }
        };
        for _ in 0..min {
            tail = self.c(child, tail, reverse);
        }
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{LookKind, Parser};

    fn compile(pattern: &str) -> Program {
        Program::new(&Parser::new().parse(pattern).unwrap())
    }

    fn op(prog: &Program, id: Option<OpID>) -> &Op {
        prog.op(id.unwrap())
    }

    #[test]
    fn concatenation_is_chained() {
        let prog = compile("a[b]c");
        let first = op(&prog, prog.start());
        assert!(matches!(*first, Op::Char { ch: 'a', .. }));
        let second = op(&prog, first.next());
        assert!(matches!(*second, Op::Range { negated: false, .. }));
        let third = op(&prog, second.next());
        assert!(matches!(*third, Op::Char { ch: 'c', next: None }));
    }

    #[test]
    fn classes_carry_their_case_closure() {
        let prog = compile(r"[a-c][0-9]");
        let first = op(&prog, prog.start());
        match *first {
            Op::Range { ref folded, .. } => {
                let folded = folded.as_ref().unwrap();
                assert!(folded.contains('B'));
                assert!(!folded.contains('d'));
            }
            ref op => panic!("expected range: {:?}", op),
        }
        let second = op(&prog, first.next());
        assert!(matches!(*second, Op::Range { folded: None, .. }));
    }

    #[test]
    fn exact_repetition_unrolls() {
        let prog = compile("a{3}");
        assert_eq!(3, prog.len());
        assert_eq!(0, prog.closure_len());
        assert_eq!(Program::new(&Token::Empty).start(), compile("a{0}").start());
    }

    #[test]
    fn bounded_repetition_nests_questions() {
        let prog = compile("a{1,3}");
        // One mandatory copy plus two optional copies.
        let questions = prog
            .ops()
            .iter()
            .filter(|op| matches!(**op, Op::Question { .. }))
            .count();
        assert_eq!(2, questions);
        let first = op(&prog, prog.start());
        assert!(matches!(*first, Op::Char { ch: 'a', .. }));
        match *op(&prog, first.next()) {
            Op::Question { child, next: None, greedy: true } => {
                let inner = op(&prog, child);
                assert!(matches!(*op(&prog, inner.next()), Op::Question { .. }));
            }
            ref op => panic!("expected question: {:?}", op),
        }
    }

    #[test]
    fn closure_loops_back() {
        let prog = compile("a*b");
        assert_eq!(1, prog.closure_len());
        let start = prog.start().unwrap();
        match *prog.op(start) {
            Op::Closure { child, greedy: true, next, .. } => {
                assert_eq!(Some(start), prog.op(child).next());
                assert!(matches!(*op(&prog, next), Op::Char { ch: 'b', .. }));
            }
            ref op => panic!("expected closure: {:?}", op),
        }

        let prog = compile("(?:)*");
        let start = prog.start().unwrap();
        match *prog.op(start) {
            Op::Closure { child, .. } => assert_eq!(start, child),
            ref op => panic!("expected closure: {:?}", op),
        }
    }

    #[test]
    fn captures_bracket_the_group() {
        let prog = compile("(a)");
        let first = op(&prog, prog.start());
        assert!(matches!(*first, Op::CaptureStart { group: 1, .. }));
        let a = op(&prog, first.next());
        assert!(matches!(*op(&prog, a.next()), Op::CaptureEnd { group: 1, next: None }));
    }

    #[test]
    fn lookbehind_compiles_in_reverse() {
        let prog = compile("(?<=ab(c))");
        let (child, kind) = match *op(&prog, prog.start()) {
            Op::Look { child, kind, next: None } => (child, kind),
            ref op => panic!("expected look: {:?}", op),
        };
        assert_eq!(LookKind::Behind, kind);
        let end = op(&prog, child);
        assert!(matches!(*end, Op::CaptureEnd { group: 1, .. }));
        let c = op(&prog, end.next());
        assert!(matches!(*c, Op::Char { ch: 'c', .. }));
        let start = op(&prog, c.next());
        assert!(matches!(*start, Op::CaptureStart { group: 1, .. }));
        let ab = op(&prog, start.next());
        assert!(matches!(*ab, Op::String { next: None, .. }));
    }

    #[test]
    fn union_alternates_share_successor() {
        let prog = compile("(?:a|b)c");
        match *op(&prog, prog.start()) {
            Op::Union { ref alternates } => {
                assert_eq!(2, alternates.len());
                let a = op(&prog, alternates[0]).next();
                let b = op(&prog, alternates[1]).next();
                assert_eq!(a, b);
                assert!(matches!(*op(&prog, a), Op::Char { ch: 'c', .. }));
            }
            ref op => panic!("expected union: {:?}", op),
        }
    }

    #[test]
    fn dot_star_detection() {
        assert!(compile(".*a").starts_with_dot_star());
        assert!(!compile(".*?a").starts_with_dot_star());
        assert!(!compile("a.*").starts_with_dot_star());
        assert!(!compile("[a]*").starts_with_dot_star());
    }

    #[test]
    fn fixed_literal_detection() {
        assert_eq!(Some(&['a', 'b'][..]), compile("ab").fixed_literal());
        assert_eq!(Some(&['a'][..]), compile("a").fixed_literal());
        assert_eq!(None, compile("ab*").fixed_literal());
        assert_eq!(None, compile("(ab)").fixed_literal());
        assert_eq!(None, compile("").fixed_literal());
    }
}
