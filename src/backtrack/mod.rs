/*!
The operation graph and the backtracking VM that executes it.

A [`Program`] is compiled from a [`Token`](crate::syntax::Token) tree. It is
an arena of [`Op`] values linked by [`OpID`] indices: concatenation is
expressed by `next` links, and constructs that own a sub-pattern link to it
with a `child` link. Unbounded repetitions loop back through a closure,
which is the only kind of cycle in a program.

The VM walks a program from a trial start offset and backtracks with an
explicit stack instead of recursion, so that deeply nested patterns and long
texts never exhaust the call stack. Its scratch space is a [`Cache`].

# Example

```
use xml_regex::{backtrack::{Op, Program}, syntax::Parser};

let token = Parser::new().parse("ab*")?;
let prog = Program::new(&token);
assert_eq!(1, prog.closure_len());
assert!(matches!(*prog.op(prog.start().unwrap()), Op::Char { ch: 'a', .. }));

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

pub use self::{
    program::{Op, OpCondition, Program},
    vm::Cache,
};
pub use crate::util::primitives::{ClosureID, OpID};

pub(crate) use self::vm::run;

mod compiler;
mod program;
mod vm;
