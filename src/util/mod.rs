/*!
A collection of utility types shared by the parser, the compiler and the
matching VM.

Most of these are re-exported at the crate root. The modules are public so
that every type has a canonical path.
*/

pub mod captures;
pub mod look;
pub mod options;
pub mod pool;
pub mod primitives;
pub mod search;

pub(crate) mod prefilter;
pub(crate) mod sparse_set;
