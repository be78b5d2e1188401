/*!
Lower level primitive types that are useful in a variety of circumstances.

The [`NonMaxUsize`] type is used for capture slots, so that an
`Option<NonMaxUsize>` has the same size as a `usize`. The [`OpID`] and
[`ClosureID`] types identify operations and closures in a compiled
[`Program`](crate::backtrack::Program).
*/

use core::num::NonZeroUsize;

/// A `usize` that can never be `usize::MAX`.
///
/// This is similar to `core::num::NonZeroUsize`, but instead of not permitting
/// a zero value, this does not permit a max value.
///
/// This is useful in certain contexts where one wants to optimize the memory
/// usage of things that contain match offsets. Namely, since Rust slices
/// are guaranteed to never have a length exceeding `isize::MAX`, we can use
/// `usize::MAX` as a sentinel to indicate that no match was found. Indeed,
/// types like `Option<NonMaxUsize>` have exactly the same size in memory as a
/// `usize`.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonMaxUsize(NonZeroUsize);

impl NonMaxUsize {
    /// Create a new `NonMaxUsize` from the given value.
    ///
    /// This returns `None` only when the given value is equal to `usize::MAX`.
    #[inline]
    pub fn new(value: usize) -> Option<NonMaxUsize> {
        NonZeroUsize::new(value.wrapping_add(1)).map(NonMaxUsize)
    }

    /// Return the underlying `usize` value. The returned value is guaranteed
    /// to not equal `usize::MAX`.
    #[inline]
    pub fn get(self) -> usize {
        self.0.get().wrapping_sub(1)
    }
}

// We provide our own Debug impl because seeing the internal repr can be quite
// surprising if you aren't expecting it. e.g., 'NonMaxUsize(5)' vs just '5'.
impl core::fmt::Debug for NonMaxUsize {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:?}", self.get())
    }
}

macro_rules! define_index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord,
        )]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// The maximum value.
            pub const MAX: $name = $name(core::u32::MAX - 1);

            /// The total number of values that can be represented.
            pub const LIMIT: usize = $name::MAX.0 as usize + 1;

            /// The zero value.
            pub const ZERO: $name = $name(0);

            /// Create a new value that is represented by a "small index."
            ///
            /// If the given index exceeds the maximum allowed value, then
            /// `None` is returned.
            #[inline]
            pub fn new(value: usize) -> Option<$name> {
                if value <= $name::MAX.0 as usize {
                    Some($name(value as u32))
                } else {
                    None
                }
            }

            /// Like `new`, but panics when the value is out of range.
            #[inline]
            pub(crate) fn must(value: usize) -> $name {
                match $name::new(value) {
                    Some(id) => id,
                    None => panic!(
                        "{} value {} exceeds limit of {}",
                        stringify!($name),
                        value,
                        $name::LIMIT,
                    ),
                }
            }

            /// Return this value as a `usize`.
            #[inline]
            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }
        }

        impl<T> core::ops::Index<$name> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &T {
                &self[index.as_usize()]
            }
        }

        impl<T> core::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.as_usize()]
            }
        }

        impl<T> core::ops::Index<$name> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &T {
                &self[index.as_usize()]
            }
        }

        impl<T> core::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.as_usize()]
            }
        }
    };
}

define_index_type!(
    /// The identifier of an operation in a compiled program.
    ///
    /// Operations live in an arena owned by the program, so links between
    /// them (including the back edge from a closure's body to the closure
    /// itself) are plain indices.
    OpID
);

define_index_type!(
    /// The identifier of a closure, used to index the per-closure sets of
    /// offsets already visited during a match attempt.
    ClosureID
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonmax_round_trips_everything_but_max() {
        assert_eq!(0, NonMaxUsize::new(0).unwrap().get());
        assert_eq!(17, NonMaxUsize::new(17).unwrap().get());
        assert!(NonMaxUsize::new(core::usize::MAX).is_none());
        assert_eq!(
            core::mem::size_of::<usize>(),
            core::mem::size_of::<Option<NonMaxUsize>>()
        );
    }

    #[test]
    fn index_limits() {
        assert!(OpID::new(OpID::LIMIT - 1).is_some());
        assert!(OpID::new(OpID::LIMIT).is_none());
        let v = vec!['a', 'b'];
        assert_eq!('b', v[OpID::must(1)]);
    }

    #[test]
    #[should_panic]
    fn must_panics_past_limit() {
        ClosureID::must(ClosureID::LIMIT);
    }
}
