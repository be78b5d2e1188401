/*!
A thread safe session pool.

The principal type in this module is a [`Pool`]. Its main use case is for
holding the mutable scratch space (a [`Cache`](crate::backtrack::Cache)) that
the matching VM needs to execute a search. This permits sharing the same
read-only regex across multiple threads while having a quick way of reusing
scratch space. This avoids needing to re-create the scratch space for every
search.

Unlike a general purpose pool, this one caches at most one value. A caller
that finds the cached value in use by another thread creates a throwaway
value instead of waiting for it, so no search ever blocks on another.
*/

use alloc::boxed::Box;

use std::sync::Mutex;

/// A pool with a single fast-path slot, plus ad hoc allocation when the slot
/// is busy.
///
/// The type parameter `T` is the type of the value in the pool, and `F` is
/// the function used to create new values.
///
/// # Example
///
/// ```
/// use xml_regex::util::pool::Pool;
///
/// let pool: Pool<Vec<char>> = Pool::new(|| vec!['a']);
/// {
///     let mut v = pool.get();
///     v.push('b');
/// }
/// // The value was returned to the pool, so we see our previous change.
/// assert_eq!(vec!['a', 'b'], *pool.get());
/// ```
pub struct Pool<T, F = fn() -> T> {
    /// The cached value. `None` when the slot is empty or the value is
    /// checked out.
    slot: Mutex<Option<Box<T>>>,
    /// Creates a new value when the slot cannot satisfy a request.
    create: F,
}

impl<T, F> Pool<T, F> {
    /// Create a new pool. The given closure is used to create values in the
    /// pool when necessary.
    pub fn new(create: F) -> Pool<T, F> {
        Pool { slot: Mutex::new(None), create }
    }
}

impl<T: Send, F: Fn() -> T> Pool<T, F> {
    /// Get a value from the pool.
    ///
    /// If the cached value is free, the caller gets it and it is put back
    /// when the guard is dropped. Otherwise, a fresh value is created and
    /// the guard hands it back to the slot on drop only if the slot is
    /// empty at that point.
    pub fn get(&self) -> PoolGuard<'_, T, F> {
        // try_lock never blocks. A poisoned or contended lock just means we
        // take the slow path.
        let cached = match self.slot.try_lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        let value = match cached {
            Some(value) => value,
            None => Box::new((self.create)()),
        };
        PoolGuard { pool: self, value: Some(value) }
    }

    fn put(&self, value: Box<T>) {
        if let Ok(mut slot) = self.slot.try_lock() {
            if slot.is_none() {
                *slot = Some(value);
            }
        }
    }
}

impl<T: core::fmt::Debug, F> core::fmt::Debug for Pool<T, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pool").field("slot", &self.slot).finish()
    }
}

/// A guard that is returned when a caller requests a value from the pool.
///
/// The purpose of the guard is to use RAII to automatically put the value
/// back in the pool once it's dropped.
pub struct PoolGuard<'a, T: Send, F: Fn() -> T> {
    pool: &'a Pool<T, F>,
    value: Option<Box<T>>,
}

impl<'a, T: Send, F: Fn() -> T> PoolGuard<'a, T, F> {
    /// Drop the value instead of returning it to the pool.
    ///
    /// This is used when a search fails with an error, so that whatever
    /// state it left behind is never seen by another search.
    pub fn discard(mut self) {
        self.value = None;
    }
}

impl<'a, T: Send, F: Fn() -> T> core::ops::Deref for PoolGuard<'a, T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.value {
            Some(ref v) => &**v,
            None => unreachable!("pool guard value is only taken on drop"),
        }
    }
}

impl<'a, T: Send, F: Fn() -> T> core::ops::DerefMut for PoolGuard<'a, T, F> {
    fn deref_mut(&mut self) -> &mut T {
        match self.value {
            Some(ref mut v) => &mut **v,
            None => unreachable!("pool guard value is only taken on drop"),
        }
    }
}

impl<'a, T: Send, F: Fn() -> T> Drop for PoolGuard<'a, T, F> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.put(value);
        }
    }
}

impl<'a, T: Send + core::fmt::Debug, F: Fn() -> T> core::fmt::Debug
    for PoolGuard<'a, T, F>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolGuard").field("value", &self.value).finish()
    }
}

#[cfg(test)]
mod tests {
    use core::panic::{RefUnwindSafe, UnwindSafe};

    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn oibits() {
        fn assert_oitbits<T: Send + Sync + UnwindSafe + RefUnwindSafe>() {}
        assert_oitbits::<Pool<Vec<u32>>>();
        assert_oitbits::<Pool<core::cell::RefCell<Vec<u32>>>>();
    }

    #[test]
    fn busy_slot_allocates_instead_of_blocking() {
        let pool: Pool<Vec<char>> = Pool::new(|| vec!['a']);
        let mut first = pool.get();
        first.push('x');

        // The cached value is checked out, so this gets a fresh one.
        let second = pool.get();
        assert_eq!(vec!['a'], *second);

        drop(first);
        drop(second);
        // The first guard to come back fills the slot. The throwaway value
        // is dropped.
        assert_eq!(vec!['a', 'x'], *pool.get());
    }

    #[test]
    fn discarded_values_are_not_reused() {
        let pool: Pool<Vec<char>> = Pool::new(|| vec!['a']);
        let mut v = pool.get();
        v.push('x');
        v.discard();
        assert_eq!(vec!['a'], *pool.get());
    }

    #[test]
    fn concurrent_callers() {
        use std::{cell::RefCell, sync::Arc};

        let pool: Arc<Pool<RefCell<Vec<char>>>> =
            Arc::new(Pool::new(|| RefCell::new(vec!['a'])));
        pool.get().borrow_mut().push('x');

        let mut handles = vec![];
        for _ in 0..4 {
            let pool = pool.clone();
            handles.push(std::thread::spawn(move || {
                let guard = pool.get();
                let first = guard.borrow()[0];
                assert_eq!('a', first);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!('a', pool.get().borrow()[0]);
    }
}
