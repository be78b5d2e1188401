use alloc::{vec, vec::Vec};

/// A sparse set of offsets.
///
/// This is how a closure remembers the offsets at which it has already been
/// entered during one match attempt. Values are offsets relative to the
/// start of the search.
///
/// This supports constant time addition and membership testing. Clearing an
/// entire set can also be done in constant time, which matters since the
/// sets are cleared before every attempt.
///
/// The data structure is based on: https://research.swtch.com/sparse
/// Note though that we don't actually use uninitialized memory. We generally
/// reuse sparse sets, so the initial allocation cost is bareable. However, its
/// other properties listed above are extremely useful.
#[derive(Clone)]
pub(crate) struct SparseSet {
    /// The number of elements currently in this set.
    len: usize,
    /// Dense contains the values in the order in which they were inserted.
    dense: Vec<usize>,
    /// Sparse maps values to their location in dense.
    ///
    /// A value is in the set if and only if
    /// sparse[value] < len && value == dense[sparse[value]].
    sparse: Vec<usize>,
}

impl SparseSet {
    /// Create a new sparse set with the given capacity.
    #[inline]
    pub(crate) fn new(capacity: usize) -> SparseSet {
        SparseSet { len: 0, dense: vec![0; capacity], sparse: vec![0; capacity] }
    }

    /// Grow this set so that it can hold every value less than
    /// `new_capacity`.
    ///
    /// Unlike a resize, this keeps the current members. A new slot in
    /// `sparse` points at `dense[0]`, which holds a smaller value if it holds
    /// anything, so new values are never mistaken for members.
    #[inline]
    pub(crate) fn grow(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity() {
            return;
        }
        let new_capacity = new_capacity.max(2 * self.capacity());
        self.dense.resize(new_capacity, 0);
        self.sparse.resize(new_capacity, 0);
    }

    /// Returns the capacity of this set.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.dense.len()
    }

    /// Returns the number of elements in this set.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Insert the value into this set and return true if the given value was
    /// not previously in this set.
    ///
    /// The set grows as needed to hold the value.
    #[inline(always)]
    pub(crate) fn insert(&mut self, value: usize) -> bool {
        if self.contains(value) {
            return false;
        }
        self.grow(value + 1);
        let i = self.len();
        self.dense[i] = value;
        self.sparse[value] = i;
        self.len += 1;
        true
    }

    /// Returns true if and only if this set contains the given value.
    #[inline]
    pub(crate) fn contains(&self, value: usize) -> bool {
        match self.sparse.get(value) {
            None => false,
            Some(&i) => i < self.len() && self.dense[i] == value,
        }
    }

    /// Clear this set such that it has no members.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    /// Returns the heap memory usage, in bytes, used by this sparse set.
    #[inline]
    pub(crate) fn memory_usage(&self) -> usize {
        2 * self.dense.len() * core::mem::size_of::<usize>()
    }
}

impl core::fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let elements = &self.dense[..self.len()];
        f.debug_tuple("SparseSet").field(&elements).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_clear() {
        let mut set = SparseSet::new(0);
        assert_eq!(0, set.len());
        assert!(set.insert(5));
        assert!(!set.insert(5));
        assert!(set.insert(0));
        assert!(set.contains(5));
        assert!(set.contains(0));
        assert!(!set.contains(3));
        assert!(!set.contains(1000));
        assert_eq!(2, set.len());

        set.clear();
        assert!(!set.contains(5));
        assert!(!set.contains(0));
        assert!(set.insert(5));
    }

    #[test]
    fn grow_keeps_members() {
        let mut set = SparseSet::new(4);
        set.insert(2);
        set.insert(3);
        set.grow(100);
        assert!(set.capacity() >= 100);
        assert!(set.contains(2));
        assert!(set.contains(3));
        assert!(!set.contains(50));
        set.insert(99);
        assert!(set.contains(99));
    }
}
