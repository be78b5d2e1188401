use alloc::vec::Vec;

use crate::syntax::unicode;

/// A set of characters represented by a sorted sequence of non-overlapping,
/// non-adjacent inclusive ranges.
///
/// Every operation that produces a new set leaves it in this canonical form,
/// so two sets are equal if and only if they contain the same characters.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ClassSet {
    ranges: Vec<ClassRange>,
}

/// A single inclusive range of characters.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClassRange {
    start: char,
    end: char,
}

impl ClassRange {
    /// Create a new range. If `start > end`, the bounds are swapped.
    pub fn new(start: char, end: char) -> ClassRange {
        if start <= end {
            ClassRange { start, end }
        } else {
            ClassRange { start: end, end: start }
        }
    }

    /// The first character in this range.
    pub fn start(&self) -> char {
        self.start
    }

    /// The last character in this range.
    pub fn end(&self) -> char {
        self.end
    }

    /// The number of characters in this range.
    pub fn len(&self) -> usize {
        let len = self.end as u32 - self.start as u32 + 1;
        // Ranges never end inside the surrogate block, but they may span it.
        if self.start <= '\u{D7FF}' && self.end >= '\u{E000}' {
            (len - 0x800) as usize
        } else {
            len as usize
        }
    }
}

impl ClassSet {
    /// Create a new set from the given ranges, which may be in any order and
    /// may overlap.
    pub fn new<I: IntoIterator<Item = ClassRange>>(ranges: I) -> ClassSet {
        let mut set = ClassSet { ranges: ranges.into_iter().collect() };
        set.compact();
        set
    }

    /// Create an empty set.
    pub fn empty() -> ClassSet {
        ClassSet { ranges: Vec::new() }
    }

    /// Create a set containing every character.
    pub fn full() -> ClassSet {
        ClassSet { ranges: vec![ClassRange::new('\0', char::MAX)] }
    }

    /// Create a set containing exactly one character.
    pub fn single(ch: char) -> ClassSet {
        ClassSet { ranges: vec![ClassRange::new(ch, ch)] }
    }

    /// The ranges in this set, in ascending order.
    pub fn ranges(&self) -> &[ClassRange] {
        &self.ranges
    }

    /// Returns true if and only if this set contains no characters.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The number of characters in this set.
    pub fn len(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    /// Add a range of characters to this set.
    pub fn push_range(&mut self, start: char, end: char) {
        self.ranges.push(ClassRange::new(start, end));
        self.compact();
    }

    /// Add a single character to this set.
    pub fn push_char(&mut self, ch: char) {
        self.push_range(ch, ch);
    }

    /// Add every character of `other` to this set.
    pub fn union(&mut self, other: &ClassSet) {
        self.ranges.extend_from_slice(&other.ranges);
        self.compact();
    }

    /// Remove every character not in `other` from this set.
    pub fn intersect(&mut self, other: &ClassSet) {
        let mut negated = other.clone();
        negated.negate();
        self.subtract(&negated);
    }

    /// Remove every character of `other` from this set.
    pub fn subtract(&mut self, other: &ClassSet) {
        let mut result = Vec::with_capacity(self.ranges.len());
        let mut theirs = other.ranges.iter().peekable();
        for &ours in &self.ranges {
            let mut cur = Some(ours);
            while let (Some(r), Some(&&sub)) = (cur, theirs.peek()) {
                if sub.end < r.start {
                    theirs.next();
                    continue;
                }
                if sub.start > r.end {
                    break;
                }
                if sub.start > r.start {
                    if let Some(before) = unicode::decrement(sub.start) {
                        result.push(ClassRange::new(r.start, before));
                    }
                }
                cur = if sub.end < r.end {
                    unicode::increment(sub.end)
                        .map(|after| ClassRange::new(after, r.end))
                } else {
                    None
                };
                if sub.end <= r.end {
                    theirs.next();
                } else {
                    break;
                }
            }
            if let Some(r) = cur {
                result.push(r);
            }
        }
        self.ranges = result;
    }

    /// Replace this set with its complement.
    pub fn negate(&mut self) {
        let mut result = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = Some('\0');
        for r in &self.ranges {
            if let Some(start) = next {
                if start < r.start {
                    if let Some(end) = unicode::decrement(r.start) {
                        result.push(ClassRange::new(start, end));
                    }
                }
            }
            next = unicode::increment(r.end);
        }
        if let Some(start) = next {
            result.push(ClassRange::new(start, char::MAX));
        }
        self.ranges = result;
    }

    /// Sort the ranges and merge adjacent or overlapping ones.
    pub fn compact(&mut self) {
        if self.ranges.len() <= 1 {
            return;
        }
        self.ranges.sort();
        let mut merged: Vec<ClassRange> = Vec::with_capacity(self.ranges.len());
        for &r in &self.ranges {
            if let Some(last) = merged.last_mut() {
                let touches = match unicode::increment(last.end) {
                    None => true,
                    Some(after) => r.start <= after,
                };
                if touches {
                    if r.end > last.end {
                        last.end = r.end;
                    }
                    continue;
                }
            }
            merged.push(r);
        }
        self.ranges = merged;
    }

    /// Returns true if and only if this set contains the given character.
    pub fn contains(&self, ch: char) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if r.end < ch {
                    core::cmp::Ordering::Less
                } else if r.start > ch {
                    core::cmp::Ordering::Greater
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Returns the closure of this set under simple case folding: every
    /// member along with every character that has the same fold key as some
    /// member.
    ///
    /// Matching a character against the closure gives the same answer as
    /// comparing it to each member with case folding.
    pub fn case_fold(&self) -> ClassSet {
        let pairs = unicode::case_fold_pairs();
        let mut keys: Vec<char> = pairs
            .iter()
            .filter(|&&(key, ch)| self.contains(key) || self.contains(ch))
            .map(|&(key, _)| key)
            .collect();
        keys.dedup();
        let mut folded = self.clone();
        for key in keys {
            folded.ranges.push(ClassRange::new(key, key));
            let at = pairs.partition_point(|&(k, _)| k < key);
            for &(_, ch) in pairs[at..].iter().take_while(|&&(k, _)| k == key) {
                folded.ranges.push(ClassRange::new(ch, ch));
            }
        }
        folded.compact();
        folded
    }
}
