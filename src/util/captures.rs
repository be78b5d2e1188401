/*!
Provides the [`Captures`] type, which records the offsets of each capturing
group for a single match.

Groups are numbered by the position of their opening parenthesis, starting
at `1`. Group `0` always corresponds to the overall match. A group that did
not participate in a match is unset, which is distinct from a group that
matched the empty string.
*/

use alloc::vec::Vec;

use crate::util::{primitives::NonMaxUsize, search::Span};

/// The span offsets of capturing groups after a match has been found.
///
/// Internally, this stores two "slots" per group: its start and end offset.
/// A slot is `None` when its group did not participate in the match.
///
/// A `Captures` value is usually created with
/// [`Regex::create_captures`](crate::Regex::create_captures), which sizes it
/// for the regex's groups. A value of any size may be passed to a search: it
/// is resized to fit the regex first.
///
/// # Example
///
/// ```
/// use xml_regex::{Regex, Span};
///
/// let re = Regex::new("(a)(b)?")?;
/// let mut caps = re.create_captures();
/// assert!(re.captures("a", &mut caps));
/// assert_eq!(Some(Span::from(0..1)), caps.get_group(0));
/// assert_eq!(Some(Span::from(0..1)), caps.get_group(1));
/// // Group 2 did not participate, so it is unset.
/// assert_eq!(None, caps.get_group(2));
/// assert_eq!(None, caps.start(2));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Captures {
    slots: Vec<Option<NonMaxUsize>>,
}

impl Captures {
    /// Create a new empty set of captures.
    ///
    /// It has no groups until it is used in a search.
    pub fn new() -> Captures {
        Captures { slots: Vec::new() }
    }

    /// Create a set of captures for a pattern with `group_len` groups
    /// (including group `0`), all unset.
    pub fn with_group_len(group_len: usize) -> Captures {
        let mut caps = Captures::new();
        caps.reset(group_len);
        caps
    }

    /// Returns true if and only if this records a match. That is, if group
    /// `0` is set.
    pub fn is_match(&self) -> bool {
        self.get_group(0).is_some()
    }

    /// Returns the span of the overall match, if any.
    pub fn get_match(&self) -> Option<Span> {
        self.get_group(0)
    }

    /// Returns the number of groups, including group `0`.
    pub fn group_len(&self) -> usize {
        self.slots.len() / 2
    }

    /// Returns the span of the given group, or `None` if the group did not
    /// participate in the match or does not exist.
    pub fn get_group(&self, index: usize) -> Option<Span> {
        let start = self.start(index)?;
        let end = self.end(index)?;
        Some(Span { start, end })
    }

    /// Returns the start offset of the given group, or `None` if it is
    /// unset.
    pub fn start(&self, index: usize) -> Option<usize> {
        self.slot(index.checked_mul(2)?)
    }

    /// Returns the end offset of the given group, or `None` if it is unset.
    pub fn end(&self, index: usize) -> Option<usize> {
        self.slot(index.checked_mul(2)?.checked_add(1)?)
    }

    /// Returns an iterator over the span of every group, in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<Span>> + '_ {
        (0..self.group_len()).map(move |i| self.get_group(i))
    }

    fn slot(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).copied().flatten().map(|s| s.get())
    }

    /// Resize to `group_len` groups and unset all of them.
    pub(crate) fn reset(&mut self, group_len: usize) {
        self.slots.clear();
        self.slots.resize(group_len * 2, None);
    }

    /// Unset every group, keeping the size.
    pub(crate) fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Option<NonMaxUsize>] {
        &mut self.slots
    }

    pub(crate) fn set_group(&mut self, index: usize, span: Span) {
        self.slots[index * 2] = NonMaxUsize::new(span.start);
        self.slots[index * 2 + 1] = NonMaxUsize::new(span.end);
    }
}
