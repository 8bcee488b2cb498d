use std::fmt;

use thiserror::Error;

pub(crate) const NONE: usize = usize::MAX;

/// Opaque index of a slot in the arena.
///
/// Handed out by [`Arena::alloc`] and the list insert operations; useful
/// for diagnostics (the original storage position of a value) and for
/// [`Arena::release`]. Never constructible from a raw integer by callers,
/// so any `SlotIndex` in circulation once referred to a real slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    #[inline(always)]
    pub(crate) fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Position of the slot in the backing pool, in `[0, capacity)`.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("arena exhausted: all {0} slots occupied")]
    OutOfCapacity(usize),
    #[error("slot {0} is not live")]
    InvalidSlot(usize),
}

/// One slot of the pool. The `next` link is shared by both chains: it
/// threads the free chain while the slot is `Vacant` and the live chain
/// while it is `Occupied`. The discriminant is the liveness flag, which is
/// what makes double release detectable instead of corrupting.
#[derive(Debug)]
enum Entry<T> {
    Vacant { next: usize },
    Occupied { value: T, next: usize },
}

/// Fixed-capacity pool with an intrusive free list.
///
/// All slots start vacant, chained `0 -> 1 -> .. -> capacity-1`. `alloc`
/// pops the free head in O(1); `release` pushes the slot back on the free
/// head, so reuse is LIFO. Capacity never changes after construction.
///
/// Links are raw `usize` indices with `usize::MAX` as the "no slot"
/// sentinel; the crate-internal link accessors let [`crate::SlotList`]
/// stitch occupied slots into its own chain through the same field.
#[derive(Debug)]
pub struct Arena<T> {
    entries: Box<[Entry<T>]>,
    free_head: usize,
    len: usize,
}

impl<T> Arena<T> {
    /// Create an arena of `capacity` vacant slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let entries = (0..capacity)
            .map(|i| Entry::Vacant {
                next: if i + 1 < capacity { i + 1 } else { NONE },
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            entries,
            free_head: if capacity > 0 { 0 } else { NONE },
            len: 0,
        }
    }

    /// Drop every live value and rebuild the initial free chain.
    pub fn clear(&mut self) {
        let capacity = self.entries.len();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            *entry = Entry::Vacant {
                next: if i + 1 < capacity { i + 1 } else { NONE },
            };
        }
        self.free_head = if capacity > 0 { 0 } else { NONE };
        self.len = 0;
    }

    /// Pop the free head and store `value` there. The new slot's link is
    /// reset to the sentinel. Fails without mutation when no slot is free.
    pub fn alloc(&mut self, value: T) -> Result<SlotIndex, ArenaError> {
        if self.free_head == NONE {
            return Err(ArenaError::OutOfCapacity(self.capacity()));
        }

        let slot = self.free_head;
        let entry = &mut self.entries[slot];

        let Entry::Vacant { next } = entry else {
            // Free chain pointed at a live slot. Refuse rather than clobber.
            return Err(ArenaError::InvalidSlot(slot));
        };

        self.free_head = *next;
        *entry = Entry::Occupied { value, next: NONE };
        self.len += 1;
        Ok(SlotIndex::new(slot))
    }

    /// Return a live slot to the free chain, moving its value out.
    ///
    /// Out-of-range and already-vacant indices fail with `InvalidSlot`;
    /// the free chain is never touched on failure.
    pub fn release(&mut self, slot: SlotIndex) -> Result<T, ArenaError> {
        let raw = slot.index();
        let entry = self
            .entries
            .get_mut(raw)
            .ok_or(ArenaError::InvalidSlot(raw))?;

        if matches!(entry, Entry::Vacant { .. }) {
            return Err(ArenaError::InvalidSlot(raw));
        }

        let old = std::mem::replace(
            entry,
            Entry::Vacant {
                next: self.free_head,
            },
        );
        self.free_head = raw;
        self.len -= 1;

        match old {
            Entry::Occupied { value, .. } => Ok(value),
            Entry::Vacant { .. } => unreachable!("occupancy checked above"),
        }
    }

    /// Value stored at `slot`, or `None` if the slot is vacant or out of
    /// range.
    #[inline(always)]
    pub fn get(&self, slot: SlotIndex) -> Option<&T> {
        match self.entries.get(slot.index()) {
            Some(Entry::Occupied { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Free slot indices in free-chain order (the order `alloc` will hand
    /// them out). Walk is bounded by capacity.
    pub fn free_slots(&self) -> Vec<SlotIndex> {
        let mut slots = Vec::with_capacity(self.free_len());
        let mut cur = self.free_head;

        for _ in 0..self.capacity() {
            if cur == NONE {
                break;
            }
            slots.push(SlotIndex::new(cur));
            cur = self.next_of(cur);
        }

        slots
    }

    #[inline(always)]
    pub fn free_head(&self) -> Option<SlotIndex> {
        (self.free_head != NONE).then(|| SlotIndex::new(self.free_head))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn free_len(&self) -> usize {
        self.capacity() - self.len
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity()
    }

    /// Link field of `slot`, regardless of which chain it is on.
    #[inline(always)]
    pub(crate) fn next_of(&self, slot: usize) -> usize {
        debug_assert!(slot < self.capacity(), "slot {slot} out of bounds");

        match &self.entries[slot] {
            Entry::Vacant { next } => *next,
            Entry::Occupied { next, .. } => *next,
        }
    }

    /// Point a live slot's link at `to` (`NONE` for end of chain).
    #[inline(always)]
    pub(crate) fn set_next(&mut self, slot: usize, to: usize) {
        debug_assert!(slot < self.capacity(), "slot {slot} out of bounds");

        match &mut self.entries[slot] {
            Entry::Occupied { next, .. } => *next = to,
            Entry::Vacant { .. } => debug_assert!(false, "slot {slot} not live"),
        }
    }

    /// Value of a live slot by raw index, `None` if vacant.
    #[inline(always)]
    pub(crate) fn value_of(&self, slot: usize) -> Option<&T> {
        debug_assert!(slot < self.capacity(), "slot {slot} out of bounds");

        match &self.entries[slot] {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }
}
