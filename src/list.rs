use thiserror::Error;

use crate::arena::{Arena, ArenaError, SlotIndex, NONE};
use crate::DEFAULT_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("list full: all {0} slots occupied")]
    OutOfCapacity(usize),
    #[error("value not found in list")]
    ValueNotFound,
    #[error("slot {0} is not live")]
    InvalidSlot(usize),
    #[error("chain walk exceeded {0} steps without reaching the end")]
    CorruptState(usize),
}

impl From<ArenaError> for ListError {
    fn from(err: ArenaError) -> Self {
        match err {
            ArenaError::OutOfCapacity(capacity) => ListError::OutOfCapacity(capacity),
            ArenaError::InvalidSlot(slot) => ListError::InvalidSlot(slot),
        }
    }
}

/// Snapshot of pool occupancy, as reported by [`SlotList::stats`].
///
/// `live + free == capacity` holds for every reachable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub capacity: usize,
    pub live: usize,
    pub free: usize,
    pub head: Option<SlotIndex>,
    pub free_head: Option<SlotIndex>,
    /// Free slot indices in free-chain order.
    pub free_slots: Vec<SlotIndex>,
}

/// Singly linked list over a fixed-capacity [`Arena`].
///
/// Occupied slots form the live chain starting at `head`; vacant slots
/// form the arena's free chain. Every slot is on exactly one of the two
/// chains at any time, so the list never allocates after construction.
///
/// Search operations compare payloads with `PartialEq` and stop at the
/// first match in list order, which makes behavior on duplicates
/// deterministic: the earliest occurrence wins.
///
/// Failing operations leave the list untouched: `push_back` and
/// `insert_after` resolve their target position before taking a slot from
/// the free chain, and `remove` releases a slot only after unlinking it.
///
/// Every chain walk is bounded by capacity. A walk that exceeds the bound
/// reports [`ListError::CorruptState`] instead of spinning, though no safe
/// use of this API can produce such a chain.
#[derive(Debug)]
pub struct SlotList<T> {
    arena: Arena<T>,
    head: usize,
}

impl<T> SlotList<T> {
    /// Create a list with `capacity` slots, all free.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            head: NONE,
        }
    }

    /// Create a list with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Drop every element and rebuild the initial free chain. Capacity is
    /// unchanged.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = NONE;
    }

    /// Insert at the front of the list. O(1).
    ///
    /// Returns the slot the value landed in.
    pub fn push_front(&mut self, value: T) -> Result<SlotIndex, ListError> {
        let slot = self.arena.alloc(value)?;
        self.arena.set_next(slot.index(), self.head);
        self.head = slot.index();
        Ok(slot)
    }

    /// Insert at the back of the list. O(len).
    ///
    /// The tail is located before a slot is taken, so running out of
    /// capacity leaves the list unchanged.
    pub fn push_back(&mut self, value: T) -> Result<SlotIndex, ListError> {
        let tail = self.tail()?;
        let slot = self.arena.alloc(value)?;

        match tail {
            Some(tail) => self.arena.set_next(tail, slot.index()),
            None => self.head = slot.index(),
        }

        Ok(slot)
    }

    /// Splice `value` in immediately after the first occurrence of
    /// `needle`.
    ///
    /// `ValueNotFound` is reported before any allocation is attempted; a
    /// full pool with a matching needle reports `OutOfCapacity`. Either
    /// way the list is unchanged on failure.
    pub fn insert_after(&mut self, needle: &T, value: T) -> Result<SlotIndex, ListError>
    where
        T: PartialEq,
    {
        let (_, at) = self.find(needle)?;
        let slot = self.arena.alloc(value)?;

        let follow = self.arena.next_of(at.index());
        self.arena.set_next(slot.index(), follow);
        self.arena.set_next(at.index(), slot.index());
        Ok(slot)
    }

    /// Unlink the first occurrence of `needle` and return its slot to the
    /// free chain.
    ///
    /// Returns the freed slot index for diagnostics.
    pub fn remove(&mut self, needle: &T) -> Result<SlotIndex, ListError>
    where
        T: PartialEq,
    {
        let mut prev = NONE;
        let mut cur = self.head;

        for _ in 0..self.capacity() {
            if cur == NONE {
                return Err(ListError::ValueNotFound);
            }

            let Some(value) = self.arena.value_of(cur) else {
                return Err(ListError::CorruptState(self.capacity()));
            };

            if *value == *needle {
                let follow = self.arena.next_of(cur);
                if prev == NONE {
                    self.head = follow;
                } else {
                    self.arena.set_next(prev, follow);
                }

                let slot = SlotIndex::new(cur);
                self.arena.release(slot)?;
                return Ok(slot);
            }

            prev = cur;
            cur = self.arena.next_of(cur);
        }

        if cur == NONE {
            Err(ListError::ValueNotFound)
        } else {
            Err(ListError::CorruptState(self.capacity()))
        }
    }

    /// Locate the first occurrence of `needle`.
    ///
    /// Returns the 1-based logical position in the list together with the
    /// slot index holding the value.
    pub fn find(&self, needle: &T) -> Result<(usize, SlotIndex), ListError>
    where
        T: PartialEq,
    {
        let mut position = 0;

        for entry in self.iter() {
            let (slot, value) = entry?;
            position += 1;
            if *value == *needle {
                return Ok((position, slot));
            }
        }

        Err(ListError::ValueNotFound)
    }

    /// Iterate over `(slot, value)` pairs in list order.
    ///
    /// Lazy and restartable; each call starts a fresh walk from the head.
    /// The iterator fuses after yielding an error.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cur: self.head,
            steps: 0,
        }
    }

    /// Occupancy snapshot. `live + free == capacity` always.
    pub fn stats(&self) -> Stats {
        Stats {
            capacity: self.capacity(),
            live: self.len(),
            free: self.arena.free_len(),
            head: self.head(),
            free_head: self.arena.free_head(),
            free_slots: self.arena.free_slots(),
        }
    }

    #[inline(always)]
    pub fn head(&self) -> Option<SlotIndex> {
        (self.head != NONE).then(|| SlotIndex::new(self.head))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.arena.is_full()
    }

    /// Last live slot, or `None` for an empty list. Bounded walk.
    fn tail(&self) -> Result<Option<usize>, ListError> {
        if self.head == NONE {
            return Ok(None);
        }

        let mut cur = self.head;
        for _ in 0..self.capacity() {
            let next = self.arena.next_of(cur);
            if next == NONE {
                return Ok(Some(cur));
            }
            cur = next;
        }

        Err(ListError::CorruptState(self.capacity()))
    }
}

impl<T> Default for SlotList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Live-chain iterator, created by [`SlotList::iter`].
pub struct Iter<'a, T> {
    list: &'a SlotList<T>,
    cur: usize,
    steps: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = Result<(SlotIndex, &'a T), ListError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NONE {
            return None;
        }

        // Cycle guard: a well-formed chain has at most capacity nodes.
        if self.steps >= self.list.capacity() {
            self.cur = NONE;
            return Some(Err(ListError::CorruptState(self.list.capacity())));
        }

        let slot = self.cur;
        let Some(value) = self.list.arena.value_of(slot) else {
            self.cur = NONE;
            return Some(Err(ListError::CorruptState(self.list.capacity())));
        };

        self.steps += 1;
        self.cur = self.list.arena.next_of(slot);
        Some(Ok((SlotIndex::new(slot), value)))
    }
}

impl<'a, T> IntoIterator for &'a SlotList<T> {
    type Item = Result<(SlotIndex, &'a T), ListError>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
