//! Singly linked list simulated over a fixed-capacity arena.
//!
//! Node identity is an index into the pool rather than a pointer, and a
//! second chain threaded through the same link field tracks the free
//! slots, so allocation and release are O(1) with no heap traffic after
//! construction.

mod arena;
mod list;

#[cfg(test)]
mod comparisons;

pub use arena::{Arena, ArenaError, SlotIndex};
pub use list::{Iter, ListError, SlotList, Stats};

/// Pool size used by [`SlotList::new`], sized for the classic classroom
/// demonstration this structure comes from.
pub const DEFAULT_CAPACITY: usize = 100;
