//! Slot arena for index-linked tree nodes.
//!
//! Nodes of the Red-Black tree and the B-tree live in an `Arena` and refer to
//! each other by slot index, so parent back-references never form ownership
//! cycles. Freed slots are threaded onto a free list and handed out again by
//! the next allocation.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

/// A growable table of values addressed by stable indices.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    /// Head of the free list threaded through vacant slots.
    free_head: Option<usize>,
    /// Number of occupied slots.
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Create an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    /// Store a value, reusing a freed slot when one is available.
    pub fn allocate(&mut self, value: T) -> usize {
        self.live += 1;
        if let Some(index) = self.free_head {
            if let Slot::Vacant { next_free } = &self.slots[index] {
                self.free_head = *next_free;
            }
            self.slots[index] = Slot::Occupied(value);
            return index;
        }
        self.slots.push(Slot::Occupied(value));
        self.slots.len() - 1
    }

    /// Release a slot, returning its value.
    ///
    /// # Panics
    ///
    /// Panics if the slot is out of range or already free. A tree only frees
    /// slots it allocated, so either case is a bug in the tree.
    pub fn free(&mut self, index: usize) -> T {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied(value) => {
                self.free_head = Some(index);
                self.live -= 1;
                value
            }
            Slot::Vacant { next_free } => {
                self.slots[index] = Slot::Vacant { next_free };
                panic!("arena slot {index} is already free");
            }
        }
    }

    /// Get a value by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        match self.slots.get(index) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Number of occupied slots.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Drop every value and forget all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.live = 0;
    }
}

impl<T> Index<usize> for Arena<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match &self.slots[index] {
            Slot::Occupied(value) => value,
            Slot::Vacant { .. } => panic!("arena slot {index} is vacant"),
        }
    }
}

impl<T> IndexMut<usize> for Arena<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match &mut self.slots[index] {
            Slot::Occupied(value) => value,
            Slot::Vacant { .. } => panic!("arena slot {index} is vacant"),
        }
    }
}
