use std::cmp::min;
use std::fmt::Debug;

use crate::derank::derank;

const HEAP_ARITY: usize = 4usize;
#[inline(always)]
#[must_use]
fn up(i: usize) -> usize {
    crate::heap_primitives::index_parent::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_left(i: usize) -> usize {
    crate::heap_primitives::index_first_children::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_right(i: usize) -> usize {
    crate::heap_primitives::index_last_children::<HEAP_ARITY>(i)
}

/// The Open list (Frontier) of a best-first search.
///
/// A min-heap that never re-ranks its entries. Searches push a fresh entry
/// whenever they find a cheaper way to a state, and skip entries for states
/// that got closed in the meantime when popping them ("lazy deletion").
///
/// Besides the entries it tracks the largest size it ever had.
#[derive(Debug)]
pub struct OpenList<N>
where
    N: Debug + Ord,
{
    heap: Vec<N>,
    peak_len: usize,
}

impl<N> OpenList<N>
where
    N: Debug + Ord,
{
    pub fn new() -> Self {
        Self {
            heap: vec![],
            peak_len: 0,
        }
    }
    pub fn with_capacity(s: usize) -> Self {
        Self {
            heap: Vec::with_capacity(s),
            peak_len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }
    /// Largest number of entries held at once.
    pub fn peak_len(&self) -> usize {
        self.peak_len
    }

    pub fn peek(&self) -> Option<&N> {
        self.heap.first()
    }

    pub fn push(&mut self, n: N) {
        self.verify_heap();

        let heap_index = self.heap.len();
        self.heap.push(n);
        self.peak_len = self.peak_len.max(self.heap.len());
        self.sift_up(heap_index);

        self.verify_heap();
    }

    pub fn pop(&mut self) -> Option<N> {
        self.verify_heap();

        let len = self.heap.len();
        if len <= 1 {
            return self.heap.pop();
        }

        // Move the best entry to the end, pop it, and fix the new root.
        self.heap.swap(0, len - 1);
        let best = self.heap.pop();
        self.sift_down(0);

        self.verify_heap();
        best
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap(&self) {
        // All good... (hopefully)
    }

    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap(&self) {
        // Every entry goes after its parent, if any.
        for i in 1..self.heap.len() {
            let p = up(i);
            debug_assert!(
                self.heap[p] <= self.heap[i],
                "Node[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }

    /// Raises an entry
    /// Returns it's new index
    #[inline(always)]
    fn sift_up(&mut self, index: usize) -> usize {
        debug_assert!(index < self.heap.len(), "Index out of bounds...");

        let mut pos = index;
        while pos > 0 {
            let parent = up(pos);
            if self.heap[parent] <= self.heap[pos] {
                break;
            }
            self.heap.swap(parent, pos);
            pos = parent;
        }
        pos
    }

    /// Lowers an entry
    /// Returns it's new index
    #[inline(always)]
    fn sift_down(&mut self, mut index: usize) -> usize {
        let len = self.heap.len();
        if len == 0 {
            return index;
        }
        debug_assert!(index < len, "Index out of bounds...");

        loop {
            // Find the best child
            let mut child = down_left(index);
            if child >= len {
                break;
            }
            debug_assert_eq!(child + HEAP_ARITY, down_right(index) + 1);
            child += derank(&self.heap[child..min(child + HEAP_ARITY, len)]);

            if self.heap[index] <= self.heap[child] {
                break;
            }

            self.heap.swap(index, child);
            debug_assert!(self.heap[index] <= self.heap[child]);

            index = child;
        }
        index
    }
}

impl<N> Default for OpenList<N>
where
    N: Debug + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}
