//! Ordering helpers and a bounded max-heap shared by every search algorithm.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

/// Wraps a `(payload, key)` pair so that `BinaryHeap` — a max-heap — orders
/// by *ascending* key, i.e. the smallest key is the max-heap's greatest
/// element and therefore sits at the top.
///
/// Used to build min-heaps (the KD best-bin-first search frontier, the
/// ball-tree branch-and-bound frontier) out of `std::collections::BinaryHeap`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MinItem<A>(pub A, pub f64);

impl<A> PartialEq for MinItem<A> {
    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1
    }
}

impl<A> Eq for MinItem<A> {}

impl<A> PartialOrd for MinItem<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for MinItem<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.1.partial_cmp(&self.1).unwrap_or(Ordering::Equal)
    }
}

/// Wraps a `(payload, key)` pair so that `BinaryHeap` orders by *ascending*
/// key the usual way (largest key on top) — a bounded max-heap over
/// distances, used to keep the `k` best (smallest-distance) candidates seen
/// so far: the *worst* of the current top-k sits at the top and is evicted
/// first when a better candidate arrives.
#[derive(Debug, Clone)]
pub(crate) struct MaxItem<A>(pub A, pub f64);

impl<A> PartialEq for MaxItem<A> {
    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1
    }
}

impl<A> Eq for MaxItem<A> {}

impl<A> PartialOrd for MaxItem<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for MaxItem<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1.partial_cmp(&other.1).unwrap_or(Ordering::Equal)
    }
}

/// A max-heap of `(payload, distance)` pairs bounded to at most `k` items.
///
/// Pushing beyond capacity evicts the current worst (largest-distance)
/// item, so the heap always holds the `k` best candidates seen so far.
/// Draining with [`SizedHeap::into_sorted_vec`] yields them in ascending
/// distance order.
#[derive(Debug)]
pub(crate) struct SizedHeap<A> {
    heap: BinaryHeap<MaxItem<A>>,
    k: usize,
}

impl<A> SizedHeap<A> {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k),
            k,
        }
    }

    /// Offers `(payload, distance)` to the heap, evicting the current
    /// worst candidate if the heap is already full and `distance` is
    /// smaller than the worst distance currently held.
    pub(crate) fn push(&mut self, payload: A, distance: f64) {
        if self.heap.len() < self.k {
            self.heap.push(MaxItem(payload, distance));
        } else if let Some(top) = self.heap.peek() {
            if distance < top.1 {
                self.heap.pop();
                self.heap.push(MaxItem(payload, distance));
            }
        }
    }

    /// The distance of the current worst (largest-distance) candidate, if
    /// the heap holds at least one item.
    pub(crate) fn worst_distance(&self) -> Option<f64> {
        self.heap.peek().map(|item| item.1)
    }

    /// Whether the heap has reached its capacity `k`.
    pub(crate) fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Drains the heap into a `Vec` sorted ascending by distance.
    pub(crate) fn into_sorted_vec(self) -> Vec<(A, f64)> {
        let mut items: Vec<_> = self.heap.into_iter().map(|MaxItem(a, d)| (a, d)).collect();
        items.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_heap_keeps_k_smallest() {
        let mut heap = SizedHeap::new(2);
        for (payload, distance) in [("a", 3.0), ("b", 1.0), ("c", 2.0), ("d", 0.5)] {
            heap.push(payload, distance);
        }
        let sorted = heap.into_sorted_vec();
        assert_eq!(sorted.iter().map(|(p, _)| *p).collect::<Vec<_>>(), vec!["d", "b"]);
    }

    #[test]
    fn sized_heap_worst_distance_tracks_eviction_boundary() {
        let mut heap = SizedHeap::new(1);
        heap.push("a", 5.0);
        assert_eq!(heap.worst_distance(), Some(5.0));
        heap.push("b", 1.0);
        assert_eq!(heap.worst_distance(), Some(1.0));
    }
}
