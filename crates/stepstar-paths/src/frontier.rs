use std::cmp::Ordering;
use std::collections::BinaryHeap;

use stepstar_core::{Cell, Grid};

/// Where a cell stands relative to the frontier.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Membership {
    #[default]
    Unseen,
    Open,
    Closed,
}

// ---------------------------------------------------------------------------
// Priority-queue entry
// ---------------------------------------------------------------------------

/// Snapshot of an open cell's priority, ordered for `BinaryHeap`.
///
/// Key: lowest `f`, then lowest `h`, then earliest entry into the open set.
/// `g` is kept to recognise entries made stale by a later improvement.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: f64,
    pub(crate) h: f64,
    pub(crate) g: i32,
    pub(crate) seq: u64,
}

impl NodeRef {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then(self.h.total_cmp(&other.h))
            .then(self.seq.cmp(&other.seq))
    }
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops the smallest key first.
        other.key_cmp(self)
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

/// Open/closed bookkeeping for one search.
///
/// Membership is one value per cell, so a cell can never be open and closed
/// at once. The heap may hold outdated entries for cells whose distance has
/// since improved; they are skipped when popped.
#[derive(Clone, Debug)]
pub(crate) struct Frontier {
    membership: Vec<Membership>,
    seq: Vec<u64>,
    heap: BinaryHeap<NodeRef>,
    next_seq: u64,
    open_len: usize,
    pub(crate) expansions: Vec<usize>,
    pub(crate) solved: bool,
}

impl Frontier {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            membership: vec![Membership::Unseen; len],
            seq: vec![0; len],
            heap: BinaryHeap::new(),
            next_seq: 0,
            open_len: 0,
            expansions: Vec::new(),
            solved: false,
        }
    }

    /// Back to `{open: {start}, closed: {}, solved: false}`.
    pub(crate) fn reset(&mut self, grid: &Grid) {
        self.membership.clear();
        self.membership.resize(grid.len(), Membership::Unseen);
        self.seq.clear();
        self.seq.resize(grid.len(), 0);
        self.heap.clear();
        self.next_seq = 0;
        self.open_len = 0;
        self.expansions.clear();
        self.solved = false;
        let start = grid.start_idx();
        self.open(start, grid.cell(start), true);
    }

    #[inline]
    pub(crate) fn membership(&self, idx: usize) -> Membership {
        self.membership[idx]
    }

    #[inline]
    pub(crate) fn is_closed(&self, idx: usize) -> bool {
        self.membership[idx] == Membership::Closed
    }

    #[inline]
    pub(crate) fn open_len(&self) -> usize {
        self.open_len
    }

    #[inline]
    pub(crate) fn closed_len(&self) -> usize {
        self.expansions.len()
    }

    /// Add `idx` to the open set. Re-adding an open cell only queues a new
    /// entry when its distance `improved`.
    pub(crate) fn open(&mut self, idx: usize, cell: &Cell, improved: bool) {
        debug_assert_ne!(
            self.membership[idx],
            Membership::Closed,
            "cell {idx} reopened after being closed"
        );
        match self.membership[idx] {
            Membership::Closed => return,
            Membership::Open if !improved => return,
            Membership::Open => {}
            Membership::Unseen => {
                self.membership[idx] = Membership::Open;
                self.seq[idx] = self.next_seq;
                self.next_seq += 1;
                self.open_len += 1;
            }
        }
        self.heap.push(NodeRef {
            idx,
            f: cell.total(),
            h: cell.distance_to_end(),
            g: cell.distance_from_start(),
            seq: self.seq[idx],
        });
    }

    /// Remove and return the best open cell, skipping outdated entries.
    pub(crate) fn pop_best(&mut self, grid: &Grid) -> Option<usize> {
        while let Some(top) = self.heap.pop() {
            if self.membership[top.idx] != Membership::Open {
                continue;
            }
            if grid.cell(top.idx).distance_from_start() != top.g {
                continue;
            }
            return Some(top.idx);
        }
        debug_assert_eq!(self.open_len, 0, "open cells missing from the queue");
        None
    }

    /// Move `idx` from open to closed.
    pub(crate) fn close(&mut self, idx: usize) {
        debug_assert_eq!(self.membership[idx], Membership::Open);
        self.membership[idx] = Membership::Closed;
        self.open_len -= 1;
        self.expansions.push(idx);
    }
}
