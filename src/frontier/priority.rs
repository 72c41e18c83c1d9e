use crate::frontier::{AddressRecord, FrontierQueue};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A record queued with its insertion sequence
#[derive(Debug)]
struct QueuedRecord {
    record: AddressRecord,
    sequence: u64,
}

// BinaryHeap is a max-heap: the shallowest, earliest record must compare greatest
impl Ord for QueuedRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .record
            .depth
            .cmp(&self.record.depth)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for QueuedRecord {}

#[derive(Debug, Default)]
struct Heap {
    records: BinaryHeap<QueuedRecord>,
    next_sequence: u64,
}

/// Priority queue that always yields the shallowest record
///
/// Records at equal depth come out in insertion order, so dispatch stays
/// strictly breadth-first even when workers at different depths push
/// concurrently.
#[derive(Debug, Default)]
pub struct DepthPriorityQueue {
    heap: Mutex<Heap>,
}

impl DepthPriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn heap(&self) -> MutexGuard<'_, Heap> {
        self.heap.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrontierQueue for DepthPriorityQueue {
    fn push(&self, record: AddressRecord) {
        let mut heap = self.heap();
        let sequence = heap.next_sequence;
        heap.next_sequence += 1;
        heap.records.push(QueuedRecord { record, sequence });
    }

    fn pop(&self) -> Option<AddressRecord> {
        self.heap().records.pop().map(|queued| queued.record)
    }

    fn len(&self) -> usize {
        self.heap().records.len()
    }

    fn clear(&self) {
        self.heap().records.clear();
    }
}
