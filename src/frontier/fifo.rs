use crate::frontier::{AddressRecord, FrontierQueue};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory first-in first-out queue
#[derive(Debug, Default)]
pub struct FifoQueue {
    records: Mutex<VecDeque<AddressRecord>>,
}

impl FifoQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, VecDeque<AddressRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrontierQueue for FifoQueue {
    fn push(&self, record: AddressRecord) {
        self.records().push_back(record);
    }

    fn pop(&self) -> Option<AddressRecord> {
        self.records().pop_front()
    }

    fn len(&self) -> usize {
        self.records().len()
    }

    fn clear(&self) {
        self.records().clear();
    }
}
