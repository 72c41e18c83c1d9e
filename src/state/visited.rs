use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Records which targets have already been dispatched
///
/// Implementations guard their own state and are shared between the dispatch
/// loop and any caller holding the engine.
pub trait DuplicateTracker: Send + Sync {
    /// Returns true if `target` has been recorded
    fn is_duplicate(&self, target: &str) -> bool;

    /// Records `target`
    fn mark_as_duplicate(&self, target: &str);

    /// Forgets every recorded target
    fn clear(&self);

    /// Records `target` and returns true if it was not recorded before
    ///
    /// The default composes [`is_duplicate`](Self::is_duplicate) and
    /// [`mark_as_duplicate`](Self::mark_as_duplicate) and is only atomic when
    /// called from a single task. Implementations should override it.
    fn check_and_mark(&self, target: &str) -> bool {
        if self.is_duplicate(target) {
            return false;
        }
        self.mark_as_duplicate(target);
        true
    }
}

/// In-memory duplicate tracker backed by a `HashSet`
#[derive(Debug, Default)]
pub struct MemoryDuplicateTracker {
    seen: Mutex<HashSet<String>>,
}

impl MemoryDuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of recorded targets
    pub fn len(&self) -> usize {
        self.seen().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen().is_empty()
    }

    fn seen(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DuplicateTracker for MemoryDuplicateTracker {
    fn is_duplicate(&self, target: &str) -> bool {
        self.seen().contains(target)
    }

    fn mark_as_duplicate(&self, target: &str) {
        self.seen().insert(target.to_string());
    }

    fn clear(&self) {
        self.seen().clear();
    }

    fn check_and_mark(&self, target: &str) -> bool {
        self.seen().insert(target.to_string())
    }
}
