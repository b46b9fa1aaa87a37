use latewarp_geometry::AffineMatrix;

use crate::meta::ResampleMeta;

/// One deferred geometric operation: a matrix increment plus the
/// resample parameters the operation was configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    /// The operation's affine increment.
    pub matrix: AffineMatrix,
    /// The operation's resample parameters.
    pub meta: ResampleMeta,
}

/// An append-only ordered list of deferred operations.
///
/// Entries are never reordered; the oldest entry's geometric effect is
/// applied first when the queue is flushed. The queue is exclusively
/// owned by one [`crate::NdImage`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingQueue {
    entries: Vec<PendingEntry>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. O(1); depth is unbounded.
    pub fn push(&mut self, entry: PendingEntry) {
        self.entries.push(entry);
    }

    /// Read the most recently pushed entry without removing it.
    pub fn peek_last(&self) -> Option<&PendingEntry> {
        self.entries.last()
    }

    /// Remove all entries after a flush.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, PendingEntry> {
        self.entries.iter()
    }

    /// Consume the queue, yielding entries oldest first.
    pub fn into_entries(self) -> Vec<PendingEntry> {
        self.entries
    }
}
