/// Cursor clock
///
/// Cursor broadcasts are ephemeral and high-frequency, so ordering uses a
/// single monotonically increasing counter per participant instead of a
/// vector clock. A receiver keeps the highest value seen per sender and drops
/// anything older.
use std::cell::Cell;

/// Monotonic counter stamping outbound cursor updates.
///
/// Owned by one bridge on the buffer's thread, hence `Cell` rather than an
/// atomic.
#[derive(Debug, Default, Clone)]
pub struct IncreasingClock {
    value: Cell<u64>,
}

impl IncreasingClock {
    /// Create a new clock starting at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the new value.
    pub fn tick(&self) -> u64 {
        let next = self.value.get() + 1;
        self.value.set(next);
        next
    }

    pub fn get(&self) -> u64 {
        self.value.get()
    }

    /// Fold in a value seen on the wire so later ticks stay ahead of it.
    pub fn observe(&self, remote: u64) {
        if remote > self.value.get() {
            self.value.set(remote);
        }
    }
}
