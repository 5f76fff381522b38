use tokio::sync::Mutex;

use crate::unit::DeliveryUnit;

/// FIFO buffer of units waiting for the next flush.
///
/// Memory only: whatever is pending when the process exits is lost.
#[derive(Debug, Default)]
pub struct PendingQueue {
    units: Mutex<Vec<DeliveryUnit>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append units in order under a single lock, so the units of one event
    /// are never split across two flushes. Returns the queue length after
    /// the append.
    pub async fn append(&self, units: impl IntoIterator<Item = DeliveryUnit>) -> usize {
        let mut pending = self.units.lock().await;
        pending.extend(units);
        pending.len()
    }

    /// Take everything queued so far and leave the queue empty.
    ///
    /// Appends that land after this returns belong to the next drain.
    pub async fn drain_all(&self) -> Vec<DeliveryUnit> {
        std::mem::take(&mut *self.units.lock().await)
    }

    pub async fn len(&self) -> usize {
        self.units.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.units.lock().await.is_empty()
    }
}
