use std::sync::Arc;

use parking_lot::Mutex;

/// Most recent request failure across all tasks. Each store replaces the
/// previous message.
#[derive(Debug, Default)]
pub struct LastError {
    slot: Mutex<Option<Arc<str>>>,
}

impl LastError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, message: String) {
        let next: Arc<str> = Arc::from(message);
        *self.slot.lock() = Some(next);
    }

    #[must_use]
    pub fn load(&self) -> Option<Arc<str>> {
        self.slot.lock().clone()
    }
}
