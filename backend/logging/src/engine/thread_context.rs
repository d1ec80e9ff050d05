use std::cell::RefCell;
use std::collections::HashMap;

use lineage_core::ContextStore;

thread_local! {
    static VALUES: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
}

/// Context store backed by a thread-local map.
///
/// Every handle sees the values of the calling thread only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadContext;

impl ThreadContext {
    /// Copy of the calling thread's entries.
    pub fn snapshot(&self) -> HashMap<String, String> {
        VALUES.with(|values| values.borrow().clone())
    }
}

impl ContextStore for ThreadContext {
    fn put(&self, key: &str, value: &str) {
        VALUES.with(|values| {
            values.borrow_mut().insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) {
        VALUES.with(|values| {
            values.borrow_mut().remove(key);
        });
    }

    fn get(&self, key: &str) -> Option<String> {
        VALUES.with(|values| values.borrow().get(key).cloned())
    }
}
