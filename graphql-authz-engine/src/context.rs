//! Per-request context.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Request-scoped values handed to every resolver.
///
/// Entries are keyed by well-known `&'static str` keys and stored behind
/// `Arc`, so a context can be shared by concurrently resolving fields.
#[derive(Clone, Default)]
pub struct Context {
    entries: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<T: Any + Send + Sync>(mut self, key: &'static str, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, replacing any previous value under `key`.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: &'static str, value: T) {
        self.entries.insert(key, Arc::new(value));
    }

    /// Get the value under `key` if it exists and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        let entry = self.entries.get(key)?;
        (**entry).downcast_ref::<T>()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}
