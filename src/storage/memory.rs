use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::Result;

use super::kv::{KeyValueBackend, KvQuoteStore};

/// Process-local backend; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, Option<String>)]) -> Result<()> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            match value {
                Some(value) => {
                    map.insert((*key).to_string(), value.clone());
                }
                None => {
                    map.remove(*key);
                }
            }
        }
        Ok(())
    }
}

pub type MemoryStore = KvQuoteStore<MemoryBackend>;

impl MemoryStore {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }
}
