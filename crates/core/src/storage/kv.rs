//! Key-value persistence collaborator

use std::collections::BTreeMap;

use crate::error::Result;

/// String blobs stored under string keys.
///
/// One logical writer is assumed; there is no locking or versioning.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    fn clear(&mut self, key: &str) -> Result<()>;

    fn clear_all(&mut self) -> Result<()>;

    /// Writes several keys. The default writes them one by one, so a failure
    /// part way leaves the earlier keys written.
    fn write_batch(&mut self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.write(key, value)?;
        }
        Ok(())
    }
}

/// In-process store, lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_read_write_clear() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read("a").unwrap(), None);

        store.write("a", "1").unwrap();
        store.write_batch(&[("b", "2".to_string()), ("c", "3".to_string())]).unwrap();
        assert_eq!(store.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.len(), 3);

        store.clear("a").unwrap();
        assert_eq!(store.read("a").unwrap(), None);

        store.clear_all().unwrap();
        assert!(store.is_empty());
    }
}
