use super::KvSlot;
use crate::error::{Result, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Process-local slot. Nothing survives the process, but a store can be
/// dropped and reopened over the same `Arc<MemorySlot>` to simulate a reload.
#[derive(Debug, Default)]
pub struct MemorySlot {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl KvSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Storage("memory slot lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Storage("memory slot lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
