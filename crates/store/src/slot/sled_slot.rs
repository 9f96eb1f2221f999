use super::KvSlot;
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;

const SLOTS_TREE: &str = "slots";

/// On-disk slot backed by a sled database.
pub struct SledSlot {
    db: sled::Db,
}

impl SledSlot {
    pub fn open(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let db = sled::open(path.as_ref())?;
        tracing::debug!(path=%path.as_ref().display(), "opened sled slot");
        Ok(Arc::new(Self { db }))
    }

    fn slots_tree(&self) -> Result<sled::Tree> {
        Ok(self.db.open_tree(SLOTS_TREE)?)
    }
}

impl KvSlot for SledSlot {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let slots = self.slots_tree()?;
        Ok(slots.get(key.as_bytes())?.map(|bytes| bytes.to_vec()))
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        let slots = self.slots_tree()?;
        slots.insert(key.as_bytes(), value)?;
        slots.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        {
            let slot = SledSlot::open(&path).unwrap();
            slot.write("boletos", b"[]").unwrap();
        }
        let slot = SledSlot::open(&path).unwrap();
        assert_eq!(slot.read("boletos").unwrap().as_deref(), Some(&b"[]"[..]));
        assert_eq!(slot.read("missing").unwrap(), None);
    }

    #[test]
    fn test_values_are_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let slot = SledSlot::open(dir.path().join("db")).unwrap();
        slot.write("boletos", &[0xff, 0xfe, 0x5b]).unwrap();
        assert_eq!(slot.read("boletos").unwrap(), Some(vec![0xff, 0xfe, 0x5b]));
    }
}
