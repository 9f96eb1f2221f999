//! The durable key-value slot the store mirrors its collection into.
//!
//! A slot holds whole serialized values under string keys. Values are raw
//! bytes; making sense of them is up to the store, which reads its key once
//! when it starts and rewrites it after every mutation.

use crate::error::Result;

pub mod memory;
pub mod sled_slot;

pub use memory::MemorySlot;
pub use sled_slot::SledSlot;

pub trait KvSlot: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Replaces the value under `key`. The write is durable once this returns.
    fn write(&self, key: &str, value: &[u8]) -> Result<()>;
}
