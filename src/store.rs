//! Storage facade translating raw ledger bytes into typed lot records.
//!
//! This layer performs no business validation: existence policy and quantity
//! rules belong to the service. It only owns the CBOR round-trip and the
//! batch mechanism used when one operation must land several writes at once.
use super::error::TransferError;
use super::lot::Lot;
use std::sync::Arc;

pub struct LotStore {
    db: Arc<sled::Db>,
}

impl LotStore {
    pub fn new(db: Arc<sled::Db>) -> Self {
        Self { db }
    }

    /// Decode the record at `key`, if one is resident. Bytes that do not
    /// parse as a lot are a data-integrity fault and surface as an error.
    pub fn get(&self, key: &str) -> Result<Option<Lot>, TransferError> {
        let Some(bytes) = self.db.get(key)? else {
            return Ok(None);
        };
        let lot = minicbor::decode(bytes.as_ref()).map_err(|source| {
            TransferError::Deserialization {
                key: key.to_owned(),
                source,
            }
        })?;
        Ok(Some(lot))
    }

    /// Serialize and write, overwriting any resident record.
    pub fn put(&self, key: &str, lot: &Lot) -> Result<(), TransferError> {
        self.db.insert(key, encode(lot)?)?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<(), TransferError> {
        self.db.remove(key)?;
        Ok(())
    }

    /// True when any record is resident at `key`, including an empty
    /// sentinel value that would not decode as a lot.
    pub fn contains(&self, key: &str) -> Result<bool, TransferError> {
        Ok(self.db.contains_key(key)?)
    }

    /// Apply a queued write set as one atomic batch.
    pub fn apply(&self, batch: LotBatch) -> Result<(), TransferError> {
        self.db.apply_batch(batch.inner)?;
        Ok(())
    }
}

/// Write set applied all-or-nothing via [`LotStore::apply`].
#[derive(Default)]
pub struct LotBatch {
    inner: sled::Batch,
}

impl LotBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &str, lot: &Lot) -> Result<(), TransferError> {
        self.inner.insert(key.as_bytes(), encode(lot)?);
        Ok(())
    }

    pub fn delete(&mut self, key: &str) {
        self.inner.remove(key.as_bytes());
    }
}

fn encode(lot: &Lot) -> Result<Vec<u8>, TransferError> {
    minicbor::to_vec(lot).map_err(TransferError::Serialization)
}
