//! In-memory storage for the default dataset and uploaded datasets.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use sha2::{Digest, Sha256};

use crate::{Error, finance::FinanceTable};

/// Identifies an uploaded dataset by the SHA-256 digest of the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetId(String);

impl DatasetId {
    /// Create the ID for a file with the given `contents`.
    pub fn from_contents(contents: &[u8]) -> Self {
        let digest = Sha256::digest(contents);

        Self(digest.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Wrap an ID read back from a cookie.
    pub(crate) fn new_unchecked(id: String) -> Self {
        Self(id)
    }

    /// The ID as lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default)]
struct Uploads {
    tables: HashMap<DatasetId, Arc<FinanceTable>>,
    /// IDs in insertion order, oldest first.
    order: VecDeque<DatasetId>,
}

/// Holds the default dataset and up to `max_uploads` uploaded datasets.
///
/// Tables are never modified once stored, requests share them through [Arc].
#[derive(Debug)]
pub struct DatasetStore {
    default: Option<Arc<FinanceTable>>,
    uploads: Mutex<Uploads>,
    max_uploads: usize,
}

impl DatasetStore {
    /// Create a store with an optional `default` dataset.
    ///
    /// At least one upload is always kept, even if `max_uploads` is zero.
    pub fn new(default: Option<FinanceTable>, max_uploads: usize) -> Self {
        Self {
            default: default.map(Arc::new),
            uploads: Mutex::new(Uploads::default()),
            max_uploads: max_uploads.max(1),
        }
    }

    /// The dataset used by sessions that have not uploaded a file.
    pub fn default_table(&self) -> Option<Arc<FinanceTable>> {
        self.default.clone()
    }

    /// Get the uploaded dataset with `id`, or `None` if it was never stored or has been evicted.
    ///
    /// # Errors
    ///
    /// Returns [Error::DatasetLockError] if the lock is poisoned.
    pub fn get(&self, id: &DatasetId) -> Result<Option<Arc<FinanceTable>>, Error> {
        Ok(self.lock()?.tables.get(id).cloned())
    }

    /// Store an uploaded dataset under `id` and return the stored table.
    ///
    /// If a dataset with the same ID is already stored, the existing table is
    /// returned and `table` is dropped. When the store is full, the oldest
    /// upload is evicted.
    ///
    /// # Errors
    ///
    /// Returns [Error::DatasetLockError] if the lock is poisoned.
    pub fn insert(&self, id: DatasetId, table: FinanceTable) -> Result<Arc<FinanceTable>, Error> {
        let mut uploads = self.lock()?;

        if let Some(existing) = uploads.tables.get(&id) {
            tracing::debug!("Dataset {id} is already stored");
            return Ok(existing.clone());
        }

        let table = Arc::new(table);
        uploads.tables.insert(id.clone(), table.clone());
        uploads.order.push_back(id);

        while uploads.order.len() > self.max_uploads {
            if let Some(evicted) = uploads.order.pop_front() {
                uploads.tables.remove(&evicted);
                tracing::debug!("Evicted dataset {evicted}");
            }
        }

        Ok(table)
    }

    /// The number of uploaded datasets currently stored.
    ///
    /// # Errors
    ///
    /// Returns [Error::DatasetLockError] if the lock is poisoned.
    pub fn upload_count(&self) -> Result<usize, Error> {
        Ok(self.lock()?.tables.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Uploads>, Error> {
        self.uploads
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire dataset lock: {error}"))
            .map_err(|_| Error::DatasetLockError)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::finance::{FinanceTable, FinancialRecord};

    use super::{DatasetId, DatasetStore};

    fn table_for(state: &str) -> FinanceTable {
        FinanceTable::new(vec![FinancialRecord::new(
            state, 2000, 1.0, 1.0, 1.0, 1.0,
        )])
    }

    #[test]
    fn ids_are_hex_sha256_digests() {
        let id = DatasetId::from_contents(b"abc");

        assert_eq!(
            id.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn identical_contents_share_an_id() {
        assert_eq!(
            DatasetId::from_contents(b"State,Year\n"),
            DatasetId::from_contents(b"State,Year\n")
        );
        assert_ne!(
            DatasetId::from_contents(b"State,Year\n"),
            DatasetId::from_contents(b"Year,State\n")
        );
    }

    #[test]
    fn default_table_is_shared() {
        let store = DatasetStore::new(Some(table_for("CA")), 4);

        let first = store.default_table().unwrap();
        let second = store.default_table().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn stores_and_gets_uploads() {
        let store = DatasetStore::new(None, 4);
        let id = DatasetId::from_contents(b"ca");

        store.insert(id.clone(), table_for("CA")).unwrap();

        let table = store.get(&id).unwrap().unwrap();
        assert_eq!(table.states(), ["CA"]);
        assert!(store.default_table().is_none());
    }

    #[test]
    fn unknown_id_is_none() {
        let store = DatasetStore::new(None, 4);

        let table = store.get(&DatasetId::from_contents(b"nope")).unwrap();

        assert!(table.is_none());
    }

    #[test]
    fn reinserting_keeps_existing_table() {
        let store = DatasetStore::new(None, 4);
        let id = DatasetId::from_contents(b"ca");

        let first = store.insert(id.clone(), table_for("CA")).unwrap();
        let second = store.insert(id, table_for("CA")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.upload_count().unwrap(), 1);
    }

    #[test]
    fn evicts_oldest_upload_when_full() {
        let store = DatasetStore::new(None, 2);
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|name| DatasetId::from_contents(name.as_bytes()))
            .collect();

        for (id, state) in ids.iter().zip(["A", "B", "C"]) {
            store.insert(id.clone(), table_for(state)).unwrap();
        }

        assert_eq!(store.upload_count().unwrap(), 2);
        assert!(store.get(&ids[0]).unwrap().is_none());
        assert!(store.get(&ids[1]).unwrap().is_some());
        assert!(store.get(&ids[2]).unwrap().is_some());
    }

    #[test]
    fn keeps_at_least_one_upload() {
        let store = DatasetStore::new(None, 0);
        let id = DatasetId::from_contents(b"ca");

        store.insert(id.clone(), table_for("CA")).unwrap();

        assert!(store.get(&id).unwrap().is_some());
    }
}
