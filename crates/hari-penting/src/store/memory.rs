use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ObservanceStore, StoreError};
use crate::types::Observance;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashSet<Observance>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ObservanceStore for MemoryStore {
    fn upsert(&self, observance: &Observance) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records.replace(observance.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn all(&self) -> Result<Vec<Observance>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, label: &str) -> Observance {
        Observance::new(date.parse().unwrap(), label).unwrap()
    }

    #[test]
    fn test_upsert_collapses_same_key() {
        let store = MemoryStore::new();
        store.upsert(&obs("21-04", "Hari Kartini")).unwrap();
        store.upsert(&obs("21-04", "Hari Kartini")).unwrap();
        store.upsert(&obs("21-04", "Hari Bumi")).unwrap();

        assert_eq!(store.writes(), 3);
        assert_eq!(store.all().unwrap().len(), 2);
    }
}
