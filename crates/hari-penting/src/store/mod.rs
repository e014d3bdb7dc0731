mod memory;
mod sqlite;

use std::sync::Arc;

use crate::types::Observance;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Corrupt row ({date}, {label}): {reason}")]
    CorruptRow {
        date: String,
        label: String,
        reason: String,
    },
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Keyed collection of observances.
///
/// `upsert` is keyed on `(date, label)` and is atomic per record only.
pub trait ObservanceStore: Send + Sync {
    fn upsert(&self, observance: &Observance) -> Result<(), StoreError>;

    fn all(&self) -> Result<Vec<Observance>, StoreError>;
}

impl<T: ObservanceStore + ?Sized> ObservanceStore for Arc<T> {
    fn upsert(&self, observance: &Observance) -> Result<(), StoreError> {
        (**self).upsert(observance)
    }

    fn all(&self) -> Result<Vec<Observance>, StoreError> {
        (**self).all()
    }
}
