use crate::error::StorageError;
use crate::record::SiteRecord;

use super::RecordBackend;

/// Volatile backend; the list lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Vec<SiteRecord>,
}

impl MemoryBackend {
    pub fn with_records(records: Vec<SiteRecord>) -> Self {
        Self { records }
    }
}

impl RecordBackend for MemoryBackend {
    fn load(&mut self) -> Result<Vec<SiteRecord>, StorageError> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[SiteRecord]) -> Result<(), StorageError> {
        self.records = records.to_vec();
        Ok(())
    }
}
