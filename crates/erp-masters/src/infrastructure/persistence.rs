//! In-memory repository implementation for testing

use async_trait::async_trait;
use erp_common::{EntityId, ErpResult};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::Master;
use crate::ports::MasterRepository;

pub struct InMemoryMasterRepository<M> {
    records: RwLock<HashMap<EntityId, M>>,
}

impl<M> InMemoryMasterRepository<M> {
    pub fn new() -> Self {
        Self { records: RwLock::new(HashMap::new()) }
    }
}

impl<M> Default for InMemoryMasterRepository<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: Master> MasterRepository<M> for InMemoryMasterRepository<M> {
    async fn find_by_id(&self, id: &EntityId) -> ErpResult<Option<M>> {
        Ok(self.records.read().get(id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> ErpResult<Option<M>> {
        Ok(self.records.read().values().find(|r| r.code() == code).cloned())
    }

    async fn list(&self) -> ErpResult<Vec<M>> {
        let mut all: Vec<M> = self.records.read().values().cloned().collect();
        all.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(all)
    }

    async fn save(&self, record: &M) -> ErpResult<()> {
        self.records.write().insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> ErpResult<bool> {
        Ok(self.records.write().remove(id).is_some())
    }
}
