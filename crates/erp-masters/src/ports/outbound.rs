//! Outbound ports

use async_trait::async_trait;
use erp_common::{EntityId, ErpResult};

use crate::domain::Master;

/// Storage for one kind of master record
#[async_trait]
pub trait MasterRepository<M: Master>: Send + Sync {
    async fn find_by_id(&self, id: &EntityId) -> ErpResult<Option<M>>;

    /// Codes are stored normalized, so lookups are exact
    async fn find_by_code(&self, code: &str) -> ErpResult<Option<M>>;

    /// All records ordered by code
    async fn list(&self) -> ErpResult<Vec<M>>;

    async fn save(&self, record: &M) -> ErpResult<()>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &EntityId) -> ErpResult<bool>;
}
