//! Master data CRUD service

use erp_common::EntityId;
use std::sync::Arc;
use tracing::info;

use crate::domain::Master;
use crate::error::{MasterError, Result};
use crate::ports::MasterRepository;

/// CRUD over one kind of master record
pub struct MasterService<M: Master> {
    repo: Arc<dyn MasterRepository<M>>,
}

impl<M: Master> MasterService<M> {
    pub fn new(repo: Arc<dyn MasterRepository<M>>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, draft: M::Draft) -> Result<M> {
        let record = M::create(draft)?;
        if self.repo.find_by_code(record.code()).await?.is_some() {
            return Err(MasterError::DuplicateCode { kind: M::KIND, code: record.code().to_string() });
        }
        self.repo.save(&record).await?;
        info!(kind = M::KIND, id = %record.id(), code = record.code(), "master created");
        Ok(record)
    }

    pub async fn get(&self, id: &EntityId) -> Result<M> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| MasterError::NotFound { kind: M::KIND, id: id.clone() })
    }

    pub async fn update(&self, id: &EntityId, patch: M::Patch) -> Result<M> {
        let mut record = self.get(id).await?;
        record.apply(patch)?;
        self.repo.save(&record).await?;
        info!(kind = M::KIND, %id, status = ?record.status(), "master updated");
        Ok(record)
    }

    /// All records, optionally only those in `status`, ordered by code
    pub async fn list(&self, status: Option<M::Status>) -> Result<Vec<M>> {
        let all = self.repo.list().await?;
        Ok(match status {
            Some(status) => all.into_iter().filter(|r| r.status() == status).collect(),
            None => all,
        })
    }

    pub async fn delete(&self, id: &EntityId) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(MasterError::NotFound { kind: M::KIND, id: id.clone() });
        }
        info!(kind = M::KIND, %id, "master deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Machine, MachineDraft, MachinePatch, MachineStatus, Product, ProductDraft};
    use crate::infrastructure::InMemoryMasterRepository;
    use rust_decimal_macros::dec;

    fn machines() -> MasterService<Machine> {
        MasterService::new(Arc::new(InMemoryMasterRepository::<Machine>::new()))
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_code() {
        let service = machines();
        service.create(MachineDraft::new("CNC-01", "Lathe")).await.unwrap();
        let err = service.create(MachineDraft::new("cnc-01", "Other")).await.unwrap_err();
        assert_eq!(err, MasterError::DuplicateCode { kind: "machine", code: "CNC-01".into() });
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let service = machines();
        let a = service.create(MachineDraft::new("M-02", "Press")).await.unwrap();
        service.create(MachineDraft::new("M-01", "Lathe")).await.unwrap();
        service
            .update(&a.id, MachinePatch { status: Some(MachineStatus::Inactive), ..MachinePatch::default() })
            .await
            .unwrap();

        let all = service.list(None).await.unwrap();
        assert_eq!(all.iter().map(|m| m.machine_code.as_str()).collect::<Vec<_>>(), ["M-01", "M-02"]);

        let active = service.list(Some(MachineStatus::Active)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].machine_code, "M-01");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let service: MasterService<Product> =
            MasterService::new(Arc::new(InMemoryMasterRepository::<Product>::new()));
        let missing = EntityId::from("nope");
        assert!(matches!(
            service.update(&missing, Default::default()).await,
            Err(MasterError::NotFound { kind: "product", .. })
        ));

        let p = service.create(ProductDraft::new("P1", "Widget", "pcs", dec!(2))).await.unwrap();
        service.delete(&p.id).await.unwrap();
        assert!(service.get(&p.id).await.is_err());
        assert!(service.delete(&p.id).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_update_is_not_saved() {
        let service = machines();
        let m = service.create(MachineDraft::new("M-01", "Lathe")).await.unwrap();
        let bad = MachinePatch { name: Some(String::new()), ..MachinePatch::default() };
        assert!(service.update(&m.id, bad).await.is_err());
        assert_eq!(service.get(&m.id).await.unwrap().name, "Lathe");
    }
}
