//! Module administration endpoints

use erp_access::Module;
use erp_common::EntityId;
use reqwest::Method;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::Result;

/// Create/update body for `/api/modules`
#[derive(Clone, Debug, Default, Serialize)]
pub struct ModuleInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ApiClient {
    pub async fn modules(&self) -> Result<Vec<Module>> {
        self.get("/api/modules").await
    }

    pub async fn module(&self, id: &EntityId) -> Result<Module> {
        self.get(&format!("/api/modules/{}", id)).await
    }

    pub async fn create_module(&self, input: &ModuleInput) -> Result<Module> {
        self.post("/api/modules", input).await
    }

    pub async fn update_module(&self, id: &EntityId, input: &ModuleInput) -> Result<Module> {
        self.put(&format!("/api/modules/{}", id), input).await
    }

    pub async fn delete_module(&self, id: &EntityId) -> Result<()> {
        self.execute::<()>(Method::DELETE, &format!("/api/modules/{}", id), None).await
    }
}
