//! Form endpoints

use async_trait::async_trait;
use erp_common::EntityId;
use erp_forms::ports::{FieldPlacement, FormSummary, SectionPlacement, SubformPlacement};
use erp_forms::{Form, FormEvent, FormField, FormGateway, FormRecord, GatewayError, Section, Subform};
use reqwest::Method;
use serde::Serialize;

use crate::client::ApiClient;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewSection<'a> {
    form_id: &'a EntityId,
    #[serde(flatten)]
    section: &'a Section,
}

#[async_trait]
impl FormGateway for ApiClient {
    async fn get_form(&self, id: &EntityId) -> Result<Form, GatewayError> {
        Ok(self.get(&format!("/api/forms/{}", id)).await?)
    }

    async fn list_forms(&self) -> Result<Vec<FormSummary>, GatewayError> {
        Ok(self.get("/api/forms").await?)
    }

    async fn create_section(&self, form_id: &EntityId, section: &Section) -> Result<Section, GatewayError> {
        Ok(self.post("/api/sections", &NewSection { form_id, section }).await?)
    }

    async fn update_section(&self, id: &EntityId, body: &SectionPlacement) -> Result<(), GatewayError> {
        Ok(self.execute(Method::PUT, &format!("/api/sections/{}", id), Some(body)).await?)
    }

    async fn create_field(&self, field: &FormField) -> Result<FormField, GatewayError> {
        Ok(self.post("/api/fields", field).await?)
    }

    async fn update_field(&self, field: &FormField) -> Result<FormField, GatewayError> {
        Ok(self.put(&format!("/api/fields/{}", field.id), field).await?)
    }

    async fn move_field(&self, id: &EntityId, body: &FieldPlacement) -> Result<(), GatewayError> {
        Ok(self.execute(Method::PUT, &format!("/api/fields/{}", id), Some(body)).await?)
    }

    async fn delete_field(&self, id: &EntityId) -> Result<(), GatewayError> {
        Ok(self.execute::<()>(Method::DELETE, &format!("/api/fields/{}", id), None).await?)
    }

    async fn create_subform(&self, subform: &Subform) -> Result<Subform, GatewayError> {
        Ok(self.post("/api/subforms", subform).await?)
    }

    async fn move_subform(&self, id: &EntityId, body: &SubformPlacement) -> Result<(), GatewayError> {
        Ok(self.execute(Method::PUT, &format!("/api/subforms/{}", id), Some(body)).await?)
    }

    async fn delete_subform(&self, id: &EntityId) -> Result<(), GatewayError> {
        Ok(self.execute::<()>(Method::DELETE, &format!("/api/subforms/{}", id), None).await?)
    }

    async fn submit(&self, record: &FormRecord) -> Result<FormRecord, GatewayError> {
        Ok(self.post(&format!("/api/forms/{}/submit", record.form_id), record).await?)
    }

    async fn record_event(&self, event: &FormEvent) -> Result<(), GatewayError> {
        Ok(self
            .execute(Method::POST, &format!("/api/forms/{}/events", event.form_id), Some(event))
            .await?)
    }
}
