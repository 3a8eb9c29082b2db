//! Permission endpoints

use async_trait::async_trait;
use erp_access::{Module, PermissionGateway, PermissionKind, Role, RolePermission, User, UserPermission};
use erp_common::ErpResult;
use reqwest::Method;
use serde::Serialize;

use crate::client::ApiClient;

/// Bulk PUT body
#[derive(Serialize)]
struct Bulk<'a, T> {
    permissions: &'a [T],
}

#[async_trait]
impl PermissionGateway for ApiClient {
    async fn list_modules(&self) -> ErpResult<Vec<Module>> {
        Ok(self.get("/api/modules").await?)
    }

    async fn list_roles(&self) -> ErpResult<Vec<Role>> {
        Ok(self.get("/api/role").await?)
    }

    async fn list_users(&self) -> ErpResult<Vec<User>> {
        Ok(self.get("/api/user").await?)
    }

    async fn list_permission_kinds(&self) -> ErpResult<Vec<PermissionKind>> {
        Ok(self.get("/api/permissions").await?)
    }

    async fn list_role_permissions(&self) -> ErpResult<Vec<RolePermission>> {
        Ok(self.get("/api/role-permissions").await?)
    }

    async fn list_user_permissions(&self) -> ErpResult<Vec<UserPermission>> {
        Ok(self.get("/api/user-permissions").await?)
    }

    async fn save_role_permissions(&self, rows: &[RolePermission]) -> ErpResult<()> {
        Ok(self
            .execute(Method::PUT, "/api/role-permissions", Some(&Bulk { permissions: rows }))
            .await?)
    }

    async fn save_user_permissions(&self, rows: &[UserPermission]) -> ErpResult<()> {
        Ok(self
            .execute(Method::PUT, "/api/user-permissions", Some(&Bulk { permissions: rows }))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use erp_access::{PermissionService, Resource, Subject};
    use erp_common::{EntityId, ErpError};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": data}))
    }

    async fn mount_loads(server: &MockServer) {
        let loads = [
            ("/api/modules", json!([{"id": "m1", "name": "Sales", "forms": [{"id": "f1", "name": "Order"}]}])),
            ("/api/role", json!([{"id": "r1", "name": "Clerk"}])),
            ("/api/user", json!([{"id": "u1", "name": "Ada", "roleId": "r1"}])),
            ("/api/permissions", json!(["view", "create", "edit", "delete", "export"])),
            ("/api/role-permissions", json!([{"roleId": "r1", "moduleId": "m1", "canView": true}])),
            ("/api/user-permissions", json!([])),
        ];
        for (p, data) in loads {
            Mock::given(method("GET")).and(path(p)).respond_with(ok(data)).mount(server).await;
        }
    }

    #[tokio::test]
    async fn test_load_and_save_role_partition() {
        let server = MockServer::start().await;
        mount_loads(&server).await;
        Mock::given(method("PUT"))
            .and(path("/api/role-permissions"))
            .and(body_json(json!({"permissions": [{
                "roleId": "r1", "moduleId": null, "formId": "f1",
                "canView": false, "canCreate": false, "canEdit": true,
                "canDelete": false, "canExport": false
            }]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri())).unwrap();
        let service = PermissionService::new(Arc::new(client));
        let report = service.load().await;
        assert!(report.failures.is_empty());

        let mut matrix = report.matrix;
        let role = Subject::Role(EntityId::from("r1"));
        let form = Resource::Form(EntityId::from("f1"));
        matrix.set(&role, &form, PermissionKind::Edit, true).unwrap();

        let outcome = service.save(&mut matrix).await;
        assert!(outcome.is_complete());
        assert!(!matrix.has_pending());
        assert!(matrix.is_granted(&role, &form, PermissionKind::Edit));
    }

    #[tokio::test]
    async fn test_rejected_save_surfaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/user-permissions"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"success": false, "error": "Forbidden"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri())).unwrap();
        let err = client.save_user_permissions(&[]).await.unwrap_err();
        assert_eq!(err, ErpError::Rejected("Forbidden".into()));
    }
}
