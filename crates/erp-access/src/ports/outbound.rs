//! Outbound ports

use async_trait::async_trait;
use erp_common::ErpResult;

use crate::domain::{Module, PermissionKind, Role, RolePermission, User, UserPermission};

/// Permission backend port
#[async_trait]
pub trait PermissionGateway: Send + Sync {
    /// `GET /api/modules`
    async fn list_modules(&self) -> ErpResult<Vec<Module>>;

    /// `GET /api/role`
    async fn list_roles(&self) -> ErpResult<Vec<Role>>;

    /// `GET /api/user`
    async fn list_users(&self) -> ErpResult<Vec<User>>;

    /// `GET /api/permissions`
    async fn list_permission_kinds(&self) -> ErpResult<Vec<PermissionKind>>;

    /// `GET /api/role-permissions`
    async fn list_role_permissions(&self) -> ErpResult<Vec<RolePermission>>;

    /// `GET /api/user-permissions`
    async fn list_user_permissions(&self) -> ErpResult<Vec<UserPermission>>;

    /// Bulk `PUT /api/role-permissions`
    async fn save_role_permissions(&self, rows: &[RolePermission]) -> ErpResult<()>;

    /// Bulk `PUT /api/user-permissions`
    async fn save_user_permissions(&self, rows: &[UserPermission]) -> ErpResult<()>;
}
