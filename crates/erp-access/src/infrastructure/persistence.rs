//! In-memory permission backend for testing

use async_trait::async_trait;
use erp_common::{ErpError, ErpResult};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::{Module, PermissionKind, Role, RolePermission, User, UserPermission};
use crate::ports::PermissionGateway;

#[derive(Default)]
pub struct InMemoryPermissionGateway {
    modules: Vec<Module>,
    roles: Vec<Role>,
    users: Vec<User>,
    role_rows: RwLock<Vec<RolePermission>>,
    user_rows: RwLock<Vec<UserPermission>>,
    failing_loads: RwLock<HashSet<&'static str>>,
    fail_user_saves: AtomicBool,
    role_saves: AtomicUsize,
    user_saves: AtomicUsize,
}

impl InMemoryPermissionGateway {
    pub fn new(
        modules: Vec<Module>,
        roles: Vec<Role>,
        users: Vec<User>,
        role_rows: Vec<RolePermission>,
        user_rows: Vec<UserPermission>,
    ) -> Self {
        Self {
            modules,
            roles,
            users,
            role_rows: RwLock::new(role_rows),
            user_rows: RwLock::new(user_rows),
            ..Self::default()
        }
    }

    /// Make one collection fail to load: "modules", "roles", "users",
    /// "permissions", "role permissions" or "user permissions"
    pub fn fail_loads_of(&self, what: &'static str) {
        self.failing_loads.write().insert(what);
    }

    pub fn fail_user_saves(&self) {
        self.fail_user_saves.store(true, Ordering::Relaxed);
    }

    pub fn role_saves(&self) -> usize {
        self.role_saves.load(Ordering::Relaxed)
    }

    pub fn user_saves(&self) -> usize {
        self.user_saves.load(Ordering::Relaxed)
    }

    fn load<T: Clone>(&self, what: &'static str, items: &[T]) -> ErpResult<Vec<T>> {
        if self.failing_loads.read().contains(what) {
            return Err(ErpError::Transport(format!("{} unavailable", what)));
        }
        Ok(items.to_vec())
    }
}

#[async_trait]
impl PermissionGateway for InMemoryPermissionGateway {
    async fn list_modules(&self) -> ErpResult<Vec<Module>> {
        self.load("modules", &self.modules)
    }

    async fn list_roles(&self) -> ErpResult<Vec<Role>> {
        self.load("roles", &self.roles)
    }

    async fn list_users(&self) -> ErpResult<Vec<User>> {
        self.load("users", &self.users)
    }

    async fn list_permission_kinds(&self) -> ErpResult<Vec<PermissionKind>> {
        self.load("permissions", &PermissionKind::ALL[..])
    }

    async fn list_role_permissions(&self) -> ErpResult<Vec<RolePermission>> {
        let rows = self.role_rows.read().clone();
        self.load("role permissions", &rows)
    }

    async fn list_user_permissions(&self) -> ErpResult<Vec<UserPermission>> {
        let rows = self.user_rows.read().clone();
        self.load("user permissions", &rows)
    }

    async fn save_role_permissions(&self, rows: &[RolePermission]) -> ErpResult<()> {
        self.role_saves.fetch_add(1, Ordering::Relaxed);
        let mut stored = self.role_rows.write();
        for row in rows {
            stored.retain(|r| !(r.role_id == row.role_id && r.resource() == row.resource()));
            stored.push(row.clone());
        }
        Ok(())
    }

    async fn save_user_permissions(&self, rows: &[UserPermission]) -> ErpResult<()> {
        self.user_saves.fetch_add(1, Ordering::Relaxed);
        if self.fail_user_saves.load(Ordering::Relaxed) {
            return Err(ErpError::Rejected("user permissions locked".into()));
        }
        let mut stored = self.user_rows.write();
        for row in rows {
            stored.retain(|r| !(r.user_id == row.user_id && r.resource() == row.resource()));
            stored.push(row.clone());
        }
        Ok(())
    }
}
