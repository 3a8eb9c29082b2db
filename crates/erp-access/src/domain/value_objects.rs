//! Access value objects
//!
//! Subjects, resources and the permission rows exchanged with the backend.

use erp_common::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One column of the permission matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    View,
    Create,
    Edit,
    Delete,
    Export,
}

impl PermissionKind {
    pub const ALL: [PermissionKind; 5] = [
        PermissionKind::View,
        PermissionKind::Create,
        PermissionKind::Edit,
        PermissionKind::Delete,
        PermissionKind::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown permission: {}", s))
    }
}

/// Who a grant applies to
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subject {
    Role(EntityId),
    User(EntityId),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(id) => write!(f, "role:{}", id),
            Self::User(id) => write!(f, "user:{}", id),
        }
    }
}

/// Parses `role:<id>` or `user:<id>`
impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("role", id)) if !id.is_empty() => Ok(Self::Role(EntityId::from(id))),
            Some(("user", id)) if !id.is_empty() => Ok(Self::User(EntityId::from(id))),
            _ => Err(format!("expected role:<id> or user:<id>, got '{}'", s)),
        }
    }
}

/// What a grant applies to
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Module(EntityId),
    Form(EntityId),
}

impl Resource {
    fn from_row(module_id: &Option<EntityId>, form_id: &Option<EntityId>) -> Option<Self> {
        match (form_id, module_id) {
            (Some(form), _) => Some(Self::Form(form.clone())),
            (None, Some(module)) => Some(Self::Module(module.clone())),
            (None, None) => None,
        }
    }

    fn row_ids(&self) -> (Option<EntityId>, Option<EntityId>) {
        match self {
            Self::Module(id) => (Some(id.clone()), None),
            Self::Form(id) => (None, Some(id.clone())),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(id) => write!(f, "module:{}", id),
            Self::Form(id) => write!(f, "form:{}", id),
        }
    }
}

/// Parses `module:<id>` or `form:<id>`
impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("module", id)) if !id.is_empty() => Ok(Self::Module(EntityId::from(id))),
            Some(("form", id)) if !id.is_empty() => Ok(Self::Form(EntityId::from(id))),
            _ => Err(format!("expected module:<id> or form:<id>, got '{}'", s)),
        }
    }
}

/// The five permission flags of one matrix cell row
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grants {
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub can_export: bool,
}

impl Grants {
    pub fn all() -> Self {
        Self { can_view: true, can_create: true, can_edit: true, can_delete: true, can_export: true }
    }

    pub fn get(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::View => self.can_view,
            PermissionKind::Create => self.can_create,
            PermissionKind::Edit => self.can_edit,
            PermissionKind::Delete => self.can_delete,
            PermissionKind::Export => self.can_export,
        }
    }

    pub fn set(&mut self, kind: PermissionKind, granted: bool) {
        let flag = match kind {
            PermissionKind::View => &mut self.can_view,
            PermissionKind::Create => &mut self.can_create,
            PermissionKind::Edit => &mut self.can_edit,
            PermissionKind::Delete => &mut self.can_delete,
            PermissionKind::Export => &mut self.can_export,
        };
        *flag = granted;
    }

    pub fn granted(&self) -> Vec<PermissionKind> {
        PermissionKind::ALL.into_iter().filter(|k| self.get(*k)).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRef {
    pub id: EntityId,
    pub name: String,
}

/// An ERP module and the forms it groups
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub forms: Vec<FormRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_id: Option<EntityId>,
}

/// Persisted role grant row; `formId` set means a form-level row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    pub role_id: EntityId,
    #[serde(default)]
    pub module_id: Option<EntityId>,
    #[serde(default)]
    pub form_id: Option<EntityId>,
    #[serde(flatten)]
    pub grants: Grants,
}

impl RolePermission {
    pub fn new(role_id: EntityId, resource: &Resource, grants: Grants) -> Self {
        let (module_id, form_id) = resource.row_ids();
        Self { role_id, module_id, form_id, grants }
    }

    pub fn resource(&self) -> Option<Resource> {
        Resource::from_row(&self.module_id, &self.form_id)
    }
}

/// Persisted per-user override row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermission {
    pub user_id: EntityId,
    #[serde(default)]
    pub module_id: Option<EntityId>,
    #[serde(default)]
    pub form_id: Option<EntityId>,
    #[serde(flatten)]
    pub grants: Grants,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl UserPermission {
    pub fn new(user_id: EntityId, resource: &Resource, grants: Grants) -> Self {
        let (module_id, form_id) = resource.row_ids();
        Self { user_id, module_id, form_id, grants, is_active: true }
    }

    pub fn resource(&self) -> Option<Resource> {
        Resource::from_row(&self.module_id, &self.form_id)
    }
}
