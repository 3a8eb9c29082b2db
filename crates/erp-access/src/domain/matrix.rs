//! Permission matrix aggregate
//!
//! Holds the persisted role and user grant rows plus the admin's unsaved
//! edits. Resolution order for a user: pending change, active user row,
//! the user's role row, denied. For a role: pending change, role row, denied.

use erp_common::EntityId;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::value_objects::*;
use crate::error::AccessError;

/// Composite key of one pending cell: `<subject>:<id>:<resource>:<id>:<permission>`
pub fn pending_key(subject: &Subject, resource: &Resource, permission: PermissionKind) -> String {
    format!("{}:{}:{}", subject, resource, permission)
}

/// An unsaved edit of one matrix cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingChange {
    pub subject: Subject,
    pub resource: Resource,
    pub permission: PermissionKind,
    pub granted: bool,
}

/// Pending changes split into the two bulk payloads
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavePlan {
    pub roles: Vec<RolePermission>,
    pub users: Vec<UserPermission>,
    pub role_keys: Vec<String>,
    pub user_keys: Vec<String>,
}

impl SavePlan {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.users.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct PermissionMatrix {
    pub modules: Vec<Module>,
    pub roles: Vec<Role>,
    pub users: Vec<User>,
    /// Matrix columns offered by the backend
    pub kinds: Vec<PermissionKind>,
    role_rows: Vec<RolePermission>,
    user_rows: Vec<UserPermission>,
    pending: BTreeMap<String, PendingChange>,
}

impl PermissionMatrix {
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
            kinds: PermissionKind::ALL.to_vec(),
            role_rows,
            user_rows,
            pending: BTreeMap::new(),
        }
    }

    pub fn role_rows(&self) -> &[RolePermission] {
        &self.role_rows
    }

    pub fn user_rows(&self) -> &[UserPermission] {
        &self.user_rows
    }

    /// Every module followed by its forms
    pub fn resources(&self) -> Vec<Resource> {
        self.modules
            .iter()
            .flat_map(|m| {
                std::iter::once(Resource::Module(m.id.clone()))
                    .chain(m.forms.iter().map(|f| Resource::Form(f.id.clone())))
            })
            .collect()
    }

    pub fn user(&self, id: &EntityId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    fn role_row(&self, role_id: &EntityId, resource: &Resource) -> Option<&RolePermission> {
        self.role_rows
            .iter()
            .find(|r| &r.role_id == role_id && r.resource().as_ref() == Some(resource))
    }

    fn user_row(&self, user_id: &EntityId, resource: &Resource) -> Option<&UserPermission> {
        self.user_rows.iter().find(|r| {
            r.is_active && &r.user_id == user_id && r.resource().as_ref() == Some(resource)
        })
    }

    /// Grants as last persisted, ignoring pending edits
    pub fn persisted_grants(&self, subject: &Subject, resource: &Resource) -> Grants {
        match subject {
            Subject::Role(role_id) => self
                .role_row(role_id, resource)
                .map(|r| r.grants)
                .unwrap_or_default(),
            Subject::User(user_id) => {
                if let Some(row) = self.user_row(user_id, resource) {
                    return row.grants;
                }
                self.user(user_id)
                    .and_then(|u| u.role_id.as_ref())
                    .and_then(|role_id| self.role_row(role_id, resource))
                    .map(|r| r.grants)
                    .unwrap_or_default()
            }
        }
    }

    pub fn is_granted(&self, subject: &Subject, resource: &Resource, permission: PermissionKind) -> bool {
        if let Some(change) = self.pending.get(&pending_key(subject, resource, permission)) {
            return change.granted;
        }
        self.persisted_grants(subject, resource).get(permission)
    }

    /// Grants with pending edits applied
    pub fn effective_grants(&self, subject: &Subject, resource: &Resource) -> Grants {
        let mut grants = Grants::default();
        for kind in PermissionKind::ALL {
            grants.set(kind, self.is_granted(subject, resource, kind));
        }
        grants
    }

    fn check_subject(&self, subject: &Subject) -> Result<(), AccessError> {
        match subject {
            Subject::Role(id) if !self.roles.iter().any(|r| &r.id == id) => {
                Err(AccessError::UnknownRole(id.clone()))
            }
            Subject::User(id) if self.user(id).is_none() => Err(AccessError::UnknownUser(id.clone())),
            _ => Ok(()),
        }
    }

    /// Record an edit; an edit back to the persisted value clears the entry
    pub fn set(
        &mut self,
        subject: &Subject,
        resource: &Resource,
        permission: PermissionKind,
        granted: bool,
    ) -> Result<(), AccessError> {
        self.check_subject(subject)?;
        let key = pending_key(subject, resource, permission);
        if self.persisted_grants(subject, resource).get(permission) == granted {
            self.pending.remove(&key);
        } else {
            debug!(%key, granted, "pending permission change");
            self.pending.insert(
                key,
                PendingChange {
                    subject: subject.clone(),
                    resource: resource.clone(),
                    permission,
                    granted,
                },
            );
        }
        Ok(())
    }

    pub fn toggle(
        &mut self,
        subject: &Subject,
        resource: &Resource,
        permission: PermissionKind,
    ) -> Result<bool, AccessError> {
        let granted = !self.is_granted(subject, resource, permission);
        self.set(subject, resource, permission, granted)?;
        Ok(granted)
    }

    pub fn pending(&self) -> impl Iterator<Item = (&String, &PendingChange)> {
        self.pending.iter()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// Split pending edits into one role payload and one user payload
    ///
    /// Each (subject, resource) pair becomes a full row: persisted grants
    /// with the pending cells applied. A new user row therefore starts from
    /// what the user inherited from their role.
    pub fn partition(&self) -> SavePlan {
        let mut rows: BTreeMap<(Subject, Resource), Grants> = BTreeMap::new();
        let mut plan = SavePlan::default();

        for (key, change) in &self.pending {
            let pair = (change.subject.clone(), change.resource.clone());
            let grants = rows
                .entry(pair)
                .or_insert_with(|| self.persisted_grants(&change.subject, &change.resource));
            grants.set(change.permission, change.granted);
            match change.subject {
                Subject::Role(_) => plan.role_keys.push(key.clone()),
                Subject::User(_) => plan.user_keys.push(key.clone()),
            }
        }

        for ((subject, resource), grants) in rows {
            match subject {
                Subject::Role(id) => plan.roles.push(RolePermission::new(id, &resource, grants)),
                Subject::User(id) => plan.users.push(UserPermission::new(id, &resource, grants)),
            }
        }
        plan
    }

    /// Merge saved role rows and drop their pending entries
    pub fn commit_roles(&mut self, rows: &[RolePermission], keys: &[String]) {
        for row in rows {
            let resource = row.resource();
            match self
                .role_rows
                .iter_mut()
                .find(|r| r.role_id == row.role_id && r.resource() == resource)
            {
                Some(existing) => existing.grants = row.grants,
                None => self.role_rows.push(row.clone()),
            }
        }
        for key in keys {
            self.pending.remove(key);
        }
    }

    /// Merge saved user rows and drop their pending entries
    pub fn commit_users(&mut self, rows: &[UserPermission], keys: &[String]) {
        for row in rows {
            let resource = row.resource();
            match self
                .user_rows
                .iter_mut()
                .find(|r| r.user_id == row.user_id && r.resource() == resource)
            {
                Some(existing) => {
                    existing.grants = row.grants;
                    existing.is_active = row.is_active;
                }
                None => self.user_rows.push(row.clone()),
            }
        }
        for key in keys {
            self.pending.remove(key);
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Module m1 with form f1; role r1 may view m1; user u1 has role r1;
    /// user u2 has no role; u1 carries an inactive deny-all row on m1.
    pub fn sample_matrix() -> PermissionMatrix {
        let id = |s: &str| EntityId::from(s);
        PermissionMatrix::new(
            vec![Module {
                id: id("m1"),
                name: "Sales".into(),
                description: None,
                forms: vec![FormRef { id: id("f1"), name: "Order".into() }],
            }],
            vec![Role { id: id("r1"), name: "Clerk".into(), description: None }],
            vec![
                User { id: id("u1"), name: "Ada".into(), email: None, role_id: Some(id("r1")) },
                User { id: id("u2"), name: "Bob".into(), email: None, role_id: None },
            ],
            vec![RolePermission::new(
                id("r1"),
                &Resource::Module(id("m1")),
                Grants { can_view: true, ..Grants::default() },
            )],
            vec![UserPermission {
                is_active: false,
                ..UserPermission::new(id("u1"), &Resource::Module(id("m1")), Grants::default())
            }],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_matrix;
    use super::*;
    use proptest::prelude::*;

    fn role() -> Subject {
        Subject::Role(EntityId::from("r1"))
    }
    fn ada() -> Subject {
        Subject::User(EntityId::from("u1"))
    }
    fn m1() -> Resource {
        Resource::Module(EntityId::from("m1"))
    }
    fn f1() -> Resource {
        Resource::Form(EntityId::from("f1"))
    }

    #[test]
    fn test_pending_key_format() {
        assert_eq!(pending_key(&role(), &f1(), PermissionKind::Edit), "role:r1:form:f1:edit");
    }

    #[test]
    fn test_user_inherits_role_row() {
        let m = sample_matrix();
        assert!(m.is_granted(&ada(), &m1(), PermissionKind::View));
        assert!(!m.is_granted(&ada(), &m1(), PermissionKind::Edit));
        assert!(!m.is_granted(&Subject::User(EntityId::from("u2")), &m1(), PermissionKind::View));
    }

    #[test]
    fn test_active_user_row_beats_role_row() {
        let mut m = sample_matrix();
        m.commit_users(&[UserPermission::new(EntityId::from("u1"), &m1(), Grants::default())], &[]);
        assert!(!m.is_granted(&ada(), &m1(), PermissionKind::View));
        // role unaffected
        assert!(m.is_granted(&role(), &m1(), PermissionKind::View));
    }

    #[test]
    fn test_pending_beats_everything() {
        let mut m = sample_matrix();
        m.set(&ada(), &m1(), PermissionKind::View, false).unwrap();
        assert!(!m.is_granted(&ada(), &m1(), PermissionKind::View));
        assert!(m.has_pending());
    }

    #[test]
    fn test_setting_back_to_persisted_clears_pending() {
        let mut m = sample_matrix();
        m.set(&role(), &f1(), PermissionKind::Export, true).unwrap();
        assert!(m.has_pending());
        m.set(&role(), &f1(), PermissionKind::Export, false).unwrap();
        assert!(!m.has_pending());
    }

    #[test]
    fn test_unknown_subject_rejected() {
        let mut m = sample_matrix();
        let err = m.set(&Subject::Role(EntityId::from("zz")), &m1(), PermissionKind::View, true);
        assert!(matches!(err, Err(AccessError::UnknownRole(_))));
    }

    #[test]
    fn test_partition_builds_full_rows_per_pair() {
        let mut m = sample_matrix();
        m.set(&role(), &m1(), PermissionKind::Edit, true).unwrap();
        m.set(&role(), &m1(), PermissionKind::Delete, true).unwrap();
        m.set(&ada(), &f1(), PermissionKind::View, true).unwrap();

        let plan = m.partition();
        assert_eq!(plan.roles.len(), 1);
        assert_eq!(plan.role_keys.len(), 2);
        let row = &plan.roles[0];
        assert!(row.grants.can_view && row.grants.can_edit && row.grants.can_delete);
        assert!(!row.grants.can_create);

        assert_eq!(plan.users.len(), 1);
        assert_eq!(plan.users[0].form_id, Some(EntityId::from("f1")));
        assert!(plan.users[0].is_active);
    }

    #[test]
    fn test_new_user_row_starts_from_inherited_grants() {
        let mut m = sample_matrix();
        m.set(&ada(), &m1(), PermissionKind::Export, true).unwrap();
        let plan = m.partition();
        let g = plan.users[0].grants;
        assert!(g.can_view, "inherited view must not be revoked");
        assert!(g.can_export);
    }

    #[test]
    fn test_commit_merges_and_clears() {
        let mut m = sample_matrix();
        m.set(&role(), &f1(), PermissionKind::View, true).unwrap();
        let plan = m.partition();
        m.commit_roles(&plan.roles, &plan.role_keys);
        assert!(!m.has_pending());
        assert!(m.persisted_grants(&role(), &f1()).can_view);
        assert_eq!(m.role_rows().len(), 2);
    }

    #[test]
    fn test_resources_lists_modules_then_forms() {
        assert_eq!(sample_matrix().resources(), vec![m1(), f1()]);
    }

    fn kind_strategy() -> impl Strategy<Value = PermissionKind> {
        prop::sample::select(PermissionKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_last_set_wins(edits in prop::collection::vec((kind_strategy(), any::<bool>()), 1..20)) {
            let mut m = sample_matrix();
            for (kind, granted) in &edits {
                m.set(&ada(), &m1(), *kind, *granted).unwrap();
            }
            for kind in PermissionKind::ALL {
                if let Some((_, granted)) = edits.iter().rev().find(|(k, _)| *k == kind) {
                    prop_assert_eq!(m.is_granted(&ada(), &m1(), kind), *granted);
                }
            }
            // pending never holds a no-op entry
            for (_, change) in m.pending() {
                prop_assert_ne!(m.persisted_grants(&change.subject, &change.resource).get(change.permission), change.granted);
            }
        }
    }
}
