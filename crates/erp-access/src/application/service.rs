//! Permission application service
//!
//! Loads the matrix from the backend and saves pending edits as two
//! independent bulk requests. The save is not transactional: a partition
//! that succeeds is merged locally, a partition that fails stays pending.

use erp_common::{ErpError, ErpResult};
use futures::join;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{PermissionKind, PermissionMatrix};
use crate::ports::PermissionGateway;

/// Matrix plus the collections that failed to load
#[derive(Debug, Default)]
pub struct LoadReport {
    pub matrix: PermissionMatrix,
    pub failures: Vec<(&'static str, ErpError)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartitionOutcome {
    /// Nothing pending for this partition
    Skipped,
    Saved(usize),
    Failed(ErpError),
}

impl PartitionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    pub roles: PartitionOutcome,
    pub users: PartitionOutcome,
}

impl SaveOutcome {
    pub fn is_complete(&self) -> bool {
        !self.roles.is_failed() && !self.users.is_failed()
    }
}

fn collect<T: Default>(
    what: &'static str,
    result: ErpResult<T>,
    failures: &mut Vec<(&'static str, ErpError)>,
) -> T {
    result.unwrap_or_else(|e| {
        warn!(what, error = %e, "failed to load");
        failures.push((what, e));
        T::default()
    })
}

/// Permission application service
pub struct PermissionService {
    gateway: Arc<dyn PermissionGateway>,
}

impl PermissionService {
    pub fn new(gateway: Arc<dyn PermissionGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch every collection concurrently; each one fails on its own
    pub async fn load(&self) -> LoadReport {
        let g = &self.gateway;
        let (modules, roles, users, kinds, role_rows, user_rows) = join!(
            g.list_modules(),
            g.list_roles(),
            g.list_users(),
            g.list_permission_kinds(),
            g.list_role_permissions(),
            g.list_user_permissions(),
        );

        let mut failures = Vec::new();
        let mut matrix = PermissionMatrix::new(
            collect("modules", modules, &mut failures),
            collect("roles", roles, &mut failures),
            collect("users", users, &mut failures),
            collect("role permissions", role_rows, &mut failures),
            collect("user permissions", user_rows, &mut failures),
        );
        let kinds: Vec<PermissionKind> = collect("permissions", kinds, &mut failures);
        if !kinds.is_empty() {
            matrix.kinds = kinds;
        }

        info!(
            modules = matrix.modules.len(),
            roles = matrix.roles.len(),
            users = matrix.users.len(),
            failures = failures.len(),
            "permission matrix loaded"
        );
        LoadReport { matrix, failures }
    }

    /// Save pending edits as one role PUT and one user PUT
    pub async fn save(&self, matrix: &mut PermissionMatrix) -> SaveOutcome {
        let plan = matrix.partition();
        let g = &self.gateway;

        let (roles, users) = join!(
            async {
                if plan.roles.is_empty() {
                    None
                } else {
                    Some(g.save_role_permissions(&plan.roles).await)
                }
            },
            async {
                if plan.users.is_empty() {
                    None
                } else {
                    Some(g.save_user_permissions(&plan.users).await)
                }
            },
        );

        let roles = match roles {
            None => PartitionOutcome::Skipped,
            Some(Ok(())) => {
                matrix.commit_roles(&plan.roles, &plan.role_keys);
                PartitionOutcome::Saved(plan.roles.len())
            }
            Some(Err(e)) => {
                warn!(rows = plan.roles.len(), error = %e, "role permissions not saved");
                PartitionOutcome::Failed(e)
            }
        };
        let users = match users {
            None => PartitionOutcome::Skipped,
            Some(Ok(())) => {
                matrix.commit_users(&plan.users, &plan.user_keys);
                PartitionOutcome::Saved(plan.users.len())
            }
            Some(Err(e)) => {
                warn!(rows = plan.users.len(), error = %e, "user permissions not saved");
                PartitionOutcome::Failed(e)
            }
        };

        info!(?roles, ?users, "permission save finished");
        SaveOutcome { roles, users }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matrix::fixtures::sample_matrix;
    use crate::domain::{Resource, Subject};
    use crate::infrastructure::InMemoryPermissionGateway;
    use erp_common::EntityId;

    fn gateway_from_fixture() -> Arc<InMemoryPermissionGateway> {
        let m = sample_matrix();
        Arc::new(InMemoryPermissionGateway::new(
            m.modules.clone(),
            m.roles.clone(),
            m.users.clone(),
            m.role_rows().to_vec(),
            m.user_rows().to_vec(),
        ))
    }

    #[tokio::test]
    async fn test_load_builds_matrix() {
        let service = PermissionService::new(gateway_from_fixture());
        let report = service.load().await;
        assert!(report.failures.is_empty());
        assert_eq!(report.matrix.users.len(), 2);
        assert_eq!(report.matrix.kinds, PermissionKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_load_failures_are_independent() {
        let gateway = gateway_from_fixture();
        gateway.fail_loads_of("roles");
        let report = PermissionService::new(gateway).load().await;
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "roles");
        assert!(report.matrix.roles.is_empty());
        assert_eq!(report.matrix.modules.len(), 1);
    }

    #[tokio::test]
    async fn test_save_partitions_and_merges() {
        let gateway = gateway_from_fixture();
        let service = PermissionService::new(gateway.clone());
        let mut matrix = service.load().await.matrix;

        let form = Resource::Form(EntityId::from("f1"));
        matrix.set(&Subject::Role(EntityId::from("r1")), &form, PermissionKind::View, true).unwrap();
        matrix.set(&Subject::User(EntityId::from("u2")), &form, PermissionKind::Edit, true).unwrap();

        let outcome = service.save(&mut matrix).await;
        assert_eq!(outcome.roles, PartitionOutcome::Saved(1));
        assert_eq!(outcome.users, PartitionOutcome::Saved(1));
        assert!(!matrix.has_pending());
        assert_eq!(gateway.role_saves(), 1);
        assert_eq!(gateway.user_saves(), 1);

        // a reload observes the same state
        let reloaded = service.load().await.matrix;
        assert!(reloaded.is_granted(&Subject::User(EntityId::from("u2")), &form, PermissionKind::Edit));
    }

    #[tokio::test]
    async fn test_failed_partition_stays_pending() {
        let gateway = gateway_from_fixture();
        gateway.fail_user_saves();
        let service = PermissionService::new(gateway.clone());
        let mut matrix = service.load().await.matrix;

        let module = Resource::Module(EntityId::from("m1"));
        let role = Subject::Role(EntityId::from("r1"));
        let user = Subject::User(EntityId::from("u2"));
        matrix.set(&role, &module, PermissionKind::Export, true).unwrap();
        matrix.set(&user, &module, PermissionKind::View, true).unwrap();

        let outcome = service.save(&mut matrix).await;
        assert!(!outcome.is_complete());
        assert_eq!(outcome.roles, PartitionOutcome::Saved(1));
        assert!(outcome.users.is_failed());

        let pending: Vec<&String> = matrix.pending().map(|(k, _)| k).collect();
        assert_eq!(pending, vec!["user:u2:module:m1:view"]);
        assert!(matrix.persisted_grants(&role, &module).can_export);
        assert!(matrix.is_granted(&user, &module, PermissionKind::View));
    }

    #[tokio::test]
    async fn test_save_with_nothing_pending_sends_nothing() {
        let gateway = gateway_from_fixture();
        let service = PermissionService::new(gateway.clone());
        let mut matrix = service.load().await.matrix;
        let outcome = service.save(&mut matrix).await;
        assert_eq!(outcome.roles, PartitionOutcome::Skipped);
        assert_eq!(outcome.users, PartitionOutcome::Skipped);
        assert_eq!(gateway.role_saves() + gateway.user_saves(), 0);
    }
}
