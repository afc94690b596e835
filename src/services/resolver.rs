use std::sync::Arc;

use crate::models::{
    Account, AdvisorProfile, CoordinatorProfile, ParentProfile, Role, StudentProfile,
};
use crate::services::DomainError;
use crate::store::Store;

/// Declarative per-operation authorization rule: the set of roles allowed to
/// reach an operation. Evaluated once here rather than re-checked ad hoc in
/// every handler; ownership scoping happens in the services through the
/// resolved profile.
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    allowed: &'static [Role],
}

impl RoutePolicy {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn authorize(&self, account: &Account) -> Result<(), DomainError> {
        if self.allowed.contains(&account.role) {
            Ok(())
        } else {
            tracing::warn!(
                account = %account.id,
                role = %account.role,
                "role not permitted for operation"
            );
            Err(DomainError::unauthorized("Role not permitted"))
        }
    }
}

pub const STUDENT_ONLY: RoutePolicy = RoutePolicy::new(&[Role::Student]);
pub const PARENT_ONLY: RoutePolicy = RoutePolicy::new(&[Role::Parent]);
pub const ADVISOR_ONLY: RoutePolicy = RoutePolicy::new(&[Role::CourseAdvisor]);
pub const COORDINATOR_ONLY: RoutePolicy = RoutePolicy::new(&[Role::CourseCoordinator]);
pub const STAFF: RoutePolicy = RoutePolicy::new(&[Role::CourseAdvisor, Role::CourseCoordinator]);

/// Resolves an authenticated account to its single role profile. A missing
/// profile for an existing account is a data-integrity fault (500), not a
/// client error: registration creates both rows together.
pub struct Resolver {
    store: Arc<dyn Store>,
}

impl Resolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn student(&self, account: &Account) -> Result<StudentProfile, DomainError> {
        STUDENT_ONLY.authorize(account)?;
        self.store
            .find_student_by_account(account.id)
            .await?
            .ok_or_else(|| missing_profile(account))
    }

    pub async fn parent(&self, account: &Account) -> Result<ParentProfile, DomainError> {
        PARENT_ONLY.authorize(account)?;
        self.store
            .find_parent_by_account(account.id)
            .await?
            .ok_or_else(|| missing_profile(account))
    }

    pub async fn advisor(&self, account: &Account) -> Result<AdvisorProfile, DomainError> {
        ADVISOR_ONLY.authorize(account)?;
        self.store
            .find_advisor_by_account(account.id)
            .await?
            .ok_or_else(|| missing_profile(account))
    }

    pub async fn coordinator(&self, account: &Account) -> Result<CoordinatorProfile, DomainError> {
        COORDINATOR_ONLY.authorize(account)?;
        self.store
            .find_coordinator_by_account(account.id)
            .await?
            .ok_or_else(|| missing_profile(account))
    }
}

fn missing_profile(account: &Account) -> DomainError {
    DomainError::Integrity(format!(
        "account {} has no {} profile",
        account.id, account.role
    ))
}
