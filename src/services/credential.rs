use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::models::{
    Account, AdvisorProfile, CoordinatorProfile, ParentProfile, Role, StudentProfile,
};
use crate::services::DomainError;
use crate::store::Store;

/// Role-specific registration fields; flattened into the register payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleFields {
    /// Student: registration number (unique business key).
    pub reg_no: Option<String>,
    /// Student: current level, e.g. "300".
    pub level: Option<String>,
    /// Student: assigned course advisor (profile id).
    pub advisor_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct Registered {
    pub account: Account,
    pub profile_id: Uuid,
    pub token: String,
}

#[derive(Debug)]
pub struct LoggedIn {
    pub token: String,
    pub profile_id: Uuid,
    pub role: Role,
}

/// Verifies passwords and issues signed session tokens; owns the
/// account-plus-profile creation pair.
pub struct CredentialService {
    store: Arc<dyn Store>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn register(
        &self,
        role: Role,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        fields: RoleFields,
    ) -> Result<Registered, DomainError> {
        validate_name(first_name, "firstName")?;
        validate_name(last_name, "lastName")?;
        validate_email(email)?;
        if password.len() < 8 {
            return Err(DomainError::validation(
                "Password must be at least 8 characters",
            ));
        }

        if self.store.find_account_by_email(email).await?.is_some() {
            return Err(DomainError::conflict("User already exists"));
        }

        // Student unique keys and the advisor link are validated before
        // anything is created, so a rejected registration leaves no partial
        // state behind.
        let student_seed = match role {
            Role::Student => {
                let reg_no = fields
                    .reg_no
                    .clone()
                    .filter(|r| !r.trim().is_empty())
                    .ok_or_else(|| DomainError::validation("reg is required"))?;
                if self.store.find_student_by_reg(&reg_no).await?.is_some() {
                    return Err(DomainError::conflict("Student already exists"));
                }
                let advisor_id = fields
                    .advisor_id
                    .ok_or_else(|| DomainError::validation("advisorId is required"))?;
                let advisor = self
                    .store
                    .find_advisor(advisor_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Advisor not found"))?;
                Some((reg_no, advisor))
            }
            _ => None,
        };

        let account = Account {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            credential_hash: auth::hash_password(password)?,
            role,
            created_at: Utc::now(),
        };
        self.store.insert_account(&account).await?;

        let profile_id = match role {
            Role::Student => {
                let (reg_no, advisor) = student_seed.ok_or_else(|| {
                    DomainError::Integrity("student seed resolved then lost".into())
                })?;
                let profile = StudentProfile {
                    id: Uuid::new_v4(),
                    account_id: account.id,
                    reg_no,
                    level: fields
                        .level
                        .clone()
                        .unwrap_or_else(|| "100".to_string()),
                    advisor_id: Some(advisor.id),
                    sessions: vec![],
                };
                self.store.insert_student(&profile).await?;
                self.store.add_advisee(advisor.id, profile.id).await?;
                profile.id
            }
            Role::Parent => {
                let profile = ParentProfile {
                    id: Uuid::new_v4(),
                    account_id: account.id,
                    children: vec![],
                };
                self.store.insert_parent(&profile).await?;
                profile.id
            }
            Role::CourseAdvisor => {
                let profile = AdvisorProfile {
                    id: Uuid::new_v4(),
                    account_id: account.id,
                    level: fields.level.clone(),
                    advisees: vec![],
                    parents: vec![],
                };
                self.store.insert_advisor(&profile).await?;
                profile.id
            }
            Role::CourseCoordinator => {
                let profile = CoordinatorProfile {
                    id: Uuid::new_v4(),
                    account_id: account.id,
                    courses: vec![],
                };
                self.store.insert_coordinator(&profile).await?;
                profile.id
            }
        };

        let token = self.issue_token(&account)?;
        info!(account = %account.id, role = %role, "registered");

        Ok(Registered {
            account,
            profile_id,
            token,
        })
    }

    /// Login against one role's endpoint. An account whose stored role
    /// differs from the endpoint's role is rejected regardless of credential
    /// correctness.
    pub async fn login(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<LoggedIn, DomainError> {
        let account = self
            .store
            .find_account_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        if !auth::verify_password(password, &account.credential_hash)? {
            return Err(DomainError::unauthorized("Invalid credentials"));
        }

        if account.role != role {
            tracing::warn!(account = %account.id, expected = %role, actual = %account.role,
                "login role mismatch");
            return Err(DomainError::unauthorized("Invalid credentials for this role"));
        }

        let profile_id = self.profile_id(&account).await?;
        let token = self.issue_token(&account)?;

        Ok(LoggedIn {
            token,
            profile_id,
            role: account.role,
        })
    }

    /// Re-hash and persist a new password, then re-issue a token.
    pub async fn update_password(
        &self,
        account: &Account,
        new_password: &str,
    ) -> Result<String, DomainError> {
        if new_password.len() < 8 {
            return Err(DomainError::validation(
                "Password must be at least 8 characters",
            ));
        }
        let hash = auth::hash_password(new_password)?;
        self.store.update_credential_hash(account.id, &hash).await?;
        Ok(self.issue_token(account)?)
    }

    /// Update the account's name and email, then re-issue a token carrying
    /// the new email. The email stays unique across accounts.
    pub async fn update_identity(
        &self,
        account: &Account,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<(Account, String), DomainError> {
        validate_name(first_name, "firstName")?;
        validate_name(last_name, "lastName")?;
        validate_email(email)?;

        if let Some(existing) = self.store.find_account_by_email(email).await? {
            if existing.id != account.id {
                return Err(DomainError::conflict("Email already in use"));
            }
        }

        self.store
            .update_account_identity(account.id, first_name, last_name, email)
            .await?;

        let updated = Account {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            ..account.clone()
        };
        let token = self.issue_token(&updated)?;
        Ok((updated, token))
    }

    pub fn issue_token(&self, account: &Account) -> Result<String, DomainError> {
        let claims = Claims::new(account.id, account.email.clone(), account.role);
        Ok(auth::generate_jwt(&claims)?)
    }

    async fn profile_id(&self, account: &Account) -> Result<Uuid, DomainError> {
        let id = match account.role {
            Role::Student => self
                .store
                .find_student_by_account(account.id)
                .await?
                .map(|p| p.id),
            Role::Parent => self
                .store
                .find_parent_by_account(account.id)
                .await?
                .map(|p| p.id),
            Role::CourseAdvisor => self
                .store
                .find_advisor_by_account(account.id)
                .await?
                .map(|p| p.id),
            Role::CourseCoordinator => self
                .store
                .find_coordinator_by_account(account.id)
                .await?
                .map(|p| p.id),
        };
        id.ok_or_else(|| {
            DomainError::Integrity(format!(
                "account {} has no {} profile",
                account.id, account.role
            ))
        })
    }
}

fn validate_name(value: &str, field: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(DomainError::validation("Invalid email format"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemStore;

    fn service() -> (CredentialService, Arc<dyn Store>) {
        let store: Arc<dyn Store> = Arc::new(MemStore::new());
        (CredentialService::new(store.clone()), store)
    }

    async fn register_advisor(svc: &CredentialService, email: &str) -> Registered {
        svc.register(
            Role::CourseAdvisor,
            "Ngozi",
            "Eze",
            email,
            "correct horse",
            RoleFields::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (svc, _) = service();
        register_advisor(&svc, "ngozi@example.edu").await;
        let err = svc
            .register(
                Role::Parent,
                "Ada",
                "Obi",
                "ngozi@example.edu",
                "password123",
                RoleFields::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn student_registration_links_advisor_and_advisee() {
        let (svc, store) = service();
        let advisor = register_advisor(&svc, "adv@example.edu").await;

        let registered = svc
            .register(
                Role::Student,
                "Ada",
                "Obi",
                "ada@example.edu",
                "password123",
                RoleFields {
                    reg_no: Some("2021/12345".into()),
                    level: Some("300".into()),
                    advisor_id: Some(advisor.profile_id),
                },
            )
            .await
            .unwrap();

        let student = store
            .find_student_by_reg("2021/12345")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.id, registered.profile_id);
        assert_eq!(student.advisor_id, Some(advisor.profile_id));

        let adv = store.find_advisor(advisor.profile_id).await.unwrap().unwrap();
        assert_eq!(adv.advisees, vec![student.id]);
    }

    #[tokio::test]
    async fn student_registration_rejects_unknown_advisor() {
        let (svc, store) = service();
        let err = svc
            .register(
                Role::Student,
                "Ada",
                "Obi",
                "ada@example.edu",
                "password123",
                RoleFields {
                    reg_no: Some("2021/12345".into()),
                    level: Some("300".into()),
                    advisor_id: Some(Uuid::new_v4()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        // No partial state left behind
        assert!(store
            .find_account_by_email("ada@example.edu")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_reg_no_conflicts_without_partial_state() {
        let (svc, store) = service();
        let advisor = register_advisor(&svc, "adv@example.edu").await;
        let student_fields = || RoleFields {
            reg_no: Some("2021/12345".into()),
            level: Some("100".into()),
            advisor_id: Some(advisor.profile_id),
        };

        svc.register(
            Role::Student,
            "Ada",
            "Obi",
            "ada@example.edu",
            "password123",
            student_fields(),
        )
        .await
        .unwrap();

        let err = svc
            .register(
                Role::Student,
                "Ben",
                "Obi",
                "ben@example.edu",
                "password123",
                student_fields(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // The rejected registration must not leave an orphaned account
        assert!(store
            .find_account_by_email("ben@example.edu")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn identity_update_keeps_email_unique_and_persists() {
        let (svc, store) = service();
        register_advisor(&svc, "taken@example.edu").await;
        let other = register_advisor(&svc, "ngozi@example.edu").await;

        let err = svc
            .update_identity(&other.account, "Ngozi", "Eze", "taken@example.edu")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let (updated, token) = svc
            .update_identity(&other.account, "Ngozi", "Eze-Okafor", "new@example.edu")
            .await
            .unwrap();
        assert_eq!(updated.last_name, "Eze-Okafor");
        assert!(!token.is_empty());

        let fresh = store.find_account(other.account.id).await.unwrap().unwrap();
        assert_eq!(fresh.email, "new@example.edu");
        // Re-submitting the caller's own email is not a conflict
        svc.update_identity(&fresh, "Ngozi", "Eze-Okafor", "new@example.edu")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn login_checks_role_endpoint() {
        let (svc, _) = service();
        register_advisor(&svc, "adv@example.edu").await;

        // Correct credentials, wrong role endpoint
        let err = svc
            .login(Role::Student, "adv@example.edu", "correct horse")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        // Correct role endpoint
        let ok = svc
            .login(Role::CourseAdvisor, "adv@example.edu", "correct horse")
            .await
            .unwrap();
        assert_eq!(ok.role, Role::CourseAdvisor);
        assert!(!ok.token.is_empty());
    }

    #[tokio::test]
    async fn login_rejects_bad_password_and_unknown_email() {
        let (svc, _) = service();
        register_advisor(&svc, "adv@example.edu").await;

        let err = svc
            .login(Role::CourseAdvisor, "adv@example.edu", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        let err = svc
            .login(Role::CourseAdvisor, "nobody@example.edu", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
