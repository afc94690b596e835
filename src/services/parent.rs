use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::models::{Account, ParentProfile, StudentProfile};
use crate::services::results::{LatestResults, ResultsService};
use crate::services::DomainError;
use crate::store::Store;

/// A child as shown to the parent: profile plus the account identity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSummary {
    pub profile: StudentProfile,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Parent-scoped operations. The parent's children set is the ownership
/// boundary: every child-keyed read checks membership first.
pub struct ParentService {
    store: Arc<dyn Store>,
    results: ResultsService,
}

impl ParentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let results = ResultsService::new(store.clone());
        Self { store, results }
    }

    /// Resolve a student by registration number and append to the children
    /// set. Duplicate adds conflict and leave the set unchanged.
    pub async fn add_child(
        &self,
        parent: &ParentProfile,
        reg_no: &str,
    ) -> Result<StudentProfile, DomainError> {
        let student = self
            .store
            .find_student_by_reg(reg_no)
            .await?
            .ok_or_else(|| DomainError::not_found("Student not found"))?;

        if parent.children.contains(&student.id) {
            return Err(DomainError::conflict("Child already added"));
        }
        // The append itself is duplicate-guarded; a concurrent add of the
        // same child loses cleanly here.
        if !self.store.add_child(parent.id, student.id).await? {
            return Err(DomainError::conflict("Child already added"));
        }

        info!(parent = %parent.id, student = %student.id, "child added");
        Ok(student)
    }

    pub async fn children(
        &self,
        parent: &ParentProfile,
    ) -> Result<Vec<ChildSummary>, DomainError> {
        let mut out = Vec::with_capacity(parent.children.len());
        for child_id in &parent.children {
            let profile = self.store.find_student(*child_id).await?.ok_or_else(|| {
                DomainError::Integrity(format!("child {} has no student profile", child_id))
            })?;
            let account = self.account_for(&profile).await?;
            out.push(ChildSummary {
                first_name: account.first_name,
                last_name: account.last_name,
                email: account.email,
                profile,
            });
        }
        Ok(out)
    }

    /// All result rows for a child, keyed by registration-number snapshot.
    pub async fn child_results(
        &self,
        parent: &ParentProfile,
        reg_no: &str,
    ) -> Result<Vec<crate::models::ResultRow>, DomainError> {
        self.check_ownership(parent, reg_no).await?;
        self.results.by_reg(reg_no).await
    }

    /// Two most recent semesters for a child.
    pub async fn child_latest_results(
        &self,
        parent: &ParentProfile,
        reg_no: &str,
    ) -> Result<LatestResults, DomainError> {
        self.check_ownership(parent, reg_no).await?;
        self.results.latest_by_reg(reg_no).await
    }

    /// Ownership predicate: a registration number outside the parent's
    /// children set is rejected as an authorization failure, not a 404.
    async fn check_ownership(
        &self,
        parent: &ParentProfile,
        reg_no: &str,
    ) -> Result<(), DomainError> {
        let student = self
            .store
            .find_student_by_reg(reg_no)
            .await?
            .ok_or_else(|| DomainError::not_found("Student not found"))?;
        if !parent.children.contains(&student.id) {
            return Err(DomainError::unauthorized(
                "Student is not registered as a child of this parent",
            ));
        }
        Ok(())
    }

    async fn account_for(&self, student: &StudentProfile) -> Result<Account, DomainError> {
        self.store
            .find_account(student.account_id)
            .await?
            .ok_or_else(|| {
                DomainError::Integrity(format!(
                    "student {} references missing account {}",
                    student.id, student.account_id
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SemesterName;
    use crate::services::results::UploadRow;
    use crate::testing::{fixtures, MemStore};

    fn service() -> (ParentService, Arc<dyn Store>) {
        let store: Arc<dyn Store> = Arc::new(MemStore::new());
        (ParentService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn duplicate_child_add_conflicts_and_leaves_set_unchanged() {
        let (svc, store) = service();
        fixtures::student(&store, "2021/12345", "100").await;
        let parent = fixtures::parent(&store).await;

        svc.add_child(&parent, "2021/12345").await.unwrap();
        let parent = store.find_parent(parent.id).await.unwrap().unwrap();

        let err = svc.add_child(&parent, "2021/12345").await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let fresh = store.find_parent(parent.id).await.unwrap().unwrap();
        assert_eq!(fresh.children.len(), 1);
    }

    #[tokio::test]
    async fn add_child_requires_existing_student() {
        let (svc, store) = service();
        let parent = fixtures::parent(&store).await;
        let err = svc.add_child(&parent, "1999/00000").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn child_results_enforce_ownership() {
        let (svc, store) = service();
        fixtures::student(&store, "2021/12345", "100").await;
        let parent = fixtures::parent(&store).await;

        // Not a child yet
        let err = svc.child_results(&parent, "2021/12345").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        svc.add_child(&parent, "2021/12345").await.unwrap();
        let parent = store.find_parent(parent.id).await.unwrap().unwrap();

        let course = fixtures::course("CS 101");
        store.insert_course(&course).await.unwrap();
        let semester = fixtures::semester(&store, SemesterName::Harmattan, "2024/2025").await;
        ResultsService::new(store.clone())
            .upload(
                semester.id,
                course.id,
                &[UploadRow {
                    reg_no: "2021/12345".into(),
                    exam_score: 40.0,
                    lab_score: 20.0,
                    test_score: 10.0,
                    total: None,
                    grade: "B".into(),
                }],
            )
            .await
            .unwrap();

        let rows = svc.child_results(&parent, "2021/12345").await.unwrap();
        assert_eq!(rows.len(), 1);
        let latest = svc
            .child_latest_results(&parent, "2021/12345")
            .await
            .unwrap();
        assert!(latest.first_semester.is_some());
    }

    #[tokio::test]
    async fn children_listing_carries_account_identity() {
        let (svc, store) = service();
        let student = fixtures::student(&store, "2021/12345", "100").await;
        let parent = fixtures::parent(&store).await;
        svc.add_child(&parent, "2021/12345").await.unwrap();
        let parent = store.find_parent(parent.id).await.unwrap().unwrap();

        let children = svc.children(&parent).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].profile.id, student.id);
        assert!(!children[0].email.is_empty());
    }
}
