pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Account, AdvisorProfile, CoordinatorProfile, Course, Message, ParentProfile, ResultRow,
    Semester, SemesterName, SessionEntry, StudentProfile,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store call timed out")]
    Timeout,

    #[error("query error: {0}")]
    Query(String),
}

/// Storage boundary for the whole system. An explicit handle with a defined
/// lifecycle, injected into every component - opened at process start,
/// closed at shutdown.
///
/// Mutations against shared sets (advisee lists, children, semester and
/// coordinator course lists, session course lists) are atomic set-union or
/// set-difference primitives, never read-then-overwrite, so concurrent
/// writers cannot drop each other's updates.
#[async_trait]
pub trait Store: Send + Sync {
    // Accounts
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn update_credential_hash(&self, id: Uuid, hash: &str) -> Result<(), StoreError>;
    async fn update_account_identity(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<(), StoreError>;

    // Role profiles (one row per account, unique on account_id)
    async fn insert_student(&self, profile: &StudentProfile) -> Result<(), StoreError>;
    async fn find_student_by_account(&self, account_id: Uuid)
        -> Result<Option<StudentProfile>, StoreError>;
    async fn find_student_by_reg(&self, reg_no: &str)
        -> Result<Option<StudentProfile>, StoreError>;
    async fn find_student(&self, id: Uuid) -> Result<Option<StudentProfile>, StoreError>;

    async fn insert_parent(&self, profile: &ParentProfile) -> Result<(), StoreError>;
    async fn find_parent(&self, id: Uuid) -> Result<Option<ParentProfile>, StoreError>;
    async fn find_parent_by_account(&self, account_id: Uuid)
        -> Result<Option<ParentProfile>, StoreError>;
    /// Duplicate-safe atomic append; returns false when the child was
    /// already present.
    async fn add_child(&self, parent_id: Uuid, student_id: Uuid) -> Result<bool, StoreError>;

    async fn insert_advisor(&self, profile: &AdvisorProfile) -> Result<(), StoreError>;
    async fn find_advisor(&self, id: Uuid) -> Result<Option<AdvisorProfile>, StoreError>;
    async fn find_advisor_by_account(&self, account_id: Uuid)
        -> Result<Option<AdvisorProfile>, StoreError>;
    async fn list_advisors(&self) -> Result<Vec<AdvisorProfile>, StoreError>;
    async fn add_advisee(&self, advisor_id: Uuid, student_id: Uuid) -> Result<bool, StoreError>;

    async fn insert_coordinator(&self, profile: &CoordinatorProfile) -> Result<(), StoreError>;
    async fn find_coordinator_by_account(&self, account_id: Uuid)
        -> Result<Option<CoordinatorProfile>, StoreError>;
    /// Atomic union; courses already present are not appended twice.
    async fn add_coordinator_courses(&self, id: Uuid, courses: &[Uuid]) -> Result<(), StoreError>;
    /// Atomic set difference; a no-op for ids not present.
    async fn remove_coordinator_courses(&self, id: Uuid, courses: &[Uuid])
        -> Result<(), StoreError>;
    async fn replace_coordinator_courses(&self, id: Uuid, courses: &[Uuid])
        -> Result<(), StoreError>;

    // Student session entries
    async fn find_session_entry(&self, student_id: Uuid, session: &str, level: &str)
        -> Result<Option<SessionEntry>, StoreError>;
    /// Find-or-create the (session, level) entry for a student.
    async fn ensure_session_entry(&self, student_id: Uuid, session: &str, level: &str)
        -> Result<SessionEntry, StoreError>;
    /// Atomic union into one term's course list of a session entry.
    async fn union_session_courses(
        &self,
        student_id: Uuid,
        session: &str,
        level: &str,
        term: SemesterName,
        courses: &[Uuid],
    ) -> Result<(), StoreError>;

    // Reference data
    async fn insert_course(&self, course: &Course) -> Result<(), StoreError>;
    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>, StoreError>;
    async fn find_courses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, StoreError>;
    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;

    async fn insert_semester(&self, semester: &Semester) -> Result<(), StoreError>;
    async fn find_semester(&self, name: SemesterName, session: &str)
        -> Result<Option<Semester>, StoreError>;
    async fn find_semester_by_id(&self, id: Uuid) -> Result<Option<Semester>, StoreError>;
    async fn find_semesters_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Semester>, StoreError>;
    async fn union_semester_courses(&self, id: Uuid, courses: &[Uuid]) -> Result<(), StoreError>;

    // Results (append-only)
    /// Bulk insert inside a single store transaction.
    async fn insert_results(&self, rows: &[ResultRow]) -> Result<(), StoreError>;
    async fn results_for_student(&self, student_id: Uuid) -> Result<Vec<ResultRow>, StoreError>;
    async fn results_by_reg(&self, reg_no: &str) -> Result<Vec<ResultRow>, StoreError>;
    async fn results_filtered(&self, course_id: Uuid, semester_id: Uuid)
        -> Result<Vec<ResultRow>, StoreError>;

    // Messages
    async fn insert_message(&self, message: &Message) -> Result<(), StoreError>;
    /// Union of messages where the account is sender or receiver, newest
    /// first.
    async fn messages_for_account(&self, account_id: Uuid) -> Result<Vec<Message>, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
