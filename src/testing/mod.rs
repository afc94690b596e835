//! In-memory store used by service tests. Implements the full storage
//! boundary over plain vectors behind one mutex so tests run without a
//! database.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Account, AdvisorProfile, CoordinatorProfile, Course, Message, ParentProfile, ResultRow,
    Semester, SemesterName, SessionEntry, StudentProfile,
};
use crate::store::{Store, StoreError};

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    students: Vec<StudentProfile>,
    parents: Vec<ParentProfile>,
    advisors: Vec<AdvisorProfile>,
    coordinators: Vec<CoordinatorProfile>,
    sessions: Vec<(Uuid, SessionEntry)>,
    courses: Vec<Course>,
    semesters: Vec<Semester>,
    results: Vec<ResultRow>,
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.inner.lock().unwrap();
        f(&mut inner)
    }

    /// Attach the student's session entries the way a joined read would.
    fn hydrate(inner: &Inner, mut student: StudentProfile) -> StudentProfile {
        student.sessions = inner
            .sessions
            .iter()
            .filter(|(id, _)| *id == student.id)
            .map(|(_, entry)| entry.clone())
            .collect();
        student
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        self.with(|inner| {
            if inner.accounts.iter().any(|a| a.email == account.email) {
                return Err(StoreError::Conflict("duplicate email".into()));
            }
            inner.accounts.push(account.clone());
            Ok(())
        })
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        self.with(|inner| Ok(inner.accounts.iter().find(|a| a.id == id).cloned()))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.with(|inner| Ok(inner.accounts.iter().find(|a| a.email == email).cloned()))
    }

    async fn update_credential_hash(&self, id: Uuid, hash: &str) -> Result<(), StoreError> {
        self.with(|inner| {
            if let Some(account) = inner.accounts.iter_mut().find(|a| a.id == id) {
                account.credential_hash = hash.to_string();
            }
            Ok(())
        })
    }

    async fn update_account_identity(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<(), StoreError> {
        self.with(|inner| {
            if inner.accounts.iter().any(|a| a.email == email && a.id != id) {
                return Err(StoreError::Conflict("duplicate email".into()));
            }
            if let Some(account) = inner.accounts.iter_mut().find(|a| a.id == id) {
                account.first_name = first_name.to_string();
                account.last_name = last_name.to_string();
                account.email = email.to_string();
            }
            Ok(())
        })
    }

    async fn insert_student(&self, profile: &StudentProfile) -> Result<(), StoreError> {
        self.with(|inner| {
            if inner.students.iter().any(|s| s.reg_no == profile.reg_no) {
                return Err(StoreError::Conflict("duplicate reg number".into()));
            }
            inner.students.push(profile.clone());
            Ok(())
        })
    }

    async fn find_student_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<StudentProfile>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .students
                .iter()
                .find(|s| s.account_id == account_id)
                .cloned()
                .map(|s| Self::hydrate(inner, s)))
        })
    }

    async fn find_student_by_reg(
        &self,
        reg_no: &str,
    ) -> Result<Option<StudentProfile>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .students
                .iter()
                .find(|s| s.reg_no == reg_no)
                .cloned()
                .map(|s| Self::hydrate(inner, s)))
        })
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<StudentProfile>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .students
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .map(|s| Self::hydrate(inner, s)))
        })
    }

    async fn insert_parent(&self, profile: &ParentProfile) -> Result<(), StoreError> {
        self.with(|inner| {
            inner.parents.push(profile.clone());
            Ok(())
        })
    }

    async fn find_parent(&self, id: Uuid) -> Result<Option<ParentProfile>, StoreError> {
        self.with(|inner| Ok(inner.parents.iter().find(|p| p.id == id).cloned()))
    }

    async fn find_parent_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<ParentProfile>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .parents
                .iter()
                .find(|p| p.account_id == account_id)
                .cloned())
        })
    }

    async fn add_child(&self, parent_id: Uuid, student_id: Uuid) -> Result<bool, StoreError> {
        self.with(|inner| {
            let parent = inner
                .parents
                .iter_mut()
                .find(|p| p.id == parent_id)
                .ok_or_else(|| StoreError::Query("parent not found".into()))?;
            if parent.children.contains(&student_id) {
                return Ok(false);
            }
            parent.children.push(student_id);
            Ok(true)
        })
    }

    async fn insert_advisor(&self, profile: &AdvisorProfile) -> Result<(), StoreError> {
        self.with(|inner| {
            inner.advisors.push(profile.clone());
            Ok(())
        })
    }

    async fn find_advisor(&self, id: Uuid) -> Result<Option<AdvisorProfile>, StoreError> {
        self.with(|inner| Ok(inner.advisors.iter().find(|a| a.id == id).cloned()))
    }

    async fn find_advisor_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<AdvisorProfile>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .advisors
                .iter()
                .find(|a| a.account_id == account_id)
                .cloned())
        })
    }

    async fn list_advisors(&self) -> Result<Vec<AdvisorProfile>, StoreError> {
        self.with(|inner| Ok(inner.advisors.clone()))
    }

    async fn add_advisee(&self, advisor_id: Uuid, student_id: Uuid) -> Result<bool, StoreError> {
        self.with(|inner| {
            let advisor = inner
                .advisors
                .iter_mut()
                .find(|a| a.id == advisor_id)
                .ok_or_else(|| StoreError::Query("advisor not found".into()))?;
            if advisor.advisees.contains(&student_id) {
                return Ok(false);
            }
            advisor.advisees.push(student_id);
            Ok(true)
        })
    }

    async fn insert_coordinator(&self, profile: &CoordinatorProfile) -> Result<(), StoreError> {
        self.with(|inner| {
            inner.coordinators.push(profile.clone());
            Ok(())
        })
    }

    async fn find_coordinator_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<CoordinatorProfile>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .coordinators
                .iter()
                .find(|c| c.account_id == account_id)
                .cloned())
        })
    }

    async fn add_coordinator_courses(
        &self,
        id: Uuid,
        courses: &[Uuid],
    ) -> Result<(), StoreError> {
        self.with(|inner| {
            let coordinator = inner
                .coordinators
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| StoreError::Query("coordinator not found".into()))?;
            for course in courses {
                if !coordinator.courses.contains(course) {
                    coordinator.courses.push(*course);
                }
            }
            Ok(())
        })
    }

    async fn remove_coordinator_courses(
        &self,
        id: Uuid,
        courses: &[Uuid],
    ) -> Result<(), StoreError> {
        self.with(|inner| {
            let coordinator = inner
                .coordinators
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| StoreError::Query("coordinator not found".into()))?;
            coordinator.courses.retain(|c| !courses.contains(c));
            Ok(())
        })
    }

    async fn replace_coordinator_courses(
        &self,
        id: Uuid,
        courses: &[Uuid],
    ) -> Result<(), StoreError> {
        self.with(|inner| {
            let coordinator = inner
                .coordinators
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| StoreError::Query("coordinator not found".into()))?;
            coordinator.courses = courses.to_vec();
            Ok(())
        })
    }

    async fn find_session_entry(
        &self,
        student_id: Uuid,
        session: &str,
        level: &str,
    ) -> Result<Option<SessionEntry>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .sessions
                .iter()
                .find(|(id, e)| *id == student_id && e.session == session && e.level == level)
                .map(|(_, e)| e.clone()))
        })
    }

    async fn ensure_session_entry(
        &self,
        student_id: Uuid,
        session: &str,
        level: &str,
    ) -> Result<SessionEntry, StoreError> {
        self.with(|inner| {
            if let Some((_, entry)) = inner
                .sessions
                .iter()
                .find(|(id, e)| *id == student_id && e.session == session && e.level == level)
            {
                return Ok(entry.clone());
            }
            let entry = SessionEntry {
                session: session.to_string(),
                level: level.to_string(),
                harmattan: vec![],
                rain: vec![],
            };
            inner.sessions.push((student_id, entry.clone()));
            Ok(entry)
        })
    }

    async fn union_session_courses(
        &self,
        student_id: Uuid,
        session: &str,
        level: &str,
        term: SemesterName,
        courses: &[Uuid],
    ) -> Result<(), StoreError> {
        self.with(|inner| {
            let entry = inner
                .sessions
                .iter_mut()
                .find(|(id, e)| *id == student_id && e.session == session && e.level == level)
                .map(|(_, e)| e)
                .ok_or_else(|| StoreError::Query("session entry not found".into()))?;
            let list = match term {
                SemesterName::Harmattan => &mut entry.harmattan,
                SemesterName::Rain => &mut entry.rain,
            };
            for course in courses {
                if !list.contains(course) {
                    list.push(*course);
                }
            }
            Ok(())
        })
    }

    async fn insert_course(&self, course: &Course) -> Result<(), StoreError> {
        self.with(|inner| {
            if inner.courses.iter().any(|c| c.code == course.code) {
                return Err(StoreError::Conflict("duplicate course code".into()));
            }
            inner.courses.push(course.clone());
            Ok(())
        })
    }

    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>, StoreError> {
        self.with(|inner| Ok(inner.courses.iter().find(|c| c.code == code).cloned()))
    }

    async fn find_courses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .courses
                .iter()
                .filter(|c| ids.contains(&c.id))
                .cloned()
                .collect())
        })
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        self.with(|inner| Ok(inner.courses.clone()))
    }

    async fn insert_semester(&self, semester: &Semester) -> Result<(), StoreError> {
        self.with(|inner| {
            if inner
                .semesters
                .iter()
                .any(|s| s.name == semester.name && s.session == semester.session)
            {
                return Err(StoreError::Conflict("duplicate semester".into()));
            }
            inner.semesters.push(semester.clone());
            Ok(())
        })
    }

    async fn find_semester(
        &self,
        name: SemesterName,
        session: &str,
    ) -> Result<Option<Semester>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .semesters
                .iter()
                .find(|s| s.name == name && s.session == session)
                .cloned())
        })
    }

    async fn find_semester_by_id(&self, id: Uuid) -> Result<Option<Semester>, StoreError> {
        self.with(|inner| Ok(inner.semesters.iter().find(|s| s.id == id).cloned()))
    }

    async fn find_semesters_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Semester>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .semesters
                .iter()
                .filter(|s| ids.contains(&s.id))
                .cloned()
                .collect())
        })
    }

    async fn union_semester_courses(&self, id: Uuid, courses: &[Uuid]) -> Result<(), StoreError> {
        self.with(|inner| {
            let semester = inner
                .semesters
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| StoreError::Query("semester not found".into()))?;
            for course in courses {
                if !semester.courses.contains(course) {
                    semester.courses.push(*course);
                }
            }
            Ok(())
        })
    }

    async fn insert_results(&self, rows: &[ResultRow]) -> Result<(), StoreError> {
        self.with(|inner| {
            inner.results.extend_from_slice(rows);
            Ok(())
        })
    }

    async fn results_for_student(&self, student_id: Uuid) -> Result<Vec<ResultRow>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .results
                .iter()
                .filter(|r| r.student_id == student_id)
                .cloned()
                .collect())
        })
    }

    async fn results_by_reg(&self, reg_no: &str) -> Result<Vec<ResultRow>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .results
                .iter()
                .filter(|r| r.reg_no == reg_no)
                .cloned()
                .collect())
        })
    }

    async fn results_filtered(
        &self,
        course_id: Uuid,
        semester_id: Uuid,
    ) -> Result<Vec<ResultRow>, StoreError> {
        self.with(|inner| {
            Ok(inner
                .results
                .iter()
                .filter(|r| r.course_id == course_id && r.semester_id == semester_id)
                .cloned()
                .collect())
        })
    }

    async fn insert_message(&self, message: &Message) -> Result<(), StoreError> {
        self.with(|inner| {
            inner.messages.push(message.clone());
            Ok(())
        })
    }

    async fn messages_for_account(&self, account_id: Uuid) -> Result<Vec<Message>, StoreError> {
        self.with(|inner| {
            let mut out: Vec<Message> = inner
                .messages
                .iter()
                .filter(|m| m.involves(account_id))
                .cloned()
                .collect();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(out)
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Seed helpers shared across service tests.
pub mod fixtures {
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::{
        Account, CoordinatorProfile, Course, CourseKind, ParentProfile, Role, Semester,
        SemesterName, StudentProfile,
    };
    use crate::store::Store;

    fn account(role: Role) -> Account {
        let id = Uuid::new_v4();
        Account {
            id,
            first_name: "Test".into(),
            last_name: role.as_str().into(),
            email: format!("{}-{}@example.edu", role.as_str(), id),
            credential_hash: "$2b$10$testhash".into(),
            role,
            created_at: Utc::now(),
        }
    }

    pub fn course(code: &str) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: format!("Course {}", code),
            code: code.into(),
            credits: 3,
            kind: CourseKind::Compulsory,
        }
    }

    pub async fn student(store: &Arc<dyn Store>, reg_no: &str, level: &str) -> StudentProfile {
        let account = account(Role::Student);
        store.insert_account(&account).await.unwrap();
        let profile = StudentProfile {
            id: Uuid::new_v4(),
            account_id: account.id,
            reg_no: reg_no.into(),
            level: level.into(),
            advisor_id: None,
            sessions: vec![],
        };
        store.insert_student(&profile).await.unwrap();
        profile
    }

    pub async fn parent(store: &Arc<dyn Store>) -> ParentProfile {
        let account = account(Role::Parent);
        store.insert_account(&account).await.unwrap();
        let profile = ParentProfile {
            id: Uuid::new_v4(),
            account_id: account.id,
            children: vec![],
        };
        store.insert_parent(&profile).await.unwrap();
        profile
    }

    pub async fn coordinator(store: &Arc<dyn Store>, courses: &[Uuid]) -> CoordinatorProfile {
        let account = account(Role::CourseCoordinator);
        store.insert_account(&account).await.unwrap();
        let profile = CoordinatorProfile {
            id: Uuid::new_v4(),
            account_id: account.id,
            courses: courses.to_vec(),
        };
        store.insert_coordinator(&profile).await.unwrap();
        profile
    }

    pub async fn semester(
        store: &Arc<dyn Store>,
        name: SemesterName,
        session: &str,
    ) -> Semester {
        let semester = Semester {
            id: Uuid::new_v4(),
            name,
            session: session.into(),
            courses: vec![],
        };
        store.insert_semester(&semester).await.unwrap();
        semester
    }
}
