use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{CoordinatorProfile, Course, CourseKind, Semester, SemesterName};
use crate::services::DomainError;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct CourseDef {
    pub name: String,
    pub code: String,
    pub credits: i32,
    #[serde(default = "default_kind")]
    pub kind: CourseKind,
}

fn default_kind() -> CourseKind {
    CourseKind::Compulsory
}

/// Course registration and course-set maintenance.
pub struct RegistrationService {
    store: Arc<dyn Store>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register courses for a student's (session, level) entry in one term.
    /// Codes already present are filtered out; the call is rejected only when
    /// nothing new remains, making duplicate submission idempotent.
    pub async fn register_courses(
        &self,
        reg_no: &str,
        session: &str,
        term: SemesterName,
        codes: &[String],
    ) -> Result<Vec<Course>, DomainError> {
        if codes.is_empty() {
            return Err(DomainError::validation("No course codes provided"));
        }

        let student = self
            .store
            .find_student_by_reg(reg_no)
            .await?
            .ok_or_else(|| DomainError::not_found("Student not found"))?;

        let courses = self.resolve_codes(codes).await?;

        let entry = self
            .store
            .ensure_session_entry(student.id, session, &student.level)
            .await?;
        let registered = match term {
            SemesterName::Harmattan => &entry.harmattan,
            SemesterName::Rain => &entry.rain,
        };

        let new_courses: Vec<Course> = courses
            .into_iter()
            .filter(|c| !registered.contains(&c.id))
            .collect();
        if new_courses.is_empty() {
            return Err(DomainError::conflict(
                "All requested courses are already registered",
            ));
        }

        let ids: Vec<Uuid> = new_courses.iter().map(|c| c.id).collect();
        self.store
            .union_session_courses(student.id, session, &student.level, term, &ids)
            .await?;

        info!(student = %student.id, session, term = %term, count = ids.len(),
            "courses registered");
        Ok(new_courses)
    }

    /// Add courses to a coordinator's managed set. Any id already assigned
    /// fails the whole call, naming the offenders.
    pub async fn add_coordinator_courses(
        &self,
        coordinator: &CoordinatorProfile,
        course_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DomainError> {
        if course_ids.is_empty() {
            return Err(DomainError::validation("Invalid or missing course IDs"));
        }

        let duplicates: Vec<String> = course_ids
            .iter()
            .filter(|id| coordinator.courses.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !duplicates.is_empty() {
            return Err(DomainError::conflict(format!(
                "These courses are already assigned: {}",
                duplicates.join(", ")
            )));
        }

        self.verify_ids_exist(course_ids).await?;
        self.store
            .add_coordinator_courses(coordinator.id, course_ids)
            .await?;

        let mut all = coordinator.courses.clone();
        all.extend_from_slice(course_ids);
        Ok(all)
    }

    /// Set difference; ids not present are a no-op.
    pub async fn remove_coordinator_courses(
        &self,
        coordinator: &CoordinatorProfile,
        course_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DomainError> {
        self.store
            .remove_coordinator_courses(coordinator.id, course_ids)
            .await?;
        Ok(coordinator
            .courses
            .iter()
            .copied()
            .filter(|id| !course_ids.contains(id))
            .collect())
    }

    /// Full overwrite after validating every new id resolves.
    pub async fn replace_coordinator_courses(
        &self,
        coordinator: &CoordinatorProfile,
        course_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DomainError> {
        self.verify_ids_exist(course_ids).await?;
        self.store
            .replace_coordinator_courses(coordinator.id, course_ids)
            .await?;
        Ok(course_ids.to_vec())
    }

    /// Merge-upsert: creating an existing (name, session) pair folds new
    /// courses in, rejecting only when every requested course is already
    /// present.
    pub async fn create_semester(
        &self,
        name: SemesterName,
        session: &str,
        course_ids: &[Uuid],
    ) -> Result<Semester, DomainError> {
        self.verify_ids_exist(course_ids).await?;

        match self.store.find_semester(name, session).await? {
            Some(existing) => {
                let new_ids: Vec<Uuid> = course_ids
                    .iter()
                    .copied()
                    .filter(|id| !existing.courses.contains(id))
                    .collect();
                if new_ids.is_empty() {
                    return Err(DomainError::conflict("Semester already exists"));
                }
                self.store
                    .union_semester_courses(existing.id, &new_ids)
                    .await?;
                self.store
                    .find_semester_by_id(existing.id)
                    .await?
                    .ok_or_else(|| {
                        DomainError::Integrity(format!("semester {} vanished", existing.id))
                    })
            }
            None => {
                let semester = Semester {
                    id: Uuid::new_v4(),
                    name,
                    session: session.to_string(),
                    courses: course_ids.to_vec(),
                };
                self.store.insert_semester(&semester).await?;
                Ok(semester)
            }
        }
    }

    /// Bulk reference-data load; codes already present are skipped.
    pub async fn load_courses(&self, defs: &[CourseDef]) -> Result<usize, DomainError> {
        let mut loaded = 0;
        for def in defs {
            if self.store.find_course_by_code(&def.code).await?.is_some() {
                continue;
            }
            let course = Course {
                id: Uuid::new_v4(),
                name: def.name.clone(),
                code: def.code.clone(),
                credits: def.credits,
                kind: def.kind,
            };
            self.store.insert_course(&course).await?;
            loaded += 1;
        }
        info!(loaded, "reference courses loaded");
        Ok(loaded)
    }

    /// Reference listing by level and term: the hundreds digit of the course
    /// number is the level, parity picks the term.
    pub async fn list_courses(
        &self,
        level: &str,
        term: SemesterName,
    ) -> Result<Vec<Course>, DomainError> {
        let level: u32 = level
            .parse()
            .map_err(|_| DomainError::validation("Invalid level"))?;
        Ok(self
            .store
            .list_courses()
            .await?
            .into_iter()
            .filter(|c| {
                let number = c
                    .code
                    .split_whitespace()
                    .nth(1)
                    .and_then(|n| n.parse::<u32>().ok());
                match number {
                    Some(n) => (n / 100) * 100 == level && c.semester_name() == Some(term),
                    None => false,
                }
            })
            .collect())
    }

    async fn resolve_codes(&self, codes: &[String]) -> Result<Vec<Course>, DomainError> {
        let mut courses = Vec::with_capacity(codes.len());
        for code in codes {
            let course = self
                .store
                .find_course_by_code(code)
                .await?
                .ok_or_else(|| DomainError::not_found(format!("Course not found: {}", code)))?;
            courses.push(course);
        }
        Ok(courses)
    }

    async fn verify_ids_exist(&self, ids: &[Uuid]) -> Result<(), DomainError> {
        let found = self.store.find_courses_by_ids(ids).await?;
        if found.len() != ids.len() {
            return Err(DomainError::not_found("Some courses not found"));
        }
        Ok(())
    }
}
