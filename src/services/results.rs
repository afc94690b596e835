use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::models::{ResultRow, Semester};
use crate::services::DomainError;
use crate::store::Store;

/// One uploaded grade line, keyed by registration number. The student
/// reference is resolved at upload time; the reg number stays on the row as
/// a snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRow {
    pub reg_no: String,
    pub exam_score: f64,
    pub lab_score: f64,
    pub test_score: f64,
    /// Assigned total; computed from the three scores when absent.
    pub total: Option<f64>,
    pub grade: String,
}

/// The two most recent semesters' rows, keyed first/second; null when the
/// student has results in fewer semesters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestResults {
    pub first_semester: Option<Vec<ResultRow>>,
    pub second_semester: Option<Vec<ResultRow>>,
}

pub struct ResultsService {
    store: Arc<dyn Store>,
}

impl ResultsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Bulk upload: every row is stamped with the semester and course and
    /// inserted append-only inside one store transaction. Rows are never
    /// updated in place.
    pub async fn upload(
        &self,
        semester_id: Uuid,
        course_id: Uuid,
        rows: &[UploadRow],
    ) -> Result<usize, DomainError> {
        if rows.is_empty() {
            return Err(DomainError::validation("Missing required parameters"));
        }
        self.store
            .find_semester_by_id(semester_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Semester not found"))?;
        let course_ids = self.store.find_courses_by_ids(&[course_id]).await?;
        if course_ids.is_empty() {
            return Err(DomainError::not_found("Course not found"));
        }

        // Resolve every reg number before inserting anything
        let mut stamped = Vec::with_capacity(rows.len());
        for row in rows {
            let student = self
                .store
                .find_student_by_reg(&row.reg_no)
                .await?
                .ok_or_else(|| {
                    DomainError::not_found(format!("Student not found: {}", row.reg_no))
                })?;
            stamped.push(ResultRow {
                id: Uuid::new_v4(),
                student_id: student.id,
                course_id,
                semester_id,
                reg_no: row.reg_no.clone(),
                exam_score: row.exam_score,
                lab_score: row.lab_score,
                test_score: row.test_score,
                total: row
                    .total
                    .unwrap_or(row.exam_score + row.lab_score + row.test_score),
                grade: row.grade.clone(),
                created_at: Utc::now(),
            });
        }

        self.store.insert_results(&stamped).await?;
        info!(semester = %semester_id, course = %course_id, count = stamped.len(),
            "results uploaded");
        Ok(stamped.len())
    }

    /// All rows for a student, upload order.
    pub async fn for_student(&self, student_id: Uuid) -> Result<Vec<ResultRow>, DomainError> {
        Ok(self.store.results_for_student(student_id).await?)
    }

    /// All rows carrying a registration-number snapshot.
    pub async fn by_reg(&self, reg_no: &str) -> Result<Vec<ResultRow>, DomainError> {
        Ok(self.store.results_by_reg(reg_no).await?)
    }

    /// Rows for one (course, semester) pair - the uploader's view.
    pub async fn filtered(
        &self,
        course_id: Uuid,
        semester_id: Uuid,
    ) -> Result<Vec<ResultRow>, DomainError> {
        Ok(self.store.results_filtered(course_id, semester_id).await?)
    }

    /// Latest results for a student: rows grouped by semester, candidate
    /// semesters ordered by (session desc, name desc), at most the two most
    /// recent returned. A student with zero rows is a 404.
    pub async fn latest_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<LatestResults, DomainError> {
        let rows = self.store.results_for_student(student_id).await?;
        self.group_latest(rows).await
    }

    pub async fn latest_by_reg(&self, reg_no: &str) -> Result<LatestResults, DomainError> {
        let rows = self.store.results_by_reg(reg_no).await?;
        self.group_latest(rows).await
    }

    async fn group_latest(&self, rows: Vec<ResultRow>) -> Result<LatestResults, DomainError> {
        if rows.is_empty() {
            return Err(DomainError::not_found("No results found for the student"));
        }

        let semester_ids: Vec<Uuid> = rows
            .iter()
            .map(|r| r.semester_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let mut semesters = self.store.find_semesters_by_ids(&semester_ids).await?;
        semesters.sort_by(Semester::recency_cmp);

        let pick = |semester: Option<&Semester>| {
            semester.map(|s| {
                rows.iter()
                    .filter(|r| r.semester_id == s.id)
                    .cloned()
                    .collect::<Vec<_>>()
            })
        };

        Ok(LatestResults {
            first_semester: pick(semesters.first()),
            second_semester: pick(semesters.get(1)),
        })
    }
}
