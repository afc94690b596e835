use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One graded outcome for a student in a course within a semester.
/// Append-only: rows are bulk-inserted at upload time and never updated.
/// Rows carry both the student reference and a registration-number snapshot;
/// student-facing reads key by id, parent proxies key by the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub semester_id: Uuid,
    pub reg_no: String,
    pub exam_score: f64,
    pub lab_score: f64,
    pub test_score: f64,
    pub total: f64,
    pub grade: String,
    pub created_at: DateTime<Utc>,
}
