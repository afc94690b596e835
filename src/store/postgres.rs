use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::config;
use crate::models::{
    Account, AdvisorProfile, CoordinatorProfile, Course, Message, ParentProfile, ResultRow,
    Semester, SemesterName, SessionEntry, StudentProfile,
};

/// Postgres-backed store. Collections live in the tables described by
/// `schema.sql`; relationship sets are `uuid[]` columns mutated with
/// in-database array primitives so concurrent writers cannot lose updates.
pub struct PgStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let cfg = config::config();
        let pool = PgPoolOptions::new()
            .max_connections(cfg.database.max_connections)
            .connect(database_url)
            .await
            .map_err(map_sqlx)?;
        info!("connected to store");
        Ok(Self {
            pool,
            timeout: Duration::from_secs(cfg.database.store_timeout_secs),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("store closed");
    }

    /// Every store call goes through this guard; no operation may block the
    /// request path indefinitely.
    async fn guard<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    async fn load_sessions(&self, student_id: Uuid) -> Result<Vec<SessionEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT session, level, harmattan, rain FROM student_sessions \
             WHERE student_id = $1 ORDER BY session, level",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(session_from_row).collect()
    }

    async fn student_from_row(&self, row: &PgRow) -> Result<StudentProfile, StoreError> {
        let id: Uuid = get(row, "id")?;
        Ok(StudentProfile {
            id,
            account_id: get(row, "account_id")?,
            reg_no: get(row, "reg_no")?,
            level: get(row, "level")?,
            advisor_id: get(row, "advisor_id")?,
            sessions: self.load_sessions(id).await?,
        })
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    StoreError::Query(err.to_string())
}

fn get<'r, T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>>(
    row: &'r PgRow,
    column: &str,
) -> Result<T, StoreError> {
    row.try_get(column).map_err(map_sqlx)
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let role: String = get(row, "role")?;
    Ok(Account {
        id: get(row, "id")?,
        first_name: get(row, "first_name")?,
        last_name: get(row, "last_name")?,
        email: get(row, "email")?,
        credential_hash: get(row, "credential_hash")?,
        role: role.parse().map_err(StoreError::Query)?,
        created_at: get(row, "created_at")?,
    })
}

fn session_from_row(row: &PgRow) -> Result<SessionEntry, StoreError> {
    Ok(SessionEntry {
        session: get(row, "session")?,
        level: get(row, "level")?,
        harmattan: get(row, "harmattan")?,
        rain: get(row, "rain")?,
    })
}

fn parent_from_row(row: &PgRow) -> Result<ParentProfile, StoreError> {
    Ok(ParentProfile {
        id: get(row, "id")?,
        account_id: get(row, "account_id")?,
        children: get(row, "children")?,
    })
}

fn advisor_from_row(row: &PgRow) -> Result<AdvisorProfile, StoreError> {
    Ok(AdvisorProfile {
        id: get(row, "id")?,
        account_id: get(row, "account_id")?,
        level: get(row, "level")?,
        advisees: get(row, "advisees")?,
        parents: get(row, "parents")?,
    })
}

fn coordinator_from_row(row: &PgRow) -> Result<CoordinatorProfile, StoreError> {
    Ok(CoordinatorProfile {
        id: get(row, "id")?,
        account_id: get(row, "account_id")?,
        courses: get(row, "courses")?,
    })
}

fn course_from_row(row: &PgRow) -> Result<Course, StoreError> {
    let kind = match get::<String>(row, "kind")?.as_str() {
        "compulsory" => crate::models::CourseKind::Compulsory,
        "elective" => crate::models::CourseKind::Elective,
        other => return Err(StoreError::Query(format!("unknown course kind: {}", other))),
    };
    Ok(Course {
        id: get(row, "id")?,
        name: get(row, "name")?,
        code: get(row, "code")?,
        credits: get(row, "credits")?,
        kind,
    })
}

fn semester_from_row(row: &PgRow) -> Result<Semester, StoreError> {
    let name: String = get(row, "name")?;
    Ok(Semester {
        id: get(row, "id")?,
        name: name.parse().map_err(StoreError::Query)?,
        session: get(row, "session")?,
        courses: get(row, "courses")?,
    })
}

fn result_from_row(row: &PgRow) -> Result<ResultRow, StoreError> {
    Ok(ResultRow {
        id: get(row, "id")?,
        student_id: get(row, "student_id")?,
        course_id: get(row, "course_id")?,
        semester_id: get(row, "semester_id")?,
        reg_no: get(row, "reg_no")?,
        exam_score: get(row, "exam_score")?,
        lab_score: get(row, "lab_score")?,
        test_score: get(row, "test_score")?,
        total: get(row, "total")?,
        grade: get(row, "grade")?,
        created_at: get(row, "created_at")?,
    })
}

fn message_from_row(row: &PgRow) -> Result<Message, StoreError> {
    Ok(Message {
        id: get(row, "id")?,
        sender_account_id: get(row, "sender_account_id")?,
        receiver_account_id: get(row, "receiver_account_id")?,
        content: get(row, "content")?,
        created_at: get(row, "created_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "INSERT INTO accounts (id, first_name, last_name, email, credential_hash, role, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(account.id)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.email)
            .bind(&account.credential_hash)
            .bind(account.role.as_str())
            .bind(account.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(account_from_row)
                .transpose()
        })
        .await
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM accounts WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(account_from_row)
                .transpose()
        })
        .await
    }

    async fn update_credential_hash(&self, id: Uuid, hash: &str) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query("UPDATE accounts SET credential_hash = $2 WHERE id = $1")
                .bind(id)
                .bind(hash)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn update_account_identity(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "UPDATE accounts SET first_name = $2, last_name = $3, email = $4 WHERE id = $1",
            )
            .bind(id)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn insert_student(&self, profile: &StudentProfile) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "INSERT INTO students (id, account_id, reg_no, level, advisor_id) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(profile.id)
            .bind(profile.account_id)
            .bind(&profile.reg_no)
            .bind(&profile.level)
            .bind(profile.advisor_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn find_student_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<StudentProfile>, StoreError> {
        self.guard(async {
            let row = sqlx::query("SELECT * FROM students WHERE account_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
            match row {
                Some(row) => Ok(Some(self.student_from_row(&row).await?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn find_student_by_reg(
        &self,
        reg_no: &str,
    ) -> Result<Option<StudentProfile>, StoreError> {
        self.guard(async {
            let row = sqlx::query("SELECT * FROM students WHERE reg_no = $1")
                .bind(reg_no)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
            match row {
                Some(row) => Ok(Some(self.student_from_row(&row).await?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<StudentProfile>, StoreError> {
        self.guard(async {
            let row = sqlx::query("SELECT * FROM students WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
            match row {
                Some(row) => Ok(Some(self.student_from_row(&row).await?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn insert_parent(&self, profile: &ParentProfile) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query("INSERT INTO parents (id, account_id, children) VALUES ($1, $2, $3)")
                .bind(profile.id)
                .bind(profile.account_id)
                .bind(&profile.children)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn find_parent(&self, id: Uuid) -> Result<Option<ParentProfile>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM parents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(parent_from_row)
                .transpose()
        })
        .await
    }

    async fn find_parent_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<ParentProfile>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM parents WHERE account_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(parent_from_row)
                .transpose()
        })
        .await
    }

    async fn add_child(&self, parent_id: Uuid, student_id: Uuid) -> Result<bool, StoreError> {
        self.guard(async {
            // Guarded append: a row is only touched when the child is absent,
            // so concurrent adds cannot double-insert.
            let done = sqlx::query(
                "UPDATE parents SET children = array_append(children, $2) \
                 WHERE id = $1 AND NOT (children @> ARRAY[$2])",
            )
            .bind(parent_id)
            .bind(student_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(done.rows_affected() > 0)
        })
        .await
    }

    async fn insert_advisor(&self, profile: &AdvisorProfile) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "INSERT INTO advisors (id, account_id, level, advisees, parents) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(profile.id)
            .bind(profile.account_id)
            .bind(&profile.level)
            .bind(&profile.advisees)
            .bind(&profile.parents)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn find_advisor(&self, id: Uuid) -> Result<Option<AdvisorProfile>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM advisors WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(advisor_from_row)
                .transpose()
        })
        .await
    }

    async fn find_advisor_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<AdvisorProfile>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM advisors WHERE account_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(advisor_from_row)
                .transpose()
        })
        .await
    }

    async fn list_advisors(&self) -> Result<Vec<AdvisorProfile>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM advisors ORDER BY level NULLS LAST")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?
                .iter()
                .map(advisor_from_row)
                .collect()
        })
        .await
    }

    async fn add_advisee(&self, advisor_id: Uuid, student_id: Uuid) -> Result<bool, StoreError> {
        self.guard(async {
            let done = sqlx::query(
                "UPDATE advisors SET advisees = array_append(advisees, $2) \
                 WHERE id = $1 AND NOT (advisees @> ARRAY[$2])",
            )
            .bind(advisor_id)
            .bind(student_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(done.rows_affected() > 0)
        })
        .await
    }

    async fn insert_coordinator(&self, profile: &CoordinatorProfile) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query("INSERT INTO coordinators (id, account_id, courses) VALUES ($1, $2, $3)")
                .bind(profile.id)
                .bind(profile.account_id)
                .bind(&profile.courses)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn find_coordinator_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<CoordinatorProfile>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM coordinators WHERE account_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(coordinator_from_row)
                .transpose()
        })
        .await
    }

    async fn add_coordinator_courses(&self, id: Uuid, courses: &[Uuid]) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "UPDATE coordinators SET courses = courses || \
                 (SELECT coalesce(array_agg(x), '{}'::uuid[]) \
                  FROM unnest($2::uuid[]) AS x WHERE x <> ALL (courses)) \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(courses)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn remove_coordinator_courses(
        &self,
        id: Uuid,
        courses: &[Uuid],
    ) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "UPDATE coordinators SET courses = \
                 (SELECT coalesce(array_agg(x), '{}'::uuid[]) \
                  FROM unnest(courses) AS x WHERE x <> ALL ($2::uuid[])) \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(courses)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn replace_coordinator_courses(
        &self,
        id: Uuid,
        courses: &[Uuid],
    ) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query("UPDATE coordinators SET courses = $2 WHERE id = $1")
                .bind(id)
                .bind(courses)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn find_session_entry(
        &self,
        student_id: Uuid,
        session: &str,
        level: &str,
    ) -> Result<Option<SessionEntry>, StoreError> {
        self.guard(async {
            sqlx::query(
                "SELECT session, level, harmattan, rain FROM student_sessions \
                 WHERE student_id = $1 AND session = $2 AND level = $3",
            )
            .bind(student_id)
            .bind(session)
            .bind(level)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .as_ref()
            .map(session_from_row)
            .transpose()
        })
        .await
    }

    async fn ensure_session_entry(
        &self,
        student_id: Uuid,
        session: &str,
        level: &str,
    ) -> Result<SessionEntry, StoreError> {
        self.guard(async {
            sqlx::query(
                "INSERT INTO student_sessions (id, student_id, session, level) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (student_id, session, level) DO NOTHING",
            )
            .bind(Uuid::new_v4())
            .bind(student_id)
            .bind(session)
            .bind(level)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

            let row = sqlx::query(
                "SELECT session, level, harmattan, rain FROM student_sessions \
                 WHERE student_id = $1 AND session = $2 AND level = $3",
            )
            .bind(student_id)
            .bind(session)
            .bind(level)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
            session_from_row(&row)
        })
        .await
    }

    async fn union_session_courses(
        &self,
        student_id: Uuid,
        session: &str,
        level: &str,
        term: SemesterName,
        courses: &[Uuid],
    ) -> Result<(), StoreError> {
        // Term maps to a fixed column; never interpolated from user input.
        let column = match term {
            SemesterName::Harmattan => "harmattan",
            SemesterName::Rain => "rain",
        };
        let sql = format!(
            "UPDATE student_sessions SET {column} = {column} || \
             (SELECT coalesce(array_agg(x), '{{}}'::uuid[]) \
              FROM unnest($4::uuid[]) AS x WHERE x <> ALL ({column})) \
             WHERE student_id = $1 AND session = $2 AND level = $3"
        );
        self.guard(async {
            sqlx::query(&sql)
                .bind(student_id)
                .bind(session)
                .bind(level)
                .bind(courses)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn insert_course(&self, course: &Course) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "INSERT INTO courses (id, name, code, credits, kind) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(course.id)
            .bind(&course.name)
            .bind(&course.code)
            .bind(course.credits)
            .bind(match course.kind {
                crate::models::CourseKind::Compulsory => "compulsory",
                crate::models::CourseKind::Elective => "elective",
            })
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM courses WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(course_from_row)
                .transpose()
        })
        .await
    }

    async fn find_courses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM courses WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?
                .iter()
                .map(course_from_row)
                .collect()
        })
        .await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM courses ORDER BY code")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?
                .iter()
                .map(course_from_row)
                .collect()
        })
        .await
    }

    async fn insert_semester(&self, semester: &Semester) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "INSERT INTO semesters (id, name, session, courses) VALUES ($1, $2, $3, $4)",
            )
            .bind(semester.id)
            .bind(semester.name.as_str())
            .bind(&semester.session)
            .bind(&semester.courses)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn find_semester(
        &self,
        name: SemesterName,
        session: &str,
    ) -> Result<Option<Semester>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM semesters WHERE name = $1 AND session = $2")
                .bind(name.as_str())
                .bind(session)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(semester_from_row)
                .transpose()
        })
        .await
    }

    async fn find_semester_by_id(&self, id: Uuid) -> Result<Option<Semester>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM semesters WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
                .as_ref()
                .map(semester_from_row)
                .transpose()
        })
        .await
    }

    async fn find_semesters_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Semester>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM semesters WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?
                .iter()
                .map(semester_from_row)
                .collect()
        })
        .await
    }

    async fn union_semester_courses(&self, id: Uuid, courses: &[Uuid]) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "UPDATE semesters SET courses = courses || \
                 (SELECT coalesce(array_agg(x), '{}'::uuid[]) \
                  FROM unnest($2::uuid[]) AS x WHERE x <> ALL (courses)) \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(courses)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn insert_results(&self, rows: &[ResultRow]) -> Result<(), StoreError> {
        self.guard(async {
            let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
            for row in rows {
                sqlx::query(
                    "INSERT INTO results (id, student_id, course_id, semester_id, reg_no, \
                     exam_score, lab_score, test_score, total, grade, created_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                )
                .bind(row.id)
                .bind(row.student_id)
                .bind(row.course_id)
                .bind(row.semester_id)
                .bind(&row.reg_no)
                .bind(row.exam_score)
                .bind(row.lab_score)
                .bind(row.test_score)
                .bind(row.total)
                .bind(&row.grade)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            }
            tx.commit().await.map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn results_for_student(&self, student_id: Uuid) -> Result<Vec<ResultRow>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM results WHERE student_id = $1 ORDER BY created_at")
                .bind(student_id)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?
                .iter()
                .map(result_from_row)
                .collect()
        })
        .await
    }

    async fn results_by_reg(&self, reg_no: &str) -> Result<Vec<ResultRow>, StoreError> {
        self.guard(async {
            sqlx::query("SELECT * FROM results WHERE reg_no = $1 ORDER BY created_at")
                .bind(reg_no)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?
                .iter()
                .map(result_from_row)
                .collect()
        })
        .await
    }

    async fn results_filtered(
        &self,
        course_id: Uuid,
        semester_id: Uuid,
    ) -> Result<Vec<ResultRow>, StoreError> {
        self.guard(async {
            sqlx::query(
                "SELECT * FROM results WHERE course_id = $1 AND semester_id = $2 \
                 ORDER BY created_at",
            )
            .bind(course_id)
            .bind(semester_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?
            .iter()
            .map(result_from_row)
            .collect()
        })
        .await
    }

    async fn insert_message(&self, message: &Message) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query(
                "INSERT INTO messages (id, sender_account_id, receiver_account_id, content, created_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(message.id)
            .bind(message.sender_account_id)
            .bind(message.receiver_account_id)
            .bind(&message.content)
            .bind(message.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }

    async fn messages_for_account(&self, account_id: Uuid) -> Result<Vec<Message>, StoreError> {
        self.guard(async {
            sqlx::query(
                "SELECT * FROM messages \
                 WHERE sender_account_id = $1 OR receiver_account_id = $1 \
                 ORDER BY created_at DESC",
            )
            .bind(account_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?
            .iter()
            .map(message_from_row)
            .collect()
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
            Ok(())
        })
        .await
    }
}
