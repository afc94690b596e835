use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseKind {
    Compulsory,
    Elective,
}

/// Immutable reference data, unique by code. Created via bulk load or a
/// coordinator action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub kind: CourseKind,
}

impl Course {
    /// Course-number parity decides the term a course is offered in:
    /// odd numbers run in Harmattan, even in Rain.
    pub fn semester_name(&self) -> Option<SemesterName> {
        let number: u32 = self.code.split_whitespace().nth(1)?.parse().ok()?;
        if number % 2 == 1 {
            Some(SemesterName::Harmattan)
        } else {
            Some(SemesterName::Rain)
        }
    }
}

/// Term name within an academic session. Harmattan is the first term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SemesterName {
    Harmattan,
    Rain,
}

impl SemesterName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemesterName::Harmattan => "Harmattan",
            SemesterName::Rain => "Rain",
        }
    }
}

impl fmt::Display for SemesterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemesterName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "harmattan" => Ok(SemesterName::Harmattan),
            "rain" => Ok(SemesterName::Rain),
            other => Err(format!("unknown semester: {}", other)),
        }
    }
}

/// A (name, session) term offering a set of courses. Unique on the pair;
/// creating an existing pair merges courses instead of erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    pub id: Uuid,
    pub name: SemesterName,
    pub session: String,
    pub courses: Vec<Uuid>,
}

impl Semester {
    /// Recency order used by "latest results": session label descending,
    /// then term name descending (Rain after Harmattan within a session).
    pub fn recency_cmp(&self, other: &Semester) -> Ordering {
        other
            .session
            .cmp(&self.session)
            .then_with(|| other.name.cmp(&self.name))
    }
}
