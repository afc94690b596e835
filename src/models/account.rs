use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The four account roles. The role tag is assigned at registration and is
/// immutable afterwards; exactly one role profile row exists per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Parent,
    CourseAdvisor,
    CourseCoordinator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::CourseAdvisor => "course_advisor",
            Role::CourseCoordinator => "course_coordinator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            // Path segments use the compact spelling, stored tags the snake_case one
            "course_advisor" | "courseadvisor" => Ok(Role::CourseAdvisor),
            "course_coordinator" | "coursecoordinator" => Ok(Role::CourseCoordinator),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Generic login identity shared by all roles. Referenced, never owned, by
/// the role profile rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash; never leaves the server.
    #[serde(skip_serializing)]
    pub credential_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
