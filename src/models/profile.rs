use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-(session, level) grouping of a student's registered courses, one
/// ordered list per term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session: String,
    pub level: String,
    pub harmattan: Vec<Uuid>,
    pub rain: Vec<Uuid>,
}

/// Student role profile. `account_id` is unique: exactly one profile row per
/// account, enforced at the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Registration number, the globally unique business key.
    pub reg_no: String,
    pub level: String,
    pub advisor_id: Option<Uuid>,
    pub sessions: Vec<SessionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Student profile ids, duplicate-free.
    pub children: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub level: Option<String>,
    /// Student profile ids, duplicate-free.
    pub advisees: Vec<Uuid>,
    pub parents: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Managed course ids.
    pub courses: Vec<Uuid>,
}
