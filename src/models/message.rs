use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed message between two accounts. Messages are always
/// account-to-account: senders and receivers are resolved from role profiles
/// to their underlying accounts before creation. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_account_id: Uuid,
    pub receiver_account_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn involves(&self, account_id: Uuid) -> bool {
        self.sender_account_id == account_id || self.receiver_account_id == account_id
    }
}
