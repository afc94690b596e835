use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::Message;
use crate::services::DomainError;
use crate::store::Store;

/// Message exchange. Role-profile ids on the wire are resolved to their
/// underlying account ids before creation - messages are always
/// account-to-account.
pub struct MessagingService {
    store: Arc<dyn Store>,
}

impl MessagingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Core send. Content is validated before any persistence.
    pub async fn send(
        &self,
        sender_account_id: Uuid,
        receiver_account_id: Uuid,
        content: &str,
    ) -> Result<Message, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("Content is required"));
        }

        let message = Message {
            id: Uuid::new_v4(),
            sender_account_id,
            receiver_account_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.store.insert_message(&message).await?;
        debug!(message = %message.id, "message sent");
        Ok(message)
    }

    /// Send to a student, addressed by student profile id.
    pub async fn send_to_student(
        &self,
        sender_account_id: Uuid,
        student_id: Uuid,
        content: &str,
    ) -> Result<Message, DomainError> {
        let student = self
            .store
            .find_student(student_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Student not found"))?;
        self.send(sender_account_id, student.account_id, content).await
    }

    /// Send to a parent, addressed by parent profile id.
    pub async fn send_to_parent(
        &self,
        sender_account_id: Uuid,
        parent_id: Uuid,
        content: &str,
    ) -> Result<Message, DomainError> {
        let parent = self
            .store
            .find_parent(parent_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Parent not found"))?;
        self.send(sender_account_id, parent.account_id, content).await
    }

    /// Student to their assigned advisor.
    pub async fn send_to_own_advisor(
        &self,
        sender_account_id: Uuid,
        advisor_id: Option<Uuid>,
        content: &str,
    ) -> Result<Message, DomainError> {
        let advisor_id =
            advisor_id.ok_or_else(|| DomainError::not_found("Advisor not found"))?;
        self.send_to_advisor(sender_account_id, advisor_id, content)
            .await
    }

    /// Send to an advisor, addressed by advisor profile id.
    pub async fn send_to_advisor(
        &self,
        sender_account_id: Uuid,
        advisor_id: Uuid,
        content: &str,
    ) -> Result<Message, DomainError> {
        let advisor = self
            .store
            .find_advisor(advisor_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Advisor not found"))?;
        self.send(sender_account_id, advisor.account_id, content).await
    }

    /// All messages where the account is sender or receiver, newest first.
    pub async fn inbox(&self, account_id: Uuid) -> Result<Vec<Message>, DomainError> {
        Ok(self.store.messages_for_account(account_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MemStore};

    fn service() -> (MessagingService, Arc<dyn Store>) {
        let store: Arc<dyn Store> = Arc::new(MemStore::new());
        (MessagingService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn empty_content_fails_before_persistence() {
        let (svc, store) = service();
        let err = svc
            .send(Uuid::new_v4(), Uuid::new_v4(), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(store
            .messages_for_account(Uuid::new_v4())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn inbox_is_participant_scoped_and_newest_first() {
        let (svc, _store) = service();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        svc.send(a, b, "first").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        svc.send(b, a, "second").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        svc.send(b, c, "not for a").await.unwrap();

        let inbox = svc.inbox(a).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].content, "second");
        assert_eq!(inbox[1].content, "first");
        assert!(inbox.iter().all(|m| m.involves(a)));
    }

    #[tokio::test]
    async fn profile_addressed_sends_resolve_to_accounts() {
        let (svc, store) = service();
        let student = fixtures::student(&store, "2021/12345", "100").await;
        let sender = Uuid::new_v4();

        let message = svc
            .send_to_student(sender, student.id, "see me after class")
            .await
            .unwrap();
        assert_eq!(message.receiver_account_id, student.account_id);
        assert_ne!(message.receiver_account_id, student.id);
    }

    #[tokio::test]
    async fn student_without_advisor_cannot_message_one() {
        let (svc, _) = service();
        let err = svc
            .send_to_own_advisor(Uuid::new_v4(), None, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
