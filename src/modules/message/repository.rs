use uuid::Uuid;

use crate::modules::message::model::InsertMessage;
use crate::{api::error, modules::message::schema::MessageEntity};

#[async_trait::async_trait]
pub trait MessageRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError>;

    /// Newest first.
    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    /// Messages not sent by `reader_id`, created strictly after `after` (all when `None`).
    async fn count_unread(
        &self,
        conversation_id: &Uuid,
        reader_id: &Uuid,
        after: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<i64, error::SystemError>;

    /// Insert the message and point the conversation's last message at it, atomically.
    async fn create_and_touch_conversation(
        &self,
        message: &InsertMessage,
    ) -> Result<MessageEntity, error::SystemError>;
}
