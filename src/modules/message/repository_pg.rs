use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let messages = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT *
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn count_unread(
        &self,
        conversation_id: &Uuid,
        reader_id: &Uuid,
        after: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<i64, error::SystemError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE conversation_id = $1
              AND sender_id <> $2
              AND ($3::timestamptz IS NULL OR created_at > $3)
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .bind(after)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn create_and_touch_conversation(
        &self,
        message: &InsertMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (id, sender_id, conversation_id, type, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(message.sender_id)
        .bind(message.conversation_id)
        .bind(message.message_type)
        .bind(&message.content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET last_message_id = $2 WHERE id = $1")
            .bind(message.conversation_id)
            .bind(created.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }
}
