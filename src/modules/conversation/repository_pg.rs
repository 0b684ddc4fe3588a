use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::{
        repository::{ConversationRepository, MemberRepository},
        schema::{ConversationEntity, MemberEntity},
    },
};

#[derive(Clone)]
pub struct ConversationRepositoryPg {
    pool: sqlx::PgPool,
}

impl ConversationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for ConversationRepositoryPg {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation =
            sqlx::query_as::<_, ConversationEntity>("SELECT * FROM conversations WHERE id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversation)
    }

    async fn create_group_atomic(
        &self,
        name: &str,
        member_ids: &[Uuid],
    ) -> Result<ConversationEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let conversation = sqlx::query_as::<_, ConversationEntity>(
            r#"
            INSERT INTO conversations (id, name, is_group)
            VALUES ($1, $2, TRUE)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        let membership_ids: Vec<Uuid> = member_ids.iter().map(|_| Uuid::now_v7()).collect();
        sqlx::query(
            r#"
            INSERT INTO conversation_members (id, member_id, conversation_id)
            SELECT m.id, m.member_id, $3
            FROM UNNEST($1::uuid[], $2::uuid[]) AS m(id, member_id)
            "#,
        )
        .bind(&membership_ids)
        .bind(member_ids)
        .bind(conversation.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(conversation)
    }

    async fn delete_cascade(&self, conversation_id: &Uuid) -> Result<(), error::SystemError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE conversations SET last_message_id = NULL WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM conversation_members WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM contacts WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl MemberRepository for ConversationRepositoryPg {
    async fn find_membership(
        &self,
        member_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<Option<MemberEntity>, error::SystemError> {
        let membership = sqlx::query_as::<_, MemberEntity>(
            "SELECT * FROM conversation_members WHERE member_id = $1 AND conversation_id = $2",
        )
        .bind(member_id)
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn find_by_member(
        &self,
        member_id: &Uuid,
    ) -> Result<Vec<MemberEntity>, error::SystemError> {
        let memberships = sqlx::query_as::<_, MemberEntity>(
            "SELECT * FROM conversation_members WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MemberEntity>, error::SystemError> {
        let memberships = sqlx::query_as::<_, MemberEntity>(
            "SELECT * FROM conversation_members WHERE conversation_id = $1 ORDER BY created_at",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    async fn delete_membership(&self, membership_id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query("DELETE FROM conversation_members WHERE id = $1")
            .bind(membership_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_last_seen(
        &self,
        membership_id: &Uuid,
        message_id: Option<Uuid>,
    ) -> Result<(), error::SystemError> {
        sqlx::query("UPDATE conversation_members SET last_seen_message_id = $2 WHERE id = $1")
            .bind(membership_id)
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
