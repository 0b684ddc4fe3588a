use uuid::Uuid;

use crate::{
    api::error::{self, ChatError},
    modules::friend::{
        repository::{ContactRepository, FriendRepo, FriendRequestRepository},
        schema::{ContactEntity, FriendRequestEntity},
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ContactRepository for FriendRepositoryPg {
    async fn find_contact_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        let contact = sqlx::query_as::<_, ContactEntity>(
            r#"
            SELECT *
            FROM contacts
            WHERE
                (user1_id = $1 AND user2_id = $2)
            OR (user1_id = $2 AND user2_id = $1)
            LIMIT 1
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn find_contacts_of_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ContactEntity>, error::SystemError> {
        let contacts = sqlx::query_as::<_, ContactEntity>(
            r#"
            SELECT *
            FROM contacts
            WHERE user1_id = $1 OR user2_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    async fn find_contact_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        let contact =
            sqlx::query_as::<_, ContactEntity>("SELECT * FROM contacts WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(contact)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE sender_id = $1 AND receiver_id = $2",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request =
            sqlx::query_as::<_, FriendRequestEntity>("SELECT * FROM friend_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(request)
    }

    async fn find_friend_request_to_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE receiver_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn create_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, sender_id, receiver_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn delete_friend_request(&self, request_id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositoryPg {
    async fn accept_friend_request_atomic(
        &self,
        request: &FriendRequestEntity,
    ) -> Result<Uuid, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let consumed: Option<Uuid> = sqlx::query_scalar(
            "DELETE FROM friend_requests WHERE id = $1 AND receiver_id = $2 RETURNING id",
        )
        .bind(request.id)
        .bind(request.receiver_id)
        .fetch_optional(&mut *tx)
        .await?;

        if consumed.is_none() {
            tx.rollback().await?;
            return Err(ChatError::FriendRequestInvalid.into());
        }

        let conversation_id = Uuid::now_v7();
        sqlx::query("INSERT INTO conversations (id, is_group) VALUES ($1, FALSE)")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO contacts (id, user1_id, user2_id, conversation_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(request.receiver_id)
        .bind(request.sender_id)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO conversation_members (id, member_id, conversation_id)
            VALUES ($1, $2, $5), ($3, $4, $5)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(request.receiver_id)
        .bind(Uuid::now_v7())
        .bind(request.sender_id)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(conversation_id)
    }
}
