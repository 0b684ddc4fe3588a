use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::schema::{ConversationEntity, MemberEntity},
};

#[async_trait::async_trait]
pub trait ConversationRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// Group conversation plus one membership per id, in one transaction.
    async fn create_group_atomic(
        &self,
        name: &str,
        member_ids: &[Uuid],
    ) -> Result<ConversationEntity, error::SystemError>;

    /// Remove the conversation with its messages, memberships and contact row.
    async fn delete_cascade(&self, conversation_id: &Uuid) -> Result<(), error::SystemError>;
}

#[async_trait::async_trait]
pub trait MemberRepository {
    async fn find_membership(
        &self,
        member_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<Option<MemberEntity>, error::SystemError>;

    async fn find_by_member(&self, member_id: &Uuid)
    -> Result<Vec<MemberEntity>, error::SystemError>;

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MemberEntity>, error::SystemError>;

    async fn delete_membership(&self, membership_id: &Uuid) -> Result<(), error::SystemError>;

    async fn set_last_seen(
        &self,
        membership_id: &Uuid,
        message_id: Option<Uuid>,
    ) -> Result<(), error::SystemError>;
}

pub trait ConversationRepo: ConversationRepository + MemberRepository + Send + Sync {}

impl<T> ConversationRepo for T where T: ConversationRepository + MemberRepository + Send + Sync {}
