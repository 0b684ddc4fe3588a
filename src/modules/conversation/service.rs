use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use uuid::Uuid;

use crate::{
    api::error::{self, ChatError},
    modules::{
        conversation::{
            model::{
                ConversationDetail, ConversationListItem, ConversationMembers, GroupMember,
                LastMessageSummary, MemberProfile, OtherMember,
            },
            repository::ConversationRepo,
            schema::{ConversationEntity, MemberEntity},
        },
        message::repository::MessageRepository,
        user::{
            model::UserResponse, repository::UserRepository, schema::UserEntity,
            service::resolve_caller,
        },
        websocket::server::{Relay, conversation_channel},
    },
    utils::Identity,
};

#[derive(Clone)]
pub struct ConversationService<C, M, U>
where
    C: ConversationRepo + 'static,
    M: MessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    conversation_repo: Arc<C>,
    message_repo: Arc<M>,
    user_repo: Arc<U>,
    relay: Relay,
}

impl<C, M, U> ConversationService<C, M, U>
where
    C: ConversationRepo + 'static,
    M: MessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        conversation_repo: Arc<C>,
        message_repo: Arc<M>,
        user_repo: Arc<U>,
        relay: Relay,
    ) -> Self {
        ConversationService { conversation_repo, message_repo, user_repo, relay }
    }

    /// Conversation and the caller's membership in it.
    async fn membership_of(
        &self,
        caller: &UserEntity,
        conversation_id: Uuid,
    ) -> Result<(ConversationEntity, MemberEntity), error::SystemError> {
        let conversation = self
            .conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        let membership = self
            .conversation_repo
            .find_membership(&caller.id, &conversation.id)
            .await?
            .ok_or(ChatError::NotAMember)?;

        Ok((conversation, membership))
    }

    async fn users_by_id(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserEntity>, error::SystemError> {
        let users = self.user_repo.find_many(ids).await?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }

    async fn last_message_summary(
        &self,
        conversation: &ConversationEntity,
    ) -> Result<Option<LastMessageSummary>, error::SystemError> {
        let Some(message_id) = conversation.last_message_id else {
            return Ok(None);
        };
        let Some(message) = self.message_repo.find_by_id(&message_id).await? else {
            return Ok(None);
        };
        let Some(sender) = self.user_repo.find_by_id(&message.sender_id).await? else {
            return Ok(None);
        };

        Ok(Some(LastMessageSummary {
            sender: sender.username,
            content: message.preview(),
            timestamp: message.created_at,
        }))
    }

    /// Messages from others after the member's read pointer. A pointer to a message that
    /// no longer exists counts everything.
    async fn unseen_count(&self, membership: &MemberEntity) -> Result<i64, error::SystemError> {
        let after = match membership.last_seen_message_id {
            Some(id) => self.message_repo.find_by_id(&id).await?.map(|m| m.created_at),
            None => None,
        };

        self.message_repo
            .count_unread(&membership.conversation_id, &membership.member_id, after)
            .await
    }

    pub async fn get_conversations(
        &self,
        identity: &Identity,
    ) -> Result<Vec<ConversationListItem>, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        let memberships = self.conversation_repo.find_by_member(&caller.id).await?;

        let mut items = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let conversation = self
                .conversation_repo
                .find_by_id(&membership.conversation_id)
                .await?
                .ok_or(ChatError::ConversationNotFound)?;

            let other_member = if conversation.is_group {
                None
            } else {
                let members = self.conversation_repo.find_by_conversation(&conversation.id).await?;
                match members.iter().find(|m| m.member_id != caller.id) {
                    Some(other) => {
                        self.user_repo.find_by_id(&other.member_id).await?.map(UserResponse::from)
                    }
                    None => None,
                }
            };

            items.push(ConversationListItem {
                unseen_count: self.unseen_count(&membership).await?,
                last_message: self.last_message_summary(&conversation).await?,
                conversation,
                other_member,
            });
        }

        items.sort_by_key(|item| std::cmp::Reverse(item.last_activity()));
        Ok(items)
    }

    pub async fn get_conversation(
        &self,
        identity: &Identity,
        conversation_id: Uuid,
    ) -> Result<ConversationDetail, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        let (conversation, _) = self.membership_of(&caller, conversation_id).await?;

        let others: Vec<MemberEntity> = self
            .conversation_repo
            .find_by_conversation(&conversation.id)
            .await?
            .into_iter()
            .filter(|m| m.member_id != caller.id)
            .collect();

        let ids: Vec<Uuid> = others.iter().map(|m| m.member_id).collect();
        let mut users = self.users_by_id(&ids).await?;

        if conversation.is_group {
            let other_members = others
                .into_iter()
                .map(|m| {
                    let user = users.remove(&m.member_id).ok_or(ChatError::MemberNotFound)?;
                    Ok(GroupMember {
                        id: user.id,
                        username: user.username,
                        last_seen_message_id: m.last_seen_message_id,
                    })
                })
                .collect::<Result<Vec<_>, ChatError>>()?;

            return Ok(ConversationDetail {
                conversation,
                other_member: None,
                other_members: Some(other_members),
            });
        }

        let other = others.first().ok_or(ChatError::MemberNotFound)?;
        let profile = users.remove(&other.member_id).ok_or(ChatError::MemberNotFound)?;

        Ok(ConversationDetail {
            other_member: Some(OtherMember {
                profile: UserResponse::from(profile),
                last_seen_message_id: other.last_seen_message_id,
            }),
            conversation,
            other_members: None,
        })
    }

    pub async fn get_members(
        &self,
        identity: &Identity,
        conversation_id: Uuid,
    ) -> Result<ConversationMembers, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        let (conversation, _) = self.membership_of(&caller, conversation_id).await?;

        let memberships = self.conversation_repo.find_by_conversation(&conversation.id).await?;
        let ids: Vec<Uuid> = memberships.iter().map(|m| m.member_id).collect();
        let mut users = self.users_by_id(&ids).await?;

        let members = memberships
            .iter()
            .map(|m| {
                let user = users.remove(&m.member_id).ok_or(ChatError::MemberNotFound)?;
                Ok(MemberProfile {
                    id: user.id,
                    username: user.username,
                    image_url: user.image_url,
                    email: user.email,
                })
            })
            .collect::<Result<Vec<_>, ChatError>>()?;

        Ok(ConversationMembers { conversation, members })
    }

    pub async fn create_group(
        &self,
        identity: &Identity,
        name: &str,
        member_ids: Vec<Uuid>,
    ) -> Result<Uuid, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(error::SystemError::bad_request("Group name is required"));
        }
        if member_ids.is_empty() {
            return Err(error::SystemError::bad_request("At least one member is required"));
        }

        let mut seen = HashSet::new();
        let unique_ids: Vec<Uuid> = std::iter::once(caller.id)
            .chain(member_ids)
            .filter(|id| seen.insert(*id))
            .collect();

        let found = self.user_repo.find_many(&unique_ids).await?;
        if found.len() != unique_ids.len() {
            return Err(ChatError::MemberNotFound.into());
        }

        let conversation = self.conversation_repo.create_group_atomic(name, &unique_ids).await?;
        log::info!(
            "Group {} created by {} with {} members",
            conversation.id,
            caller.id,
            unique_ids.len()
        );

        Ok(conversation.id)
    }

    pub async fn delete_group(
        &self,
        identity: &Identity,
        conversation_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        let conversation = self
            .conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        if !conversation.is_group {
            return Err(ChatError::NotAGroup.into());
        }

        self.conversation_repo
            .find_membership(&caller.id, &conversation.id)
            .await?
            .ok_or(ChatError::NotAMember)?;

        self.conversation_repo.delete_cascade(&conversation.id).await?;
        log::info!("Group {} deleted by {}", conversation.id, caller.id);

        Ok(())
    }

    pub async fn leave_group(
        &self,
        identity: &Identity,
        conversation_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        let (conversation, membership) = self.membership_of(&caller, conversation_id).await?;

        if !conversation.is_group {
            return Err(ChatError::NotAGroup.into());
        }

        self.conversation_repo.delete_membership(&membership.id).await?;

        let remaining = self.conversation_repo.find_by_conversation(&conversation.id).await?;
        if remaining.is_empty() {
            self.conversation_repo.delete_cascade(&conversation.id).await?;
            log::info!("Group {} removed after its last member left", conversation.id);
        }

        Ok(())
    }

    pub async fn mark_as_read(
        &self,
        identity: &Identity,
        conversation_id: Uuid,
        message_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        let (conversation, membership) = self.membership_of(&caller, conversation_id).await?;

        let pointer = match self.message_repo.find_by_id(&message_id).await? {
            Some(message) if message.conversation_id == conversation.id => Some(message.id),
            Some(_) => {
                return Err(ChatError::InvalidMessage(
                    "Message belongs to another conversation".into(),
                )
                .into());
            }
            None => None,
        };

        self.conversation_repo.set_last_seen(&membership.id, pointer).await?;

        self.relay.publish(
            conversation_channel(&conversation.id),
            "read",
            serde_json::json!({
                "conversationId": conversation.id,
                "memberId": caller.id,
                "messageId": pointer,
            }),
        );

        Ok(())
    }
}
