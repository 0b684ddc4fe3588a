use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    api::error::{self, ChatError},
    modules::{
        conversation::repository::ConversationRepo,
        message::{
            model::{InsertMessage, MessageFeedItem, format_seen_by},
            repository::MessageRepository,
            schema::MessageType,
        },
        user::{repository::UserRepository, schema::UserEntity, service::resolve_caller},
        websocket::server::{Relay, conversation_channel},
    },
    utils::Identity,
};

/// Content rules per message type: text needs something readable, media carries one URL.
fn validate_content(message_type: MessageType, content: &[String]) -> Result<(), ChatError> {
    if content.is_empty() {
        return Err(ChatError::InvalidMessage("Message content must not be empty".into()));
    }

    match message_type {
        MessageType::Text if content.iter().all(|part| part.trim().is_empty()) => {
            Err(ChatError::InvalidMessage("Text message must not be blank".into()))
        }
        MessageType::Text => Ok(()),
        _ if content.len() != 1 || content[0].trim().is_empty() => Err(
            ChatError::InvalidMessage("Media message must carry exactly one URL".into()),
        ),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct MessageService<M, C, U>
where
    M: MessageRepository + Send + Sync + 'static,
    C: ConversationRepo + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    message_repo: Arc<M>,
    conversation_repo: Arc<C>,
    user_repo: Arc<U>,
    relay: Relay,
}

impl<M, C, U> MessageService<M, C, U>
where
    M: MessageRepository + Send + Sync + 'static,
    C: ConversationRepo + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        message_repo: Arc<M>,
        conversation_repo: Arc<C>,
        user_repo: Arc<U>,
        relay: Relay,
    ) -> Self {
        MessageService { message_repo, conversation_repo, user_repo, relay }
    }

    async fn ensure_member(
        &self,
        caller: &UserEntity,
        conversation_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        self.conversation_repo
            .find_membership(&caller.id, conversation_id)
            .await?
            .ok_or(ChatError::NotAMember)?;
        Ok(())
    }

    pub async fn create(
        &self,
        identity: &Identity,
        conversation_id: Uuid,
        message_type: MessageType,
        content: Vec<String>,
    ) -> Result<Uuid, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        self.ensure_member(&caller, &conversation_id).await?;
        validate_content(message_type, &content)?;

        let message = self
            .message_repo
            .create_and_touch_conversation(&InsertMessage {
                conversation_id,
                sender_id: caller.id,
                message_type,
                content,
            })
            .await?;

        log::debug!("Message {} stored in conversation {}", message.id, conversation_id);

        self.relay.publish(
            conversation_channel(&conversation_id),
            "message",
            serde_json::json!({
                "conversationId": conversation_id,
                "messageId": message.id,
                "senderId": caller.id,
            }),
        );

        Ok(message.id)
    }

    pub async fn list(
        &self,
        identity: &Identity,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageFeedItem>, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        self.ensure_member(&caller, &conversation_id).await?;

        let messages = self.message_repo.find_by_conversation(&conversation_id).await?;
        let members = self.conversation_repo.find_by_conversation(&conversation_id).await?;

        let mut user_ids: Vec<Uuid> = messages.iter().map(|m| m.sender_id).collect();
        user_ids.extend(members.iter().map(|m| m.member_id));
        user_ids.sort();
        user_ids.dedup();

        let users: HashMap<Uuid, UserEntity> = self
            .user_repo
            .find_many(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        messages
            .into_iter()
            .map(|message| -> Result<MessageFeedItem, error::SystemError> {
                let sender = users.get(&message.sender_id).ok_or(ChatError::SenderNotFound)?;
                let is_current_user = sender.id == caller.id;

                let seen = if is_current_user {
                    let names: Vec<&str> = members
                        .iter()
                        .filter(|m| m.member_id != caller.id)
                        .filter(|m| m.last_seen_message_id == Some(message.id))
                        .filter_map(|m| users.get(&m.member_id).map(UserEntity::first_name))
                        .collect();
                    format_seen_by(&names)
                } else {
                    None
                };

                Ok(MessageFeedItem {
                    sender_name: sender.username.clone(),
                    sender_image: sender.image_url.clone(),
                    is_current_user,
                    seen,
                    message,
                })
            })
            .collect()
    }
}
