//! In-memory implementation of every repository trait, for service tests.


use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        conversation::{
            repository::{ConversationRepository, MemberRepository},
            schema::{ConversationEntity, MemberEntity},
        },
        friend::{
            repository::{
                CONTACT_PAIR_KEY, ContactRepository, FriendRepo, FriendRequestRepository,
                REQUEST_PAIR_KEY,
            },
            schema::{ContactEntity, FriendRequestEntity},
        },
        message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
        user::{model::UpsertUser, repository::UserRepository, schema::UserEntity},
    },
    utils::Identity,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserEntity>,
    requests: Vec<FriendRequestEntity>,
    contacts: Vec<ContactEntity>,
    conversations: Vec<ConversationEntity>,
    members: Vec<MemberEntity>,
    messages: Vec<MessageEntity>,
    clock: i64,
}

impl Tables {
    /// Strictly increasing timestamps, one millisecond apart.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::from_timestamp_millis(1_700_000_000_000 + self.clock).unwrap()
    }

    fn conflict() -> error::SystemError {
        error::SystemError::Conflict(None)
    }

    fn violation(constraint: &str) -> error::SystemError {
        error::SystemError::Conflict(Some(error::DbErrorMeta {
            code: Some("23505".into()),
            constraint: Some(constraint.into()),
            message: format!("duplicate key value violates unique constraint \"{constraint}\""),
        }))
    }

    fn same_pair(a1: &Uuid, a2: &Uuid, b1: &Uuid, b2: &Uuid) -> bool {
        (a1 == b1 && a2 == b2) || (a1 == b2 && a2 == b1)
    }

    fn add_member(&mut self, member_id: Uuid, conversation_id: Uuid) -> Result<(), error::SystemError> {
        if self.members.iter().any(|m| m.member_id == member_id && m.conversation_id == conversation_id) {
            return Err(Self::conflict());
        }
        let created_at = self.tick();
        self.members.push(MemberEntity {
            id: Uuid::now_v7(),
            member_id,
            conversation_id,
            last_seen_message_id: None,
            created_at,
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn seed_user(&self, username: &str, email: &str) -> UserEntity {
        let mut t = self.lock();
        let now = t.tick();
        let user = UserEntity {
            id: Uuid::now_v7(),
            external_id: format!("ext_{}", email),
            username: username.to_string(),
            email: email.to_string(),
            image_url: format!("https://img/{}.png", username),
            status: String::new(),
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        user
    }

    pub fn remove_user(&self, id: &Uuid) {
        self.lock().users.retain(|u| u.id != *id);
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn contact_count(&self) -> usize {
        self.lock().contacts.len()
    }

    pub fn conversation_count(&self) -> usize {
        self.lock().conversations.len()
    }

    pub fn member_count(&self, conversation_id: &Uuid) -> usize {
        self.lock().members.iter().filter(|m| m.conversation_id == *conversation_id).count()
    }

    pub fn message_count(&self, conversation_id: &Uuid) -> usize {
        self.lock().messages.iter().filter(|m| m.conversation_id == *conversation_id).count()
    }

    pub fn last_seen_of(&self, member_id: &Uuid, conversation_id: &Uuid) -> Option<Uuid> {
        self.lock()
            .members
            .iter()
            .find(|m| m.member_id == *member_id && m.conversation_id == *conversation_id)
            .and_then(|m| m.last_seen_message_id)
    }
}

pub fn identity_of(user: &UserEntity) -> Identity {
    Identity::new(user.external_id.clone(), Some(&user.email))
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock().users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock().users.iter().find(|u| u.external_id == external_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock().users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        Ok(self.lock().users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn upsert_by_external_id(
        &self,
        user: &UpsertUser,
        status: &str,
    ) -> Result<UserEntity, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();

        if t.users.iter().any(|u| {
            u.email.eq_ignore_ascii_case(&user.email) && u.external_id != user.external_id
        }) {
            return Err(Tables::conflict());
        }

        if let Some(existing) = t.users.iter_mut().find(|u| u.external_id == user.external_id) {
            existing.username = user.username.clone();
            existing.email = user.email.clone();
            existing.image_url = user.image_url.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let entity = UserEntity {
            id: Uuid::now_v7(),
            external_id: user.external_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.users.push(entity.clone());
        Ok(entity)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        Ok(t.users.iter_mut().find(|u| u.id == *id).map(|u| {
            u.status = status.to_string();
            u.updated_at = now;
            u.clone()
        }))
    }
}

#[async_trait::async_trait]
impl ContactRepository for MemoryStore {
    async fn find_contact_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        Ok(self
            .lock()
            .contacts
            .iter()
            .find(|c| {
                (c.user1_id == *user_id_a && c.user2_id == *user_id_b)
                    || (c.user1_id == *user_id_b && c.user2_id == *user_id_a)
            })
            .cloned())
    }

    async fn find_contacts_of_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ContactEntity>, error::SystemError> {
        Ok(self
            .lock()
            .contacts
            .iter()
            .filter(|c| c.user1_id == *user_id || c.user2_id == *user_id)
            .cloned()
            .collect())
    }

    async fn find_contact_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        Ok(self.lock().contacts.iter().find(|c| c.conversation_id == *conversation_id).cloned())
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for MemoryStore {
    async fn find_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self
            .lock()
            .requests
            .iter()
            .find(|r| r.sender_id == *sender_id && r.receiver_id == *receiver_id)
            .cloned())
    }

    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self.lock().requests.iter().find(|r| r.id == *request_id).cloned())
    }

    async fn find_friend_request_to_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        Ok(self.lock().requests.iter().filter(|r| r.receiver_id == *user_id).cloned().collect())
    }

    async fn create_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut t = self.lock();
        if sender_id == receiver_id {
            return Err(Tables::conflict());
        }
        if t.requests
            .iter()
            .any(|r| Tables::same_pair(&r.sender_id, &r.receiver_id, sender_id, receiver_id))
        {
            return Err(Tables::violation(REQUEST_PAIR_KEY));
        }
        let created_at = t.tick();
        let request = FriendRequestEntity {
            id: Uuid::now_v7(),
            sender_id: *sender_id,
            receiver_id: *receiver_id,
            created_at,
        };
        t.requests.push(request.clone());
        Ok(request)
    }

    async fn delete_friend_request(&self, request_id: &Uuid) -> Result<(), error::SystemError> {
        self.lock().requests.retain(|r| r.id != *request_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl FriendRepo for MemoryStore {
    async fn accept_friend_request_atomic(
        &self,
        request: &FriendRequestEntity,
    ) -> Result<Uuid, error::SystemError> {
        let mut t = self.lock();
        if t.contacts.iter().any(|c| {
            Tables::same_pair(&c.user1_id, &c.user2_id, &request.sender_id, &request.receiver_id)
        }) {
            return Err(Tables::violation(CONTACT_PAIR_KEY));
        }
        let before = t.requests.len();
        t.requests.retain(|r| !(r.id == request.id && r.receiver_id == request.receiver_id));
        if t.requests.len() == before {
            return Err(crate::api::error::ChatError::FriendRequestInvalid.into());
        }

        let created_at = t.tick();
        let conversation = ConversationEntity {
            id: Uuid::now_v7(),
            name: None,
            is_group: false,
            last_message_id: None,
            created_at,
        };
        t.contacts.push(ContactEntity {
            id: Uuid::now_v7(),
            user1_id: request.receiver_id,
            user2_id: request.sender_id,
            conversation_id: conversation.id,
            created_at,
        });
        t.conversations.push(conversation.clone());
        t.add_member(request.receiver_id, conversation.id)?;
        t.add_member(request.sender_id, conversation.id)?;

        Ok(conversation.id)
    }
}

#[async_trait::async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        Ok(self.lock().conversations.iter().find(|c| c.id == *conversation_id).cloned())
    }

    async fn create_group_atomic(
        &self,
        name: &str,
        member_ids: &[Uuid],
    ) -> Result<ConversationEntity, error::SystemError> {
        let mut t = self.lock();
        let created_at = t.tick();
        let conversation = ConversationEntity {
            id: Uuid::now_v7(),
            name: Some(name.to_string()),
            is_group: true,
            last_message_id: None,
            created_at,
        };
        t.conversations.push(conversation.clone());
        for member_id in member_ids {
            t.add_member(*member_id, conversation.id)?;
        }
        Ok(conversation)
    }

    async fn delete_cascade(&self, conversation_id: &Uuid) -> Result<(), error::SystemError> {
        let mut t = self.lock();
        t.members.retain(|m| m.conversation_id != *conversation_id);
        t.messages.retain(|m| m.conversation_id != *conversation_id);
        t.contacts.retain(|c| c.conversation_id != *conversation_id);
        t.conversations.retain(|c| c.id != *conversation_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl MemberRepository for MemoryStore {
    async fn find_membership(
        &self,
        member_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<Option<MemberEntity>, error::SystemError> {
        Ok(self
            .lock()
            .members
            .iter()
            .find(|m| m.member_id == *member_id && m.conversation_id == *conversation_id)
            .cloned())
    }

    async fn find_by_member(
        &self,
        member_id: &Uuid,
    ) -> Result<Vec<MemberEntity>, error::SystemError> {
        Ok(self.lock().members.iter().filter(|m| m.member_id == *member_id).cloned().collect())
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MemberEntity>, error::SystemError> {
        Ok(self
            .lock()
            .members
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .cloned()
            .collect())
    }

    async fn delete_membership(&self, membership_id: &Uuid) -> Result<(), error::SystemError> {
        self.lock().members.retain(|m| m.id != *membership_id);
        Ok(())
    }

    async fn set_last_seen(
        &self,
        membership_id: &Uuid,
        message_id: Option<Uuid>,
    ) -> Result<(), error::SystemError> {
        if let Some(m) = self.lock().members.iter_mut().find(|m| m.id == *membership_id) {
            m.last_seen_message_id = message_id;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError> {
        Ok(self.lock().messages.iter().find(|m| m.id == *id).cloned())
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let mut messages: Vec<MessageEntity> = self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn count_unread(
        &self,
        conversation_id: &Uuid,
        reader_id: &Uuid,
        after: Option<DateTime<Utc>>,
    ) -> Result<i64, error::SystemError> {
        let count = self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == *conversation_id && m.sender_id != *reader_id)
            .filter(|m| after.is_none_or(|after| m.created_at > after))
            .count();
        Ok(count as i64)
    }

    async fn create_and_touch_conversation(
        &self,
        message: &InsertMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        let mut t = self.lock();
        if message.content.is_empty() {
            return Err(error::SystemError::bad_request("content must not be empty"));
        }
        let created_at = t.tick();
        let entity = MessageEntity {
            id: Uuid::now_v7(),
            sender_id: message.sender_id,
            conversation_id: message.conversation_id,
            message_type: message.message_type,
            content: message.content.clone(),
            created_at,
        };
        let conversation = t
            .conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
            .ok_or_else(|| error::SystemError::bad_request("conversation does not exist"))?;
        conversation.last_message_id = Some(entity.id);
        t.messages.push(entity.clone());
        Ok(entity)
    }
}
