use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;

use crate::{
    api::error::{self, ChatError},
    modules::{
        conversation::repository::ConversationRepo,
        friend::{
            model::{ContactResponse, FriendRequestResponse},
            repository::{CONTACT_PAIR_KEY, FriendRepo, REQUEST_PAIR_KEY},
            schema::FriendRequestEntity,
        },
        user::{model::UserResponse, repository::UserRepository, service::resolve_caller},
    },
    utils::Identity,
};

#[derive(Clone)]
pub struct FriendService<R, U, C>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
    C: ConversationRepo,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
    conversation_repo: Arc<C>,
}

impl<R, U, C> FriendService<R, U, C>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
    C: ConversationRepo,
{
    pub fn with_dependencies(
        friend_repo: Arc<R>,
        user_repo: Arc<U>,
        conversation_repo: Arc<C>,
    ) -> Self {
        FriendService { friend_repo, user_repo, conversation_repo }
    }

    pub async fn send_friend_request(
        &self,
        identity: &Identity,
        email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let email = email.trim();

        if identity.email.as_deref().is_some_and(|own| own.eq_ignore_ascii_case(email)) {
            return Err(ChatError::FriendRequestToSelf.into());
        }

        let sender = resolve_caller(self.user_repo.as_ref(), identity).await?;

        let receiver =
            self.user_repo.find_by_email(email).await?.ok_or(ChatError::ReceiverNotFound)?;

        if receiver.id == sender.id {
            return Err(ChatError::FriendRequestToSelf.into());
        }

        let (sent, received, contact) = tokio::try_join!(
            self.friend_repo.find_friend_request(&sender.id, &receiver.id),
            self.friend_repo.find_friend_request(&receiver.id, &sender.id),
            self.friend_repo.find_contact_between(&sender.id, &receiver.id),
        )?;

        if sent.is_some() {
            return Err(ChatError::FriendRequestAlreadyExists.into());
        }

        if received.is_some() {
            return Err(ChatError::FriendRequestAlreadyReceived.into());
        }

        if contact.is_some() {
            return Err(ChatError::AlreadyFriends(receiver.email).into());
        }

        let request = match self.friend_repo.create_friend_request(&sender.id, &receiver.id).await
        {
            // A concurrent request for the same pair landed between the checks and the insert.
            Err(e) if e.violates(REQUEST_PAIR_KEY) => {
                let sent = self.friend_repo.find_friend_request(&sender.id, &receiver.id).await?;
                return Err(match sent {
                    Some(_) => ChatError::FriendRequestAlreadyExists,
                    None => ChatError::FriendRequestAlreadyReceived,
                }
                .into());
            }
            other => other?,
        };
        log::info!("Friend request {} sent from {} to {}", request.id, sender.id, receiver.id);

        Ok(request)
    }

    async fn pending_request_for(
        &self,
        identity: &Identity,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;

        let request = self
            .friend_repo
            .find_friend_request_by_id(&request_id)
            .await?
            .ok_or(ChatError::FriendRequestInvalid)?;

        if request.receiver_id != caller.id {
            return Err(ChatError::FriendRequestInvalid.into());
        }

        Ok(request)
    }

    /// Returns the id of the direct conversation created for the new contact.
    pub async fn accept_friend_request(
        &self,
        identity: &Identity,
        request_id: Uuid,
    ) -> Result<Uuid, error::SystemError> {
        let request = self.pending_request_for(identity, request_id).await?;
        let conversation_id = match self.friend_repo.accept_friend_request_atomic(&request).await {
            Err(e) if e.violates(CONTACT_PAIR_KEY) => {
                self.friend_repo.delete_friend_request(&request.id).await?;
                let sender = self
                    .user_repo
                    .find_by_id(&request.sender_id)
                    .await?
                    .ok_or(ChatError::SenderNotFound)?;
                return Err(ChatError::AlreadyFriends(sender.email).into());
            }
            other => other?,
        };

        log::info!("Friend request {} accepted, conversation {}", request.id, conversation_id);
        Ok(conversation_id)
    }

    pub async fn decline_friend_request(
        &self,
        identity: &Identity,
        request_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let request = self.pending_request_for(identity, request_id).await?;
        self.friend_repo.delete_friend_request(&request.id).await?;

        Ok(())
    }

    pub async fn get_friend_requests(
        &self,
        identity: &Identity,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        let requests = self.friend_repo.find_friend_request_to_user(&caller.id).await?;

        let sender_ids: Vec<Uuid> = requests.iter().map(|r| r.sender_id).collect();
        let mut senders: HashMap<Uuid, _> = self
            .user_repo
            .find_many(&sender_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        requests
            .into_iter()
            .map(|request| {
                let sender = senders.remove(&request.sender_id).ok_or(ChatError::SenderNotFound)?;
                Ok(FriendRequestResponse {
                    id: request.id,
                    sender: UserResponse::from(sender),
                    created_at: request.created_at,
                })
            })
            .collect()
    }

    pub async fn get_friends(
        &self,
        identity: &Identity,
    ) -> Result<Vec<ContactResponse>, error::SystemError> {
        let caller = resolve_caller(self.user_repo.as_ref(), identity).await?;
        let contacts = self.friend_repo.find_contacts_of_user(&caller.id).await?;

        let other_ids: Vec<Uuid> = contacts.iter().map(|c| c.other_party(&caller.id)).collect();
        let users: HashMap<Uuid, _> = self
            .user_repo
            .find_many(&other_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        contacts
            .into_iter()
            .map(|contact| {
                let other = users
                    .get(&contact.other_party(&caller.id))
                    .cloned()
                    .ok_or(ChatError::ContactNotFound)?;
                Ok(ContactResponse {
                    conversation_id: contact.conversation_id,
                    user: UserResponse::from(other),
                })
            })
            .collect()
    }

    /// Unfriend: tear down the direct conversation together with the contact row.
    pub async fn block(
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

        if conversation.is_group {
            return Err(ChatError::NotADirectConversation.into());
        }

        let memberships = self.conversation_repo.find_by_conversation(&conversation.id).await?;
        if memberships.len() != 2 {
            return Err(ChatError::NotADirectConversation.into());
        }
        if !memberships.iter().any(|m| m.member_id == caller.id) {
            return Err(ChatError::NotAMember.into());
        }

        self.friend_repo
            .find_contact_by_conversation(&conversation.id)
            .await?
            .ok_or(ChatError::ContactNotFound)?;

        self.conversation_repo.delete_cascade(&conversation.id).await?;
        log::info!("User {} blocked contact in conversation {}", caller.id, conversation.id);

        Ok(())
    }
}
