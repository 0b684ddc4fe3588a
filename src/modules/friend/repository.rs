use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::schema::{ContactEntity, FriendRequestEntity};

/// Unique index over the unordered (sender, receiver) pair of a pending request.
pub const REQUEST_PAIR_KEY: &str = "friend_requests_pair_key";
/// Unique index over the unordered pair of a contact.
pub const CONTACT_PAIR_KEY: &str = "contacts_pair_key";

#[async_trait::async_trait]
pub trait ContactRepository {
    /// Contact between the two users, whichever side accepted.
    async fn find_contact_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<ContactEntity>, error::SystemError>;

    async fn find_contacts_of_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ContactEntity>, error::SystemError>;

    async fn find_contact_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ContactEntity>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    /// Pending request in the given direction only.
    async fn find_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_friend_request_to_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;

    async fn create_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn delete_friend_request(&self, request_id: &Uuid) -> Result<(), error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRepo: ContactRepository + FriendRequestRepository + Send + Sync {
    /// Consume the request and create the direct conversation, the contact and both
    /// memberships in one transaction. Returns the new conversation id.
    async fn accept_friend_request_atomic(
        &self,
        request: &FriendRequestEntity,
    ) -> Result<Uuid, error::SystemError>;
}
