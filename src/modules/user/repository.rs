use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::UpsertUser, schema::UserEntity},
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    /// Rows for the given ids; unknown ids are simply absent from the result.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError>;

    /// Insert keyed by external id, or overwrite the profile fields of the existing row.
    /// `status` is only written on insert.
    async fn upsert_by_external_id(
        &self,
        user: &UpsertUser,
        status: &str,
    ) -> Result<UserEntity, error::SystemError>;

    async fn update_status(
        &self,
        id: &Uuid,
        status: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;
}
