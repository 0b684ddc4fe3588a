use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::{self, ChatError};
use crate::configs::RedisCache;
use crate::modules::user::model::{DEFAULT_STATUS, UpsertUser, UserResponse};
use crate::modules::user::{repository::UserRepository, schema::UserEntity};
use crate::utils::Identity;

const PROFILE_TTL_SECONDS: u64 = 3600;

/// Map the authenticated caller onto their user row.
pub async fn resolve_caller<U>(repo: &U, identity: &Identity) -> Result<UserEntity, error::SystemError>
where
    U: UserRepository + Send + Sync + ?Sized,
{
    repo.find_by_external_id(&identity.subject).await?.ok_or_else(|| ChatError::UserNotFound.into())
}

fn profile_key(id: &Uuid) -> String {
    format!("user:{id}")
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Option<Arc<RedisCache>>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Option<Arc<RedisCache>>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache }
    }

    pub async fn get_me(&self, identity: &Identity) -> Result<UserResponse, error::SystemError> {
        let user = resolve_caller(self.repo.as_ref(), identity).await?;
        Ok(UserResponse::from(user))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = profile_key(&id);
        if let Some(cache) = &self.cache {
            if let Some(cached_user) = cache.get::<UserResponse>(&key).await? {
                info!("User {} found in cache", id);
                return Ok(cached_user);
            }
        }

        let entity = self.repo.find_by_id(&id).await?.ok_or(ChatError::UserNotFound)?;
        let user = UserResponse::from(entity);

        if let Some(cache) = &self.cache {
            cache.set(&key, &user, PROFILE_TTL_SECONDS).await?;
            info!("User {} cached", id);
        }
        Ok(user)
    }

    pub async fn update_status(
        &self,
        identity: &Identity,
        status: String,
    ) -> Result<UserResponse, error::SystemError> {
        let status = status.trim();
        if status.is_empty() {
            return Err(error::SystemError::bad_request("Status must not be blank"));
        }

        let caller = resolve_caller(self.repo.as_ref(), identity).await?;
        let updated = self
            .repo
            .update_status(&caller.id, status)
            .await?
            .ok_or(ChatError::UserNotFound)?;

        self.invalidate(&updated.id).await?;
        Ok(UserResponse::from(updated))
    }

    /// Create or refresh the row mirrored from the identity provider.
    pub async fn sync_profile(&self, user: UpsertUser) -> Result<UserEntity, error::SystemError> {
        let entity = self.repo.upsert_by_external_id(&user, DEFAULT_STATUS).await?;
        self.invalidate(&entity.id).await?;
        info!("User {} synced from identity provider", entity.external_id);
        Ok(entity)
    }

    async fn invalidate(&self, id: &Uuid) -> Result<(), error::SystemError> {
        if let Some(cache) = &self.cache {
            cache.delete(&profile_key(id)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{identity_of, MemoryStore};

    fn service(store: &Arc<MemoryStore>) -> UserService {
        UserService::with_dependencies(store.clone(), None)
    }

    #[actix_web::test]
    async fn sync_profile_inserts_then_updates_without_touching_status() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(&store);

        let created = svc
            .sync_profile(UpsertUser {
                external_id: "user_1".into(),
                username: "Ann Lee".into(),
                email: "ann@example.com".into(),
                image_url: "https://img/ann.png".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.status, DEFAULT_STATUS);

        svc.update_status(&identity_of(&created), "Busy".into()).await.unwrap();

        let updated = svc
            .sync_profile(UpsertUser {
                external_id: "user_1".into(),
                username: "Ann Smith".into(),
                email: "ann@example.com".into(),
                image_url: "https://img/ann2.png".into(),
            })
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.username, "Ann Smith");
        assert_eq!(updated.status, "Busy");
        assert_eq!(store.user_count(), 1);
    }

    #[actix_web::test]
    async fn unknown_caller_is_user_not_found() {
        let store = Arc::new(MemoryStore::default());
        let err = service(&store)
            .get_me(&Identity::new("ghost", None))
            .await
            .unwrap_err();
        assert_eq!(err.chat(), Some(&ChatError::UserNotFound));
    }

    #[actix_web::test]
    async fn get_by_id_returns_profile() {
        let store = Arc::new(MemoryStore::default());
        let ann = store.seed_user("Ann Lee", "ann@example.com");

        let profile = service(&store).get_by_id(ann.id).await.unwrap();
        assert_eq!(profile.email, "ann@example.com");

        let missing = service(&store).get_by_id(Uuid::now_v7()).await.unwrap_err();
        assert_eq!(missing.chat(), Some(&ChatError::UserNotFound));
    }

    #[actix_web::test]
    async fn blank_status_is_rejected() {
        let store = Arc::new(MemoryStore::default());
        let ann = store.seed_user("Ann Lee", "ann@example.com");
        let svc = service(&store);

        let err = svc.update_status(&identity_of(&ann), "   ".into()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        let profile = svc.get_by_id(ann.id).await.unwrap();
        assert_eq!(profile.status, ann.status);

        let trimmed = svc.update_status(&identity_of(&ann), "  Away ".into()).await.unwrap();
        assert_eq!(trimmed.status, "Away");
    }
}
