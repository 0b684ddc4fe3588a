use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database},
    middlewares::authentication,
    modules::{
        call::{model::LiveKitConfig, service::CallService},
        conversation::{repository_pg::ConversationRepositoryPg, service::ConversationService},
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        media::{model::UploadConfig, service::MediaService},
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
        webhook::service::{WebhookService, WebhookVerifier},
        websocket::server::{Relay, WebSocketServer},
    },
    utils::TokenVerifier,
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

fn token_verifier() -> std::io::Result<TokenVerifier> {
    match (&ENV.auth_jwt_public_key, &ENV.auth_jwt_secret) {
        (Some(pem), _) => TokenVerifier::rsa_pem(pem.as_bytes())
            .map_err(|_| std::io::Error::other("Invalid AUTH_JWT_PUBLIC_KEY")),
        (None, Some(secret)) => Ok(TokenVerifier::hmac(secret.as_bytes())),
        (None, None) => Err(std::io::Error::other("No identity token key configured")),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));
    let conversation_repo = Arc::new(ConversationRepositoryPg::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));

    let ws_server = WebSocketServer::new().start();
    let relay = Relay::new(ws_server.clone());

    let verifier = web::Data::new(token_verifier()?);
    let webhook_verifier = WebhookVerifier::from_secret(&ENV.webhook_secret)
        .map_err(|_| std::io::Error::other("Invalid CLERK_WEBHOOK_SECRET"))?;

    let user_service =
        UserService::with_dependencies(user_repo.clone(), Some(Arc::new(redis_pool)));
    let webhook_service =
        WebhookService::with_dependencies(Arc::new(webhook_verifier), user_service.clone());
    let friend_service = FriendService::with_dependencies(
        friend_repo,
        user_repo.clone(),
        conversation_repo.clone(),
    );
    let conversation_service = ConversationService::with_dependencies(
        conversation_repo.clone(),
        message_repo.clone(),
        user_repo.clone(),
        relay.clone(),
    );
    let message_service = MessageService::with_dependencies(
        message_repo,
        conversation_repo,
        user_repo,
        relay.clone(),
    );
    let call_service = CallService::new(LiveKitConfig::from_env(&ENV));
    let media_service = MediaService::new(UploadConfig::from_env(&ENV));

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(verifier.clone())
            .app_data(web::Data::new(ws_server.clone()))
            .app_data(web::Data::new(relay.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(webhook_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(conversation_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new(call_service.clone()))
            .app_data(web::Data::new(media_service.clone()))
            .service(health_check)
            .configure(modules::webhook::route::configure)
            .configure(modules::websocket::route::configure_socket)
            .configure(modules::media::route::configure_public)
            .service(
                web::scope("/api")
                    .wrap(from_fn(authentication))
                    .configure(modules::user::route::configure)
                    .configure(modules::friend::route::configure)
                    .configure(modules::conversation::route::configure)
                    .configure(modules::message::route::configure)
                    .configure(modules::websocket::route::configure)
                    .configure(modules::call::route::configure)
                    .configure(modules::media::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
