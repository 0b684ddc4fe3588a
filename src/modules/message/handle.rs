use actix_web::{HttpRequest, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_identity,
    modules::{
        conversation::repository_pg::ConversationRepositoryPg,
        message::{
            model::{CreatedMessage, MessageFeedItem, SendMessageBody},
            repository_pg::MessageRepositoryPg,
            service::MessageService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type MessageSvc = MessageService<MessageRepositoryPg, ConversationRepositoryPg, UserRepositoryPg>;

#[post("")]
pub async fn send_message(
    message_service: web::Data<MessageSvc>,
    body: ValidatedJson<SendMessageBody>,
    req: HttpRequest,
) -> Result<success::Success<CreatedMessage>, error::Error> {
    let identity = get_identity(&req)?;
    let SendMessageBody { conversation_id, message_type, content } = body.0;

    let id = message_service.create(&identity, conversation_id, message_type, content).await?;

    Ok(success::Success::created(Some(CreatedMessage { id })).message("Message sent successfully"))
}

#[get("/{conversation_id}")]
pub async fn get_messages(
    message_service: web::Data<MessageSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MessageFeedItem>>, error::Error> {
    let identity = get_identity(&req)?;
    let messages = message_service.list(&identity, *conversation_id).await?;

    Ok(success::Success::ok(Some(messages)).message("Successfully retrieved messages"))
}
