use actix_web::{HttpRequest, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_identity,
    modules::{
        conversation::{
            model::{
                ConversationDetail, ConversationListItem, ConversationMembers, CreateGroupBody,
                GroupCreated, MarkAsReadBody,
            },
            repository_pg::ConversationRepositoryPg,
            service::ConversationService,
        },
        message::repository_pg::MessageRepositoryPg,
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type ConversationSvc =
    ConversationService<ConversationRepositoryPg, MessageRepositoryPg, UserRepositoryPg>;

#[get("")]
pub async fn get_conversations(
    conversation_svc: web::Data<ConversationSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ConversationListItem>>, error::Error> {
    let identity = get_identity(&req)?;
    let conversations = conversation_svc.get_conversations(&identity).await?;

    Ok(success::Success::ok(Some(conversations)).message("Successfully retrieved conversations"))
}

#[post("/groups")]
pub async fn create_group(
    conversation_svc: web::Data<ConversationSvc>,
    body: ValidatedJson<CreateGroupBody>,
    req: HttpRequest,
) -> Result<success::Success<GroupCreated>, error::Error> {
    let identity = get_identity(&req)?;
    let CreateGroupBody { name, members } = body.0;

    let conversation_id = conversation_svc.create_group(&identity, &name, members).await?;

    Ok(success::Success::created(Some(GroupCreated { conversation_id }))
        .message("Group created successfully"))
}

#[get("/{conversation_id}")]
pub async fn get_conversation(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ConversationDetail>, error::Error> {
    let identity = get_identity(&req)?;
    let conversation = conversation_svc.get_conversation(&identity, *conversation_id).await?;

    Ok(success::Success::ok(Some(conversation)).message("Successfully retrieved conversation"))
}

#[get("/{conversation_id}/members")]
pub async fn get_members(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ConversationMembers>, error::Error> {
    let identity = get_identity(&req)?;
    let members = conversation_svc.get_members(&identity, *conversation_id).await?;

    Ok(success::Success::ok(Some(members)).message("Successfully retrieved members"))
}

#[post("/{conversation_id}/read")]
pub async fn mark_as_read(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
    body: web::Json<MarkAsReadBody>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let identity = get_identity(&req)?;
    conversation_svc.mark_as_read(&identity, *conversation_id, body.message_id).await?;

    Ok(success::Success::no_content())
}

#[post("/{conversation_id}/leave")]
pub async fn leave_group(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let identity = get_identity(&req)?;
    conversation_svc.leave_group(&identity, *conversation_id).await?;

    Ok(success::Success::no_content())
}

#[delete("/{conversation_id}")]
pub async fn delete_group(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let identity = get_identity(&req)?;
    conversation_svc.delete_group(&identity, *conversation_id).await?;

    Ok(success::Success::no_content())
}
