use actix_web::{HttpRequest, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_identity,
    modules::{
        conversation::repository_pg::ConversationRepositoryPg,
        friend::{
            model::{
                AcceptedResponse, ContactResponse, FriendRequestBody, FriendRequestCreated,
                FriendRequestResponse,
            },
            repository_pg::FriendRepositoryPg,
            service::FriendService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type FriendSvc = FriendService<FriendRepositoryPg, UserRepositoryPg, ConversationRepositoryPg>;

#[post("/requests")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendSvc>,
    body: ValidatedJson<FriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestCreated>, error::Error> {
    let identity = get_identity(&req)?;
    let request = friend_service.send_friend_request(&identity, &body.0.email).await?;

    Ok(success::Success::created(Some(FriendRequestCreated { id: request.id }))
        .message("Friend request sent successfully"))
}

#[post("/requests/{request_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendSvc>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<AcceptedResponse>, error::Error> {
    let identity = get_identity(&req)?;
    let conversation_id = friend_service.accept_friend_request(&identity, *request_id).await?;

    Ok(success::Success::ok(Some(AcceptedResponse { conversation_id }))
        .message("Friend request accepted successfully"))
}

#[post("/requests/{request_id}/decline")]
pub async fn decline_friend_request(
    friend_service: web::Data<FriendSvc>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let identity = get_identity(&req)?;
    friend_service.decline_friend_request(&identity, *request_id).await?;
    Ok(success::Success::no_content())
}

#[get("")]
pub async fn list_friends(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ContactResponse>>, error::Error> {
    let identity = get_identity(&req)?;
    let friends = friend_service.get_friends(&identity).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[get("/requests")]
pub async fn list_friend_requests(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let identity = get_identity(&req)?;
    let requests = friend_service.get_friend_requests(&identity).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

/// Unfriend by tearing down the shared direct conversation.
#[delete("/{conversation_id}")]
pub async fn block_friend(
    friend_service: web::Data<FriendSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let identity = get_identity(&req)?;
    friend_service.block(&identity, *conversation_id).await?;
    Ok(success::Success::no_content())
}
