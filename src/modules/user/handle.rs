use actix_web::{HttpRequest, get, patch, web};
use uuid::Uuid;

use crate::middlewares::get_identity;
use crate::modules::user::{model, service::UserService};
use crate::{
    api::{error, success},
    utils::ValidatedJson,
};

#[get("/me")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let identity = get_identity(&req)?;
    let user = user_service.get_me(&identity).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[patch("/me/status")]
pub async fn update_status(
    user_service: web::Data<UserService>,
    body: ValidatedJson<model::UpdateStatusModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let identity = get_identity(&req)?;
    let user = user_service.update_status(&identity, body.0.status).await?;
    Ok(success::Success::ok(Some(user)).message("Status updated successfully"))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.get_by_id(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(user)).message("User retrieved successfully"))
}
