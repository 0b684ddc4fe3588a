use actix_web::{HttpResponse, get, web};

use crate::{
    api::error,
    modules::call::{
        model::{RoomToken, RoomTokenQuery},
        service::CallService,
    },
    utils::ValidatedQuery,
};

#[get("/livekit")]
pub async fn get_room_token(
    call_service: web::Data<CallService>,
    query: ValidatedQuery<RoomTokenQuery>,
) -> Result<HttpResponse, error::Error> {
    let RoomTokenQuery { room, username } = query.0;
    let token = call_service.room_token(&room, &username, chrono::Utc::now().timestamp())?;

    Ok(HttpResponse::Ok().json(RoomToken { token }))
}
