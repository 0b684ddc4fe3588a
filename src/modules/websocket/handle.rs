use actix_web::{HttpResponse, post, web};

use crate::{
    api::error,
    modules::websocket::{
        model::{TypeIndicatorAck, TypeIndicatorBody},
        server::Relay,
    },
    utils::ValidatedJson,
};

/// Relay a typing indicator to everyone listening on `channel`.
#[post("/type-indicator")]
pub async fn type_indicator(
    relay: web::Data<Relay>,
    body: ValidatedJson<TypeIndicatorBody>,
) -> Result<HttpResponse, error::Error> {
    let TypeIndicatorBody { channel, event, data } = body.0;
    let data = serde_json::to_value(data).map_err(|_| error::Error::InternalServer)?;
    relay.publish(channel, &event, data);

    Ok(HttpResponse::Ok().json(TypeIndicatorAck { success: true }))
}
