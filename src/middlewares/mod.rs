use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};

use crate::{
    api::error::{self, ChatError},
    utils::{Claims, Identity, TokenVerifier},
};

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let Some(token) = auth.and_then(|h| h.strip_prefix("Bearer ")) else {
        return Err(error::Error::from(ChatError::NotAuthenticated).into());
    };

    let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
        log::error!("TokenVerifier is not registered as app data");
        error::Error::InternalServer
    })?;

    let claims = Claims::decode(token, verifier).map_err(|e| {
        log::debug!("Rejected identity token: {e}");
        error::Error::from(ChatError::NotAuthenticated)
    })?;

    req.extensions_mut().insert(claims.identity());

    next.call(req).await
}

pub fn get_identity(req: &HttpRequest) -> Result<Identity, error::Error> {
    let extensions = req.extensions();

    let identity = extensions
        .get::<Identity>()
        .ok_or_else(|| error::Error::from(ChatError::NotAuthenticated))?
        .clone();

    Ok(identity)
}
