use actix_web::{HttpRequest, post, web};

use crate::{
    api::{
        error::{self, ChatError},
        success,
    },
    modules::webhook::service::{SvixHeaders, WebhookService},
};

fn svix_headers(req: &HttpRequest) -> Result<SvixHeaders, error::Error> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or(error::Error::from(ChatError::WebhookSignature))
    };

    Ok(SvixHeaders {
        id: header("svix-id")?,
        timestamp: header("svix-timestamp")?,
        signature: header("svix-signature")?,
    })
}

#[post("/clerk-auth-users-webhook")]
pub async fn receive_user_webhook(
    webhook_service: web::Data<WebhookService>,
    body: web::Bytes,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let headers = svix_headers(&req)?;
    webhook_service.process(&headers, &body, chrono::Utc::now().timestamp()).await?;
    Ok(success::Success::ok(None).message("Webhook processed"))
}
