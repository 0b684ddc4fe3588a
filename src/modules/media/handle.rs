use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use futures_util::TryStreamExt;

use crate::{
    api::{
        error::{self, ChatError},
        success,
    },
    modules::media::{model::MediaUploaded, service::MediaService},
};

fn upload_error(msg: &'static str) -> error::Error {
    ChatError::FileUpload(msg.into()).into()
}

/// Accepts a single file part and stores it.
#[post("/media")]
pub async fn upload_media(
    media_service: web::Data<MediaService>,
    mut payload: Multipart,
) -> Result<success::Success<MediaUploaded>, error::Error> {
    let mut field = payload
        .try_next()
        .await
        .map_err(|_| upload_error("Malformed multipart body"))?
        .ok_or_else(|| upload_error("No file found in request"))?;

    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string)
        .ok_or_else(|| upload_error("Missing filename"))?;

    let declared = field.content_type().map(|m| m.to_string());
    let mime_type = media_service.resolve_mime(declared.as_deref(), &filename);

    let limit = media_service.max_file_size();
    let mut bytes = Vec::new();
    while let Some(chunk) =
        field.try_next().await.map_err(|_| upload_error("Interrupted upload"))?
    {
        if bytes.len() + chunk.len() > limit {
            return Err(ChatError::FileUpload(format!("File exceeds {limit} bytes").into()).into());
        }
        bytes.extend_from_slice(&chunk);
    }

    let uploaded = media_service.store(&filename, &mime_type, &bytes).await?;

    Ok(success::Success::created(Some(uploaded)).message("File uploaded successfully"))
}

/// Public read access to stored uploads; the URL returned by `upload_media` points here.
#[get("/uploads/{name}")]
pub async fn serve_upload(
    media_service: web::Data<MediaService>,
    path: web::Path<String>,
) -> Result<HttpResponse, error::Error> {
    let file = media_service.load(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().content_type(file.content_type).body(file.bytes))
}
