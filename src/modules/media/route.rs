use actix_web::web::ServiceConfig;

use crate::modules::media::handle::{serve_upload, upload_media};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(upload_media);
}

/// Routes mounted outside the authenticated `/api` scope.
pub fn configure_public(cfg: &mut ServiceConfig) {
    cfg.service(serve_upload);
}
