use crate::modules::websocket::{handle::*, handler::websocket_handler};
use actix_web::web::ServiceConfig;

pub fn configure_socket(cfg: &mut ServiceConfig) {
    cfg.service(websocket_handler);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(type_indicator);
}
