use actix_web::web::ServiceConfig;

use crate::modules::call::handle::get_room_token;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_room_token);
}
