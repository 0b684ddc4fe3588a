use crate::modules::conversation::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/conversations")
            .service(get_conversations)
            .service(create_group)
            .service(get_conversation)
            .service(get_members)
            .service(mark_as_read)
            .service(leave_group)
            .service(delete_group),
    );
}
