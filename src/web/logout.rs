use super::see_other;
use crate::middleware::ClientCtx;
use crate::session::log_out;
use actix_web::{get, Responder};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_logout);
}

#[get("/users/logout/")]
pub async fn view_logout(client: ClientCtx, cookies: actix_session::Session) -> impl Responder {
    if let Some(user_id) = client.get_id() {
        log::debug!("view_logout: user_id={}", user_id);
    }
    log_out(&cookies);
    see_other("/board/")
}
