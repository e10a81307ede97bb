use actix_web::http::header;
use actix_web::{get, HttpResponse, Responder};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index);
}

#[get("/")]
pub async fn view_index() -> impl Responder {
    HttpResponse::Found()
        .append_header((header::LOCATION, "/board/"))
        .finish()
}
