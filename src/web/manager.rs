use crate::app_config;
use crate::constants::PERM_SEND_MASS_EMAIL;
use crate::email::Mailer;
use crate::error::BoardResult;
use crate::managers::{self, ElevationForm, ManagerStatus, NewsForm};
use crate::middleware::ClientCtx;
use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_add_manager)
        .service(add_manager)
        .service(view_send_news)
        .service(send_news);
}

#[get("/board/manager/add/")]
pub async fn view_add_manager(client: ClientCtx) -> BoardResult<impl Responder> {
    client.require_login()?;
    Ok(HttpResponse::Ok().json(ManagerStatus {
        is_manager: client.get_roles().is_manager(),
        manager_is_added: false,
    }))
}

#[post("/board/manager/add/")]
pub async fn add_manager(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Form<ElevationForm>,
) -> BoardResult<impl Responder> {
    let user = client.require_login()?;
    let status = managers::elevate_to_manager(&db, user, client.get_roles(), &form).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[get("/board/manager/send_news/")]
pub async fn view_send_news(client: ClientCtx) -> BoardResult<impl Responder> {
    client.require_permission(PERM_SEND_MASS_EMAIL)?;
    Ok(HttpResponse::Ok().json(json!({ "fields": ["subject", "text"] })))
}

#[post("/board/manager/send_news/")]
pub async fn send_news(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Arc<dyn Mailer>>,
    form: web::Form<NewsForm>,
) -> BoardResult<impl Responder> {
    client.require_permission(PERM_SEND_MASS_EMAIL)?;

    let from_address = app_config::email().from_address;
    let recipients = managers::send_news(
        &db,
        mailer.get_ref().as_ref(),
        client.get_roles(),
        &from_address,
        &form,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "sent": true, "recipients": recipients })))
}
