use super::see_other;
use crate::error::BoardResult;
use crate::middleware::ClientCtx;
use crate::subscriptions::{self, SubscriptionForm};
use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_subscription).service(save_subscription);
}

#[get("/board/subscription/")]
pub async fn view_subscription(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> BoardResult<impl Responder> {
    let user = client.require_login()?;
    let subscription = subscriptions::get_subscription(&db, user).await?;
    Ok(HttpResponse::Ok().json(subscription))
}

#[post("/board/subscription/")]
pub async fn save_subscription(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Form<SubscriptionForm>,
) -> BoardResult<HttpResponse> {
    let user = client.require_login()?;
    subscriptions::save_subscription(&db, user, &form).await?;
    Ok(see_other("/board/subscription/"))
}
