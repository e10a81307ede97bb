use super::see_other;
use crate::accounts::{self, confirm_email_path, LoginForm, LoginOutcome};
use crate::app_config;
use crate::email::Mailer;
use crate::error::{BoardError, BoardResult};
use crate::middleware::ClientCtx;
use crate::session::log_in;
use actix_session::Session;
use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_login).service(view_login);
}

#[get("/users/login/")]
pub async fn view_login(client: ClientCtx) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "logged_in": client.is_user(),
        "user_id": client.get_id(),
        "fields": ["email", "password"],
    }))
}

#[post("/users/login/")]
pub async fn post_login(
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Arc<dyn Mailer>>,
    cookies: Session,
    form: web::Form<LoginForm>,
) -> BoardResult<HttpResponse> {
    let base_url = app_config::site().base_url;

    match accounts::login(&db, mailer.get_ref().as_ref(), &base_url, &form).await? {
        LoginOutcome::Success(user) => {
            log_in(&cookies, user.id)?;
            log::debug!("login success: user_id={}", user.id);
            Ok(see_other("/board/"))
        }
        LoginOutcome::Inactive(email) => {
            log::debug!("login deferred: {} is not confirmed yet", email);
            Ok(see_other(confirm_email_path(&email)))
        }
        LoginOutcome::BadCredentials => {
            log::debug!("login failure: bad credentials for {}", form.email);
            Err(BoardError::BadCredentials)
        }
    }
}
