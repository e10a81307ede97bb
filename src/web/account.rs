use super::see_other;
use crate::accounts::{self, confirm_email_path, ConfirmForm, ConfirmOutcome, SignupForm};
use crate::app_config;
use crate::email::Mailer;
use crate::error::BoardResult;
use crate::middleware::ClientCtx;
use crate::session::log_in;
use actix_session::Session;
use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_signup)
        .service(post_signup)
        .service(view_confirm_email)
        .service(post_confirm_email);
}

#[get("/users/signup/")]
pub async fn view_signup(client: ClientCtx) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "logged_in": client.is_user(),
        "fields": ["first_name", "email", "password1", "password2"],
    }))
}

#[post("/users/signup/")]
pub async fn post_signup(
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Arc<dyn Mailer>>,
    form: web::Form<SignupForm>,
) -> BoardResult<HttpResponse> {
    let base_url = app_config::site().base_url;
    let user = accounts::signup(&db, mailer.get_ref().as_ref(), &base_url, &form).await?;
    Ok(see_other(confirm_email_path(&user.email)))
}

#[get("/users/signup/confirm_email/{email}/")]
pub async fn view_confirm_email(path: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "email": path.into_inner(),
        "fields": ["code", "password"],
    }))
}

#[post("/users/signup/confirm_email/{email}/")]
pub async fn post_confirm_email(
    db: web::Data<DatabaseConnection>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<ConfirmForm>,
) -> BoardResult<HttpResponse> {
    match accounts::confirm_email(&db, &path.into_inner(), &form).await? {
        ConfirmOutcome::LoggedIn(user) => {
            log_in(&session, user.id)?;
            Ok(see_other("/board/"))
        }
        ConfirmOutcome::Activated(_) => Ok(see_other("/users/login/")),
        ConfirmOutcome::UnknownEmail => Ok(see_other("/users/signup/")),
    }
}
