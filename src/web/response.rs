use super::see_other;
use crate::ads;
use crate::error::BoardResult;
use crate::middleware::ClientCtx;
use crate::responses::{self, ResponseFilter, ResponseForm};
use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_create_response)
        .service(create_response)
        .service(view_responses)
        .service(view_accept_response)
        .service(accept_response)
        .service(view_delete_response)
        .service(delete_response);
}

/// The ad being answered and the requester's earlier response, if any.
#[get("/board/ad/{id}/response/")]
pub async fn view_create_response(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> BoardResult<impl Responder> {
    let user = client.require_login()?;
    let detail = ads::get_ad_detail(&db, path.into_inner(), Some(user.id)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "ad": detail.ad,
        "response": detail.response,
        "response_create": true,
    })))
}

#[post("/board/ad/{id}/response/")]
pub async fn create_response(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<ResponseForm>,
) -> BoardResult<HttpResponse> {
    let user = client.require_login()?;
    responses::create_response(&db, user, path.into_inner(), &form).await?;
    Ok(see_other("/board/"))
}

#[get("/board/responses/")]
pub async fn view_responses(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ResponseFilter>,
) -> BoardResult<impl Responder> {
    let user = client.require_login()?;
    let page = responses::list_responses_to_own_ads(&db, user, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/board/response/{id}/accept/")]
pub async fn view_accept_response(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> BoardResult<impl Responder> {
    let user = client.require_login()?;
    let (response, ad) = responses::get_owned_response(&db, user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "response": response, "ad": ad })))
}

#[post("/board/response/{id}/accept/")]
pub async fn accept_response(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> BoardResult<HttpResponse> {
    let user = client.require_login()?;
    responses::accept_response(&db, user, path.into_inner()).await?;
    Ok(see_other("/board/responses/"))
}

#[get("/board/response/{id}/delete/")]
pub async fn view_delete_response(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> BoardResult<impl Responder> {
    let user = client.require_login()?;
    let (response, ad) = responses::get_owned_response(&db, user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "response": response, "ad": ad })))
}

#[post("/board/response/{id}/delete/")]
pub async fn delete_response(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> BoardResult<HttpResponse> {
    let user = client.require_login()?;
    responses::delete_response(&db, user, path.into_inner()).await?;
    Ok(see_other("/board/responses/"))
}
