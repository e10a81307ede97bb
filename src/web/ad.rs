use super::see_other;
use crate::ads::{self, AdForm};
use crate::error::BoardResult;
use crate::middleware::ClientCtx;
use crate::orm::ads::Category;
use crate::pagination::PageQuery;
use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::{DatabaseConnection, Iterable};
use serde::Serialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // The create routes go first so "create" is never parsed as an id.
    conf.service(view_create_ad)
        .service(create_ad)
        .service(view_ads)
        .service(view_edit_ad)
        .service(edit_ad)
        .service(view_ad);
}

#[derive(Serialize)]
struct CategoryChoice {
    id: &'static str,
    label: &'static str,
}

fn category_choices() -> Vec<CategoryChoice> {
    Category::iter()
        .map(|c| CategoryChoice {
            id: c.as_str(),
            label: c.label(),
        })
        .collect()
}

#[get("/board/")]
pub async fn view_ads(
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> BoardResult<impl Responder> {
    let page = ads::list_ads(&db, query.page.unwrap_or(1)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/board/ad/create/")]
pub async fn view_create_ad(client: ClientCtx) -> BoardResult<impl Responder> {
    client.require_login()?;
    Ok(HttpResponse::Ok().json(json!({ "categories": category_choices() })))
}

#[post("/board/ad/create/")]
pub async fn create_ad(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Form<AdForm>,
) -> BoardResult<HttpResponse> {
    let user = client.require_login()?;
    ads::create_ad(&db, user, &form).await?;
    Ok(see_other("/board/"))
}

#[get("/board/ad/{id}/")]
pub async fn view_ad(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> BoardResult<impl Responder> {
    let detail = ads::get_ad_detail(&db, path.into_inner(), client.get_id()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/board/ad/{id}/edit/")]
pub async fn view_edit_ad(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> BoardResult<impl Responder> {
    client.require_login()?;
    let ad = ads::get_ad(&db, path.into_inner()).await?;
    client.require_ownership(ad.author_id, "You can only edit your own ads")?;

    Ok(HttpResponse::Ok().json(json!({
        "ad": ad,
        "categories": category_choices(),
        "is_update": true,
    })))
}

#[post("/board/ad/{id}/edit/")]
pub async fn edit_ad(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<AdForm>,
) -> BoardResult<HttpResponse> {
    let user = client.require_login()?;
    ads::update_ad(&db, user, path.into_inner(), &form).await?;
    Ok(see_other("/board/"))
}
