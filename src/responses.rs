//! Responses to ads and the ad author's accept/delete workflow.
//!
//! A user responds to an ad at most once. Only the ad's author may accept or
//! delete a response. Both run the ownership check and the write in one
//! transaction, and the write itself repeats the ownership predicate.

use crate::ads::get_ad;
use crate::constants::RESPONSES_PER_PAGE;
use crate::db::is_unique_violation;
use crate::error::{BoardError, BoardResult};
use crate::orm::{ads, responses, users};
use crate::pagination::{deserialize_blank_as_none, page_index, Page};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ResponseForm {
    #[validate(length(min = 1))]
    pub text: String,
}

/// Optional filters of the author's response listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResponseFilter {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub ad: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub accepted: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub page: Option<usize>,
}

/// A response with the ad it answers, for the author's listing.
#[derive(Clone, Debug, Serialize)]
pub struct ResponseEntry {
    #[serde(flatten)]
    pub response: responses::Model,
    pub ad_title: String,
}

/// `SELECT id FROM ads WHERE author_id = ?`
fn ads_owned_by(user_id: i32) -> SelectStatement {
    Query::select()
        .column(ads::Column::Id)
        .from(ads::Entity)
        .and_where(Expr::col(ads::Column::AuthorId).eq(user_id))
        .to_owned()
}

pub async fn find_own_response<C>(
    db: &C,
    ad_id: i32,
    user_id: i32,
) -> BoardResult<Option<responses::Model>>
where
    C: ConnectionTrait,
{
    Ok(responses::Entity::find()
        .filter(responses::Column::AdId.eq(ad_id))
        .filter(responses::Column::AuthorId.eq(user_id))
        .one(db)
        .await?)
}

/// Creates the user's response to an ad.
///
/// A second response to the same ad is a conflict.
pub async fn create_response(
    db: &DatabaseConnection,
    author: &users::Model,
    ad_id: i32,
    form: &ResponseForm,
) -> BoardResult<responses::Model> {
    form.validate()?;
    if form.text.trim().is_empty() {
        return Err(BoardError::field(
            "text",
            "required",
            "Response text must not be blank",
        ));
    }

    let ad = get_ad(db, ad_id).await?;

    let txn = db.begin().await?;
    if find_own_response(&txn, ad.id, author.id).await?.is_some() {
        return Err(BoardError::Conflict("You have already responded to this ad"));
    }

    let response = responses::ActiveModel {
        ad_id: Set(ad.id),
        author_id: Set(author.id),
        text: Set(form.text.clone()),
        created_at: Set(Utc::now().naive_utc()),
        is_accepted: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await;

    let response = match response {
        Ok(response) => response,
        // A concurrent insert hit the unique index first.
        Err(e) if is_unique_violation(&e) => {
            return Err(BoardError::Conflict("You have already responded to this ad"));
        }
        Err(e) => return Err(e.into()),
    };
    txn.commit().await?;

    log::info!(
        "Response {} to ad {} created by user_id={}",
        response.id,
        ad.id,
        author.id
    );
    Ok(response)
}

/// Loads a response and checks the requester wrote the ad it answers.
async fn load_owned_response<C>(
    db: &C,
    user: &users::Model,
    response_id: i32,
    denied: &'static str,
) -> BoardResult<(responses::Model, ads::Model)>
where
    C: ConnectionTrait,
{
    let response = responses::Entity::find_by_id(response_id)
        .one(db)
        .await?
        .ok_or(BoardError::NotFound("Response"))?;
    let ad = ads::Entity::find_by_id(response.ad_id)
        .one(db)
        .await?
        .ok_or(BoardError::NotFound("Ad"))?;

    if ad.author_id != user.id {
        log::warn!(
            "user_id={} denied on response {} to ad {} owned by user_id={}",
            user.id,
            response.id,
            ad.id,
            ad.author_id
        );
        return Err(BoardError::PermissionDenied(denied));
    }

    Ok((response, ad))
}

/// Returns the response and its ad when the requester may accept or delete it.
pub async fn get_owned_response(
    db: &DatabaseConnection,
    user: &users::Model,
    response_id: i32,
) -> BoardResult<(responses::Model, ads::Model)> {
    load_owned_response(
        db,
        user,
        response_id,
        "You can only manage responses to your own ads",
    )
    .await
}

/// Marks a response accepted. Accepting twice is a no-op.
pub async fn accept_response(
    db: &DatabaseConnection,
    user: &users::Model,
    response_id: i32,
) -> BoardResult<responses::Model> {
    let txn = db.begin().await?;
    let (response, _) = load_owned_response(
        &txn,
        user,
        response_id,
        "You can only accept responses to your own ads",
    )
    .await?;

    let result = responses::Entity::update_many()
        .col_expr(responses::Column::IsAccepted, Expr::value(true))
        .filter(responses::Column::Id.eq(response.id))
        .filter(responses::Column::AdId.in_subquery(ads_owned_by(user.id)))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(BoardError::NotFound("Response"));
    }
    txn.commit().await?;

    log::info!("Response {} accepted by user_id={}", response.id, user.id);
    Ok(responses::Model {
        is_accepted: true,
        ..response
    })
}

pub async fn delete_response(
    db: &DatabaseConnection,
    user: &users::Model,
    response_id: i32,
) -> BoardResult<()> {
    let txn = db.begin().await?;
    let (response, _) = load_owned_response(
        &txn,
        user,
        response_id,
        "You can only delete responses to your own ads",
    )
    .await?;

    let result = responses::Entity::delete_many()
        .filter(responses::Column::Id.eq(response.id))
        .filter(responses::Column::AdId.in_subquery(ads_owned_by(user.id)))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(BoardError::NotFound("Response"));
    }
    txn.commit().await?;

    log::info!("Response {} deleted by user_id={}", response.id, user.id);
    Ok(())
}

/// Responses to the requester's ads, newest first.
pub async fn list_responses_to_own_ads(
    db: &DatabaseConnection,
    user: &users::Model,
    filter: &ResponseFilter,
) -> BoardResult<Page<ResponseEntry>> {
    let mut query = responses::Entity::find()
        .filter(responses::Column::AdId.in_subquery(ads_owned_by(user.id)));
    if let Some(ad_id) = filter.ad {
        query = query.filter(responses::Column::AdId.eq(ad_id));
    }
    if let Some(accepted) = filter.accepted {
        query = query.filter(responses::Column::IsAccepted.eq(accepted));
    }

    let paginator = query
        .order_by_desc(responses::Column::CreatedAt)
        .order_by_desc(responses::Column::Id)
        .paginate(db, RESPONSES_PER_PAGE);

    let page = filter.page.unwrap_or(1);
    let item_count = paginator.num_items().await?;
    let page_count = paginator.num_pages().await?;
    let items = paginator.fetch_page(page_index(page, page_count)?).await?;

    let ad_ids: Vec<i32> = items.iter().map(|r| r.ad_id).collect();
    let titles: std::collections::HashMap<i32, String> = if ad_ids.is_empty() {
        Default::default()
    } else {
        ads::Entity::find()
            .filter(ads::Column::Id.is_in(ad_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|ad| (ad.id, ad.title))
            .collect()
    };

    let page = Page {
        items,
        this_page: page,
        page_count,
        item_count,
    };
    Ok(page.map(|response| ResponseEntry {
        ad_title: titles.get(&response.ad_id).cloned().unwrap_or_default(),
        response,
    }))
}
