//! Ad listing, detail, creation and editing.

use crate::constants::ADS_PER_PAGE;
use crate::error::{BoardError, BoardResult};
use crate::orm::ads::{self, Category};
use crate::orm::{responses, users};
use crate::pagination::{page_index, Page};
use crate::permission::is_ad_author;
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Submitted ad fields, shared by create and edit.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AdForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(custom = "validate_category")]
    pub category: String,
}

pub fn validate_category(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Category>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_category"))
}

impl AdForm {
    /// Validates and returns the trimmed title and parsed category.
    fn clean(&self) -> BoardResult<(String, Category)> {
        let trimmed = AdForm {
            title: self.title.trim().to_owned(),
            content: self.content.clone(),
            category: self.category.trim().to_owned(),
        };
        trimmed.validate()?;
        if trimmed.content.trim().is_empty() {
            return Err(BoardError::field(
                "content",
                "required",
                "Content must not be blank",
            ));
        }

        let category = trimmed
            .category
            .parse()
            .map_err(|_| BoardError::field("category", "unknown_category", "Unknown category"))?;
        Ok((trimmed.title, category))
    }
}

/// Ads newest first, `ADS_PER_PAGE` per page.
pub async fn list_ads(db: &DatabaseConnection, page: usize) -> BoardResult<Page<ads::Model>> {
    let paginator = ads::Entity::find()
        .order_by_desc(ads::Column::CreatedAt)
        .order_by_desc(ads::Column::Id)
        .paginate(db, ADS_PER_PAGE);

    let item_count = paginator.num_items().await?;
    let page_count = paginator.num_pages().await?;
    let index = page_index(page, page_count)?;
    let items = paginator.fetch_page(index).await?;

    Ok(Page {
        items,
        this_page: page,
        page_count,
        item_count,
    })
}

/// An ad plus the viewer's own response to it, if they wrote one.
#[derive(Clone, Debug, Serialize)]
pub struct AdDetail {
    pub ad: ads::Model,
    pub response: Option<responses::Model>,
}

pub async fn get_ad(db: &DatabaseConnection, ad_id: i32) -> BoardResult<ads::Model> {
    ads::Entity::find_by_id(ad_id)
        .one(db)
        .await?
        .ok_or(BoardError::NotFound("Ad"))
}

pub async fn get_ad_detail(
    db: &DatabaseConnection,
    ad_id: i32,
    viewer_id: Option<i32>,
) -> BoardResult<AdDetail> {
    let ad = get_ad(db, ad_id).await?;

    let response = match viewer_id {
        Some(viewer_id) => {
            responses::Entity::find()
                .filter(responses::Column::AdId.eq(ad.id))
                .filter(responses::Column::AuthorId.eq(viewer_id))
                .one(db)
                .await?
        }
        None => None,
    };

    Ok(AdDetail { ad, response })
}

pub async fn create_ad(
    db: &DatabaseConnection,
    author: &users::Model,
    form: &AdForm,
) -> BoardResult<ads::Model> {
    let (title, category) = form.clean()?;
    let now = Utc::now().naive_utc();

    let ad = ads::ActiveModel {
        author_id: Set(author.id),
        title: Set(title),
        content: Set(form.content.clone()),
        category: Set(category),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("Ad {} created by user_id={}", ad.id, author.id);
    Ok(ad)
}

/// Replaces title, content and category. Only the author may edit.
pub async fn update_ad(
    db: &DatabaseConnection,
    editor: &users::Model,
    ad_id: i32,
    form: &AdForm,
) -> BoardResult<ads::Model> {
    let ad = get_ad(db, ad_id).await?;
    if !is_ad_author(editor, &ad) {
        log::warn!(
            "user_id={} attempted to edit ad {} owned by user_id={}",
            editor.id,
            ad.id,
            ad.author_id
        );
        return Err(BoardError::PermissionDenied(
            "You can only edit your own ads",
        ));
    }

    let (title, category) = form.clean()?;

    let mut active: ads::ActiveModel = ad.into();
    active.title = Set(title);
    active.content = Set(form.content.clone());
    active.category = Set(category);
    active.updated_at = Set(Utc::now().naive_utc());

    Ok(active.update(db).await?)
}
