//! Category subscriptions for the weekly digest.

use crate::error::{BoardError, BoardResult};
use crate::orm::ads::Category;
use crate::orm::subscribers::{self, encode_categories};
use crate::orm::users;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Submitted subscription. `categories` is a comma separated list of
/// category identifiers; empty unsubscribes from everything.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubscriptionForm {
    #[serde(default)]
    pub categories: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub categories: Vec<Category>,
}

/// Parses `tanks, heals` into categories, dropping duplicates and keeping order.
pub fn parse_categories(raw: &str) -> BoardResult<Vec<Category>> {
    let mut categories = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        let category: Category = id.parse().map_err(|_| {
            let mut error = ValidationError::new("unknown_category");
            error.message = Some(format!("Unknown category: {}", id).into());
            error.add_param("value".into(), &id);
            let mut errors = validator::ValidationErrors::new();
            errors.add("categories", error);
            BoardError::Validation(errors)
        })?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    Ok(categories)
}

/// The user's categories, or an empty set when they never subscribed.
pub async fn get_subscription(
    db: &DatabaseConnection,
    user: &users::Model,
) -> BoardResult<Subscription> {
    let categories = subscribers::Entity::find()
        .filter(subscribers::Column::UserId.eq(user.id))
        .one(db)
        .await?
        .map(|s| s.category_list())
        .unwrap_or_default();

    Ok(Subscription { categories })
}

/// Creates or replaces the user's single subscription row.
pub async fn save_subscription(
    db: &DatabaseConnection,
    user: &users::Model,
    form: &SubscriptionForm,
) -> BoardResult<Subscription> {
    let categories = parse_categories(&form.categories)?;
    let encoded = encode_categories(&categories);

    let txn = db.begin().await?;
    let existing = subscribers::Entity::find()
        .filter(subscribers::Column::UserId.eq(user.id))
        .one(&txn)
        .await?;

    match existing {
        Some(existing) => {
            let mut active: subscribers::ActiveModel = existing.into();
            active.categories = Set(encoded);
            active.update(&txn).await?;
        }
        None => {
            subscribers::ActiveModel {
                user_id: Set(user.id),
                categories: Set(encoded),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }
    txn.commit().await?;

    log::debug!(
        "user_id={} subscribed to {:?}",
        user.id,
        categories.iter().map(Category::as_str).collect::<Vec<_>>()
    );
    Ok(Subscription { categories })
}
