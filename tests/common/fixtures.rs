//! Test fixtures for creating test data
#![allow(dead_code)]
#![allow(clippy::needless_update)]

use chrono::{Duration, NaiveDateTime, Utc};
use mmorpg_board::constants::MANAGERS_GROUP;
use mmorpg_board::orm::ads::Category;
use mmorpg_board::orm::{ads, groups, responses, subscribers, user_groups, users};
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection, DbErr};

pub const TEST_PASSWORD: &str = "password123";

/// Create a user with known credentials
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    is_active: bool,
) -> Result<users::Model, DbErr> {
    let password = mmorpg_board::session::hash_password(TEST_PASSWORD)
        .map_err(|e| DbErr::Custom(e.to_string()))?;

    users::ActiveModel {
        username: Set(email.to_string()),
        email: Set(email.to_string()),
        first_name: Set(String::new()),
        password: Set(password),
        is_active: Set(is_active),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_test_ad_at(
    db: &DatabaseConnection,
    author_id: i32,
    title: &str,
    category: Category,
    created_at: NaiveDateTime,
) -> Result<ads::Model, DbErr> {
    ads::ActiveModel {
        author_id: Set(author_id),
        title: Set(title.to_string()),
        content: Set(format!("<p>{}</p>", title)),
        category: Set(category),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create an ad dated now
pub async fn create_test_ad(
    db: &DatabaseConnection,
    author_id: i32,
    title: &str,
    category: Category,
) -> Result<ads::Model, DbErr> {
    create_test_ad_at(db, author_id, title, category, Utc::now().naive_utc()).await
}

/// Create `count` ads titled "Ad 1".."Ad N", oldest first, one minute apart.
pub async fn create_test_ads(
    db: &DatabaseConnection,
    author_id: i32,
    count: usize,
) -> Result<Vec<ads::Model>, DbErr> {
    let start = Utc::now().naive_utc() - Duration::minutes(count as i64);
    let mut created = Vec::with_capacity(count);
    for n in 1..=count {
        created.push(
            create_test_ad_at(
                db,
                author_id,
                &format!("Ad {}", n),
                Category::Tanks,
                start + Duration::minutes(n as i64),
            )
            .await?,
        );
    }
    Ok(created)
}

pub async fn create_test_response(
    db: &DatabaseConnection,
    ad_id: i32,
    author_id: i32,
    text: &str,
) -> Result<responses::Model, DbErr> {
    responses::ActiveModel {
        ad_id: Set(ad_id),
        author_id: Set(author_id),
        text: Set(text.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        is_accepted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_test_subscription(
    db: &DatabaseConnection,
    user_id: i32,
    categories: &[Category],
) -> Result<subscribers::Model, DbErr> {
    subscribers::ActiveModel {
        user_id: Set(user_id),
        categories: Set(subscribers::encode_categories(categories)),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Add a user to the seeded managers group
pub async fn make_manager(db: &DatabaseConnection, user_id: i32) -> Result<(), DbErr> {
    let group = groups::Entity::find()
        .filter(groups::Column::Name.eq(MANAGERS_GROUP))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::Custom("managers group was not seeded".to_string()))?;

    user_groups::ActiveModel {
        user_id: Set(user_id),
        group_id: Set(group.id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
