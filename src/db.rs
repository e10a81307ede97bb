//! Database connection and schema setup.
//!
//! Tables are created from the entity definitions; composite unique indexes
//! the entity derive cannot express are added with raw SQL that both
//! Postgres and SQLite accept.

use crate::constants::{MANAGERS_GROUP, PERM_SEND_MASS_EMAIL};
use crate::orm::{
    ads, email_confirmations, group_permissions, groups, managers, permissions, responses,
    subscribers, user_groups, users,
};
use sea_orm::{
    entity::*, query::*, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, Schema, Statement,
};
use std::time::Duration;

/// Opens a connection pool.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url.to_owned());
    opt.max_connections(max_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    log::info!("Connected to database ({:?})", db.get_database_backend());
    Ok(db)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

async fn execute_raw(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

/// Creates every table and index that does not exist yet.
///
/// Parents are created before children so Postgres can resolve foreign keys.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, users::Entity).await?;
    create_table(db, &schema, groups::Entity).await?;
    create_table(db, &schema, permissions::Entity).await?;
    create_table(db, &schema, user_groups::Entity).await?;
    create_table(db, &schema, group_permissions::Entity).await?;
    create_table(db, &schema, ads::Entity).await?;
    create_table(db, &schema, responses::Entity).await?;
    create_table(db, &schema, subscribers::Entity).await?;
    create_table(db, &schema, managers::Entity).await?;
    create_table(db, &schema, email_confirmations::Entity).await?;

    // One response per user per ad.
    execute_raw(
        db,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_responses_ad_author ON responses (ad_id, author_id)",
    )
    .await?;
    execute_raw(
        db,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_groups_user_group ON user_groups (user_id, group_id)",
    )
    .await?;
    execute_raw(
        db,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_group_permissions_group_perm ON group_permissions (group_id, permission_id)",
    )
    .await?;
    execute_raw(
        db,
        "CREATE INDEX IF NOT EXISTS idx_ads_created_at ON ads (created_at)",
    )
    .await?;
    execute_raw(
        db,
        "CREATE INDEX IF NOT EXISTS idx_email_confirmations_email ON email_confirmations (email)",
    )
    .await?;

    Ok(())
}

/// Returns the group with `name`, creating it when missing.
pub async fn get_or_create_group<C>(db: &C, name: &str) -> Result<groups::Model, DbErr>
where
    C: ConnectionTrait,
{
    if let Some(group) = groups::Entity::find()
        .filter(groups::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(group);
    }

    groups::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Grants `codename` to the group, registering the permission when missing.
pub async fn grant_group_permission<C>(
    db: &C,
    group_id: i32,
    codename: &str,
    label: &str,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let permission = match permissions::Entity::find()
        .filter(permissions::Column::Codename.eq(codename))
        .one(db)
        .await?
    {
        Some(permission) => permission,
        None => {
            permissions::ActiveModel {
                codename: Set(codename.to_owned()),
                label: Set(label.to_owned()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    let granted = group_permissions::Entity::find()
        .filter(group_permissions::Column::GroupId.eq(group_id))
        .filter(group_permissions::Column::PermissionId.eq(permission.id))
        .count(db)
        .await?;

    if granted == 0 {
        group_permissions::ActiveModel {
            group_id: Set(group_id),
            permission_id: Set(permission.id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// Seeds the managers group and its mass-email permission.
pub async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    let managers = get_or_create_group(db, MANAGERS_GROUP).await?;
    grant_group_permission(
        db,
        managers.id,
        PERM_SEND_MASS_EMAIL,
        "Can send mass email",
    )
    .await?;

    log::debug!("Seeded group '{}' with '{}'", MANAGERS_GROUP, PERM_SEND_MASS_EMAIL);
    Ok(())
}

/// True when `e` came from a unique index rejecting an insert.
///
/// sea-orm 0.8 flattens driver errors into strings, so this matches the
/// SQLite ("UNIQUE constraint failed") and Postgres ("duplicate key value
/// violates unique constraint") messages.
pub fn is_unique_violation(e: &DbErr) -> bool {
    let message = e.to_string().to_lowercase();
    message.contains("unique constraint") || message.contains("duplicate key")
}

/// Creates the schema and seed rows. Safe to call on every start.
pub async fn init_db(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_schema(db).await?;
    seed(db).await
}
