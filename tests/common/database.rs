//! Test database setup
#![allow(dead_code)]

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Statement};

/// A fresh in-memory SQLite database with the schema and seed rows.
///
/// The pool holds a single connection: every connection to `sqlite::memory:`
/// opens its own empty database.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let db = mmorpg_board::db::connect("sqlite::memory:", 1).await?;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_owned(),
    ))
    .await?;

    mmorpg_board::db::init_db(&db).await?;
    Ok(db)
}
