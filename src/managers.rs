//! Manager self-elevation and mass email.

use crate::constants::{MANAGERS_GROUP, PERM_SEND_MASS_EMAIL};
use crate::db::{get_or_create_group, is_unique_violation};
use crate::email::{templates, Mailer};
use crate::error::{BoardError, BoardResult};
use crate::orm::{managers, user_groups, users};
use crate::permission::Roles;
use chrono::Utc;
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ElevationForm {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct NewsForm {
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManagerStatus {
    pub is_manager: bool,
    /// True only on the request that performed the elevation.
    pub manager_is_added: bool,
}

/// Adds the user to the managers group and records the elevation.
///
/// Users already in the group are left as they are, including one added by a
/// concurrent request after `roles` was read. Without `confirm` nothing
/// changes.
pub async fn elevate_to_manager(
    db: &DatabaseConnection,
    user: &users::Model,
    roles: &Roles,
    form: &ElevationForm,
) -> BoardResult<ManagerStatus> {
    let already_manager = ManagerStatus {
        is_manager: true,
        manager_is_added: false,
    };
    if roles.is_manager() {
        return Ok(already_manager);
    }
    if !form.confirm {
        return Err(BoardError::field(
            "confirm",
            "required",
            "Confirm that you want to become a manager",
        ));
    }

    let txn = db.begin().await?;
    match add_manager_rows(&txn, user).await {
        Ok(()) => txn.commit().await?,
        // The membership index rejected a second row; the transaction rolls back on drop.
        Err(e) if is_unique_violation(&e) => {
            log::debug!("user_id={} was already added to managers", user.id);
            return Ok(already_manager);
        }
        Err(e) => return Err(e.into()),
    }

    log::info!("user_id={} elevated to manager", user.id);
    Ok(ManagerStatus {
        is_manager: true,
        manager_is_added: true,
    })
}

async fn add_manager_rows<C>(db: &C, user: &users::Model) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let group = get_or_create_group(db, MANAGERS_GROUP).await?;
    user_groups::ActiveModel {
        user_id: Set(user.id),
        group_id: Set(group.id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let flagged = managers::Entity::find()
        .filter(managers::Column::ManagerId.eq(user.id))
        .count(db)
        .await?;
    if flagged == 0 {
        managers::ActiveModel {
            manager_id: Set(user.id),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Email addresses of every active user.
pub async fn active_user_emails(db: &DatabaseConnection) -> BoardResult<Vec<String>> {
    Ok(users::Entity::find()
        .filter(users::Column::IsActive.eq(true))
        .order_by_asc(users::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.email)
        .collect())
}

/// Sends one message blind-copied to every active user.
///
/// The caller must hold `board.can_send_mass_email`. Transport failures are
/// returned, not retried.
pub async fn send_news(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    roles: &Roles,
    from_address: &str,
    form: &NewsForm,
) -> BoardResult<usize> {
    if !roles.has_permission(PERM_SEND_MASS_EMAIL) {
        return Err(BoardError::PermissionDenied("Insufficient permissions"));
    }
    form.validate()?;

    let recipients = active_user_emails(db).await?;
    let count = recipients.len();
    let email = templates::news_email(from_address, &form.subject, &form.text, recipients);
    mailer.send(email).await?;

    log::info!("Mass email '{}' sent to {} users", form.subject, count);
    Ok(count)
}
