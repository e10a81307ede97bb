//! Weekly digest of new ads for subscribers.

use crate::app_config::MailingConfig;
use crate::email::{templates, Mailer};
use crate::error::BoardResult;
use crate::orm::{ads, subscribers, users};
use chrono::{Duration, Utc};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use std::collections::HashMap;
use std::sync::Arc;

/// Sends each active subscriber one email listing the ads created in the
/// last `lookback_days` in their categories. Returns the number of digests sent.
///
/// Subscribers with nothing new are skipped. A failed send is logged and the
/// remaining subscribers are still mailed.
pub async fn weekly_mailing(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    base_url: &str,
    lookback_days: i64,
) -> BoardResult<usize> {
    let since = Utc::now().naive_utc() - Duration::days(lookback_days);
    let recent = ads::Entity::find()
        .filter(ads::Column::CreatedAt.gte(since))
        .order_by_desc(ads::Column::CreatedAt)
        .order_by_desc(ads::Column::Id)
        .all(db)
        .await?;
    if recent.is_empty() {
        log::debug!("Weekly mailing: no ads since {}", since);
        return Ok(0);
    }

    let subscriptions = subscribers::Entity::find().all(db).await?;
    if subscriptions.is_empty() {
        return Ok(0);
    }

    let user_ids: Vec<i32> = subscriptions.iter().map(|s| s.user_id).collect();
    let recipients: HashMap<i32, users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .filter(users::Column::IsActive.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut sent = 0;
    for subscription in subscriptions {
        let user = match recipients.get(&subscription.user_id) {
            Some(user) => user,
            None => continue,
        };

        let categories = subscription.category_list();
        let matching: Vec<ads::Model> = recent
            .iter()
            .filter(|ad| categories.contains(&ad.category))
            .cloned()
            .collect();
        if matching.is_empty() {
            continue;
        }

        let email =
            templates::weekly_digest_email(&user.email, &user.first_name, &matching, base_url);
        match mailer.send(email).await {
            Ok(()) => sent += 1,
            Err(e) => log::error!("Weekly digest to user_id={} failed: {}", user.id, e),
        }
    }

    log::info!("Weekly mailing sent {} digests", sent);
    Ok(sent)
}

/// Runs [`weekly_mailing`] every `interval_hours` on the actix runtime.
///
/// The first run happens one full interval after startup.
pub fn spawn_weekly_mailing(
    db: DatabaseConnection,
    mailer: Arc<dyn Mailer>,
    config: MailingConfig,
    base_url: String,
) {
    let period = std::time::Duration::from_secs(config.interval_hours.max(1) * 3600);

    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(period);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) =
                weekly_mailing(&db, mailer.as_ref(), &base_url, config.lookback_days).await
            {
                log::error!("Weekly mailing failed: {}", e);
            }
        }
    });
}
