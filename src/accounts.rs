//! Signup, email confirmation and login.
//!
//! New accounts stay inactive until the emailed six digit code is entered.
//! Logging in to an inactive account sends a fresh code instead.

use crate::constants::{CONFIRMATION_CODE_LENGTH, CONFIRMATION_CODE_TTL_MINUTES};
use crate::email::{templates, Mailer};
use crate::error::{BoardError, BoardResult};
use crate::orm::{email_confirmations, users};
use crate::session::{hash_password, verify_password};
use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, TransactionTrait};
use serde::Deserialize;
use url::form_urlencoded::byte_serialize;
use validator::Validate;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 1000))]
    pub password1: String,
    pub password2: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConfirmForm {
    pub code: String,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Activated and the password matched.
    LoggedIn(users::Model),
    /// Activated; the user still has to log in.
    Activated(users::Model),
    /// No account exists for the email.
    UnknownEmail,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success(users::Model),
    /// The account exists but is unconfirmed; a new code was sent to this address.
    Inactive(String),
    BadCredentials,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Path of the confirmation page for `email`, with the address escaped as one segment.
pub fn confirm_email_path(email: &str) -> String {
    format!(
        "/users/signup/confirm_email/{}/",
        byte_serialize(email.as_bytes()).collect::<String>()
    )
}

/// Six random decimal digits, zero padded.
pub fn generate_code() -> String {
    let upper = 10u32.pow(CONFIRMATION_CODE_LENGTH as u32);
    format!(
        "{:0width$}",
        rand::thread_rng().gen_range(0..upper),
        width = CONFIRMATION_CODE_LENGTH
    )
}

/// True while a code issued at `created_at` may still be used.
pub fn code_is_fresh(created_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    now - created_at <= Duration::minutes(CONFIRMATION_CODE_TTL_MINUTES)
}

pub async fn find_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
}

/// Stores a new code for `email` and mails it.
pub async fn issue_confirmation_code(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    email: &str,
    base_url: &str,
) -> BoardResult<()> {
    let code = generate_code();
    email_confirmations::ActiveModel {
        email: Set(email.to_owned()),
        code: Set(code.clone()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    mailer
        .send(templates::confirmation_code_email(email, &code, base_url))
        .await?;
    log::debug!("Confirmation code sent to {}", email);
    Ok(())
}

/// Creates an inactive account and mails its confirmation code.
///
/// A failed send is logged; logging in later sends another code.
pub async fn signup(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    base_url: &str,
    form: &SignupForm,
) -> BoardResult<users::Model> {
    let form = SignupForm {
        email: normalize_email(&form.email),
        ..form.clone()
    };
    form.validate()?;
    if form.password1 != form.password2 {
        return Err(BoardError::field(
            "password2",
            "password_mismatch",
            "The two password fields didn't match",
        ));
    }

    let email = form.email.clone();
    if find_user_by_email(db, &email).await?.is_some() {
        return Err(BoardError::field(
            "email",
            "unique",
            "A user with that email already exists",
        ));
    }

    let password = hash_password(&form.password1)?;
    let txn = db.begin().await?;
    let user = users::ActiveModel {
        username: Set(email.clone()),
        email: Set(email.clone()),
        first_name: Set(form.first_name.trim().to_owned()),
        password: Set(password),
        is_active: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    log::info!("New account user_id={} awaiting confirmation", user.id);

    if let Err(e) = issue_confirmation_code(db, mailer, &email, base_url).await {
        log::error!("Could not send confirmation code to {}: {}", email, e);
    }

    Ok(user)
}

/// Checks the newest code issued for `email` and activates the account.
pub async fn confirm_email(
    db: &DatabaseConnection,
    email: &str,
    form: &ConfirmForm,
) -> BoardResult<ConfirmOutcome> {
    let user = match find_user_by_email(db, email).await? {
        Some(user) => user,
        None => return Ok(ConfirmOutcome::UnknownEmail),
    };

    let latest = email_confirmations::Entity::find()
        .filter(email_confirmations::Column::Email.eq(user.email.clone()))
        .order_by_desc(email_confirmations::Column::CreatedAt)
        .order_by_desc(email_confirmations::Column::Id)
        .one(db)
        .await?;

    let now = Utc::now().naive_utc();
    let valid = match &latest {
        Some(row) => row.code == form.code.trim() && code_is_fresh(row.created_at, now),
        None => false,
    };
    if !valid {
        log::debug!("Rejected confirmation code for user_id={}", user.id);
        return Err(BoardError::field(
            "code",
            "invalid_code",
            "The confirmation code is invalid or has expired",
        ));
    }

    let txn = db.begin().await?;
    let mut active: users::ActiveModel = user.clone().into();
    active.is_active = Set(true);
    let user = active.update(&txn).await?;
    email_confirmations::Entity::delete_many()
        .filter(email_confirmations::Column::Email.eq(user.email.clone()))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    log::info!("user_id={} confirmed their email", user.id);

    match form.password.as_deref() {
        Some(password) if verify_password(password, &user.password) => {
            Ok(ConfirmOutcome::LoggedIn(user))
        }
        _ => Ok(ConfirmOutcome::Activated(user)),
    }
}

/// Checks credentials. Inactive accounts get a new code instead of a session.
pub async fn login(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    base_url: &str,
    form: &LoginForm,
) -> BoardResult<LoginOutcome> {
    let user = match find_user_by_email(db, &form.email).await? {
        Some(user) => user,
        None => return Ok(LoginOutcome::BadCredentials),
    };

    if !user.is_active {
        issue_confirmation_code(db, mailer, &user.email, base_url).await?;
        return Ok(LoginOutcome::Inactive(user.email));
    }

    if !verify_password(&form.password, &user.password) {
        log::debug!("login failure: bad password for user_id={}", user.id);
        return Ok(LoginOutcome::BadCredentials);
    }

    Ok(LoginOutcome::Success(user))
}
