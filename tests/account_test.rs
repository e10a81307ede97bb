/// Integration tests for signup, email confirmation, login and logout
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use mmorpg_board::email::{Mailer, MockMailer};
use mmorpg_board::orm::{email_confirmations, users};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use std::sync::Arc;

async fn latest_code(db: &DatabaseConnection, email: &str) -> String {
    email_confirmations::Entity::find()
        .filter(email_confirmations::Column::Email.eq(email))
        .order_by_desc(email_confirmations::Column::Id)
        .one(db)
        .await
        .unwrap()
        .expect("no confirmation code stored")
        .code
}

#[actix_rt::test]
async fn test_signup_creates_inactive_user_and_sends_code() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/signup/")
        .set_form(&[
            ("first_name", "Ann"),
            ("email", "ann@example.com"),
            ("password1", "correct horse"),
            ("password2", "correct horse"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/users/signup/confirm_email/ann%40example.com/");

    let user = users::Entity::find()
        .filter(users::Column::Email.eq("ann@example.com"))
        .one(&db)
        .await
        .unwrap()
        .expect("user was not created");
    assert!(!user.is_active);
    assert_eq!(user.username, "ann@example.com");
    assert_eq!(user.first_name, "Ann");

    let code = latest_code(&db, "ann@example.com").await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["ann@example.com".to_string()]);
    assert!(sent[0].body_text.contains(&code));
}

#[actix_rt::test]
async fn test_signup_with_registered_email_is_rejected() {
    let db = setup_test_database().await.expect("Failed to setup database");
    create_test_user(&db, "taken@example.com", true)
        .await
        .expect("Failed to create user");

    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/signup/")
        .set_form(&[
            ("email", "taken@example.com"),
            ("password1", "password123"),
            ("password2", "password123"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let count = users::Entity::find().count(&db).await.unwrap();
    assert_eq!(count, 1);
    assert!(mailer.sent().is_empty());
}

#[actix_rt::test]
async fn test_signup_trims_and_lowercases_email() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/signup/")
        .set_form(&[
            ("email", " Ann@Example.com "),
            ("password1", "correct horse"),
            ("password2", "correct horse"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/users/signup/confirm_email/ann%40example.com/");

    let user = users::Entity::find()
        .one(&db)
        .await
        .unwrap()
        .expect("user was not created");
    assert_eq!(user.email, "ann@example.com");
    assert_eq!(user.username, "ann@example.com");
    assert_eq!(mailer.sent()[0].to, vec!["ann@example.com".to_string()]);

    // Same address with different padding and case is taken.
    let req = test::TestRequest::post()
        .uri("/users/signup/")
        .set_form(&[
            ("email", "ANN@example.com  "),
            ("password1", "correct horse"),
            ("password2", "correct horse"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_confirmation_link_escapes_unusual_address() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/signup/")
        .set_form(&[
            ("email", "guild/raid?x@example.com"),
            ("password1", "password123"),
            ("password2", "password123"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let confirm_path = location(&resp);
    assert_eq!(
        confirm_path,
        "/users/signup/confirm_email/guild%2Fraid%3Fx%40example.com/"
    );
    assert!(mailer.sent()[0].body_text.contains(&confirm_path));

    let code = latest_code(&db, "guild/raid?x@example.com").await;
    let req = test::TestRequest::post()
        .uri(&confirm_path)
        .set_form(&[("code", code.as_str()), ("password", "password123")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/board/");
}

#[actix_rt::test]
async fn test_signup_rejects_mismatched_passwords() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let app = test_app!(db.clone(), Arc::new(MockMailer::new()) as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/signup/")
        .set_form(&[
            ("email", "ann@example.com"),
            ("password1", "password123"),
            ("password2", "password321"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let count = users::Entity::find().count(&db).await.unwrap();
    assert_eq!(count, 0);
}

#[actix_rt::test]
async fn test_confirm_email_activates_and_logs_in() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/signup/")
        .set_form(&[
            ("email", "ann@example.com"),
            ("password1", "password123"),
            ("password2", "password123"),
        ])
        .to_request();
    test::call_service(&app, req).await;
    let code = latest_code(&db, "ann@example.com").await;

    let wrong = if code == "000000" { "111111" } else { "000000" };
    let req = test::TestRequest::post()
        .uri("/users/signup/confirm_email/ann@example.com/")
        .set_form(&[("code", wrong), ("password", "password123")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/users/signup/confirm_email/ann@example.com/")
        .set_form(&[("code", code.as_str()), ("password", "password123")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/board/");
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "id")
        .expect("confirmation did not log the user in")
        .into_owned();

    let user = users::Entity::find()
        .filter(users::Column::Email.eq("ann@example.com"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(user.is_active);

    // The session belongs to the confirmed user.
    let req = test::TestRequest::get()
        .uri("/board/subscription/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_confirm_without_password_redirects_to_login() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let app = test_app!(db.clone(), Arc::new(MockMailer::new()) as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/signup/")
        .set_form(&[
            ("email", "ann@example.com"),
            ("password1", "password123"),
            ("password2", "password123"),
        ])
        .to_request();
    test::call_service(&app, req).await;
    let code = latest_code(&db, "ann@example.com").await;

    let req = test::TestRequest::post()
        .uri("/users/signup/confirm_email/ann@example.com/")
        .set_form(&[("code", code.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/users/login/");
}

#[actix_rt::test]
async fn test_confirm_unknown_email_redirects_to_signup() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let app = test_app!(db.clone(), Arc::new(MockMailer::new()) as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/signup/confirm_email/nobody@example.com/")
        .set_form(&[("code", "123456")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/users/signup/");
}

#[actix_rt::test]
async fn test_login_to_inactive_account_resends_code() {
    let db = setup_test_database().await.expect("Failed to setup database");
    create_test_user(&db, "pending@example.com", false)
        .await
        .expect("Failed to create user");

    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/login/")
        .set_form(&[("email", "pending@example.com"), ("password", TEST_PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "/users/signup/confirm_email/pending%40example.com/"
    );

    let code = latest_code(&db, "pending@example.com").await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body_text.contains(&code));
}

#[actix_rt::test]
async fn test_login_with_bad_password_is_unauthorized() {
    let db = setup_test_database().await.expect("Failed to setup database");
    create_test_user(&db, "user@example.com", true)
        .await
        .expect("Failed to create user");
    let app = test_app!(db.clone(), Arc::new(MockMailer::new()) as Arc<dyn Mailer>);

    let req = test::TestRequest::post()
        .uri("/users/login/")
        .set_form(&[("email", "user@example.com"), ("password", "wrong password")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/users/login/")
        .set_form(&[("email", "nobody@example.com"), ("password", TEST_PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_logout_ends_session() {
    let db = setup_test_database().await.expect("Failed to setup database");
    create_test_user(&db, "user@example.com", true)
        .await
        .expect("Failed to create user");
    let app = test_app!(db.clone(), Arc::new(MockMailer::new()) as Arc<dyn Mailer>);
    let cookie = login!(app, "user@example.com", TEST_PASSWORD);

    let req = test::TestRequest::get()
        .uri("/users/logout/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_redirection());

    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == "id")
        .expect("logout did not touch the session cookie")
        .into_owned();

    let req = test::TestRequest::get()
        .uri("/board/subscription/")
        .cookie(cleared)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
