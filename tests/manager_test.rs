/// Integration tests for manager elevation and mass email
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use mmorpg_board::email::{Mailer, MockMailer};
use mmorpg_board::managers::{elevate_to_manager, ElevationForm, ManagerStatus};
use mmorpg_board::orm::{managers, user_groups};
use mmorpg_board::permission::Roles;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;
use std::sync::Arc;

#[actix_rt::test]
async fn test_mass_email_requires_permission() {
    let db = setup_test_database().await.expect("Failed to setup database");
    create_test_user(&db, "user@example.com", true)
        .await
        .expect("Failed to create user");

    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);
    let cookie = login!(app, "user@example.com", TEST_PASSWORD);

    let req = test::TestRequest::post()
        .uri("/board/manager/send_news/")
        .cookie(cookie)
        .set_form(&[("subject", "X"), ("text", "Y")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(mailer.sent().is_empty());
}

#[actix_rt::test]
async fn test_elevation_grants_mass_email() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let user = create_test_user(&db, "user@example.com", true)
        .await
        .expect("Failed to create user");

    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);
    let cookie = login!(app, "user@example.com", TEST_PASSWORD);

    let req = test::TestRequest::get()
        .uri("/board/manager/add/")
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["is_manager"], false);

    // Without confirmation nothing changes.
    let req = test::TestRequest::post()
        .uri("/board/manager/add/")
        .cookie(cookie.clone())
        .set_form(&[("confirm", "false")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/board/manager/add/")
        .cookie(cookie.clone())
        .set_form(&[("confirm", "true")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["is_manager"], true);
    assert_eq!(body["manager_is_added"], true);

    // A second elevation short-circuits.
    let req = test::TestRequest::post()
        .uri("/board/manager/add/")
        .cookie(cookie.clone())
        .set_form(&[("confirm", "true")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["manager_is_added"], false);

    let flags = managers::Entity::find().all(&db).await.unwrap();
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].manager_id, user.id);

    let req = test::TestRequest::get()
        .uri("/board/manager/send_news/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_elevation_with_stale_roles_is_idempotent() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let user = create_test_user(&db, "user@example.com", true)
        .await
        .expect("Failed to create user");
    // Another request added the membership after this one read its roles.
    make_manager(&db, user.id)
        .await
        .expect("Failed to add manager");

    let status = elevate_to_manager(
        &db,
        &user,
        &Roles::default(),
        &ElevationForm { confirm: true },
    )
    .await
    .expect("elevation failed");
    assert_eq!(
        status,
        ManagerStatus {
            is_manager: true,
            manager_is_added: false,
        }
    );

    assert_eq!(user_groups::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(managers::Entity::find().count(&db).await.unwrap(), 0);

    // The rolled back transaction left the connection usable.
    let other = create_test_user(&db, "other@example.com", true)
        .await
        .expect("Failed to create user");
    let status = elevate_to_manager(
        &db,
        &other,
        &Roles::default(),
        &ElevationForm { confirm: true },
    )
    .await
    .expect("elevation failed");
    assert!(status.manager_is_added);
}

#[actix_rt::test]
async fn test_mass_email_blind_copies_active_users() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let manager = create_test_user(&db, "manager@example.com", true)
        .await
        .expect("Failed to create user");
    make_manager(&db, manager.id)
        .await
        .expect("Failed to add manager");
    create_test_user(&db, "player1@example.com", true)
        .await
        .expect("Failed to create user");
    create_test_user(&db, "player2@example.com", true)
        .await
        .expect("Failed to create user");
    create_test_user(&db, "pending@example.com", false)
        .await
        .expect("Failed to create user");

    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);
    let cookie = login!(app, "manager@example.com", TEST_PASSWORD);

    let req = test::TestRequest::post()
        .uri("/board/manager/send_news/")
        .cookie(cookie)
        .set_form(&[("subject", "X"), ("text", "Y")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["recipients"], 3);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "X");
    assert_eq!(sent[0].body_text, "Y");
    assert_eq!(sent[0].to, vec!["noreply@localhost".to_string()]);

    let mut bcc = sent[0].bcc.clone();
    bcc.sort();
    assert_eq!(
        bcc,
        vec![
            "manager@example.com",
            "player1@example.com",
            "player2@example.com"
        ]
    );
}

#[actix_rt::test]
async fn test_mass_email_failure_is_a_server_error() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let manager = create_test_user(&db, "manager@example.com", true)
        .await
        .expect("Failed to create user");
    make_manager(&db, manager.id)
        .await
        .expect("Failed to add manager");

    let mailer: Arc<dyn Mailer> = Arc::new(MockMailer::failing());
    let app = test_app!(db.clone(), mailer);
    let cookie = login!(app, "manager@example.com", TEST_PASSWORD);

    let req = test::TestRequest::post()
        .uri("/board/manager/send_news/")
        .cookie(cookie)
        .set_form(&[("subject", "X"), ("text", "Y")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_rt::test]
async fn test_mass_email_validates_form() {
    let db = setup_test_database().await.expect("Failed to setup database");
    let manager = create_test_user(&db, "manager@example.com", true)
        .await
        .expect("Failed to create user");
    make_manager(&db, manager.id)
        .await
        .expect("Failed to add manager");

    let mailer = Arc::new(MockMailer::new());
    let app = test_app!(db.clone(), mailer.clone() as Arc<dyn Mailer>);
    let cookie = login!(app, "manager@example.com", TEST_PASSWORD);

    let req = test::TestRequest::post()
        .uri("/board/manager/send_news/")
        .cookie(cookie)
        .set_form(&[("subject", ""), ("text", "Y")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(mailer.sent().is_empty());
}
