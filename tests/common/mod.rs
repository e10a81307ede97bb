#![allow(dead_code)]
#![allow(unused_macros)]

pub mod database;
pub mod fixtures;

pub use database::*;
pub use fixtures::*;

/// Builds the full app around `$db` and `$mailer` (an `Arc<dyn Mailer>`).
macro_rules! test_app {
    ($db:expr, $mailer:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($db))
                .app_data(actix_web::web::Data::new($mailer))
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::from(&[7u8; 64]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(mmorpg_board::web::configure),
        )
        .await
    };
}

/// Logs in through the login form and returns the session cookie.
macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/users/login/")
            .set_form(&[("email", $email), ("password", $password)])
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::SEE_OTHER,
            "login failed"
        );
        resp.response()
            .cookies()
            .find(|c| c.name() == "id")
            .expect("login did not set a session cookie")
            .into_owned()
    }};
}

/// Location header of a redirect response.
pub fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
