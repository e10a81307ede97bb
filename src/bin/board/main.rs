use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use mmorpg_board::app_config;
use mmorpg_board::db::{connect, init_db};
use mmorpg_board::email::{build_mailer, Mailer};
use mmorpg_board::mailing::spawn_weekly_mailing;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    app_config::init();
    let config = app_config::get_config();

    let db = connect(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to the database.");
    init_db(&db)
        .await
        .expect("Failed to create the database schema.");

    let mailer: Arc<dyn Mailer> = build_mailer(&config.email).expect("Failed to build the mailer.");

    if config.mailing.enabled {
        log::info!(
            "Weekly mailing every {} hours",
            config.mailing.interval_hours
        );
        spawn_weekly_mailing(
            db.clone(),
            mailer.clone(),
            config.mailing.clone(),
            config.site.base_url.clone(),
        );
    }

    let secret_key = if config.session.secret_key.len() >= 64 {
        Key::from(config.session.secret_key.as_bytes())
    } else {
        let random_string: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(128)
            .map(char::from)
            .collect();
        log::warn!("BOARD_SESSION__SECRET_KEY is missing or shorter than 64 bytes.\r\nThis means the key used for signing session cookies will invalidate every time the application is restarted.\r\n\r\nNeed a key? How about:\r\n{}", random_string);
        Key::from(random_string.as_bytes())
    };
    let cookie_secure = config.session.cookie_secure;
    let bind = (config.server.bind_address.clone(), config.server.port);

    HttpServer::new(move || {
        let mailer_data: Data<Arc<dyn Mailer>> = Data::new(mailer.clone());

        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(db.clone()))
            .app_data(mailer_data)
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(cookie_secure)
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %T"))
            .configure(mmorpg_board::web::configure)
    })
    .bind(bind)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
