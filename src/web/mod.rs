use actix_web::http::header;
use actix_web::HttpResponse;

pub mod account;
pub mod ad;
pub mod index;
pub mod login;
pub mod logout;
pub mod manager;
pub mod response;
pub mod subscription;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    index::configure(conf);
    ad::configure(conf);
    response::configure(conf);
    subscription::configure(conf);
    manager::configure(conf);
    account::configure(conf);
    login::configure(conf);
    logout::configure(conf);
}

/// `303 See Other` to `location`, the answer to a successful form POST.
pub fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location.as_ref()))
        .finish()
}
