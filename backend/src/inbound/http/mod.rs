//! HTTP inbound adapter exposing the record creation endpoints.

pub mod error;
pub mod records;
pub mod schemas;
pub mod state;
pub mod validation;

use actix_web::web;

/// Register the record endpoints and the JSON extractor configuration.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use dualwrite::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .service(records::create_user)
        .service(records::create_product);
}
