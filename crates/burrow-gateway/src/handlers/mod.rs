mod admin;
mod api;
mod health;
mod redirect;
mod session;
mod url;

pub use admin::{
    create_url_handler, delete_url_handler, get_url_handler, list_urls_handler, me_handler,
    update_url_handler,
};
pub use api::shorten_handler;
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use session::{login_handler, logout_handler};
pub use url::{create_with_generated_code, GENERATE_ATTEMPTS};
