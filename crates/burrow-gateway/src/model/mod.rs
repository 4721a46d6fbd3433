mod session;
mod url;

pub use session::{LoginRequest, SessionResponse};
pub use url::{
    CreateUrlRequest, HealthResponse, ShortenResponse, UpdateUrlRequest, UrlListResponse,
    UrlResponse,
};
