// handlers/auth/mod.rs - token issue and caller identity

pub mod token; // POST /auth/token
pub mod whoami; // GET /auth/whoami

pub use token::{token_post, TokenRequest, TokenResponse};
pub use whoami::{whoami_get, WhoamiResponse};
