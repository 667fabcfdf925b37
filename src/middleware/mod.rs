pub mod auth;
pub mod clock;

pub use auth::{auth_middleware, AuthUser};
pub use clock::ClientClock;
