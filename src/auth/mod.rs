// Tokens are issued by the hosted identity provider; this service only
// verifies them.
pub mod jwt;

pub use jwt::{verify_jwt, JwtSettings};
