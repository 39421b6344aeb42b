//! Request authentication
//!
//! Callers present `Authorization: Bearer <jwt>`. The token's subject is the
//! user id every ownership check compares against.

pub mod bearer;
pub mod jwt;

pub use bearer::{authenticate, bearer_token};
pub use jwt::{AccessClaims, IdentityVerifier, JwtVerifier};
