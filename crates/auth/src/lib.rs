//! `vault-auth`: bearer-token verification and the roles it carries.
//!
//! Decoupled from HTTP. The api crate extracts the token and asks a
//! [`JwtValidator`] who the caller is.

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use roles::Role;
