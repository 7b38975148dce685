//! Authentication adapters.
//!
//! Implementations of the `TokenVerifier` port:
//!
//! - `jwt` - Shared-secret JWT verification for production
//! - `mock` - Test implementation that maps opaque tokens to users

mod jwt;
mod mock;

pub use jwt::JwtTokenVerifier;
pub use mock::MockTokenVerifier;
