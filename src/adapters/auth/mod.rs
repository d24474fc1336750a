//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `jwt` - HS256 campus tokens
//! - `mock` - Test implementation that needs no signing key

mod jwt;
mod mock;

pub use jwt::{CampusClaims, JwtSessionValidator, JwtValidatorConfig};
pub use mock::MockSessionValidator;
