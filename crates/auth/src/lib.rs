//! `stashpad-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: password
//! hashing, token issue/verify, and the ownership policy are all functions of
//! their inputs. Credential lookup and resource loading live with the callers.

pub mod claims;
pub mod ownership;
pub mod password;
pub mod token;

pub use claims::{Claims, TokenValidationError, validate_claims};
pub use ownership::{Operation, OwnershipError, ReadScope, authorize};
pub use password::{Argon2PasswordHasher, PasswordHashError, PasswordHasher};
pub use token::{AuthError, Hs256TokenService, TokenConfig, TokenIssueError, TokenService};
