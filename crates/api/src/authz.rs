//! Route-side ownership guard.
//!
//! Maps the pure ownership decision onto HTTP responses. A denied read of an
//! owner-scoped record surfaces as 404 so that non-owners cannot probe for
//! record existence; a denied mutation surfaces as 403.

use axum::http::StatusCode;

use stashpad_auth::{Operation, OwnershipError, ReadScope, authorize};
use stashpad_core::UserId;

use crate::app::errors;
use crate::context::CurrentUser;

/// Check whether the current user may perform `operation` on a record owned
/// by `owner`. Callers must resolve NotFound before calling this.
pub fn check_access(
    current: &CurrentUser,
    owner: UserId,
    operation: Operation,
    scope: ReadScope,
) -> Result<(), axum::response::Response> {
    match authorize(current.user_id(), owner, operation, scope) {
        Ok(()) => Ok(()),
        Err(OwnershipError::Forbidden) => match operation {
            Operation::Read => Err(errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                "not found",
            )),
            Operation::Update | Operation::Delete => Err(errors::json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                "you do not own this resource",
            )),
        },
    }
}
