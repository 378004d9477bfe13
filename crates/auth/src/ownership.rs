use thiserror::Error;

use stashpad_core::UserId;

/// Operation attempted against an owned resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Read,
    Update,
    Delete,
}

/// Per-resource-kind read visibility.
///
/// The two record kinds deliberately differ: items are private to their
/// owner, posts are readable by any authenticated user. Making the scope an
/// explicit parameter keeps that divergence auditable at the call site.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadScope {
    /// Reads and listings are restricted to the owner.
    OwnerOnly,
    /// Any authenticated identity may read; only mutation is owner-checked.
    Public,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("forbidden: identity does not own the resource")]
    Forbidden,
}

/// Decide whether `identity` may perform `operation` on a resource owned by
/// `owner`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Callers must resolve NotFound before invoking this: the decision assumes
/// the resource exists. Ownership comparison is identifier equality only;
/// there is no role-based override.
pub fn authorize(
    identity: UserId,
    owner: UserId,
    operation: Operation,
    scope: ReadScope,
) -> Result<(), OwnershipError> {
    match operation {
        Operation::Read => match scope {
            ReadScope::Public => Ok(()),
            ReadScope::OwnerOnly if identity == owner => Ok(()),
            ReadScope::OwnerOnly => Err(OwnershipError::Forbidden),
        },
        Operation::Update | Operation::Delete => {
            if identity == owner {
                Ok(())
            } else {
                Err(OwnershipError::Forbidden)
            }
        }
    }
}
