use stashpad_core::UserId;

/// Authenticated identity for a request.
///
/// Derived from verified token claims; must be present for all protected
/// routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user_id: UserId,
    username: String,
}

impl CurrentUser {
    pub fn new(user_id: UserId, username: String) -> Self {
        Self { user_id, username }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
