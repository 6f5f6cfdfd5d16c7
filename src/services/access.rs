use uuid::Uuid;

use crate::database::models::user::ROLE_ADMIN;

/// Identity on whose behalf a store operation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl Requester {
    pub fn new(id: Uuid, username: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id,
            username: username.into(),
            roles,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }

    /// Owner or admin
    pub fn may_write(&self, owner_id: Uuid) -> bool {
        self.id == owner_id || self.is_admin()
    }
}
