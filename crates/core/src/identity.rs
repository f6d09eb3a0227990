//! Port to the external user directory. The workflow only uses it for
//! display names in notification text; nothing is enforced through it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub name: String,
    pub department: String,
    pub position: String,
}

pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, user_id: UserId) -> Option<UserIdentity>;

    /// Display name with a fallback for users the directory no longer knows.
    fn display_name(&self, user_id: UserId) -> String {
        self.resolve(user_id)
            .map(|identity| identity.name)
            .unwrap_or_else(|| format!("user {user_id}"))
    }
}

/// In-memory directory used by tests and the seed fixtures. Production
/// deployments wire the real directory service behind the same trait.
#[derive(Clone, Debug, Default)]
pub struct DirectoryIdentityProvider {
    users: HashMap<UserId, UserIdentity>,
}

impl DirectoryIdentityProvider {
    pub fn new(users: Vec<(UserId, UserIdentity)>) -> Self {
        Self { users: users.into_iter().collect() }
    }
}

impl IdentityProvider for DirectoryIdentityProvider {
    fn resolve(&self, user_id: UserId) -> Option<UserIdentity> {
        self.users.get(&user_id).cloned()
    }
}
