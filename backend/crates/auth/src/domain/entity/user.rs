//! User Summary Entity
//!
//! The slice of the user profile the access-control boundary needs. The
//! full profile is owned by the identity provider.

use serde::{Deserialize, Serialize};

use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: UserRole,
}

impl UserSummary {
    #[inline]
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }
}
