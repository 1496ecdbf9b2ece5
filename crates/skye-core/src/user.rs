//! User accounts and invitation codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A registered user.
///
/// Every user has exactly one inviter. The seed account is its own inviter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID.
    pub id: UserId,

    /// Login identity, unique.
    pub email: String,

    /// bcrypt hash of the password.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name.
    pub name: String,

    /// VIP users may use the unrestricted general model.
    pub is_vip: bool,

    /// Invitation code, generated lazily on first request.
    pub invitation_code: Option<String>,

    /// Who invited this user.
    pub inviter_id: UserId,

    /// When the user registered.
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Whether this is a self-invited root account.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.inviter_id == self.id
    }
}

/// Data needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login identity.
    pub email: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Display name.
    pub name: String,
}

impl NewUser {
    /// Build the full record for an invited user.
    #[must_use]
    pub fn into_user(self, inviter_id: UserId) -> User {
        User {
            id: UserId::generate(),
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            is_vip: false,
            invitation_code: None,
            inviter_id,
            date_joined: Utc::now(),
        }
    }

    /// Build a self-invited root record.
    #[must_use]
    pub fn into_root(self, invitation_code: Option<String>) -> User {
        let id = UserId::generate();
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            is_vip: false,
            invitation_code,
            inviter_id: id,
            date_joined: Utc::now(),
        }
    }
}

/// Generate a fresh invitation code of the form `XXXX-XXXX-XXXX-XXXX`.
#[must_use]
pub fn generate_invitation_code() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!(
        "{}-{}-{}-{}",
        &hex[0..4],
        &hex[4..8],
        &hex[8..12],
        &hex[12..16]
    )
}
