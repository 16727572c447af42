use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Login input as asserted by the identity provider callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
}

impl From<models::user::Model> for AuthUser {
    fn from(u: models::user::Model) -> Self {
        Self { id: u.id, username: u.username }
    }
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
    /// Whether this login created the user.
    pub created: bool,
}

impl AuthSession {
    pub fn greeting(&self) -> String {
        if self.created {
            format!("Logged in as new user {}", self.user.username)
        } else {
            format!("Logged in as returning user {}", self.user.username)
        }
    }
}

/// Who is making the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
    #[default]
    Guest,
    User(AuthUser),
}

impl Actor {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Actor::Guest => None,
            Actor::User(u) => Some(u),
        }
    }

    /// Gate for every mutating or detail-exposing operation.
    pub fn require_user(&self) -> Result<&AuthUser, ServiceError> {
        self.user().ok_or(ServiceError::Forbidden)
    }
}
