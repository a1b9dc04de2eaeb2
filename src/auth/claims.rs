use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who the session belongs to; decides route access and whether `/log` persists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Profile fields embedded in a user token so pages render without a lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: String,
}

/// JWT payload stored in the `token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>, // only for Role::User
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}
