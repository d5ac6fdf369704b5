use std::fmt;

use serde::{Deserialize, Serialize};

/// Role carried by an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Artist,
    Admin,
    Gallery,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Customer => "customer",
            Role::Artist => "artist",
            Role::Admin => "admin",
            Role::Gallery => "gallery",
        };
        f.write_str(name)
    }
}

/// Represents the user behind an authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn new(id: u64, email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    /// Two identities with the same key own the same remote cart.
    pub fn key(&self) -> (u64, Role) {
        (self.id, self.role)
    }
}

/// Who is using the storefront right now.
#[derive(Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Guest,
    Authenticated { identity: Identity, token: String },
}

impl Session {
    pub fn authenticated(identity: Identity, token: impl Into<String>) -> Self {
        Session::Authenticated {
            identity,
            token: token.into(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Guest => None,
            Session::Authenticated { identity, .. } => Some(identity),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Guest => None,
            Session::Authenticated { token, .. } => Some(token),
        }
    }

    /// Bearer token of a customer session; cart sync and checkout need one.
    pub fn customer_token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { identity, token } if identity.role == Role::Customer => {
                Some(token)
            }
            _ => None,
        }
    }

    pub fn is_customer(&self) -> bool {
        self.customer_token().is_some()
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Guest => f.write_str("Guest"),
            Session::Authenticated { identity, .. } => f
                .debug_struct("Authenticated")
                .field("identity", identity)
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}
