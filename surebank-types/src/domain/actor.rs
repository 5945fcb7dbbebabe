//! The authenticated subject on whose behalf an operation runs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Acting subject and its roles, as resolved by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Subject id (the teller's user id). Empty for anonymous callers.
    pub subject: String,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(subject: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            subject: subject.into(),
            roles,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            subject: String::new(),
            roles: Vec::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.subject.trim().is_empty()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_actor() {
        let actor = Actor::anonymous();
        assert!(!actor.is_authenticated());
        assert!(!actor.has_role(Role::Admin));
    }

    #[test]
    fn test_roles() {
        let actor = Actor::new("rep-1", vec![Role::User, Role::Admin]);
        assert!(actor.is_authenticated());
        assert!(actor.has_role(Role::Admin));
        assert_eq!(" Admin ".parse::<Role>(), Ok(Role::Admin));
    }
}
