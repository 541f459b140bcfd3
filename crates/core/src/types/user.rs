//! Pizza service users.
//!
//! Passwords are write-only from the client's point of view. They travel in
//! request bodies built by the client crate and are never part of [`User`].

use serde::{Deserialize, Serialize};

use crate::{Email, RoleKind, Roles, UserId};

/// A user as returned by the pizza service.
///
/// Identity is the id. The email is a mutable key whose uniqueness the
/// service enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub roles: Roles,
}

impl User {
    /// Avatar label: the first letter of each word of the name, upper-cased.
    ///
    /// "Kai Chen" gives "KC". An empty name gives "?".
    #[must_use]
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect();

        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }

    /// Role names joined for display, e.g. "diner, admin".
    #[must_use]
    pub fn role_summary(&self) -> String {
        let names: Vec<String> = self
            .roles
            .iter()
            .map(|grant| match (grant.role, grant.object_id) {
                (RoleKind::Franchisee, Some(id)) => format!("franchisee on {id}"),
                (role, _) => role.to_string(),
            })
            .collect();
        names.join(", ")
    }
}

/// One page of users from the admin listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    /// Whether another page follows.
    #[serde(default)]
    pub more: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            id: UserId::new(3),
            name: name.to_string(),
            email: Email::parse("d@jwt.com").unwrap(),
            roles: Roles::default(),
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(user("Kai Chen").initials(), "KC");
        assert_eq!(user("fran  chise").initials(), "FC");
        assert_eq!(user("pizza diner extra").initials(), "PDE");
        assert_eq!(user("  ").initials(), "?");
    }

    #[test]
    fn test_deserialize_ignores_password_and_accepts_string_id() {
        let json = r#"{
            "id": "4",
            "name": "Fran Chise",
            "email": "f@jwt.com",
            "password": "a",
            "roles": [{"role": "franchisee", "objectId": "2"}]
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::new(4));
        assert_eq!(user.role_summary(), "franchisee on 2");
        assert!(!serde_json::to_string(&user).unwrap().contains("password"));
    }

    #[test]
    fn test_user_list_defaults_more() {
        let list: UserList = serde_json::from_str(r#"{"users": []}"#).unwrap();
        assert!(!list.more);
    }
}
