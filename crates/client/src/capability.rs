//! Role-gated UI decisions.
//!
//! The service is the authority on what a user may do. The client only uses
//! these checks to decide which dashboards, links, and delete controls to
//! render. Nothing here blocks a request.

use std::collections::HashSet;

use jwt_pizza_core::{FranchiseId, Roles};

use crate::session::Session;

/// Something the UI may offer to the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Admin dashboard: every franchise, every store, every user.
    AdminDashboard,
    /// Franchise dashboard for the user's own franchises.
    FranchiseDashboard,
    /// Diner dashboard with profile and order history.
    DinerDashboard,
    /// Create and close franchises.
    ManageFranchises,
    /// Create and close the stores of one franchise.
    ManageStores(FranchiseId),
    /// List users.
    ManageUsers,
    /// The delete control next to each user.
    DeleteUser,
    /// Submit an order from the cart.
    PlaceOrder,
}

/// Everything the current user may be offered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    granted: HashSet<Capability>,
    admin: bool,
}

impl CapabilitySet {
    /// Derive capabilities from a role list.
    #[must_use]
    pub fn from_roles(roles: &Roles) -> Self {
        let mut granted = HashSet::from([Capability::DinerDashboard, Capability::PlaceOrder]);

        if roles.is_franchisee() {
            granted.insert(Capability::FranchiseDashboard);
        }
        granted.extend(roles.franchise_ids().map(Capability::ManageStores));

        let admin = roles.is_admin();
        if admin {
            granted.extend([
                Capability::AdminDashboard,
                Capability::ManageFranchises,
                Capability::ManageUsers,
                Capability::DeleteUser,
            ]);
        }

        Self { granted, admin }
    }

    /// Whether the capability should be offered.
    ///
    /// Admins may manage the stores of any franchise.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageStores(_) if self.admin => true,
            other => self.granted.contains(&other),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

/// Capabilities of whoever holds the session. Logged out means none.
#[must_use]
pub fn capabilities(session: &Session) -> CapabilitySet {
    if !session.is_logged_in() {
        return CapabilitySet::default();
    }
    session
        .roles()
        .map(CapabilitySet::from_roles)
        .unwrap_or_default()
}

/// A header or footer link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavItem {
    Order,
    /// Franchise dashboard for franchisees, the franchise pitch otherwise.
    Franchise { dashboard: bool },
    Admin,
    Login,
    Register,
    Logout,
    /// Avatar link to the diner dashboard, labelled with the user's initials.
    Profile { initials: String },
}

impl NavItem {
    /// Link text as rendered.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Order => "Order",
            Self::Franchise { .. } => "Franchise",
            Self::Admin => "Admin",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Logout => "Logout",
            Self::Profile { initials } => initials,
        }
    }
}

/// Links to render for the session, in display order.
#[must_use]
pub fn navigation(session: &Session) -> Vec<NavItem> {
    let caps = capabilities(session);
    let mut items = vec![
        NavItem::Order,
        NavItem::Franchise {
            dashboard: caps.allows(Capability::FranchiseDashboard),
        },
    ];

    if caps.allows(Capability::AdminDashboard) {
        items.push(NavItem::Admin);
    }

    match session.user() {
        Some(user) if session.is_logged_in() => {
            items.push(NavItem::Logout);
            items.push(NavItem::Profile {
                initials: user.initials(),
            });
        }
        _ => {
            items.push(NavItem::Login);
            items.push(NavItem::Register);
        }
    }

    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jwt_pizza_core::{Email, RoleGrant, RoleKind, User, UserId};

    use super::*;
    use crate::session::AuthToken;

    fn session_with(name: &str, grants: Vec<RoleGrant>) -> Session {
        let mut session = Session::new();
        session.establish(
            User {
                id: UserId::new(1),
                name: name.to_string(),
                email: Email::parse("x@jwt.com").unwrap(),
                roles: Roles::new(grants),
            },
            AuthToken::new("token"),
        );
        session
    }

    #[test]
    fn test_logged_out_has_no_capabilities() {
        let session = Session::new();
        let caps = capabilities(&session);
        assert!(caps.is_empty());
        assert!(!caps.allows(Capability::PlaceOrder));
    }

    #[test]
    fn test_diner() {
        let caps = capabilities(&session_with("Kai Chen", vec![RoleGrant::new(RoleKind::Diner)]));
        assert!(caps.allows(Capability::DinerDashboard));
        assert!(caps.allows(Capability::PlaceOrder));
        assert!(!caps.allows(Capability::FranchiseDashboard));
        assert!(!caps.allows(Capability::AdminDashboard));
        assert!(!caps.allows(Capability::DeleteUser));
    }

    #[test]
    fn test_franchisee_is_scoped() {
        let caps = capabilities(&session_with(
            "Fran Chise",
            vec![RoleGrant::franchisee(FranchiseId::new(2))],
        ));
        assert!(caps.allows(Capability::FranchiseDashboard));
        assert!(caps.allows(Capability::ManageStores(FranchiseId::new(2))));
        assert!(!caps.allows(Capability::ManageStores(FranchiseId::new(3))));
        assert!(!caps.allows(Capability::ManageFranchises));
    }

    #[test]
    fn test_admin_manages_every_store() {
        let caps = capabilities(&session_with("Ad Min", vec![RoleGrant::new(RoleKind::Admin)]));
        assert!(caps.allows(Capability::AdminDashboard));
        assert!(caps.allows(Capability::ManageFranchises));
        assert!(caps.allows(Capability::ManageUsers));
        assert!(caps.allows(Capability::DeleteUser));
        assert!(caps.allows(Capability::ManageStores(FranchiseId::new(99))));
        assert!(!caps.allows(Capability::FranchiseDashboard));
    }

    #[test]
    fn test_navigation_logged_out() {
        let labels: Vec<String> = navigation(&Session::new())
            .iter()
            .map(|item| item.label().to_string())
            .collect();
        assert_eq!(labels, ["Order", "Franchise", "Login", "Register"]);
    }

    #[test]
    fn test_navigation_admin() {
        let nav = navigation(&session_with("Ad Min", vec![RoleGrant::new(RoleKind::Admin)]));
        assert_eq!(
            nav,
            vec![
                NavItem::Order,
                NavItem::Franchise { dashboard: false },
                NavItem::Admin,
                NavItem::Logout,
                NavItem::Profile {
                    initials: "AM".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_navigation_franchisee_links_dashboard() {
        let nav = navigation(&session_with(
            "Fran Chise",
            vec![RoleGrant::franchisee(FranchiseId::new(2))],
        ));
        assert!(nav.contains(&NavItem::Franchise { dashboard: true }));
        assert!(!nav.contains(&NavItem::Admin));
        assert_eq!(nav.last().unwrap().label(), "FC");
    }
}
