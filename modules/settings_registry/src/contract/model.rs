//! Contract models for the settings registry
//!
//! Scope flags and the identity/location types used to select a backing store.
//! NO serde derives - these are pure domain models.

use std::fmt;

bitflags::bitflags! {
    /// Scope a setting persists under.
    ///
    /// Only the `USER` and `APPLICATION` bits discriminate between stores.
    /// `ORGANIZATION` and `SYSTEM` are zero-valued aliases, so a setting
    /// declared with either of them lands in the organization-wide,
    /// system-visible store.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Scope: u8 {
        /// Per-user store (otherwise system-wide)
        const USER = 0x1;
        /// Per-application store (otherwise organization-wide)
        const APPLICATION = 0x2;
        /// Organization-wide store
        const ORGANIZATION = 0x0;
        /// System-wide store
        const SYSTEM = 0x0;
        /// Per-user, per-application store
        const DEFAULT = Self::USER.bits() | Self::APPLICATION.bits();
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Scope {
    /// Visibility of the store selected by this scope
    pub fn visibility(self) -> Visibility {
        if self.intersects(Self::USER) {
            Visibility::User
        } else {
            Visibility::System
        }
    }

    /// Whether the store is specific to the application
    pub fn is_application_specific(self) -> bool {
        self.intersects(Self::APPLICATION)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = match self.visibility() {
            Visibility::User => "user",
            Visibility::System => "system",
        };
        let what = if self.is_application_specific() {
            "application"
        } else {
            "organization"
        };
        write!(f, "{}/{}", who, what)
    }
}

/// Whether a store is visible to the current user only or system-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    User,
    System,
}

/// Organization and application names used to locate stores
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppIdentity {
    /// Organization name
    pub organization: String,
    /// Application name
    pub application: String,
}

impl AppIdentity {
    pub fn new(organization: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            application: application.into(),
        }
    }
}

/// Physical store selection resolved from a scope and an identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreLocation {
    pub visibility: Visibility,
    pub organization: String,
    /// `None` for organization-wide stores
    pub application: Option<String>,
}

impl StoreLocation {
    /// Resolve the store location for `scope`
    pub fn resolve(scope: Scope, identity: &AppIdentity) -> Self {
        Self {
            visibility: scope.visibility(),
            organization: identity.organization.clone(),
            application: scope
                .is_application_specific()
                .then(|| identity.application.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scope_is_user_application() {
        assert_eq!(Scope::default(), Scope::USER | Scope::APPLICATION);
        assert_eq!(Scope::DEFAULT.bits(), 0x3);
    }

    #[test]
    fn test_zero_valued_aliases_collapse() {
        assert_eq!(Scope::ORGANIZATION, Scope::SYSTEM);
        assert_eq!(Scope::ORGANIZATION, Scope::empty());
        assert_eq!(Scope::USER | Scope::ORGANIZATION, Scope::USER);
        assert_eq!(Scope::SYSTEM.visibility(), Visibility::System);
        assert!(!Scope::ORGANIZATION.is_application_specific());
    }

    #[test]
    fn test_resolve_location() {
        let identity = AppIdentity::new("Kitware", "Viewer");

        let loc = StoreLocation::resolve(Scope::DEFAULT, &identity);
        assert_eq!(loc.visibility, Visibility::User);
        assert_eq!(loc.application.as_deref(), Some("Viewer"));

        let loc = StoreLocation::resolve(Scope::USER, &identity);
        assert_eq!(loc.visibility, Visibility::User);
        assert_eq!(loc.application, None);

        let loc = StoreLocation::resolve(Scope::APPLICATION, &identity);
        assert_eq!(loc.visibility, Visibility::System);
        assert_eq!(loc.application.as_deref(), Some("Viewer"));

        let loc = StoreLocation::resolve(Scope::SYSTEM, &identity);
        assert_eq!(loc.visibility, Visibility::System);
        assert_eq!(loc.organization, "Kitware");
        assert_eq!(loc.application, None);
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::DEFAULT.to_string(), "user/application");
        assert_eq!(Scope::SYSTEM.to_string(), "system/organization");
    }
}
