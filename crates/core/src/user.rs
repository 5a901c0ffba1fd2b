//! The visitor's profile.

use serde::{Deserialize, Serialize};

use crate::address::AddressResolution;

/// Display name plus the address lookup state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    username: String,
    address: AddressResolution,
}

impl UserProfile {
    /// Maximum stored length of a display name, in characters.
    pub const MAX_NAME_LENGTH: usize = 64;

    /// Set the display name. Blank names are ignored; returns whether the
    /// name was stored.
    pub fn set_username(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.username = name.chars().take(Self::MAX_NAME_LENGTH).collect();
        true
    }

    /// The display name, if one has been set.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        (!self.username.is_empty()).then_some(self.username.as_str())
    }

    #[must_use]
    pub const fn address(&self) -> &AddressResolution {
        &self.address
    }

    pub const fn address_mut(&mut self) -> &mut AddressResolution {
        &mut self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_defaults_to_none() {
        assert!(UserProfile::default().username().is_none());
    }

    #[test]
    fn test_set_username_trims() {
        let mut user = UserProfile::default();
        assert!(user.set_username("  Jonas "));
        assert_eq!(user.username(), Some("Jonas"));
    }

    #[test]
    fn test_blank_username_is_ignored() {
        let mut user = UserProfile::default();
        user.set_username("Jonas");
        assert!(!user.set_username("   "));
        assert_eq!(user.username(), Some("Jonas"));
    }

    #[test]
    fn test_username_is_capped() {
        let mut user = UserProfile::default();
        user.set_username(&"x".repeat(200));
        assert_eq!(
            user.username().map(str::len),
            Some(UserProfile::MAX_NAME_LENGTH)
        );
    }
}
