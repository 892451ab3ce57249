use quiz_core::model::UserId;

/// Who is practicing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    signed_in: bool,
}

impl Identity {
    #[must_use]
    pub fn guest() -> Self {
        Self {
            user_id: UserId::guest(),
            signed_in: false,
        }
    }

    #[must_use]
    pub fn signed_in(user_id: UserId) -> Self {
        Self {
            user_id,
            signed_in: true,
        }
    }

    /// Guest for the shared guest id, signed in otherwise.
    #[must_use]
    pub fn from_user_id(user_id: UserId) -> Self {
        if user_id.is_guest() {
            Self::guest()
        } else {
            Self::signed_in(user_id)
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::guest()
    }
}

/// Source of the current identity, injected instead of read from ambient state.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Identity;
}

impl IdentityProvider for Identity {
    fn current(&self) -> Identity {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_id_is_never_signed_in() {
        assert!(!Identity::from_user_id(UserId::guest()).is_signed_in());
        assert!(Identity::from_user_id(UserId::new("ana")).is_signed_in());
        assert_eq!(Identity::default(), Identity::guest());
    }
}
