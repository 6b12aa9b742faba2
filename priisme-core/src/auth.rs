use uuid::Uuid;

/// The signed-in user, as established by the surrounding platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Authentication state handed to the analysis session explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    user: Option<AuthUser>,
}

impl AuthContext {
    /// Path the client is sent to when a signed-in user is required.
    pub const SIGN_IN_PATH: &'static str = "/auth";

    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn signed_in(user: AuthUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn for_user_id(id: Option<Uuid>) -> Self {
        Self {
            user: id.map(|id| AuthUser { id }),
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user_id_without_id_is_anonymous() {
        let auth = AuthContext::for_user_id(None);
        assert!(!auth.is_authenticated());
        assert_eq!(auth, AuthContext::anonymous());
    }

    #[test]
    fn test_for_user_id_signs_in_that_user() {
        let id = Uuid::new_v4();
        let auth = AuthContext::for_user_id(Some(id));
        assert!(auth.is_authenticated());
        assert_eq!(auth.user(), Some(&AuthUser { id }));
        assert_eq!(auth, AuthContext::signed_in(AuthUser { id }));
    }
}
