use uuid::Uuid;

use super::payloads::User;

/// Authentication state for one logical user.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            token: None,
            user: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The stored token, if any. Empty tokens count as absent.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn sign_in(&mut self, token: String, user: Option<User>) {
        self.token = Some(token);
        self.user = user;
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_anonymous() {
        let session = Session::new();
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_empty_token_is_treated_as_absent() {
        let mut session = Session::new();
        session.sign_in(String::new(), None);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_clear_drops_token_and_user() {
        let mut session = Session::new();
        session.sign_in("T".to_string(), Some(User::default()));
        assert_eq!(session.token(), Some("T"));
        session.clear();
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(Session::new().id(), Session::new().id());
    }
}
