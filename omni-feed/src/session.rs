//! Operator session injected into the REST client and the feed service.

use tracing::warn;

const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    token: Option<String>,
    operator: Operator,
}

impl Session {
    pub fn new(token: Option<String>, operator: Operator) -> Self {
        if token.is_none() {
            warn!(operator = %operator.name, "No API token configured, requests will be unauthenticated");
        }
        Self { token, operator }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Only admins may reply to customers.
    pub fn is_admin(&self) -> bool {
        self.operator.role == ADMIN_ROLE
    }

    /// Value for the `Authorization` header, if a token is present.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator(role: &str) -> Operator {
        Operator {
            name: "Laura".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_admin_role() {
        assert!(Session::new(None, operator("admin")).is_admin());
        assert!(!Session::new(None, operator("agent")).is_admin());
    }

    #[test]
    fn test_bearer_header() {
        let session = Session::new(Some("abc".to_string()), operator("agent"));
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc"));
        assert!(Session::new(None, operator("agent")).bearer().is_none());
    }
}
