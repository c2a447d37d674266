use subtle::ConstantTimeEq;

/// What a validated credential is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The privileged root identity: may update and delete any user.
    Root,
}

/// Resolves a presented credential to the scope it grants.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, credential: &str) -> Option<Scope>;
}

/// Accepts exactly one pre-shared root token.
pub struct StaticTokenValidator {
    token: String,
}

impl StaticTokenValidator {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(&self, credential: &str) -> Option<Scope> {
        let expected = self.token.as_bytes();
        if expected.is_empty() {
            return None;
        }
        bool::from(expected.ct_eq(credential.as_bytes())).then_some(Scope::Root)
    }
}
