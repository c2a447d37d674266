pub(crate) mod extractors;
pub mod jwt;
pub mod password;
pub mod validator;

pub use extractors::Credential;
pub use validator::{Scope, StaticTokenValidator, TokenValidator};
