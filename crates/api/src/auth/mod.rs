//! Admin authentication: passwords, tokens, cookies and the session middleware

pub mod cookies;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use cookies::{CookiePolicy, ACCESS_COOKIE, REFRESH_COOKIE};
pub use credentials::{CredentialError, CredentialStore};
pub use jwt::{AccessClaims, RefreshClaims, TokenError, TokenPair, TokenService, TokenType};
pub use middleware::{require_admin, AuthError, CurrentAdmin};
pub use password::{hash_password, validate_password_length, verify_password, PasswordError};
