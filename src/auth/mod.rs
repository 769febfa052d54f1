pub mod credentials;
pub mod password;
pub mod session;
pub mod token;

pub use credentials::{authenticate_user, signup_user, AdminCredentials};
pub use password::{hash_password, verify_password};
pub use session::{
    Session, SessionBackend, SessionManager, ADMIN_SESSION_COOKIE, USER_SESSION_COOKIE,
};
pub use token::{SessionClaims, TokenCodec};
