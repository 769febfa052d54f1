pub mod json;
pub mod session_user;

pub use json::Json;
pub use session_user::{require_login_or_redirect, AdminUser, CurrentUser};
