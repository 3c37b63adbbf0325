mod auth;
mod users;
mod profile;

pub use auth::{handle_login, handle_logout, serve_login_page, SESSION_USER_KEY};
pub use users::{add_user, archive_user, delete_user, serve_users_page};
pub use profile::{serve_profile_page, update_permissions, update_profile, upload_avatar};
