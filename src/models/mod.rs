mod user;
mod forms;

pub use user::{display_date_today, NewUser, User, UserUpdate};
pub use forms::{ListParams, LoginForm, PermissionsForm, ProfileForm};
