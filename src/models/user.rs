use chrono::Local;
use serde::{Deserialize, Serialize};

/// One managed account: identity, profile and permission flags.
///
/// Serialized with camelCase field names so the persisted JSON layout
/// matches the `user-management-data` blob format. `password_hash` is a
/// bcrypt hash and must never be echoed back to clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub is_admin: bool,
    pub can_export_data: bool,
    pub can_import_data: bool,
    pub last_active: String,
    pub date_added: String,
}

impl User {
    /// Fallback initials shown when a record has no avatar image.
    pub fn initials(&self) -> String {
        self.name.chars().take(2).collect::<String>().to_uppercase()
    }
}

/// Attributes supplied by the add-user form. The store assigns `id` and
/// stamps `last_active`/`date_added` itself.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub is_admin: bool,
    pub can_export_data: bool,
    pub can_import_data: bool,
}

/// Field-level update payload: only `Some` fields are replaced on the
/// matching record. `date_added` is deliberately absent, it is set once at
/// creation and never changes.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub avatar: Option<String>,
    pub is_admin: Option<bool>,
    pub can_export_data: Option<bool>,
    pub can_import_data: Option<bool>,
    pub last_active: Option<String>,
}

/// Today's date in the table's display format, e.g. "Mar 4, 2024".
pub fn display_date_today() -> String {
    Local::now().format("%b %-d, %Y").to_string()
}
