use serde::Deserialize;

use crate::view::SortOption;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters of the user-management page.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: SortOption,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
}

// HTML checkboxes post "on" when checked and nothing otherwise, so each
// flag arrives as an optional string rather than a bool.
#[derive(Debug, Deserialize)]
pub struct PermissionsForm {
    pub is_admin: Option<String>,
    pub can_export_data: Option<String>,
    pub can_import_data: Option<String>,
}
