use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use bcrypt::{hash, DEFAULT_COST};
use std::{fs, io::Write};
use tower_sessions::Session;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::handlers::auth::SESSION_USER_KEY;
use crate::models::{ListParams, NewUser, User};
use crate::store::UserStore;
use crate::view::{build_view, PageView, SortOption};

// Mirrors the accept list of the original file picker.
const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub async fn serve_users_page(
    State((store, config)): State<(UserStore, Config)>,
    session: Session,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    tracing::info!("Rendering user management page");

    let current = session
        .get::<User>(SESSION_USER_KEY)
        .await
        .map_err(|e| AppError::Auth(format!("Session error: {}", e)))?
        .ok_or_else(|| AppError::Auth("Not authenticated".into()))?;

    let snapshot = store.snapshot().await;
    let view = build_view(
        snapshot,
        &params.q,
        params.sort,
        params.page,
        config.view.page_size,
    );

    tracing::debug!(
        "Derived view: {} of {} record(s), page {} of {}",
        view.users.len(),
        view.total_count,
        view.page,
        view.total_pages
    );

    let template = fs::read_to_string("templates/users.html").map_err(|e| {
        tracing::error!("Failed to read users template: {}", e);
        AppError::File(e)
    })?;

    let rows_html = if view.users.is_empty() {
        r#"<tr><td colspan="6" class="empty-state">
            <p>No users found.</p>
            <p class="hint">Try adjusting your search or filters.</p>
        </td></tr>"#
            .to_string()
    } else {
        view.users
            .iter()
            .map(render_user_row)
            .collect::<Vec<_>>()
            .join("\n")
    };

    let user_word = if view.total_count == 1 { "user" } else { "users" };

    let html = template
        .replace("{{rows}}", &rows_html)
        .replace("{{total_count}}", &view.total_count.to_string())
        .replace("{{user_word}}", user_word)
        .replace("{{query}}", &params.q)
        .replace("{{sort_label}}", params.sort.label())
        .replace("{{sort}}", params.sort.as_str())
        .replace("{{sort_menu}}", &render_sort_menu(&params.q, params.sort))
        .replace("{{page}}", &view.page.to_string())
        .replace("{{total_pages}}", &view.total_pages.to_string())
        .replace("{{pagination}}", &render_pagination(&params.q, params.sort, &view))
        .replace("{{current_name}}", &current.name)
        .replace("{{current_email}}", &current.email);

    tracing::info!("Successfully rendered user management page");
    Ok(Html(html).into_response())
}

pub async fn add_user(
    State((store, config)): State<(UserStore, Config)>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut name = String::new();
    let mut email = String::new();
    let mut password = String::new();
    let mut avatar = String::new();
    let mut is_admin = false;
    let mut can_export_data = false;
    let mut can_import_data = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to get next field from multipart form: {}", e);
        AppError::Upload(format!("Failed to process form field: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "name" => name = read_text_field(field).await?,
            "email" => email = read_text_field(field).await?,
            "password" => password = read_text_field(field).await?,
            "is_admin" => is_admin = read_checkbox_field(field).await?,
            "can_export_data" => can_export_data = read_checkbox_field(field).await?,
            "can_import_data" => can_import_data = read_checkbox_field(field).await?,
            "avatar" => avatar = save_avatar_file(field, &config).await?,
            field_name => {
                tracing::warn!("Unexpected form field: {}", field_name);
            }
        }
    }

    let password_hash = hash(password.as_bytes(), DEFAULT_COST)
        .map_err(|e| AppError::Upload(format!("Failed to hash password: {}", e)))?;

    let created = store
        .add(NewUser {
            name,
            email,
            password_hash,
            avatar,
            is_admin,
            can_export_data,
            can_import_data,
        })
        .await;

    tracing::info!("Added user {} ({})", created.name, created.id);
    Ok(Redirect::to("/users").into_response())
}

pub async fn delete_user(
    State((store, _)): State<(UserStore, Config)>,
    Path(user_id): Path<String>,
) -> AppResult<Response> {
    tracing::info!("Deleting user {}", user_id);
    store.delete(&user_id).await;
    Ok(Redirect::to("/users").into_response())
}

// Archiving currently removes the record, same as delete.
pub async fn archive_user(
    State((store, _)): State<(UserStore, Config)>,
    Path(user_id): Path<String>,
) -> AppResult<Response> {
    tracing::info!("Archiving user {}", user_id);
    store.delete(&user_id).await;
    Ok(Redirect::to("/users").into_response())
}

fn render_user_row(user: &User) -> String {
    let avatar_html = if user.avatar.is_empty() {
        format!(r#"<span class="avatar avatar-fallback">{}</span>"#, user.initials())
    } else {
        format!(r#"<img class="avatar" src="{}" alt="{}">"#, user.avatar, user.name)
    };

    let mut badges = String::new();
    if user.is_admin {
        badges.push_str(r#"<span class="badge badge-admin">Admin</span>"#);
    }
    if user.can_export_data {
        badges.push_str(r#"<span class="badge badge-export">Data Export</span>"#);
    }
    if user.can_import_data {
        badges.push_str(r#"<span class="badge badge-import">Data Import</span>"#);
    }

    format!(
        r#"<tr>
            <td>{}</td>
            <td>
                <div class="user-name">{}</div>
                <div class="user-email">{}</div>
            </td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td class="action-cell">
                <a href="/users/{}" class="view-btn">Voir le profil</a>
                <a href="/users/archive/{}" class="archive-btn">Archiver</a>
                <a href="/users/delete/{}" class="delete-btn">Supprimer</a>
            </td>
        </tr>"#,
        avatar_html,
        user.name,
        user.email,
        badges,
        user.last_active,
        user.date_added,
        user.id,
        user.id,
        user.id
    )
}

fn panel_url(query: &str, sort: SortOption, page: usize) -> String {
    format!(
        "/users?q={}&sort={}&page={}",
        urlencoding::encode(query),
        sort.as_str(),
        page
    )
}

// Every sort link points back at page 1: a new ordering invalidates the
// current page position.
fn render_sort_menu(query: &str, active: SortOption) -> String {
    [
        (SortOption::None, "No filter"),
        (SortOption::Alphabetical, "Alphabetical (A-Z)"),
        (SortOption::DateAdded, "Date added (Recent first)"),
        (SortOption::Admin, "Access level (Admins first)"),
    ]
    .iter()
    .map(|(option, label)| {
        let class = if *option == active { "sort-link active" } else { "sort-link" };
        format!(
            r#"<a class="{}" href="{}">{}</a>"#,
            class,
            panel_url(query, *option, 1),
            label
        )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn render_pagination(query: &str, sort: SortOption, view: &PageView) -> String {
    let mut html = String::new();

    if view.page > 1 {
        html.push_str(&format!(
            r#"<a class="page-link" href="{}">Previous</a>"#,
            panel_url(query, sort, view.page - 1)
        ));
    } else {
        html.push_str(r#"<span class="page-link disabled">Previous</span>"#);
    }

    for page in 1..=view.total_pages {
        if page == view.page {
            html.push_str(&format!(r#"<span class="page-link current">{}</span>"#, page));
        } else {
            html.push_str(&format!(
                r#"<a class="page-link" href="{}">{}</a>"#,
                panel_url(query, sort, page),
                page
            ));
        }
    }

    if view.page < view.total_pages {
        html.push_str(&format!(
            r#"<a class="page-link" href="{}">Next</a>"#,
            panel_url(query, sort, view.page + 1)
        ));
    } else {
        html.push_str(r#"<span class="page-link disabled">Next</span>"#);
    }

    html
}

// Helper function to read a text form field
async fn read_text_field(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Upload(format!("Failed to read field: {}", e)))
}

// HTML checkboxes submit "on" when ticked and are absent otherwise, so any
// value at all counts as checked.
async fn read_checkbox_field(field: Field<'_>) -> AppResult<bool> {
    let value = field
        .text()
        .await
        .map_err(|e| AppError::Upload(format!("Failed to read checkbox field: {}", e)))?;
    Ok(!value.is_empty())
}

/// Save an uploaded avatar image under the configured directory and return
/// the URL it will be served from. An empty file input yields an empty
/// avatar, which falls back to initials in the table.
pub(super) async fn save_avatar_file(mut field: Field<'_>, config: &Config) -> AppResult<String> {
    let filename = field.file_name().unwrap_or("").to_string();
    if filename.is_empty() {
        return Ok(String::new());
    }

    let extension = std::path::Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !ACCEPTED_IMAGE_TYPES.contains(&extension.as_str()) {
        return Err(AppError::Upload(format!(
            "Unsupported image type '{}', expected one of: {}",
            extension,
            ACCEPTED_IMAGE_TYPES.join(", ")
        )));
    }

    // Create the avatar directory only if it doesn't exist
    if !std::path::Path::new(&config.upload.avatar_dir).exists() {
        std::fs::create_dir_all(&config.upload.avatar_dir).map_err(|e| {
            tracing::error!("Failed to create avatar directory {}: {}", config.upload.avatar_dir, e);
            AppError::File(e)
        })?;
    }

    let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
    let stored_path = format!("{}/{}", config.upload.avatar_dir, stored_name);

    // Write the upload chunk by chunk through a buffered writer
    let file = std::fs::File::create(&stored_path).map_err(|e| {
        tracing::error!("Failed to create file {}: {}", stored_path, e);
        AppError::File(e)
    })?;
    let mut writer = std::io::BufWriter::new(file);

    while let Ok(Some(chunk)) = field.chunk().await {
        writer.write_all(&chunk).map_err(|e| {
            tracing::error!("Error writing chunk to {}: {}", stored_path, e);
            AppError::File(e)
        })?;
    }

    writer.flush().map_err(|e| {
        tracing::error!("Error flushing file {}: {}", stored_path, e);
        AppError::File(e)
    })?;

    tracing::debug!("Saved avatar upload {} -> {}", filename, stored_path);
    Ok(format!("/{}", stored_path))
}
