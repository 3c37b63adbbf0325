use axum::{
    extract::{Form, Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::fs;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::handlers::users::save_avatar_file;
use crate::models::{PermissionsForm, ProfileForm, User, UserUpdate};
use crate::store::UserStore;

/// Profile page for one record: name/email edit, permission toggles and
/// avatar change, plus the read-only role and date fields.
pub async fn serve_profile_page(
    State((store, _)): State<(UserStore, Config)>,
    Path(user_id): Path<String>,
) -> AppResult<Response> {
    tracing::info!("Viewing profile for user {}", user_id);

    let user = store
        .find_by_id(&user_id)
        .await
        .ok_or_else(|| AppError::User(format!("User {} not found", user_id)))?;

    let template = fs::read_to_string("templates/profile.html").map_err(|e| {
        tracing::error!("Failed to read profile template: {}", e);
        AppError::File(e)
    })?;

    let avatar_html = if user.avatar.is_empty() {
        format!(r#"<span class="avatar avatar-large avatar-fallback">{}</span>"#, user.initials())
    } else {
        format!(r#"<img class="avatar avatar-large" src="{}" alt="{}">"#, user.avatar, user.name)
    };

    let html = template
        .replace("{{id}}", &user.id)
        .replace("{{name}}", &user.name)
        .replace("{{email}}", &user.email)
        .replace("{{avatar}}", &avatar_html)
        .replace("{{role}}", if user.is_admin { "Administrator" } else { "User" })
        .replace("{{last_active}}", &user.last_active)
        .replace("{{date_added}}", &user.date_added)
        .replace("{{admin_checked}}", checked_attr(user.is_admin))
        .replace("{{export_checked}}", checked_attr(user.can_export_data))
        .replace("{{import_checked}}", checked_attr(user.can_import_data));

    Ok(Html(html).into_response())
}

pub async fn update_profile(
    State((store, _)): State<(UserStore, Config)>,
    Path(user_id): Path<String>,
    Form(profile): Form<ProfileForm>,
) -> AppResult<Response> {
    tracing::info!("Updating profile for user {}", user_id);

    store
        .update_fields(
            &user_id,
            UserUpdate {
                name: Some(profile.name),
                email: Some(profile.email),
                ..Default::default()
            },
        )
        .await;

    Ok(Redirect::to(&format!("/users/{}", user_id)).into_response())
}

pub async fn update_permissions(
    State((store, _)): State<(UserStore, Config)>,
    Path(user_id): Path<String>,
    Form(permissions): Form<PermissionsForm>,
) -> AppResult<Response> {
    tracing::info!("Updating permissions for user {}", user_id);

    store
        .update_fields(
            &user_id,
            UserUpdate {
                is_admin: Some(permissions.is_admin.is_some()),
                can_export_data: Some(permissions.can_export_data.is_some()),
                can_import_data: Some(permissions.can_import_data.is_some()),
                ..Default::default()
            },
        )
        .await;

    Ok(Redirect::to(&format!("/users/{}", user_id)).into_response())
}

pub async fn upload_avatar(
    State((store, config)): State<(UserStore, Config)>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    tracing::info!("Changing avatar for user {}", user_id);

    // Reject early rather than storing an image for a nonexistent record
    let user: Option<User> = store.find_by_id(&user_id).await;
    if user.is_none() {
        return Err(AppError::User(format!("User {} not found", user_id)));
    }

    let mut avatar = String::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to get next field from multipart form: {}", e);
        AppError::Upload(format!("Failed to process form field: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "avatar" => avatar = save_avatar_file(field, &config).await?,
            field_name => {
                tracing::warn!("Unexpected form field: {}", field_name);
            }
        }
    }

    if avatar.is_empty() {
        return Err(AppError::Upload("No image file uploaded".into()));
    }

    store
        .update_fields(
            &user_id,
            UserUpdate {
                avatar: Some(avatar),
                ..Default::default()
            },
        )
        .await;

    Ok(Redirect::to(&format!("/users/{}", user_id)).into_response())
}

fn checked_attr(checked: bool) -> &'static str {
    if checked {
        "checked"
    } else {
        ""
    }
}
