use axum::{extract::State, Json};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    auth::{AuthenticatedUser, STATUS_ACTIVE, STATUS_PENDING, STATUS_REJECTED},
    error::{AppError, AppResult},
    models::User,
    schema::users,
    state::AppState,
    workflow::Role,
};

/// User shape exposed over the API; the password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            status: user.status,
            created_at: super::job_files::to_iso(user.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
}

#[derive(Deserialize)]
pub struct UserUpdate {
    pub id: Uuid,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct BatchUpdateRequest {
    pub updates: Vec<UserUpdate>,
}

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<UserListResponse>> {
    user.require_admin()?;

    let mut conn = state.db()?;
    let rows: Vec<User> = users::table.order(users::created_at.asc()).load(&mut conn)?;

    Ok(Json(UserListResponse {
        users: rows.into_iter().map(PublicUser::from).collect(),
    }))
}

/// Applies role/status changes for several users at once. The batch is
/// all-or-nothing: an unknown id or a bad value rolls every change back.
pub async fn batch_update_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<BatchUpdateRequest>,
) -> AppResult<Json<UserListResponse>> {
    user.require_admin()?;

    if payload.updates.is_empty() {
        return Err(AppError::bad_request("updates must not be empty"));
    }
    for update in &payload.updates {
        if update.role.is_none() && update.status.is_none() {
            return Err(AppError::bad_request(
                "each update needs a role or a status",
            ));
        }
        if let Some(ref role) = update.role {
            Role::from_str(role).map_err(AppError::bad_request)?;
        }
        if let Some(ref status) = update.status {
            if ![STATUS_PENDING, STATUS_ACTIVE, STATUS_REJECTED].contains(&status.as_str()) {
                return Err(AppError::bad_request(format!("unknown status: {status}")));
            }
        }
    }

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();

    conn.transaction::<(), AppError, _>(|conn| {
        for update in &payload.updates {
            let affected = match (&update.role, &update.status) {
                (Some(role), Some(status)) => diesel::update(users::table.find(update.id))
                    .set((
                        users::role.eq(role),
                        users::status.eq(status),
                        users::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                (Some(role), None) => diesel::update(users::table.find(update.id))
                    .set((users::role.eq(role), users::updated_at.eq(now)))
                    .execute(conn)?,
                (None, Some(status)) => diesel::update(users::table.find(update.id))
                    .set((users::status.eq(status), users::updated_at.eq(now)))
                    .execute(conn)?,
                (None, None) => unreachable!("validated above"),
            };
            if affected == 0 {
                return Err(AppError::not_found());
            }
        }
        Ok(())
    })?;

    let ids: Vec<Uuid> = payload.updates.iter().map(|update| update.id).collect();
    let rows: Vec<User> = users::table
        .filter(users::id.eq_any(ids))
        .order(users::created_at.asc())
        .load(&mut conn)?;

    Ok(Json(UserListResponse {
        users: rows.into_iter().map(PublicUser::from).collect(),
    }))
}
