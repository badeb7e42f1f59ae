use axum::{extract::State, http::StatusCode, Json};
use diesel::{dsl::count_star, prelude::*, result::DatabaseErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{password, AuthenticatedUser, STATUS_ACTIVE, STATUS_PENDING},
    error::{AppError, AppResult},
    models::{NewUser, User},
    schema::users,
    state::AppState,
    workflow::Role,
};

use super::users::PublicUser;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: PublicUser,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: PublicUser,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let email = payload.email.trim().to_lowercase();
    let display_name = payload.display_name.trim().to_string();
    if email.is_empty() || display_name.is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request(
            "email, display_name and password are all required",
        ));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let mut conn = state.db()?;

    // The explicit table lock serializes racing registrations; under plain
    // READ COMMITTED both would count zero rows and both would bootstrap as
    // admin.
    let user = conn.transaction::<User, AppError, _>(|conn| {
        diesel::sql_query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE").execute(conn)?;
        let existing_users: i64 = users::table.select(count_star()).first(conn)?;
        let is_first_user = existing_users == 0;

        let new_user = NewUser {
            id: Uuid::new_v4(),
            email: email.clone(),
            display_name: display_name.clone(),
            password_hash: password_hash.clone(),
            role: if is_first_user {
                Role::Admin.as_str().to_string()
            } else {
                Role::User.as_str().to_string()
            },
            status: if is_first_user {
                STATUS_ACTIVE.to_string()
            } else {
                STATUS_PENDING.to_string()
            },
        };

        match diesel::insert_into(users::table)
            .values(&new_user)
            .execute(conn)
        {
            Ok(_) => {}
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                return Err(AppError::duplicate_key(
                    "an account with this email already exists",
                ));
            }
            Err(err) => return Err(AppError::from(err)),
        }

        Ok(users::table.find(new_user.id).first(conn)?)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: PublicUser::from(user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let mut conn = state.db()?;

    let user: User = users::table
        .filter(users::email.eq(payload.email.trim().to_lowercase()))
        .first(&mut conn)
        .optional()?
        .ok_or_else(invalid_credentials)?;

    let valid =
        password::verify_password(&payload.password, &user.password_hash).unwrap_or(false);
    if !valid {
        return Err(invalid_credentials());
    }

    let access_token = state
        .jwt
        .generate_token(user.id, &user.email, &user.display_name)?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt_expiry_minutes * 60,
        user: PublicUser::from(user),
    }))
}

pub async fn me(user: AuthenticatedUser) -> Json<AuthenticatedUser> {
    Json(user)
}

fn invalid_credentials() -> AppError {
    AppError::new(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "invalid email or password",
    )
}
