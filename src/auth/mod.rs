pub mod jwt;
pub mod password;

use std::str::FromStr;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use diesel::prelude::*;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::User,
    schema::users,
    state::AppState,
    workflow::Role,
};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_REJECTED: &str = "rejected";

/// Resolved request identity: token verified, user looked up, and status
/// confirmed active. Everything privileged goes through this extractor.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::forbidden("admin role required"))
        }
    }

    pub fn require_reviewer(&self) -> AppResult<()> {
        if self.role.is_reviewer() {
            Ok(())
        } else {
            Err(AppError::forbidden("supervisor or admin role required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthenticated())?;

        let claims = state
            .jwt
            .verify_token(bearer.token())
            .map_err(|_| AppError::invalid_token())?;

        let mut conn = state.db()?;
        let user: User = users::table
            .find(claims.sub)
            .first(&mut conn)
            .optional()?
            .ok_or_else(AppError::user_not_found)?;

        if user.status != STATUS_ACTIVE {
            return Err(AppError::account_not_active());
        }

        let role = Role::from_str(&user.role).map_err(AppError::internal)?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            display_name: user.display_name,
            role,
        })
    }
}
