use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::{prelude::*, result::DatabaseErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    models::{Client, NewClient},
    schema::clients,
    state::AppState,
};

use super::job_files::to_iso;

#[derive(Deserialize)]
pub struct ClientRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub client_type: Option<String>,
}

#[derive(Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub client_type: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct ClientListResponse {
    pub clients: Vec<ClientResponse>,
}

#[derive(AsChangeset)]
#[diesel(table_name = clients)]
#[diesel(treat_none_as_null = true)]
struct ClientChangeset {
    name: String,
    address: Option<String>,
    contact_person: Option<String>,
    phone: Option<String>,
    client_type: Option<String>,
    updated_at: chrono::NaiveDateTime,
}

fn to_response(client: Client) -> ClientResponse {
    ClientResponse {
        id: client.id,
        name: client.name,
        address: client.address,
        contact_person: client.contact_person,
        phone: client.phone,
        client_type: client.client_type,
        created_at: to_iso(client.created_at),
        updated_at: to_iso(client.updated_at),
    }
}

pub async fn list_clients(State(state): State<AppState>) -> AppResult<Json<ClientListResponse>> {
    let mut conn = state.db()?;
    let rows: Vec<Client> = clients::table.order(clients::name.asc()).load(&mut conn)?;
    Ok(Json(ClientListResponse {
        clients: rows.into_iter().map(to_response).collect(),
    }))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<ClientRequest>,
) -> AppResult<(StatusCode, Json<ClientResponse>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let new_client = NewClient {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: payload.address,
        contact_person: payload.contact_person,
        phone: payload.phone,
        client_type: payload.client_type,
    };

    let mut conn = state.db()?;
    match diesel::insert_into(clients::table)
        .values(&new_client)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(AppError::duplicate_key("client name already exists"));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    let stored: Client = clients::table.find(new_client.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(stored))))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<ClientRequest>,
) -> AppResult<Json<ClientResponse>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let mut conn = state.db()?;
    let changeset = ClientChangeset {
        name: name.to_string(),
        address: payload.address,
        contact_person: payload.contact_person,
        phone: payload.phone,
        client_type: payload.client_type,
        updated_at: Utc::now().naive_utc(),
    };

    let updated = match diesel::update(clients::table.find(client_id))
        .set(&changeset)
        .execute(&mut conn)
    {
        Ok(count) => count,
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(AppError::duplicate_key("client name already exists"));
        }
        Err(err) => return Err(AppError::from(err)),
    };
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let stored: Client = clients::table.find(client_id).first(&mut conn)?;
    Ok(Json(to_response(stored)))
}

pub async fn delete_client(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_admin()?;

    let mut conn = state.db()?;
    let deleted = diesel::delete(clients::table.find(client_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
