use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::{prelude::*, result::DatabaseErrorKind, PgConnection};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    analytics::{DateField, Timeframe},
    auth::AuthenticatedUser,
    charges::{self, Charge, ChargeInput},
    error::{AppError, AppResult},
    models::{ClearanceFlags, JobFile, NewJobFile, ProductTypeFlags},
    schema::job_files,
    state::AppState,
    workflow::{self, Action, JobStatus, Transition},
};

/// Full-replace payload for create and update. The charge list is normalized
/// server-side; any totals a client might send are ignored.
#[derive(Debug, Deserialize)]
pub struct JobFileRequest {
    pub job_file_no: Option<String>,
    #[serde(default)]
    pub job_date: Option<NaiveDate>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub clearance: ClearanceFlags,
    #[serde(default)]
    pub product_types: ProductTypeFlags,
    #[serde(default)]
    pub invoice_no: Option<String>,
    #[serde(default)]
    pub billing_date: Option<NaiveDate>,
    #[serde(default)]
    pub salesman: Option<String>,
    #[serde(default)]
    pub shipper_name: Option<String>,
    #[serde(default)]
    pub consignee_name: Option<String>,
    #[serde(default)]
    pub mawb: Option<String>,
    #[serde(default)]
    pub hawb: Option<String>,
    #[serde(default)]
    pub shipping_terms: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub piece_count: Option<String>,
    #[serde(default)]
    pub gross_weight: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub volume_weight: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub truck_info: Option<String>,
    #[serde(default)]
    pub vessel_name: Option<String>,
    #[serde(default)]
    pub voyage_no: Option<String>,
    #[serde(default)]
    pub container_no: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub charges: Vec<ChargeInput>,
    /// Optional compare-and-swap token for updates. When present, the update
    /// only applies if the stored row still carries this version.
    #[serde(default)]
    pub row_version: Option<i32>,
}

#[derive(Serialize)]
pub struct JobFileResponse {
    pub job_file_no: String,
    pub job_date: Option<NaiveDate>,
    pub po_number: Option<String>,
    pub clearance: ClearanceFlags,
    pub product_types: ProductTypeFlags,
    pub invoice_no: Option<String>,
    pub billing_date: Option<NaiveDate>,
    pub salesman: Option<String>,
    pub shipper_name: Option<String>,
    pub consignee_name: Option<String>,
    pub mawb: Option<String>,
    pub hawb: Option<String>,
    pub shipping_terms: Option<String>,
    pub origin: Option<String>,
    pub piece_count: Option<String>,
    pub gross_weight: Option<String>,
    pub destination: Option<String>,
    pub volume_weight: Option<String>,
    pub description: Option<String>,
    pub carrier: Option<String>,
    pub truck_info: Option<String>,
    pub vessel_name: Option<String>,
    pub voyage_no: Option<String>,
    pub container_no: Option<String>,
    pub remarks: Option<String>,
    pub charges: Vec<Charge>,
    pub total_cost: BigDecimal,
    pub total_selling: BigDecimal,
    pub total_profit: BigDecimal,
    pub status: String,
    pub created_by: String,
    pub last_updated_by: String,
    pub checked_by: Option<String>,
    pub checked_at: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub row_version: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = job_files)]
#[diesel(treat_none_as_null = true)]
struct JobFileChangeset {
    job_date: Option<NaiveDate>,
    po_number: Option<String>,
    clearance: serde_json::Value,
    product_types: serde_json::Value,
    invoice_no: Option<String>,
    billing_date: Option<NaiveDate>,
    salesman: Option<String>,
    shipper_name: Option<String>,
    consignee_name: Option<String>,
    mawb: Option<String>,
    hawb: Option<String>,
    shipping_terms: Option<String>,
    origin: Option<String>,
    piece_count: Option<String>,
    gross_weight: Option<String>,
    destination: Option<String>,
    volume_weight: Option<String>,
    description: Option<String>,
    carrier: Option<String>,
    truck_info: Option<String>,
    vessel_name: Option<String>,
    voyage_no: Option<String>,
    container_no: Option<String>,
    remarks: Option<String>,
    charges: serde_json::Value,
    total_cost: BigDecimal,
    total_selling: BigDecimal,
    total_profit: BigDecimal,
    last_updated_by: String,
    updated_at: NaiveDateTime,
    row_version: i32,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub date_field: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
}

#[derive(Serialize)]
pub struct JobFileListResponse {
    pub job_files: Vec<JobFileResponse>,
}

pub fn to_iso(dt: NaiveDateTime) -> String {
    dt.and_utc().to_rfc3339()
}

pub fn to_response(job: JobFile) -> AppResult<JobFileResponse> {
    let charges: Vec<Charge> = serde_json::from_value(job.charges)?;
    let clearance: ClearanceFlags = serde_json::from_value(job.clearance)?;
    let product_types: ProductTypeFlags = serde_json::from_value(job.product_types)?;

    Ok(JobFileResponse {
        job_file_no: job.job_file_no,
        job_date: job.job_date,
        po_number: job.po_number,
        clearance,
        product_types,
        invoice_no: job.invoice_no,
        billing_date: job.billing_date,
        salesman: job.salesman,
        shipper_name: job.shipper_name,
        consignee_name: job.consignee_name,
        mawb: job.mawb,
        hawb: job.hawb,
        shipping_terms: job.shipping_terms,
        origin: job.origin,
        piece_count: job.piece_count,
        gross_weight: job.gross_weight,
        destination: job.destination,
        volume_weight: job.volume_weight,
        description: job.description,
        carrier: job.carrier,
        truck_info: job.truck_info,
        vessel_name: job.vessel_name,
        voyage_no: job.voyage_no,
        container_no: job.container_no,
        remarks: job.remarks,
        charges,
        total_cost: job.total_cost,
        total_selling: job.total_selling,
        total_profit: job.total_profit,
        status: job.status,
        created_by: job.created_by,
        last_updated_by: job.last_updated_by,
        checked_by: job.checked_by,
        checked_at: job.checked_at.map(to_iso),
        approved_by: job.approved_by,
        approved_at: job.approved_at.map(to_iso),
        row_version: job.row_version,
        created_at: to_iso(job.created_at),
        updated_at: to_iso(job.updated_at),
    })
}

/// Loads the non-deleted snapshot a listing or report runs over, newest update
/// first. Shared with the analytics endpoint so both apply the identical
/// timeframe predicate.
pub fn load_filtered(
    conn: &mut PgConnection,
    date_field: DateField,
    timeframe: Timeframe,
) -> AppResult<Vec<JobFile>> {
    let mut query = job_files::table
        .filter(job_files::is_deleted.eq(false))
        .into_boxed();

    if let Some((start, end)) = timeframe.date_range(Utc::now().date_naive()) {
        query = match date_field {
            DateField::BillingDate => query
                .filter(job_files::billing_date.ge(start))
                .filter(job_files::billing_date.lt(end)),
            DateField::JobDate => query
                .filter(job_files::job_date.ge(start))
                .filter(job_files::job_date.lt(end)),
        };
    }

    let rows = query.order(job_files::updated_at.desc()).load(conn)?;
    Ok(rows)
}

pub fn parse_list_query(query: &ListQuery) -> AppResult<(DateField, Timeframe)> {
    let date_field = match query.date_field.as_deref() {
        None => DateField::default(),
        Some(raw) => DateField::from_str(raw).map_err(AppError::bad_request)?,
    };
    let timeframe = match query.timeframe.as_deref() {
        None => Timeframe::All,
        Some(raw) => Timeframe::parse(raw).map_err(AppError::bad_request)?,
    };
    Ok((date_field, timeframe))
}

pub async fn list_job_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<JobFileListResponse>> {
    let (date_field, timeframe) = parse_list_query(&query)?;
    let mut conn = state.db()?;
    let rows = load_filtered(&mut conn, date_field, timeframe)?;

    let mut job_files = Vec::with_capacity(rows.len());
    for row in rows {
        job_files.push(to_response(row)?);
    }
    Ok(Json(JobFileListResponse { job_files }))
}

pub async fn create_job_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<JobFileRequest>,
) -> AppResult<(StatusCode, Json<JobFileResponse>)> {
    let job_file_no = payload
        .job_file_no
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if job_file_no.is_empty() {
        return Err(AppError::bad_request("job_file_no must not be empty"));
    }

    let charge_lines = charges::normalize(payload.charges);
    let totals = charges::compute_totals(&charge_lines);

    let new_job = NewJobFile {
        job_file_no: job_file_no.to_string(),
        job_date: payload.job_date,
        po_number: payload.po_number,
        clearance: serde_json::to_value(&payload.clearance)?,
        product_types: serde_json::to_value(&payload.product_types)?,
        invoice_no: payload.invoice_no,
        billing_date: payload.billing_date,
        salesman: payload.salesman,
        shipper_name: payload.shipper_name,
        consignee_name: payload.consignee_name,
        mawb: payload.mawb,
        hawb: payload.hawb,
        shipping_terms: payload.shipping_terms,
        origin: payload.origin,
        piece_count: payload.piece_count,
        gross_weight: payload.gross_weight,
        destination: payload.destination,
        volume_weight: payload.volume_weight,
        description: payload.description,
        carrier: payload.carrier,
        truck_info: payload.truck_info,
        vessel_name: payload.vessel_name,
        voyage_no: payload.voyage_no,
        container_no: payload.container_no,
        remarks: payload.remarks,
        charges: serde_json::to_value(&charge_lines)?,
        total_cost: totals.total_cost,
        total_selling: totals.total_selling,
        total_profit: totals.total_profit,
        status: JobStatus::Pending.as_str().to_string(),
        created_by: user.display_name.clone(),
        last_updated_by: user.display_name,
    };

    let mut conn = state.db()?;
    match diesel::insert_into(job_files::table)
        .values(&new_job)
        .execute(&mut conn)
    {
        Ok(_) => {}
        // The key stays reserved even after a soft delete, so a violation here
        // may come from a row no listing will ever show again.
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(AppError::duplicate_key("job file number already exists"));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    let stored: JobFile = job_files::table.find(job_file_no).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(stored)?)))
}

pub async fn get_job_file(
    State(state): State<AppState>,
    Path(job_file_no): Path<String>,
) -> AppResult<Json<JobFileResponse>> {
    let mut conn = state.db()?;
    let job = load_live(&mut conn, &job_file_no)?;
    Ok(Json(to_response(job)?))
}

pub async fn update_job_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_file_no): Path<String>,
    Json(payload): Json<JobFileRequest>,
) -> AppResult<Json<JobFileResponse>> {
    let mut conn = state.db()?;
    let existing = load_live(&mut conn, &job_file_no)?;

    if let Some(expected) = payload.row_version {
        if expected != existing.row_version {
            return Err(AppError::conflict(
                "job file was modified by someone else; reload and retry",
            ));
        }
    }

    let charge_lines = charges::normalize(payload.charges);
    let totals = charges::compute_totals(&charge_lines);
    let now = Utc::now().naive_utc();

    let changeset = JobFileChangeset {
        job_date: payload.job_date,
        po_number: payload.po_number,
        clearance: serde_json::to_value(&payload.clearance)?,
        product_types: serde_json::to_value(&payload.product_types)?,
        invoice_no: payload.invoice_no,
        billing_date: payload.billing_date,
        salesman: payload.salesman,
        shipper_name: payload.shipper_name,
        consignee_name: payload.consignee_name,
        mawb: payload.mawb,
        hawb: payload.hawb,
        shipping_terms: payload.shipping_terms,
        origin: payload.origin,
        piece_count: payload.piece_count,
        gross_weight: payload.gross_weight,
        destination: payload.destination,
        volume_weight: payload.volume_weight,
        description: payload.description,
        carrier: payload.carrier,
        truck_info: payload.truck_info,
        vessel_name: payload.vessel_name,
        voyage_no: payload.voyage_no,
        container_no: payload.container_no,
        remarks: payload.remarks,
        charges: serde_json::to_value(&charge_lines)?,
        total_cost: totals.total_cost,
        total_selling: totals.total_selling,
        total_profit: totals.total_profit,
        last_updated_by: user.display_name,
        updated_at: now,
        row_version: existing.row_version + 1,
    };

    // Compare-and-swap on the version we read; a concurrent writer makes this
    // match zero rows instead of silently losing their update.
    let updated = diesel::update(
        job_files::table
            .find(&job_file_no)
            .filter(job_files::is_deleted.eq(false))
            .filter(job_files::row_version.eq(existing.row_version)),
    )
    .set(&changeset)
    .execute(&mut conn)?;

    if updated == 0 {
        return Err(AppError::conflict(
            "job file was modified by someone else; reload and retry",
        ));
    }

    let stored: JobFile = job_files::table.find(&job_file_no).first(&mut conn)?;
    Ok(Json(to_response(stored)?))
}

pub async fn delete_job_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_file_no): Path<String>,
) -> AppResult<StatusCode> {
    user.require_admin()?;

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(
        job_files::table
            .find(&job_file_no)
            .filter(job_files::is_deleted.eq(false)),
    )
    .set((
        job_files::is_deleted.eq(true),
        job_files::last_updated_by.eq(&user.display_name),
        job_files::updated_at.eq(now),
        job_files::row_version.eq(job_files::row_version + 1),
    ))
    .execute(&mut conn)?;

    if updated == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_job_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_file_no): Path<String>,
) -> AppResult<Json<JobFileResponse>> {
    apply_transition(&state, &user, &job_file_no, Action::Check).await
}

pub async fn approve_job_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_file_no): Path<String>,
) -> AppResult<Json<JobFileResponse>> {
    apply_transition(&state, &user, &job_file_no, Action::Approve).await
}

pub async fn reject_job_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_file_no): Path<String>,
) -> AppResult<Json<JobFileResponse>> {
    apply_transition(&state, &user, &job_file_no, Action::Reject).await
}

async fn apply_transition(
    state: &AppState,
    user: &AuthenticatedUser,
    job_file_no: &str,
    action: Action,
) -> AppResult<Json<JobFileResponse>> {
    let mut conn = state.db()?;
    let existing = load_live(&mut conn, job_file_no)?;
    let current = JobStatus::from_str(&existing.status).map_err(AppError::internal)?;

    let next = match workflow::transition(current, action, user.role)? {
        Transition::NoOp => return Ok(Json(to_response(existing)?)),
        Transition::Advance(next) => next,
    };

    let now = Utc::now().naive_utc();
    // Guarded on the status and version we read: two racing transitions cannot
    // both stamp the file.
    let target = job_files::table
        .find(job_file_no)
        .filter(job_files::is_deleted.eq(false))
        .filter(job_files::status.eq(current.as_str()))
        .filter(job_files::row_version.eq(existing.row_version));

    let updated = match action {
        Action::Check => diesel::update(target)
            .set((
                job_files::status.eq(next.as_str()),
                job_files::checked_by.eq(&user.display_name),
                job_files::checked_at.eq(now),
                job_files::updated_at.eq(now),
                job_files::row_version.eq(existing.row_version + 1),
            ))
            .execute(&mut conn)?,
        Action::Approve => diesel::update(target)
            .set((
                job_files::status.eq(next.as_str()),
                job_files::approved_by.eq(&user.display_name),
                job_files::approved_at.eq(now),
                job_files::updated_at.eq(now),
                job_files::row_version.eq(existing.row_version + 1),
            ))
            .execute(&mut conn)?,
        Action::Reject => diesel::update(target)
            .set((
                job_files::status.eq(next.as_str()),
                job_files::updated_at.eq(now),
                job_files::row_version.eq(existing.row_version + 1),
            ))
            .execute(&mut conn)?,
    };

    if updated == 0 {
        return Err(AppError::conflict(
            "job file was modified by someone else; reload and retry",
        ));
    }

    tracing::info!(
        job_file_no,
        action = %action,
        from = %current,
        to = %next,
        actor = %user.display_name,
        "job file transition"
    );

    let stored: JobFile = job_files::table.find(job_file_no).first(&mut conn)?;
    Ok(Json(to_response(stored)?))
}

fn load_live(conn: &mut PgConnection, job_file_no: &str) -> AppResult<JobFile> {
    job_files::table
        .find(job_file_no)
        .filter(job_files::is_deleted.eq(false))
        .first(conn)
        .optional()?
        .ok_or_else(AppError::not_found)
}
