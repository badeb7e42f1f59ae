use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    analytics::{build_report, Report},
    auth::AuthenticatedUser,
    error::AppResult,
    state::AppState,
};

use super::job_files::{load_filtered, parse_list_query, ListQuery};

/// Profit dashboard rollup. Reviewer-gated: plain users see their own job
/// files, not the company-wide numbers.
pub async fn get_analytics(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Report>> {
    user.require_reviewer()?;

    let (date_field, timeframe) = parse_list_query(&query)?;
    let mut conn = state.db()?;
    let rows = load_filtered(&mut conn, date_field, timeframe)?;

    Ok(Json(build_report(&rows, date_field)))
}
