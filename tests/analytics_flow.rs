mod common;

use anyhow::Result;
use axum::http::StatusCode;
use bigdecimal::BigDecimal;
use common::{acquire_db_lock, body_to_vec, TestApp};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;

#[derive(Deserialize)]
struct Report {
    summary: Summary,
    top_shippers: Vec<NameProfit>,
    top_users: Vec<NameStats>,
    monthly_stats: Vec<MonthlyStat>,
}

#[derive(Deserialize)]
struct Summary {
    total_jobs: i64,
    total_profit: String,
}

#[derive(Deserialize)]
struct NameProfit {
    name: String,
    profit: String,
}

#[derive(Deserialize)]
struct NameStats {
    name: String,
    count: i64,
}

#[derive(Deserialize)]
struct MonthlyStat {
    month: String,
    count: i64,
    profit: String,
}

fn dec(raw: &str) -> BigDecimal {
    BigDecimal::from_str(raw).unwrap()
}

async fn fetch_report(app: &TestApp, path: &str, token: &str) -> Result<Report> {
    let response = app.get(path, Some(token)).await?;
    anyhow::ensure!(
        response.status() == StatusCode::OK,
        "analytics request failed with status {}",
        response.status()
    );
    let body = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn seed_job(
    app: &TestApp,
    token: &str,
    number: &str,
    billing_date: &str,
    shipper: &str,
    cost: &str,
    selling: &str,
) -> Result<()> {
    let response = app
        .post_json(
            "/api/job-files",
            &json!({
                "job_file_no": number,
                "billing_date": billing_date,
                "shipper_name": shipper,
                "charges": [{ "description": "freight", "cost": cost, "selling": selling }]
            }),
            Some(token),
        )
        .await?;
    anyhow::ensure!(
        response.status() == StatusCode::CREATED,
        "seeding {number} failed with status {}",
        response.status()
    );
    Ok(())
}

#[tokio::test]
async fn report_aggregates_profit_by_shipper_user_and_month() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("clerk@example.com", "Clerk", "clerkpass", "user", "active")
        .await?;
    app.insert_user("boss@example.com", "Boss", "bosspass", "admin", "active")
        .await?;
    let clerk = app.login_token("clerk@example.com", "clerkpass").await?;
    let boss = app.login_token("boss@example.com", "bosspass").await?;

    seed_job(&app, &clerk, "JF-A1", "2024-05-02", "Acme", "100", "200").await?;
    seed_job(&app, &clerk, "JF-A2", "2024-05-15", "Acme", "120", "100").await?;
    seed_job(&app, &boss, "JF-A3", "2024-05-28", "Globex", "50", "100").await?;

    let report = fetch_report(&app, "/api/analytics", &boss).await?;

    assert_eq!(report.summary.total_jobs, 3);
    assert_eq!(dec(&report.summary.total_profit), dec("130"));

    assert_eq!(report.monthly_stats.len(), 1);
    assert_eq!(report.monthly_stats[0].month, "2024-05");
    assert_eq!(report.monthly_stats[0].count, 3);
    assert_eq!(dec(&report.monthly_stats[0].profit), dec("130"));

    // Acme nets 100 - 20 = 80, Globex 50.
    assert_eq!(report.top_shippers.len(), 2);
    assert_eq!(report.top_shippers[0].name, "Acme");
    assert_eq!(dec(&report.top_shippers[0].profit), dec("80"));
    assert_eq!(report.top_shippers[1].name, "Globex");

    let clerk_stats = report
        .top_users
        .iter()
        .find(|entry| entry.name == "Clerk")
        .expect("clerk missing from user stats");
    assert_eq!(clerk_stats.count, 2);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn soft_deleted_files_are_excluded_from_the_report() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("boss@example.com", "Boss", "bosspass", "admin", "active")
        .await?;
    let boss = app.login_token("boss@example.com", "bosspass").await?;

    seed_job(&app, &boss, "JF-B1", "2024-05-01", "Acme", "0", "100").await?;
    seed_job(&app, &boss, "JF-B2", "2024-05-02", "Acme", "0", "40").await?;

    let deleted = app.delete("/api/job-files/JF-B2", Some(&boss)).await?;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let report = fetch_report(&app, "/api/analytics", &boss).await?;
    assert_eq!(report.summary.total_jobs, 1);
    assert_eq!(dec(&report.summary.total_profit), dec("100"));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn timeframe_and_date_field_narrow_the_report() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user(
        "reviewer@example.com",
        "Reviewer",
        "reviewpass",
        "supervisor",
        "active",
    )
    .await?;
    let reviewer = app.login_token("reviewer@example.com", "reviewpass").await?;

    seed_job(&app, &reviewer, "JF-C1", "2024-05-10", "Acme", "0", "10").await?;
    seed_job(&app, &reviewer, "JF-C2", "2024-06-10", "Acme", "0", "20").await?;

    // One file pivots on the operational date instead.
    let response = app
        .post_json(
            "/api/job-files",
            &json!({
                "job_file_no": "JF-C3",
                "job_date": "2024-05-20",
                "charges": [{ "description": "freight", "cost": "0", "selling": "40" }]
            }),
            Some(&reviewer),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let may = fetch_report(&app, "/api/analytics?timeframe=2024-05", &reviewer).await?;
    assert_eq!(may.summary.total_jobs, 1);
    assert_eq!(dec(&may.summary.total_profit), dec("10"));

    let by_job_date =
        fetch_report(&app, "/api/analytics?timeframe=2024-05&date_field=job_date", &reviewer)
            .await?;
    assert_eq!(by_job_date.summary.total_jobs, 1);
    assert_eq!(dec(&by_job_date.summary.total_profit), dec("40"));

    let all = fetch_report(&app, "/api/analytics?timeframe=all", &reviewer).await?;
    assert_eq!(all.summary.total_jobs, 3);

    let bad = app
        .get("/api/analytics?timeframe=2024-13", Some(&reviewer))
        .await?;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn plain_users_cannot_read_analytics() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("clerk@example.com", "Clerk", "clerkpass", "user", "active")
        .await?;
    let clerk = app.login_token("clerk@example.com", "clerkpass").await?;

    let response = app.get("/api/analytics", Some(&clerk)).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.cleanup().await?;
    Ok(())
}
