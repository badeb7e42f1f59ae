use std::collections::{BTreeMap, HashMap};

use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::JobFile;

/// Which date column a report is pivoted on: the billing date (default, as the
/// finance views expect) or the operational job date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateField {
    #[default]
    BillingDate,
    JobDate,
}

impl std::str::FromStr for DateField {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            // "bd" and "d" are the column abbreviations older clients send.
            "billing_date" | "bd" => Ok(DateField::BillingDate),
            "job_date" | "d" => Ok(DateField::JobDate),
            other => Err(format!("invalid date_field: {other}")),
        }
    }
}

impl DateField {
    pub fn of(self, job: &JobFile) -> Option<NaiveDate> {
        match self {
            DateField::BillingDate => job.billing_date,
            DateField::JobDate => job.job_date,
        }
    }
}

/// Reporting window: everything, a calendar year relative to today, or one
/// specific `YYYY-MM` month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    All,
    ThisYear,
    LastYear,
    Month(i32, u32),
}

impl Timeframe {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "all" => Ok(Timeframe::All),
            "thisYear" => Ok(Timeframe::ThisYear),
            "lastYear" => Ok(Timeframe::LastYear),
            other => {
                let (year, month) = other
                    .split_once('-')
                    .ok_or_else(|| format!("invalid timeframe: {other}"))?;
                let year: i32 = year
                    .parse()
                    .map_err(|_| format!("invalid timeframe: {other}"))?;
                let month: u32 = month
                    .parse()
                    .map_err(|_| format!("invalid timeframe: {other}"))?;
                if !(1..=12).contains(&month) {
                    return Err(format!("invalid timeframe month: {other}"));
                }
                // chrono cannot represent dates outside this range; an
                // unbounded year would fall through to "no restriction".
                if !(1900..=9999).contains(&year) {
                    return Err(format!("invalid timeframe year: {other}"));
                }
                Ok(Timeframe::Month(year, month))
            }
        }
    }

    /// Half-open [start, end) date window for SQL filtering; `None` means no
    /// restriction.
    pub fn date_range(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let year_window = |year: i32| {
            let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
            let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
            Some((start, end))
        };
        match self {
            Timeframe::All => None,
            Timeframe::ThisYear => year_window(today.year()),
            Timeframe::LastYear => year_window(today.year() - 1),
            Timeframe::Month(year, month) => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let end = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)?
                };
                Some((start, end))
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub top_shippers: Vec<NameProfit>,
    pub top_consignees: Vec<NameProfit>,
    pub top_salesmen: Vec<NameStats>,
    pub top_users: Vec<NameStats>,
    pub monthly_stats: Vec<MonthlyStat>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_jobs: i64,
    pub total_profit: BigDecimal,
    pub total_cost: BigDecimal,
    pub total_selling: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct NameProfit {
    pub name: String,
    pub profit: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct NameStats {
    pub name: String,
    pub count: i64,
    pub profit: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct MonthlyStat {
    pub month: String,
    pub count: i64,
    pub profit: BigDecimal,
}

const TOP_LIMIT: usize = 5;

/// Pure rollup over an already-filtered snapshot of non-deleted job files.
pub fn build_report(rows: &[JobFile], date_field: DateField) -> Report {
    let mut summary = Summary {
        total_jobs: rows.len() as i64,
        total_profit: BigDecimal::zero(),
        total_cost: BigDecimal::zero(),
        total_selling: BigDecimal::zero(),
    };
    for job in rows {
        summary.total_profit += &job.total_profit;
        summary.total_cost += &job.total_cost;
        summary.total_selling += &job.total_selling;
    }

    let top_shippers = rank_profit(rows, |job| job.shipper_name.as_deref(), Some(TOP_LIMIT));
    let top_consignees = rank_profit(rows, |job| job.consignee_name.as_deref(), Some(TOP_LIMIT));
    let top_salesmen = rank_stats(rows, |job| job.salesman.as_deref());
    let top_users = rank_stats(rows, |job| Some(job.created_by.as_str()));

    let mut months: BTreeMap<String, (i64, BigDecimal)> = BTreeMap::new();
    for job in rows {
        if let Some(date) = date_field.of(job) {
            let entry = months
                .entry(format!("{:04}-{:02}", date.year(), date.month()))
                .or_insert_with(|| (0, BigDecimal::zero()));
            entry.0 += 1;
            entry.1 += &job.total_profit;
        }
    }
    let monthly_stats = months
        .into_iter()
        .map(|(month, (count, profit))| MonthlyStat {
            month,
            count,
            profit,
        })
        .collect();

    Report {
        summary,
        top_shippers,
        top_consignees,
        top_salesmen,
        top_users,
        monthly_stats,
    }
}

fn group_profit<'a>(
    rows: &'a [JobFile],
    key: impl Fn(&'a JobFile) -> Option<&'a str>,
) -> Vec<(String, i64, BigDecimal)> {
    let mut groups: HashMap<&str, (i64, BigDecimal)> = HashMap::new();
    for job in rows {
        let Some(name) = key(job) else { continue };
        if name.is_empty() {
            continue;
        }
        let entry = groups
            .entry(name)
            .or_insert_with(|| (0, BigDecimal::zero()));
        entry.0 += 1;
        entry.1 += &job.total_profit;
    }

    let mut ranked: Vec<(String, i64, BigDecimal)> = groups
        .into_iter()
        .map(|(name, (count, profit))| (name.to_string(), count, profit))
        .collect();
    // Profit descending, name ascending as a stable tie-break.
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn rank_profit<'a>(
    rows: &'a [JobFile],
    key: impl Fn(&'a JobFile) -> Option<&'a str>,
    limit: Option<usize>,
) -> Vec<NameProfit> {
    let mut ranked = group_profit(rows, key);
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
        .into_iter()
        .map(|(name, _, profit)| NameProfit { name, profit })
        .collect()
}

fn rank_stats<'a>(
    rows: &'a [JobFile],
    key: impl Fn(&'a JobFile) -> Option<&'a str>,
) -> Vec<NameStats> {
    group_profit(rows, key)
        .into_iter()
        .map(|(name, count, profit)| NameStats {
            name,
            count,
            profit,
        })
        .collect()
}
