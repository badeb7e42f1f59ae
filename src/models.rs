use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::*;

/// Customs-clearance flag set persisted as the `clearance` JSONB sub-document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceFlags {
    #[serde(default)]
    pub export: bool,
    #[serde(default)]
    pub import: bool,
    #[serde(default)]
    pub clearance: bool,
    #[serde(default)]
    pub local: bool,
}

/// Transport-mode flag set persisted as the `product_types` JSONB sub-document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTypeFlags {
    #[serde(default)]
    pub air: bool,
    #[serde(default)]
    pub sea: bool,
    #[serde(default)]
    pub land: bool,
    #[serde(default)]
    pub others: bool,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = job_files)]
#[diesel(primary_key(job_file_no))]
pub struct JobFile {
    pub job_file_no: String,
    pub job_date: Option<NaiveDate>,
    pub po_number: Option<String>,
    pub clearance: serde_json::Value,
    pub product_types: serde_json::Value,
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
    pub charges: serde_json::Value,
    pub total_cost: BigDecimal,
    pub total_selling: BigDecimal,
    pub total_profit: BigDecimal,
    pub status: String,
    pub created_by: String,
    pub last_updated_by: String,
    pub checked_by: Option<String>,
    pub checked_at: Option<NaiveDateTime>,
    pub approved_by: Option<String>,
    pub approved_at: Option<NaiveDateTime>,
    pub is_deleted: bool,
    pub row_version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = job_files)]
pub struct NewJobFile {
    pub job_file_no: String,
    pub job_date: Option<NaiveDate>,
    pub po_number: Option<String>,
    pub clearance: serde_json::Value,
    pub product_types: serde_json::Value,
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
    pub charges: serde_json::Value,
    pub total_cost: BigDecimal,
    pub total_selling: BigDecimal,
    pub total_profit: BigDecimal,
    pub status: String,
    pub created_by: String,
    pub last_updated_by: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = clients)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub client_type: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = clients)]
pub struct NewClient {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub client_type: Option<String>,
}
