//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::students;

/// Row struct for reading from the students table.
///
/// Also derives `QueryableByName` so conditional `UPDATE ... RETURNING *`
/// statements can load it.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudentRow {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub branch_id: Option<Uuid>,
    pub monthly_fee: i64,
    pub join_date: NaiveDate,
    pub payment_status: String,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub payment_deadline: Option<DateTime<Utc>>,
    pub payment_warning_shown: bool,
    pub block_reason: String,
    pub blocked_at: Option<DateTime<Utc>>,
    pub warnings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for enrolling new students.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = students)]
pub(crate) struct NewStudentRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub phone: &'a str,
    pub role: &'a str,
    pub branch_id: Option<Uuid>,
    pub monthly_fee: i64,
    pub join_date: NaiveDate,
    pub payment_status: &'a str,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub payment_deadline: Option<DateTime<Utc>>,
    pub payment_warning_shown: bool,
    pub block_reason: &'a str,
    pub blocked_at: Option<DateTime<Utc>>,
    pub warnings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JSONB shape of one warning ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WarningRecord {
    pub reason: String,
    pub date: DateTime<Utc>,
    pub given_by: String,
}
