//! PostgreSQL-backed `StudentRepository` implementation using Diesel ORM.
//!
//! Each port call is one statement. Transitions that depend on the current
//! row (clearing only payment blocks, appending the third warning) are
//! expressed as conditional `UPDATE`s so concurrent callers cannot race
//! between a read and a write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Jsonb, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{
    StudentListFilter, StudentRepository, StudentRepositoryError, WarningAppend,
};
use crate::domain::{
    Block, BlockReason, CycleReset, MAX_WARNINGS, PaymentStatus, PaymentTransition, Student,
    StudentId, StudentProfile, StudentRole, Warning,
};

use super::models::{NewStudentRow, StudentRow, WarningRecord};
use super::pool::{DbPool, PoolError};
use super::schema::students;

const MARK_PAID_SQL: &str = r#"
UPDATE students
SET payment_status = 'paid',
    last_payment_date = $2,
    payment_warning_shown = FALSE,
    blocked_at = CASE WHEN block_reason = 'payment' THEN NULL ELSE blocked_at END,
    block_reason = CASE WHEN block_reason = 'payment' THEN 'none' ELSE block_reason END,
    updated_at = $2
WHERE id = $1
RETURNING *
"#;

const MARK_UNPAID_WITHIN_GRACE_SQL: &str = r#"
UPDATE students
SET payment_status = 'unpaid',
    last_payment_date = NULL,
    blocked_at = CASE WHEN block_reason = 'payment' THEN NULL ELSE blocked_at END,
    block_reason = CASE WHEN block_reason = 'payment' THEN 'none' ELSE block_reason END,
    updated_at = $2
WHERE id = $1
RETURNING *
"#;

const MARK_UNPAID_PAST_DEADLINE_SQL: &str = r#"
UPDATE students
SET payment_status = 'unpaid',
    last_payment_date = NULL,
    blocked_at = CASE WHEN block_reason = 'none' THEN $2 ELSE blocked_at END,
    block_reason = CASE WHEN block_reason = 'none' THEN 'payment' ELSE block_reason END,
    updated_at = $2
WHERE id = $1
RETURNING *
"#;

const APPEND_WARNING_SQL: &str = r#"
UPDATE students
SET warnings = warnings || jsonb_build_array($2::jsonb),
    block_reason = CASE
        WHEN jsonb_array_length(warnings) + 1 >= $3 THEN 'disciplinary'
        ELSE block_reason
    END,
    blocked_at = CASE
        WHEN jsonb_array_length(warnings) + 1 >= $3 THEN $4
        ELSE blocked_at
    END,
    updated_at = $4
WHERE id = $1 AND jsonb_array_length(warnings) < $3
RETURNING *
"#;

const RESET_CYCLE_SQL: &str = r#"
UPDATE students
SET payment_status = 'unpaid',
    payment_deadline = $1,
    payment_warning_shown = FALSE,
    blocked_at = CASE WHEN block_reason = 'payment' THEN NULL ELSE blocked_at END,
    block_reason = CASE WHEN block_reason = 'payment' THEN 'none' ELSE block_reason END,
    updated_at = $2
WHERE role = 'offline'
"#;

/// Diesel-backed implementation of the `StudentRepository` port.
#[derive(Clone)]
pub struct DieselStudentRepository {
    pool: DbPool,
}

impl DieselStudentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain student repository errors.
fn map_pool_error(error: PoolError) -> StudentRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StudentRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain student repository errors.
fn map_diesel_error(error: diesel::result::Error) -> StudentRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StudentRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => StudentRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StudentRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StudentRepositoryError::query("student already exists")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            StudentRepositoryError::query("student row violates a table constraint")
        }
        _ => StudentRepositoryError::query("database error"),
    }
}

fn warning_to_json(warning: &Warning) -> Result<Value, StudentRepositoryError> {
    serde_json::to_value(WarningRecord {
        reason: warning.reason().to_owned(),
        date: warning.date(),
        given_by: warning.given_by().to_owned(),
    })
    .map_err(|err| StudentRepositoryError::query(format!("failed to encode warning: {err}")))
}

fn warnings_to_json(warnings: &[Warning]) -> Result<Value, StudentRepositoryError> {
    warnings
        .iter()
        .map(warning_to_json)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn warnings_from_json(value: Value) -> Result<Vec<Warning>, StudentRepositoryError> {
    let records: Vec<WarningRecord> = serde_json::from_value(value)
        .map_err(|err| StudentRepositoryError::query(format!("malformed warnings: {err}")))?;
    Ok(records
        .into_iter()
        .map(|record| Warning {
            reason: record.reason,
            date: record.date,
            given_by: record.given_by,
        })
        .collect())
}

fn parse_column<T>(value: &str, column: &str) -> Result<T, StudentRepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err| StudentRepositoryError::query(format!("invalid {column}: {err}")))
}

/// Convert a database row to a domain `Student`.
fn row_to_student(row: StudentRow) -> Result<Student, StudentRepositoryError> {
    let role: StudentRole = parse_column(&row.role, "role")?;
    let payment_status: PaymentStatus = parse_column(&row.payment_status, "payment_status")?;
    let block_reason: BlockReason = parse_column(&row.block_reason, "block_reason")?;
    let block = Block::from_parts(block_reason, row.blocked_at);
    if block.is_none() && block_reason != BlockReason::None {
        return Err(StudentRepositoryError::query(format!(
            "student {} is blocked without a timestamp",
            row.id
        )));
    }

    Ok(Student {
        id: StudentId::from_uuid(row.id),
        name: row.name,
        phone: row.phone,
        role,
        branch_id: row.branch_id,
        monthly_fee: row.monthly_fee,
        join_date: row.join_date,
        payment_status,
        last_payment_date: row.last_payment_date,
        payment_deadline: row.payment_deadline,
        payment_warning_shown: row.payment_warning_shown,
        block,
        warnings: warnings_from_json(row.warnings)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn affected_rows(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

fn max_warnings_for_db() -> i32 {
    i32::try_from(MAX_WARNINGS).unwrap_or(i32::MAX)
}

#[async_trait]
impl StudentRepository for DieselStudentRepository {
    async fn insert(&self, student: &Student) -> Result<(), StudentRepositoryError> {
        let warnings = warnings_to_json(student.warnings())?;
        let block = student.block();
        let row = NewStudentRow {
            id: *student.id().as_uuid(),
            name: student.name(),
            phone: student.phone(),
            role: student.role().as_str(),
            branch_id: student.branch_id(),
            monthly_fee: student.monthly_fee(),
            join_date: student.join_date(),
            payment_status: student.payment_status().as_str(),
            last_payment_date: student.last_payment_date(),
            payment_deadline: student.payment_deadline(),
            payment_warning_shown: student.payment_warning_shown(),
            block_reason: student.block_reason().as_str(),
            blocked_at: block.map(|active| active.since()),
            warnings,
            created_at: student.created_at(),
            updated_at: student.updated_at(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(students::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StudentRow> = students::table
            .find(*id.as_uuid())
            .select(StudentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_student).transpose()
    }

    async fn list(
        &self,
        filter: &StudentListFilter,
    ) -> Result<Vec<Student>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = students::table
            .select(StudentRow::as_select())
            .order((students::name.asc(), students::id.asc()))
            .into_boxed();
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(students::branch_id.eq(branch_id));
        }
        let rows: Vec<StudentRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_student).collect()
    }

    async fn update_profile(
        &self,
        id: &StudentId,
        profile: &StudentProfile,
        at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StudentRow> = diesel::update(students::table.find(*id.as_uuid()))
            .set((
                students::name.eq(profile.name.as_str()),
                students::phone.eq(profile.phone.as_str()),
                students::role.eq(profile.role.as_str()),
                students::branch_id.eq(profile.branch_id),
                students::monthly_fee.eq(profile.monthly_fee),
                students::updated_at.eq(at),
            ))
            .returning(StudentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_student).transpose()
    }

    async fn delete(&self, id: &StudentId) -> Result<bool, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(students::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn apply_payment(
        &self,
        id: &StudentId,
        transition: PaymentTransition,
    ) -> Result<Option<Student>, StudentRepositoryError> {
        let statement = match transition {
            PaymentTransition::MarkPaid { .. } => MARK_PAID_SQL,
            PaymentTransition::MarkUnpaid {
                past_deadline: false,
                ..
            } => MARK_UNPAID_WITHIN_GRACE_SQL,
            PaymentTransition::MarkUnpaid {
                past_deadline: true,
                ..
            } => MARK_UNPAID_PAST_DEADLINE_SQL,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StudentRow> = sql_query(statement)
            .bind::<SqlUuid, _>(id.as_uuid())
            .bind::<Timestamptz, _>(transition.at())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_student).transpose()
    }

    async fn append_warning(
        &self,
        id: &StudentId,
        warning: &Warning,
    ) -> Result<WarningAppend, StudentRepositoryError> {
        let entry = warning_to_json(warning)?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StudentRow> = sql_query(APPEND_WARNING_SQL)
            .bind::<SqlUuid, _>(id.as_uuid())
            .bind::<Jsonb, _>(&entry)
            .bind::<Integer, _>(max_warnings_for_db())
            .bind::<Timestamptz, _>(warning.date())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        if let Some(row) = row {
            return row_to_student(row).map(WarningAppend::Recorded);
        }

        let exists: bool = diesel::select(diesel::dsl::exists(students::table.find(*id.as_uuid())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(if exists {
            WarningAppend::LimitReached
        } else {
            WarningAppend::NotFound
        })
    }

    async fn unblock(
        &self,
        id: &StudentId,
        at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StudentRow> = diesel::update(students::table.find(*id.as_uuid()))
            .set((
                students::block_reason.eq(BlockReason::None.as_str()),
                students::blocked_at.eq(None::<DateTime<Utc>>),
                students::warnings.eq(Value::Array(Vec::new())),
                students::updated_at.eq(at),
            ))
            .returning(StudentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_student).transpose()
    }

    async fn reset_cycle(&self, reset: &CycleReset) -> Result<u64, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = sql_query(RESET_CYCLE_SQL)
            .bind::<Timestamptz, _>(reset.deadline)
            .bind::<Timestamptz, _>(reset.at)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected_rows(updated))
    }

    async fn enforce_deadline(&self, at: DateTime<Utc>) -> Result<u64, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            students::table
                .filter(students::role.eq(StudentRole::Offline.as_str()))
                .filter(students::payment_status.eq(PaymentStatus::Unpaid.as_str()))
                .filter(students::block_reason.eq(BlockReason::None.as_str())),
        )
        .set((
            students::block_reason.eq(BlockReason::Payment.as_str()),
            students::blocked_at.eq(Some(at)),
            students::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected_rows(updated))
    }

    async fn release_expired_blocks(
        &self,
        cutoff: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<u64, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            students::table
                .filter(students::block_reason.ne(BlockReason::None.as_str()))
                .filter(students::blocked_at.le(cutoff)),
        )
        .set((
            students::block_reason.eq(BlockReason::None.as_str()),
            students::blocked_at.eq(None::<DateTime<Utc>>),
            students::warnings.eq(Value::Array(Vec::new())),
            students::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected_rows(updated))
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion and error mapping coverage. The statements themselves
    //! run against embedded PostgreSQL in `tests/diesel_student_repository.rs`.
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use uuid::Uuid;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, day, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn row() -> StudentRow {
        StudentRow {
            id: Uuid::new_v4(),
            name: "Madina Yusupova".to_owned(),
            phone: "+998935550011".to_owned(),
            role: "offline".to_owned(),
            branch_id: None,
            monthly_fee: 350_000,
            join_date: NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date"),
            payment_status: "unpaid".to_owned(),
            last_payment_date: None,
            payment_deadline: Some(at(10)),
            payment_warning_shown: false,
            block_reason: "none".to_owned(),
            blocked_at: None,
            warnings: json!([]),
            created_at: at(1),
            updated_at: at(1),
        }
    }

    #[rstest]
    fn row_converts_to_unblocked_student(row: StudentRow) {
        let id = row.id;
        let student = row_to_student(row).expect("valid row");

        assert_eq!(*student.id().as_uuid(), id);
        assert_eq!(student.role(), StudentRole::Offline);
        assert_eq!(student.payment_status(), PaymentStatus::Unpaid);
        assert!(!student.is_blocked());
        assert!(student.warnings().is_empty());
    }

    #[rstest]
    fn row_restores_block_and_warnings(mut row: StudentRow) {
        row.block_reason = "disciplinary".to_owned();
        row.blocked_at = Some(at(3));
        row.warnings = json!([
            { "reason": "late", "date": at(1), "givenBy": "admin" },
            { "reason": "noise", "date": at(2), "givenBy": "admin" },
            { "reason": "absent", "date": at(3), "givenBy": "mentor" },
        ]);

        let student = row_to_student(row).expect("valid row");

        assert_eq!(student.block(), Some(Block::Disciplinary { since: at(3) }));
        assert_eq!(student.warnings().len(), 3);
        assert_eq!(student.warnings()[2].given_by(), "mentor");
    }

    #[rstest]
    #[case::role("role")]
    #[case::status("payment_status")]
    #[case::block("block_reason")]
    fn unknown_enum_values_are_query_errors(mut row: StudentRow, #[case] column: &str) {
        match column {
            "role" => row.role = "vip".to_owned(),
            "payment_status" => row.payment_status = "partial".to_owned(),
            _ => row.block_reason = "banned".to_owned(),
        }

        let err = row_to_student(row).expect_err("invalid column");

        assert!(matches!(err, StudentRepositoryError::Query { .. }));
        assert!(err.to_string().contains(column));
    }

    #[rstest]
    fn block_without_timestamp_is_rejected(mut row: StudentRow) {
        row.block_reason = "payment".to_owned();
        let err = row_to_student(row).expect_err("missing timestamp");
        assert!(err.to_string().contains("without a timestamp"));
    }

    #[rstest]
    fn malformed_warnings_are_rejected(mut row: StudentRow) {
        row.warnings = json!({ "reason": "late" });
        assert!(row_to_student(row).is_err());
    }

    #[rstest]
    fn warnings_encode_with_camel_case_keys() {
        let warning = crate::domain::WarningDraft::new("late", "admin")
            .expect("valid warning")
            .issue(at(4));

        let encoded = warnings_to_json(&[warning]).expect("encodes");

        assert_eq!(encoded[0]["givenBy"], "admin");
        assert_eq!(encoded[0]["reason"], "late");
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, StudentRepositoryError::connection("timed out"));
    }

    #[rstest]
    #[case::closed(DatabaseErrorKind::ClosedConnection, true)]
    #[case::unique(DatabaseErrorKind::UniqueViolation, false)]
    fn database_errors_map_by_kind(#[case] kind: DatabaseErrorKind, #[case] is_connection: bool) {
        let err = map_diesel_error(DieselError::DatabaseError(
            kind,
            Box::new("boom".to_owned()),
        ));
        assert_eq!(
            matches!(err, StudentRepositoryError::Connection { .. }),
            is_connection
        );
    }
}
