//! Port for student persistence.
//!
//! Every mutating method is a single atomic operation on the backing store.
//! Adapters must reproduce the transitions in
//! [`crate::domain::payment_cycle`] and [`crate::domain::discipline`]
//! exactly; the in-memory adapter does so by calling them under a lock and
//! the PostgreSQL adapter by issuing one conditional `UPDATE` per call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    CycleReset, PaymentTransition, Student, StudentId, StudentProfile, Warning,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by student repository adapters.
    pub enum StudentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "student repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "student repository query failed: {message}",
    }
}

/// Optional filters for listing students.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentListFilter {
    /// Only return students of this branch.
    pub branch_id: Option<Uuid>,
}

/// Outcome of an atomic warning append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningAppend {
    /// The warning was stored; the student reflects any resulting block.
    Recorded(Student),
    /// The student already carries the maximum number of warnings.
    LimitReached,
    /// No student has the given identifier.
    NotFound,
}

/// Port for student storage, lookup and bulk sweeps.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Persist a newly enrolled student.
    async fn insert(&self, student: &Student) -> Result<(), StudentRepositoryError>;

    /// Fetch a student by identifier.
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, StudentRepositoryError>;

    /// List students matching `filter`, ordered by name.
    async fn list(&self, filter: &StudentListFilter)
    -> Result<Vec<Student>, StudentRepositoryError>;

    /// Replace the editable details of a student, leaving payment, block
    /// and warning state as stored.
    async fn update_profile(
        &self,
        id: &StudentId,
        profile: &StudentProfile,
        at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError>;

    /// Remove a student. Returns whether a row was deleted.
    async fn delete(&self, id: &StudentId) -> Result<bool, StudentRepositoryError>;

    /// Apply a manual payment toggle and return the updated student.
    async fn apply_payment(
        &self,
        id: &StudentId,
        transition: PaymentTransition,
    ) -> Result<Option<Student>, StudentRepositoryError>;

    /// Append a warning unless the ledger is full, blocking on the third.
    ///
    /// The limit check, the append and the block happen atomically so
    /// concurrent requests can never lose a warning or exceed the limit.
    async fn append_warning(
        &self,
        id: &StudentId,
        warning: &Warning,
    ) -> Result<WarningAppend, StudentRepositoryError>;

    /// Clear the block and warnings of a student.
    async fn unblock(
        &self,
        id: &StudentId,
        at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError>;

    /// Open a new payment cycle for every fee-paying student.
    ///
    /// Returns the number of students touched.
    async fn reset_cycle(&self, reset: &CycleReset) -> Result<u64, StudentRepositoryError>;

    /// Block every fee-paying student still unpaid and unblocked.
    ///
    /// Returns the number of students newly blocked.
    async fn enforce_deadline(&self, at: DateTime<Utc>) -> Result<u64, StudentRepositoryError>;

    /// Release every student whose block started at or before `cutoff`.
    ///
    /// Returns the number of students released.
    async fn release_expired_blocks(
        &self,
        cutoff: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<u64, StudentRepositoryError>;
}
