//! Driving port for student reads.

use async_trait::async_trait;

use super::StudentListFilter;
use crate::domain::{Error, PaymentAccess, Student, StudentId};

/// Driving port for student reads.
///
/// Listing is not side-effect free: it first releases students whose block
/// has outlived the amnesty period.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentQuery: Send + Sync {
    /// List students, applying amnesty first.
    async fn list(&self, filter: StudentListFilter) -> Result<Vec<Student>, Error>;

    /// Fetch one student.
    async fn get(&self, id: &StudentId) -> Result<Student, Error>;

    /// Decide whether the student may currently view their progress.
    async fn payment_access(&self, id: &StudentId) -> Result<PaymentAccess, Error>;
}
