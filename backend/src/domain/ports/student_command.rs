//! Driving port for student mutations.
//!
//! HTTP handlers call [`StudentCommand`] to enrol, edit and delete students,
//! toggle payment, issue warnings and lift blocks.

use async_trait::async_trait;

use crate::domain::{Error, PaymentStatus, Student, StudentDraft, StudentId, StudentProfile};

/// Request to issue a disciplinary warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueWarningRequest {
    /// Why the warning is issued.
    pub reason: String,
    /// Staff member issuing the warning.
    pub given_by: String,
}

/// Result of issuing a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningOutcome {
    /// Student after the warning was stored.
    pub student: Student,
    /// Whether this warning produced the disciplinary block.
    pub blocked: bool,
}

/// Driving port for student mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentCommand: Send + Sync {
    /// Enrol a new student for the current payment cycle.
    async fn enrol(&self, draft: StudentDraft) -> Result<Student, Error>;

    /// Edit name, phone, role, branch and fee.
    async fn update(&self, id: &StudentId, profile: StudentProfile) -> Result<Student, Error>;

    /// Delete a student.
    async fn delete(&self, id: &StudentId) -> Result<(), Error>;

    /// Mark the current month as paid or unpaid.
    async fn set_payment_status(
        &self,
        id: &StudentId,
        status: PaymentStatus,
    ) -> Result<Student, Error>;

    /// Append a warning, blocking the student on the third.
    async fn issue_warning(
        &self,
        id: &StudentId,
        request: IssueWarningRequest,
    ) -> Result<WarningOutcome, Error>;

    /// Lift any block and clear the warning ledger.
    async fn unblock(&self, id: &StudentId) -> Result<Student, Error>;
}
