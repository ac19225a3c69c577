//! Student domain service implementing the command and query driving ports.
//!
//! The service owns time: every transition is stamped with the injected
//! clock and evaluated on the injected [`BillingCalendar`]. Persistence and
//! atomicity are delegated to the [`StudentRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    IssueWarningRequest, StudentCommand, StudentListFilter, StudentQuery, StudentRepository,
    StudentRepositoryError, WarningAppend, WarningOutcome,
};
use crate::domain::{
    BillingCalendar, BlockReason, Error, MAX_WARNINGS, PaymentAccess, PaymentStatus,
    PaymentTransition, Student, StudentDraft, StudentId, StudentProfile, StudentValidationError,
    WarningDraft, WarningError, amnesty_cutoff,
};

/// Student service implementing [`StudentCommand`] and [`StudentQuery`].
#[derive(Clone)]
pub struct StudentService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    calendar: BillingCalendar,
}

impl<R> StudentService<R> {
    /// Create a service over `repo`.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use backend::domain::{BillingCalendar, StudentService};
    /// # use backend::outbound::memory::InMemoryStudentRepository;
    /// # use mockable::DefaultClock;
    /// let service = StudentService::new(
    ///     Arc::new(InMemoryStudentRepository::default()),
    ///     Arc::new(DefaultClock),
    ///     BillingCalendar::default(),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, calendar: BillingCalendar) -> Self {
        Self {
            repo,
            clock,
            calendar,
        }
    }
}

fn map_repository_error(error: StudentRepositoryError) -> Error {
    match error {
        StudentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("student repository unavailable: {message}"))
        }
        StudentRepositoryError::Query { message } => {
            Error::internal(format!("student repository error: {message}"))
        }
    }
}

fn student_not_found(id: &StudentId) -> Error {
    Error::not_found("student not found").with_details(json!({
        "studentId": id.to_string(),
        "code": "student_not_found",
    }))
}

fn invalid_field(message: String, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn map_student_validation(error: StudentValidationError) -> Error {
    let (field, code) = match &error {
        StudentValidationError::InvalidId => ("id", "invalid_id"),
        StudentValidationError::EmptyName => ("name", "empty_name"),
        StudentValidationError::EmptyPhone => ("phone", "empty_phone"),
        StudentValidationError::NegativeFee => ("monthlyFee", "negative_fee"),
        StudentValidationError::UnknownValue { .. } => ("role", "unknown_value"),
    };
    invalid_field(error.to_string(), field, code)
}

fn map_warning_error(error: WarningError) -> Error {
    let (field, code) = match &error {
        WarningError::EmptyReason => ("reason", "empty_reason"),
        WarningError::EmptyIssuer => ("givenBy", "empty_given_by"),
        WarningError::LimitReached => ("warnings", "warning_limit_reached"),
    };
    invalid_field(error.to_string(), field, code)
}

impl<R> StudentService<R>
where
    R: StudentRepository,
{
    async fn fetch(&self, id: &StudentId) -> Result<Student, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| student_not_found(id))
    }

    /// Release students whose block has outlived the amnesty period.
    ///
    /// Failures are logged and swallowed so listing still succeeds.
    async fn apply_amnesty(&self) {
        let now = self.clock.utc();
        match self
            .repo
            .release_expired_blocks(amnesty_cutoff(now), now)
            .await
        {
            Ok(0) => {}
            Ok(released) => info!(released, "amnesty released long-standing blocks"),
            Err(error) => warn!(%error, "amnesty sweep failed; listing without it"),
        }
    }
}

#[async_trait]
impl<R> StudentCommand for StudentService<R>
where
    R: StudentRepository,
{
    async fn enrol(&self, draft: StudentDraft) -> Result<Student, Error> {
        let now = self.clock.utc();
        let deadline = self.calendar.deadline_for(now);
        let student = Student::enrol(StudentId::random(), draft, deadline, now)
            .map_err(map_student_validation)?;
        self.repo
            .insert(&student)
            .await
            .map_err(map_repository_error)?;
        info!(student_id = %student.id(), role = %student.role(), "student enrolled");
        Ok(student)
    }

    async fn update(&self, id: &StudentId, profile: StudentProfile) -> Result<Student, Error> {
        let profile = profile.validated().map_err(map_student_validation)?;
        let student = self
            .repo
            .update_profile(id, &profile, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| student_not_found(id))?;
        info!(student_id = %id, role = %student.role(), "student profile updated");
        Ok(student)
    }

    async fn delete(&self, id: &StudentId) -> Result<(), Error> {
        let deleted = self.repo.delete(id).await.map_err(map_repository_error)?;
        if !deleted {
            return Err(student_not_found(id));
        }
        info!(student_id = %id, "student deleted");
        Ok(())
    }

    async fn set_payment_status(
        &self,
        id: &StudentId,
        status: PaymentStatus,
    ) -> Result<Student, Error> {
        let transition = PaymentTransition::for_status(status, self.clock.utc(), &self.calendar);
        let student = self
            .repo
            .apply_payment(id, transition)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| student_not_found(id))?;
        info!(
            student_id = %id,
            status = %status,
            block_reason = %student.block_reason(),
            "payment status updated"
        );
        Ok(student)
    }

    async fn issue_warning(
        &self,
        id: &StudentId,
        request: IssueWarningRequest,
    ) -> Result<WarningOutcome, Error> {
        let warning = WarningDraft::new(&request.reason, &request.given_by)
            .map_err(map_warning_error)?
            .issue(self.clock.utc());
        match self
            .repo
            .append_warning(id, &warning)
            .await
            .map_err(map_repository_error)?
        {
            WarningAppend::Recorded(student) => {
                let blocked = student.warnings().len() == MAX_WARNINGS
                    && student.block_reason() == BlockReason::Disciplinary;
                info!(
                    student_id = %id,
                    warnings = student.warnings().len(),
                    blocked,
                    "warning issued"
                );
                Ok(WarningOutcome { student, blocked })
            }
            WarningAppend::LimitReached => Err(map_warning_error(WarningError::LimitReached)),
            WarningAppend::NotFound => Err(student_not_found(id)),
        }
    }

    async fn unblock(&self, id: &StudentId) -> Result<Student, Error> {
        let student = self
            .repo
            .unblock(id, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| student_not_found(id))?;
        info!(student_id = %id, "student unblocked");
        Ok(student)
    }
}

#[async_trait]
impl<R> StudentQuery for StudentService<R>
where
    R: StudentRepository,
{
    async fn list(&self, filter: StudentListFilter) -> Result<Vec<Student>, Error> {
        self.apply_amnesty().await;
        self.repo.list(&filter).await.map_err(map_repository_error)
    }

    async fn get(&self, id: &StudentId) -> Result<Student, Error> {
        self.fetch(id).await
    }

    async fn payment_access(&self, id: &StudentId) -> Result<PaymentAccess, Error> {
        let student = self.fetch(id).await?;
        Ok(PaymentAccess::evaluate(
            &student,
            &self.calendar,
            self.clock.utc(),
        ))
    }
}

#[cfg(test)]
#[path = "student_service_tests.rs"]
mod tests;
