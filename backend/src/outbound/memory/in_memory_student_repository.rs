//! In-memory implementation of the student repository.
//!
//! One mutex guards the whole collection, so every repository call is
//! atomic with respect to every other. Transitions are delegated to the
//! domain methods on [`Student`].

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::ports::{
    StudentListFilter, StudentRepository, StudentRepositoryError, WarningAppend,
};
use crate::domain::{CycleReset, PaymentTransition, Student, StudentId, StudentProfile, Warning};

/// Student store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStudentRepository {
    students: Mutex<BTreeMap<StudentId, Student>>,
}

impl InMemoryStudentRepository {
    /// Create a store seeded with `students`.
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        Self {
            students: Mutex::new(
                students
                    .into_iter()
                    .map(|student| (student.id(), student))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<StudentId, Student>>, StudentRepositoryError> {
        self.students.lock().map_err(|_| {
            debug!("in-memory student store mutex poisoned");
            StudentRepositoryError::query("student store lock poisoned")
        })
    }

    fn update<T>(
        &self,
        id: &StudentId,
        mutate: impl FnOnce(&mut Student) -> T,
    ) -> Result<Option<T>, StudentRepositoryError> {
        let mut students = self.lock()?;
        Ok(students.get_mut(id).map(mutate))
    }

    fn sweep(&self, mut apply: impl FnMut(&mut Student) -> bool) -> Result<u64, StudentRepositoryError> {
        let mut students = self.lock()?;
        let affected = students
            .values_mut()
            .fold(0_u64, |count, student| count + u64::from(apply(student)));
        Ok(affected)
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn insert(&self, student: &Student) -> Result<(), StudentRepositoryError> {
        let mut students = self.lock()?;
        if students.contains_key(&student.id()) {
            return Err(StudentRepositoryError::query(format!(
                "student {} already exists",
                student.id()
            )));
        }
        students.insert(student.id(), student.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, StudentRepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &StudentListFilter,
    ) -> Result<Vec<Student>, StudentRepositoryError> {
        let students = self.lock()?;
        let mut matching: Vec<Student> = students
            .values()
            .filter(|student| {
                filter
                    .branch_id
                    .is_none_or(|branch| student.branch_id() == Some(branch))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));
        Ok(matching)
    }

    async fn update_profile(
        &self,
        id: &StudentId,
        profile: &StudentProfile,
        at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError> {
        self.update(id, |student| {
            student.update_profile(profile.clone(), at);
            student.clone()
        })
    }

    async fn delete(&self, id: &StudentId) -> Result<bool, StudentRepositoryError> {
        Ok(self.lock()?.remove(id).is_some())
    }

    async fn apply_payment(
        &self,
        id: &StudentId,
        transition: PaymentTransition,
    ) -> Result<Option<Student>, StudentRepositoryError> {
        self.update(id, |student| {
            student.apply_payment(transition);
            student.clone()
        })
    }

    async fn append_warning(
        &self,
        id: &StudentId,
        warning: &Warning,
    ) -> Result<WarningAppend, StudentRepositoryError> {
        let outcome = self.update(id, |student| {
            match student.issue_warning(warning.clone()) {
                Ok(_) => WarningAppend::Recorded(student.clone()),
                Err(_) => WarningAppend::LimitReached,
            }
        })?;
        Ok(outcome.unwrap_or(WarningAppend::NotFound))
    }

    async fn unblock(
        &self,
        id: &StudentId,
        at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError> {
        self.update(id, |student| {
            student.unblock(at);
            student.clone()
        })
    }

    async fn reset_cycle(&self, reset: &CycleReset) -> Result<u64, StudentRepositoryError> {
        self.sweep(|student| student.reset_cycle(reset))
    }

    async fn enforce_deadline(&self, at: DateTime<Utc>) -> Result<u64, StudentRepositoryError> {
        self.sweep(|student| student.enforce_deadline(at))
    }

    async fn release_expired_blocks(
        &self,
        cutoff: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<u64, StudentRepositoryError> {
        self.sweep(|student| student.release_if_expired(cutoff, at))
    }
}
