//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only see the
//! driving ports, so they can be tested with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{StudentCommand, StudentQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Student mutations.
    pub students: Arc<dyn StudentCommand>,
    /// Student reads and access checks.
    pub students_query: Arc<dyn StudentQuery>,
}

impl HttpState {
    /// Bundle the student ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use backend::domain::{BillingCalendar, StudentService};
    /// use backend::inbound::http::state::HttpState;
    /// use backend::outbound::memory::InMemoryStudentRepository;
    /// use mockable::DefaultClock;
    ///
    /// let service = Arc::new(StudentService::new(
    ///     Arc::new(InMemoryStudentRepository::default()),
    ///     Arc::new(DefaultClock),
    ///     BillingCalendar::default(),
    /// ));
    /// let state = HttpState::new(service.clone(), service);
    /// let _students = state.students.clone();
    /// ```
    pub fn new(students: Arc<dyn StudentCommand>, students_query: Arc<dyn StudentQuery>) -> Self {
        Self {
            students,
            students_query,
        }
    }
}
