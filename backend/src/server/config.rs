//! HTTP server configuration object and helpers.

use backend::domain::BillingCalendar;
use backend::outbound::persistence::DbPool;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) calendar: BillingCalendar,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) scheduler_enabled: bool,
}

impl ServerConfig {
    /// Listen on `bind_addr` with the in-memory store and the scheduler on.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, calendar: BillingCalendar) -> Self {
        Self {
            bind_addr,
            calendar,
            db_pool: None,
            scheduler_enabled: true,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, students are stored in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Enable or disable the monthly payment sweeps.
    #[must_use]
    pub fn with_scheduler(mut self, enabled: bool) -> Self {
        self.scheduler_enabled = enabled;
        self
    }
}
