//! Builders wiring the student repository into services and the scheduler.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tokio::task::JoinHandle;
use tracing::info;

use backend::domain::ports::StudentRepository;
use backend::domain::{BillingCalendar, PaymentScheduler, StudentService};
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::InMemoryStudentRepository;
use backend::outbound::persistence::DieselStudentRepository;

use super::ServerConfig;

/// HTTP state plus the scheduler tasks started alongside it.
pub(crate) struct AppServices {
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) scheduler: Vec<JoinHandle<()>>,
}

fn wire<R>(repo: Arc<R>, calendar: BillingCalendar, scheduler_enabled: bool) -> AppServices
where
    R: StudentRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let service = Arc::new(StudentService::new(
        Arc::clone(&repo),
        Arc::clone(&clock),
        calendar,
    ));
    let http_state = web::Data::new(HttpState::new(service.clone(), service));

    let scheduler = if scheduler_enabled {
        let scheduler = Arc::new(PaymentScheduler::new(repo, clock, calendar));
        scheduler.spawn()
    } else {
        info!("payment scheduler disabled");
        Vec::new()
    };

    AppServices {
        http_state,
        scheduler,
    }
}

/// Build services over PostgreSQL when a pool is configured, otherwise over
/// an in-memory store.
pub(crate) fn build_services(config: &ServerConfig) -> AppServices {
    match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL student repository");
            wire(
                Arc::new(DieselStudentRepository::new(pool.clone())),
                config.calendar,
                config.scheduler_enabled,
            )
        }
        None => {
            info!("using in-memory student repository");
            wire(
                Arc::new(InMemoryStudentRepository::default()),
                config.calendar,
                config.scheduler_enabled,
            )
        }
    }
}
