//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{AppServices, build_services};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tokio::task::JoinHandle;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::students;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Running HTTP server and the scheduler tasks bound to its lifetime.
pub struct RunningServer {
    pub server: Server,
    pub scheduler: Vec<JoinHandle<()>>,
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(students::configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Starts the payment scheduler when enabled and marks the server ready once
/// the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<RunningServer> {
    let server_health_state = health_state.clone();
    let AppServices {
        http_state,
        scheduler,
    } = build_services(&config);

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr);
    let server = match server {
        Ok(server) => server.run(),
        Err(err) => {
            scheduler.iter().for_each(JoinHandle::abort);
            return Err(err);
        }
    };

    health_state.mark_ready();
    Ok(RunningServer { server, scheduler })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use backend::domain::BillingCalendar;
    use rstest::rstest;

    fn services() -> AppServices {
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().expect("socket address"),
            BillingCalendar::default(),
        )
        .with_scheduler(false);
        build_services(&config)
    }

    #[rstest]
    #[actix_web::test]
    async fn app_serves_students_and_probes() {
        let AppServices {
            http_state,
            scheduler,
        } = services();
        assert!(scheduler.is_empty());
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        let app = test::init_service(build_app(health, http_state)).await;

        for uri in ["/api/v1/students", "/health/ready", "/health/live"] {
            let res =
                test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::OK, "{uri}");
            assert!(res.headers().contains_key("trace-id"), "{uri}");
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_fails_until_marked() {
        let AppServices { http_state, .. } = services();
        let app =
            test::init_service(build_app(web::Data::new(HealthState::new()), http_state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
