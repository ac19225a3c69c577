//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every student endpoint, the health probes and the
//! request/response payloads. Swagger UI serves it at `/docs` in debug
//! builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::students_dto::{
    EnrolStudentRequest, IssueWarningBody, IssueWarningResponse, PaymentAccessResponse,
    PaymentStatusRequest, StudentResponse, UnblockResponse, UpdateStudentRequest,
    WarningResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tutoring-centre CRM API",
        description = "Student payment cycle, warnings and blocks, plus health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::students::list_students,
        crate::inbound::http::students::enrol_student,
        crate::inbound::http::students::get_student,
        crate::inbound::http::students::update_student,
        crate::inbound::http::students::delete_student,
        crate::inbound::http::students::set_payment_status,
        crate::inbound::http::students::issue_warning,
        crate::inbound::http::students::unblock_student,
        crate::inbound::http::students::payment_access,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        EnrolStudentRequest,
        UpdateStudentRequest,
        PaymentStatusRequest,
        IssueWarningBody,
        WarningResponse,
        StudentResponse,
        IssueWarningResponse,
        UnblockResponse,
        PaymentAccessResponse,
    )),
    tags(
        (name = "students", description = "Enrolment, profile edits, payments, warnings and blocks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
