//! Student HTTP handlers.
//!
//! ```text
//! GET    /api/v1/students?branchId=
//! POST   /api/v1/students
//! GET    /api/v1/students/{id}
//! PUT    /api/v1/students/{id}
//! DELETE /api/v1/students/{id}
//! PUT    /api/v1/students/{id}/payment
//! POST   /api/v1/students/{id}/warnings
//! POST   /api/v1/students/{id}/unblock
//! GET    /api/v1/students/{id}/payment-access
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::ports::{IssueWarningRequest, StudentListFilter};
use crate::domain::{Error, PaymentStatus, StudentDraft, StudentProfile, StudentRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::students_dto::{
    EnrolStudentRequest, IssueWarningBody, IssueWarningResponse, ListStudentsQuery,
    PaymentAccessResponse, PaymentStatusRequest, StudentResponse, UnblockResponse,
    UpdateStudentRequest,
};
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_choice, parse_date, parse_student_id, parse_uuid,
};

const ROLES: &[&str] = &["offline", "online", "mentor"];
const PAYMENT_STATUSES: &[&str] = &["paid", "unpaid"];

struct ProfileFields {
    name: Option<String>,
    phone: Option<String>,
    role: Option<String>,
    branch_id: Option<String>,
    monthly_fee: Option<i64>,
}

fn parse_profile(fields: ProfileFields) -> Result<StudentProfile, Error> {
    let name = fields
        .name
        .ok_or_else(|| missing_field_error(FieldName::new("name")))?;
    let phone = fields
        .phone
        .ok_or_else(|| missing_field_error(FieldName::new("phone")))?;
    let role = fields
        .role
        .map(|role| parse_choice::<StudentRole>(&role, FieldName::new("role"), ROLES))
        .transpose()?
        .unwrap_or_default();
    let branch_id = fields
        .branch_id
        .map(|id| parse_uuid(&id, FieldName::new("branchId")))
        .transpose()?;

    Ok(StudentProfile {
        name,
        phone,
        role,
        branch_id,
        monthly_fee: fields.monthly_fee.unwrap_or(0),
    })
}

fn parse_enrolment(payload: EnrolStudentRequest) -> Result<StudentDraft, Error> {
    let EnrolStudentRequest {
        name,
        phone,
        role,
        branch_id,
        monthly_fee,
        join_date,
    } = payload;
    let profile = parse_profile(ProfileFields {
        name,
        phone,
        role,
        branch_id,
        monthly_fee,
    })?;
    let join_date = join_date.ok_or_else(|| missing_field_error(FieldName::new("joinDate")))?;

    Ok(StudentDraft {
        name: profile.name,
        phone: profile.phone,
        role: profile.role,
        branch_id: profile.branch_id,
        monthly_fee: profile.monthly_fee,
        join_date: parse_date(&join_date, FieldName::new("joinDate"))?,
    })
}

fn parse_update(payload: UpdateStudentRequest) -> Result<StudentProfile, Error> {
    let UpdateStudentRequest {
        name,
        phone,
        role,
        branch_id,
        monthly_fee,
    } = payload;
    parse_profile(ProfileFields {
        name,
        phone,
        role,
        branch_id,
        monthly_fee,
    })
}

fn parse_payment_status(payload: PaymentStatusRequest) -> Result<PaymentStatus, Error> {
    let status = payload
        .status
        .ok_or_else(|| missing_field_error(FieldName::new("status")))?;
    parse_choice(&status, FieldName::new("status"), PAYMENT_STATUSES)
}

fn parse_warning(payload: IssueWarningBody) -> Result<IssueWarningRequest, Error> {
    Ok(IssueWarningRequest {
        reason: payload
            .reason
            .ok_or_else(|| missing_field_error(FieldName::new("reason")))?,
        given_by: payload
            .given_by
            .ok_or_else(|| missing_field_error(FieldName::new("givenBy")))?,
    })
}

/// List students, releasing blocks older than a year first.
#[utoipa::path(
    get,
    path = "/api/v1/students",
    params(ListStudentsQuery),
    responses(
        (status = 200, description = "Students sorted by name", body = [StudentResponse]),
        (status = 400, description = "Invalid branch id", body = Error),
        (status = 503, description = "Student store unavailable", body = Error)
    ),
    tags = ["students"],
    operation_id = "listStudents"
)]
#[get("/students")]
pub async fn list_students(
    state: web::Data<HttpState>,
    query: web::Query<ListStudentsQuery>,
) -> ApiResult<web::Json<Vec<StudentResponse>>> {
    let branch_id = query
        .into_inner()
        .branch_id
        .map(|id| parse_uuid(&id, FieldName::new("branchId")))
        .transpose()?;
    let students = state
        .students_query
        .list(StudentListFilter { branch_id })
        .await?;
    Ok(web::Json(
        students.iter().map(StudentResponse::from).collect(),
    ))
}

/// Enrol a student for the current payment cycle.
#[utoipa::path(
    post,
    path = "/api/v1/students",
    request_body = EnrolStudentRequest,
    responses(
        (status = 201, description = "Student enrolled", body = StudentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Student store unavailable", body = Error)
    ),
    tags = ["students"],
    operation_id = "enrolStudent"
)]
#[post("/students")]
pub async fn enrol_student(
    state: web::Data<HttpState>,
    payload: web::Json<EnrolStudentRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_enrolment(payload.into_inner())?;
    let student = state.students.enrol(draft).await?;
    Ok(HttpResponse::Created().json(StudentResponse::from(&student)))
}

/// Fetch one student.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    params(("id" = String, Path, description = "Student UUID")),
    responses(
        (status = 200, description = "Student", body = StudentResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "getStudent"
)]
#[get("/students/{id}")]
pub async fn get_student(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<StudentResponse>> {
    let id = parse_student_id(&path.into_inner())?;
    let student = state.students_query.get(&id).await?;
    Ok(web::Json(StudentResponse::from(&student)))
}

/// Edit name, phone, role, branch and fee.
///
/// Payment, block and warning state are left unchanged.
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    params(("id" = String, Path, description = "Student UUID")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Updated student", body = StudentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "updateStudent"
)]
#[put("/students/{id}")]
pub async fn update_student(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateStudentRequest>,
) -> ApiResult<web::Json<StudentResponse>> {
    let id = parse_student_id(&path.into_inner())?;
    let profile = parse_update(payload.into_inner())?;
    let student = state.students.update(&id, profile).await?;
    Ok(web::Json(StudentResponse::from(&student)))
}

/// Delete a student.
#[utoipa::path(
    delete,
    path = "/api/v1/students/{id}",
    params(("id" = String, Path, description = "Student UUID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "deleteStudent"
)]
#[delete("/students/{id}")]
pub async fn delete_student(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_student_id(&path.into_inner())?;
    state.students.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mark the current month paid or unpaid.
///
/// Marking unpaid after the 10th blocks the student immediately.
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}/payment",
    params(("id" = String, Path, description = "Student UUID")),
    request_body = PaymentStatusRequest,
    responses(
        (status = 200, description = "Updated student", body = StudentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "setPaymentStatus"
)]
#[put("/students/{id}/payment")]
pub async fn set_payment_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<PaymentStatusRequest>,
) -> ApiResult<web::Json<StudentResponse>> {
    let id = parse_student_id(&path.into_inner())?;
    let status = parse_payment_status(payload.into_inner())?;
    let student = state.students.set_payment_status(&id, status).await?;
    Ok(web::Json(StudentResponse::from(&student)))
}

/// Issue a warning; the third blocks the student.
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/warnings",
    params(("id" = String, Path, description = "Student UUID")),
    request_body = IssueWarningBody,
    responses(
        (status = 200, description = "Warning recorded", body = IssueWarningResponse),
        (status = 400, description = "Invalid warning or limit reached", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "issueWarning"
)]
#[post("/students/{id}/warnings")]
pub async fn issue_warning(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<IssueWarningBody>,
) -> ApiResult<web::Json<IssueWarningResponse>> {
    let id = parse_student_id(&path.into_inner())?;
    let request = parse_warning(payload.into_inner())?;
    let outcome = state.students.issue_warning(&id, request).await?;
    Ok(web::Json(IssueWarningResponse::from(outcome)))
}

/// Lift any block and clear the warnings.
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/unblock",
    params(("id" = String, Path, description = "Student UUID")),
    responses(
        (status = 200, description = "Student unblocked", body = UnblockResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "unblockStudent"
)]
#[post("/students/{id}/unblock")]
pub async fn unblock_student(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UnblockResponse>> {
    let id = parse_student_id(&path.into_inner())?;
    let student = state.students.unblock(&id).await?;
    Ok(web::Json(UnblockResponse {
        message: "Student unblocked".to_owned(),
        student: StudentResponse::from(&student),
    }))
}

/// Decide whether the student may view their progress.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/payment-access",
    params(("id" = String, Path, description = "Student UUID")),
    responses(
        (status = 200, description = "Access decision", body = PaymentAccessResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "getPaymentAccess"
)]
#[get("/students/{id}/payment-access")]
pub async fn payment_access(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PaymentAccessResponse>> {
    let id = parse_student_id(&path.into_inner())?;
    let access = state.students_query.payment_access(&id).await?;
    Ok(web::Json(PaymentAccessResponse::from(access)))
}

/// Register every student handler on a scope or app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_students)
        .service(enrol_student)
        .service(get_student)
        .service(update_student)
        .service(delete_student)
        .service(set_payment_status)
        .service(issue_warning)
        .service(unblock_student)
        .service(payment_access);
}

#[cfg(test)]
#[path = "students_tests.rs"]
mod tests;
