//! Request and response payloads for the student endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::WarningOutcome;
use crate::domain::{BlockReason, PaymentAccess, Student, Warning};

/// Payload for enrolling a student.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolStudentRequest {
    /// Full name.
    #[schema(example = "Dilnoza Karimova")]
    pub name: Option<String>,
    /// Contact phone number.
    #[schema(example = "+998901234567")]
    pub phone: Option<String>,
    /// `offline` (default), `online` or `mentor`.
    #[schema(example = "offline")]
    pub role: Option<String>,
    /// Owning branch UUID.
    pub branch_id: Option<String>,
    /// Monthly fee; defaults to zero.
    #[schema(example = 450_000)]
    pub monthly_fee: Option<i64>,
    /// Join date as `YYYY-MM-DD`.
    #[schema(example = "2026-09-01")]
    pub join_date: Option<String>,
}

/// Payload for editing a student's contact and billing details.
///
/// Omitted `role` and `monthlyFee` take the enrolment defaults; an omitted
/// `branchId` clears the branch.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    /// Full name.
    #[schema(example = "Dilnoza Rakhimova")]
    pub name: Option<String>,
    /// Contact phone number.
    #[schema(example = "+998907654321")]
    pub phone: Option<String>,
    /// `offline` (default), `online` or `mentor`.
    #[schema(example = "online")]
    pub role: Option<String>,
    /// Owning branch UUID.
    pub branch_id: Option<String>,
    /// Monthly fee; defaults to zero.
    #[schema(example = 500_000)]
    pub monthly_fee: Option<i64>,
}

/// Payload for toggling the current month's payment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    /// `paid` or `unpaid`.
    #[schema(example = "paid")]
    pub status: Option<String>,
}

/// Payload for issuing a warning.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueWarningBody {
    /// Why the warning is issued.
    #[schema(example = "Missed three lessons")]
    pub reason: Option<String>,
    /// Staff member issuing the warning.
    #[schema(example = "Branch administrator")]
    pub given_by: Option<String>,
}

/// Query parameters for listing students.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListStudentsQuery {
    /// Only list students of this branch.
    pub branch_id: Option<String>,
}

/// Warning ledger entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarningResponse {
    /// Why the warning was issued.
    #[schema(example = "Missed three lessons")]
    pub reason: String,
    /// RFC 3339 timestamp of the warning.
    pub date: String,
    /// Staff member who issued it.
    pub given_by: String,
}

impl From<&Warning> for WarningResponse {
    fn from(value: &Warning) -> Self {
        Self {
            reason: value.reason().to_owned(),
            date: value.date().to_rfc3339(),
            given_by: value.given_by().to_owned(),
        }
    }
}

/// Student as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    /// Student UUID.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// `offline`, `online` or `mentor`; only offline students are swept.
    #[schema(example = "offline")]
    pub role: String,
    /// Owning branch UUID.
    pub branch_id: Option<String>,
    /// Fee owed per monthly cycle.
    pub monthly_fee: i64,
    /// Join date as `YYYY-MM-DD`.
    pub join_date: String,
    /// `paid` or `unpaid`.
    pub current_month_payment: String,
    /// When the current month was marked paid.
    pub last_payment_date: Option<String>,
    /// End of the grace window for the active cycle.
    pub payment_deadline: Option<String>,
    /// Whether the grace-period reminder was shown this cycle.
    pub payment_warning_shown: bool,
    /// Whether any block is in force.
    pub is_blocked: bool,
    /// `none`, `payment` or `disciplinary`.
    pub block_reason: String,
    /// When the active block started.
    pub blocked_at: Option<String>,
    /// Warning ledger in issue order, at most three entries.
    pub warnings: Vec<WarningResponse>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last change.
    pub updated_at: String,
}

impl From<&Student> for StudentResponse {
    fn from(value: &Student) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_owned(),
            phone: value.phone().to_owned(),
            role: value.role().as_str().to_owned(),
            branch_id: value.branch_id().map(|id| id.to_string()),
            monthly_fee: value.monthly_fee(),
            join_date: value.join_date().format("%Y-%m-%d").to_string(),
            current_month_payment: value.payment_status().as_str().to_owned(),
            last_payment_date: value.last_payment_date().map(|at| at.to_rfc3339()),
            payment_deadline: value.payment_deadline().map(|at| at.to_rfc3339()),
            payment_warning_shown: value.payment_warning_shown(),
            is_blocked: value.is_blocked(),
            block_reason: value.block_reason().as_str().to_owned(),
            blocked_at: value.blocked_at().map(|at| at.to_rfc3339()),
            warnings: value.warnings().iter().map(WarningResponse::from).collect(),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

/// Result of issuing a warning.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueWarningResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Whether this warning blocked the student.
    pub blocked: bool,
    /// Student after the warning was stored.
    pub student: StudentResponse,
}

impl From<WarningOutcome> for IssueWarningResponse {
    fn from(value: WarningOutcome) -> Self {
        let message = if value.blocked {
            "Warning issued; student blocked after the third warning"
        } else {
            "Warning issued"
        };
        Self {
            message: message.to_owned(),
            blocked: value.blocked,
            student: StudentResponse::from(&value.student),
        }
    }
}

/// Result of lifting a block.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnblockResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Student with the block and warnings cleared.
    pub student: StudentResponse,
}

/// Whether a student may currently view their progress.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAccessResponse {
    /// Whether the student may view their progress.
    pub can_access: bool,
    /// Unpaid but still inside the grace window.
    pub warning: bool,
    /// Access is suspended by a block or a missed deadline.
    pub blocked: bool,
    /// `none`, `payment` or `disciplinary`.
    pub block_reason: String,
    /// Present while a reminder is due.
    pub payment_deadline: Option<String>,
    /// Explanation shown to the student.
    pub message: String,
}

impl From<PaymentAccess> for PaymentAccessResponse {
    fn from(value: PaymentAccess) -> Self {
        match value {
            PaymentAccess::Granted => Self {
                can_access: true,
                warning: false,
                blocked: false,
                block_reason: BlockReason::None.as_str().to_owned(),
                payment_deadline: None,
                message: "Payment received".to_owned(),
            },
            PaymentAccess::GrantedWithReminder { deadline } => Self {
                can_access: true,
                warning: true,
                blocked: false,
                block_reason: BlockReason::None.as_str().to_owned(),
                payment_deadline: Some(deadline.to_rfc3339()),
                message: "Payment period is open; pay by the 10th".to_owned(),
            },
            PaymentAccess::Denied { reason } => Self {
                can_access: false,
                warning: false,
                blocked: true,
                block_reason: reason.as_str().to_owned(),
                payment_deadline: None,
                message: match reason {
                    BlockReason::Disciplinary => {
                        "Access suspended after three warnings".to_owned()
                    }
                    _ => "Payment deadline has passed; access resumes once paid".to_owned(),
                },
            },
        }
    }
}
