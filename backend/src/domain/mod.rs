//! Domain primitives, transitions and services.
//!
//! Purpose: hold the payment and discipline state engine for students. The
//! transitions in [`payment_cycle`] and [`discipline`] are pure mutations on
//! [`Student`]; [`StudentService`] and the [`payment_scheduler`] drive them
//! through the [`ports::StudentRepository`] port.
//!
//! Public surface:
//! - `Student`, `Block`, `BlockReason`: the aggregate and its tagged block.
//! - `BillingCalendar`: local-calendar arithmetic for deadlines and timers.
//! - `StudentService`: implementation of the student driving ports.
//! - `PaymentScheduler`: independent monthly sweep timers.
//! - `Error`, `ErrorCode`: transport-agnostic error payload.

pub mod billing_calendar;
pub mod discipline;
pub mod error;
pub mod payment_access;
pub mod payment_cycle;
pub mod payment_scheduler;
pub mod ports;
pub mod student;
pub mod student_service;
pub mod trace_id;

pub use self::billing_calendar::{
    BillingCalendar, BillingCalendarError, DEADLINE_DAY, DEFAULT_UTC_OFFSET_MINUTES,
    ENFORCEMENT_DAY, RESET_DAY,
};
pub use self::discipline::{AMNESTY_PERIOD_DAYS, WarningDraft, WarningError, amnesty_cutoff};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::payment_access::PaymentAccess;
pub use self::payment_cycle::{CycleReset, PaymentTransition};
pub use self::payment_scheduler::{PaymentScheduler, SweepJob};
pub use self::student::{
    Block, BlockReason, MAX_WARNINGS, PaymentStatus, Student, StudentDraft, StudentId,
    StudentProfile, StudentRole, StudentValidationError, Warning,
};
pub use self::student_service::StudentService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
