//! Access decision derived from payment and block state.

use chrono::{DateTime, Utc};

use super::billing_calendar::BillingCalendar;
use super::student::{Block, BlockReason, PaymentStatus, Student};

/// Whether a student may view their progress right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAccess {
    /// The current month is paid.
    Granted,
    /// Unpaid but still inside the grace window.
    GrantedWithReminder {
        /// Deadline the student must pay by.
        deadline: DateTime<Utc>,
    },
    /// Access is suspended.
    Denied {
        /// Why access is suspended.
        reason: BlockReason,
    },
}

impl PaymentAccess {
    /// Evaluate access for `student` at `now`.
    ///
    /// Disciplinary blocks always deny. Otherwise a paid month grants access,
    /// and an unpaid month grants access with a reminder until the local
    /// deadline has passed.
    #[must_use]
    pub fn evaluate(student: &Student, calendar: &BillingCalendar, now: DateTime<Utc>) -> Self {
        if let Some(Block::Disciplinary { .. }) = student.block() {
            return Self::Denied {
                reason: BlockReason::Disciplinary,
            };
        }
        if student.payment_status() == PaymentStatus::Paid {
            return Self::Granted;
        }
        if student.block().is_some() || calendar.is_past_deadline(now) {
            return Self::Denied {
                reason: BlockReason::Payment,
            };
        }
        Self::GrantedWithReminder {
            deadline: student
                .payment_deadline()
                .unwrap_or_else(|| calendar.deadline_for(now)),
        }
    }

    /// Whether the decision lets the student in.
    #[must_use]
    pub const fn can_access(&self) -> bool {
        !matches!(self, Self::Denied { .. })
    }
}
