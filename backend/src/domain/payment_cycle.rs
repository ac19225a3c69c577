//! Monthly payment cycle transitions.
//!
//! These are pure mutations on [`Student`]. Repository adapters either call
//! them directly (the in-memory store) or mirror them as single-statement
//! updates (the PostgreSQL store); the behaviour must stay identical.

use chrono::{DateTime, Utc};

use super::billing_calendar::BillingCalendar;
use super::student::{Block, PaymentStatus, Student};

/// Parameters of a monthly cycle reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReset {
    /// Deadline of the cycle being opened.
    pub deadline: DateTime<Utc>,
    /// Instant the reset runs.
    pub at: DateTime<Utc>,
}

impl CycleReset {
    /// Build the reset for the month containing `at`.
    #[must_use]
    pub fn starting(calendar: &BillingCalendar, at: DateTime<Utc>) -> Self {
        Self {
            deadline: calendar.deadline_for(at),
            at,
        }
    }
}

/// Manual change of a student's payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTransition {
    /// Record the current month as paid.
    MarkPaid {
        /// When the payment was recorded.
        at: DateTime<Utc>,
    },
    /// Revert the current month to unpaid.
    MarkUnpaid {
        /// When the change was made.
        at: DateTime<Utc>,
        /// Whether the local day already lies after the deadline.
        past_deadline: bool,
    },
}

impl PaymentTransition {
    /// Build the transition for a requested status at `at`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{BillingCalendar, PaymentStatus, PaymentTransition};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let calendar = BillingCalendar::default();
    /// let at = Utc.with_ymd_and_hms(2026, 5, 15, 6, 0, 0).single().expect("valid time");
    /// let transition = PaymentTransition::for_status(PaymentStatus::Unpaid, at, &calendar);
    /// assert_eq!(
    ///     transition,
    ///     PaymentTransition::MarkUnpaid { at, past_deadline: true }
    /// );
    /// ```
    #[must_use]
    pub fn for_status(status: PaymentStatus, at: DateTime<Utc>, calendar: &BillingCalendar) -> Self {
        match status {
            PaymentStatus::Paid => Self::MarkPaid { at },
            PaymentStatus::Unpaid => Self::MarkUnpaid {
                at,
                past_deadline: calendar.is_past_deadline(at),
            },
        }
    }

    /// Instant the transition takes effect.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::MarkPaid { at } | Self::MarkUnpaid { at, .. } => *at,
        }
    }

    /// Status the student ends up in.
    #[must_use]
    pub const fn status(&self) -> PaymentStatus {
        match self {
            Self::MarkPaid { .. } => PaymentStatus::Paid,
            Self::MarkUnpaid { .. } => PaymentStatus::Unpaid,
        }
    }
}

impl Student {
    /// Whether the monthly sweeps apply to this student.
    #[must_use]
    pub const fn is_swept_by_cycle(&self) -> bool {
        self.role.is_fee_paying()
    }

    /// Open a new payment cycle.
    ///
    /// Returns `false` and leaves the student untouched when the role is not
    /// fee-paying. Disciplinary blocks survive the reset.
    pub fn reset_cycle(&mut self, reset: &CycleReset) -> bool {
        if !self.is_swept_by_cycle() {
            return false;
        }
        self.payment_status = PaymentStatus::Unpaid;
        self.payment_deadline = Some(reset.deadline);
        self.payment_warning_shown = false;
        self.clear_payment_block();
        self.updated_at = reset.at;
        true
    }

    /// Block an unpaid student once the grace window has closed.
    ///
    /// Returns `true` only when a new block was applied. Students that are
    /// paid, already blocked or not fee-paying are left untouched.
    pub fn enforce_deadline(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_swept_by_cycle()
            || self.payment_status != PaymentStatus::Unpaid
            || self.block.is_some()
        {
            return false;
        }
        self.block = Some(Block::Payment { since: at });
        self.updated_at = at;
        true
    }

    /// Apply a manual payment toggle.
    pub fn apply_payment(&mut self, transition: PaymentTransition) {
        match transition {
            PaymentTransition::MarkPaid { at } => {
                self.payment_status = PaymentStatus::Paid;
                self.last_payment_date = Some(at);
                self.payment_warning_shown = false;
                self.clear_payment_block();
            }
            PaymentTransition::MarkUnpaid { at, past_deadline } => {
                self.payment_status = PaymentStatus::Unpaid;
                self.last_payment_date = None;
                if !past_deadline {
                    self.clear_payment_block();
                } else if self.block.is_none() {
                    self.block = Some(Block::Payment { since: at });
                }
            }
        }
        self.updated_at = transition.at();
    }

    fn clear_payment_block(&mut self) {
        if matches!(self.block, Some(Block::Payment { .. })) {
            self.block = None;
        }
    }
}

#[cfg(test)]
mod tests {
    //! Transition coverage for the monthly payment cycle.
    use super::*;
    use crate::domain::student::{BlockReason, StudentDraft, StudentId, StudentRole};
    use chrono::{NaiveDate, TimeZone};
    use rstest::{fixture, rstest};

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, d, h, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn student_with_role(role: StudentRole) -> Student {
        let draft = StudentDraft {
            name: "Jasur Aliyev".to_owned(),
            phone: "+998935550011".to_owned(),
            role,
            branch_id: None,
            monthly_fee: 400_000,
            join_date: NaiveDate::from_ymd_opt(2026, 5, 5).expect("valid date"),
        };
        Student::enrol(StudentId::random(), draft, utc(10, 18), utc(5, 6)).expect("valid draft")
    }

    #[fixture]
    fn student() -> Student {
        student_with_role(StudentRole::Offline)
    }

    #[fixture]
    fn reset() -> CycleReset {
        CycleReset::starting(&BillingCalendar::default(), utc(1, 0))
    }

    #[rstest]
    fn reset_is_idempotent(mut student: Student, reset: CycleReset) {
        student.apply_payment(PaymentTransition::MarkPaid { at: utc(6, 6) });
        student.payment_warning_shown = true;

        assert!(student.reset_cycle(&reset));
        let once = student.clone();
        assert!(student.reset_cycle(&reset));

        assert_eq!(student, once);
        assert_eq!(student.payment_status(), PaymentStatus::Unpaid);
        assert_eq!(student.payment_deadline(), Some(reset.deadline));
        assert!(!student.payment_warning_shown());
        assert!(!student.is_blocked());
    }

    #[rstest]
    fn reset_clears_payment_block(mut student: Student, reset: CycleReset) {
        assert!(student.enforce_deadline(utc(11, 0)));
        student.reset_cycle(&reset);
        assert_eq!(student.block_reason(), BlockReason::None);
    }

    #[rstest]
    fn reset_keeps_disciplinary_block(mut student: Student, reset: CycleReset) {
        student.block = Some(Block::Disciplinary { since: utc(3, 8) });
        student.reset_cycle(&reset);
        assert_eq!(student.block(), Some(Block::Disciplinary { since: utc(3, 8) }));
    }

    #[rstest]
    #[case(StudentRole::Online)]
    #[case(StudentRole::Mentor)]
    fn sweeps_skip_non_paying_roles(#[case] role: StudentRole, reset: CycleReset) {
        let mut student = student_with_role(role);
        let before = student.clone();
        assert!(!student.reset_cycle(&reset));
        assert!(!student.enforce_deadline(utc(11, 0)));
        assert_eq!(student, before);
    }

    #[rstest]
    fn enforcement_blocks_unpaid_students(mut student: Student) {
        assert!(student.enforce_deadline(utc(11, 0)));
        assert_eq!(student.block(), Some(Block::Payment { since: utc(11, 0) }));
        assert_eq!(student.updated_at(), utc(11, 0));
    }

    #[rstest]
    fn enforcement_leaves_paid_students_untouched(mut student: Student) {
        student.apply_payment(PaymentTransition::MarkPaid { at: utc(6, 6) });
        let before = student.clone();
        assert!(!student.enforce_deadline(utc(11, 0)));
        assert_eq!(student, before);
    }

    #[rstest]
    fn enforcement_is_idempotent_and_keeps_first_timestamp(mut student: Student) {
        student.enforce_deadline(utc(11, 0));
        assert!(!student.enforce_deadline(utc(11, 5)));
        assert_eq!(student.blocked_at(), Some(utc(11, 0)));
    }

    #[rstest]
    fn enforcement_never_replaces_disciplinary_block(mut student: Student) {
        student.block = Some(Block::Disciplinary { since: utc(2, 9) });
        assert!(!student.enforce_deadline(utc(11, 0)));
        assert_eq!(student.block_reason(), BlockReason::Disciplinary);
    }

    #[rstest]
    fn mark_paid_lifts_payment_block(mut student: Student) {
        student.enforce_deadline(utc(11, 0));
        student.payment_warning_shown = true;
        student.apply_payment(PaymentTransition::MarkPaid { at: utc(12, 9) });

        assert_eq!(student.payment_status(), PaymentStatus::Paid);
        assert_eq!(student.last_payment_date(), Some(utc(12, 9)));
        assert!(!student.payment_warning_shown());
        assert!(!student.is_blocked());
    }

    #[rstest]
    fn mark_paid_keeps_disciplinary_block(mut student: Student) {
        student.block = Some(Block::Disciplinary { since: utc(2, 9) });
        student.apply_payment(PaymentTransition::MarkPaid { at: utc(12, 9) });
        assert_eq!(student.block_reason(), BlockReason::Disciplinary);
    }

    #[rstest]
    fn mark_unpaid_after_deadline_reblocks_immediately(mut student: Student) {
        student.apply_payment(PaymentTransition::MarkPaid { at: utc(3, 9) });
        student.apply_payment(PaymentTransition::MarkUnpaid {
            at: utc(15, 9),
            past_deadline: true,
        });

        assert_eq!(student.payment_status(), PaymentStatus::Unpaid);
        assert!(student.last_payment_date().is_none());
        assert_eq!(student.block(), Some(Block::Payment { since: utc(15, 9) }));
    }

    #[rstest]
    fn mark_unpaid_within_grace_leaves_student_unblocked(mut student: Student) {
        student.apply_payment(PaymentTransition::MarkPaid { at: utc(3, 9) });
        student.apply_payment(PaymentTransition::MarkUnpaid {
            at: utc(7, 9),
            past_deadline: false,
        });
        assert!(!student.is_blocked());
    }

    #[rstest]
    fn mark_unpaid_never_replaces_disciplinary_block(mut student: Student) {
        student.block = Some(Block::Disciplinary { since: utc(2, 9) });
        student.apply_payment(PaymentTransition::MarkUnpaid {
            at: utc(15, 9),
            past_deadline: true,
        });
        assert_eq!(student.block(), Some(Block::Disciplinary { since: utc(2, 9) }));
    }

    #[rstest]
    #[case::grace(utc(10, 18), false)]
    #[case::after_deadline(utc(10, 19), true)]
    fn transition_derives_deadline_from_local_day(
        #[case] at: DateTime<Utc>,
        #[case] past_deadline: bool,
    ) {
        let transition =
            PaymentTransition::for_status(PaymentStatus::Unpaid, at, &BillingCalendar::default());
        assert_eq!(transition, PaymentTransition::MarkUnpaid { at, past_deadline });
        assert_eq!(transition.status(), PaymentStatus::Unpaid);
    }
}
