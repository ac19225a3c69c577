//! Student aggregate.
//!
//! A student carries two independent pieces of state that the engine
//! mutates: the monthly payment cycle (see [`crate::domain::payment_cycle`])
//! and the disciplinary warning ledger (see [`crate::domain::discipline`]).
//! Both feed a single tagged [`Block`] so callers can always tell why a
//! student is suspended.
//!
//! ## Invariants
//! - `warnings.len() <= MAX_WARNINGS`.
//! - A [`PaymentStatus::Paid`] student never carries a [`Block::Payment`].
//! - A payment block never replaces a disciplinary block.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of warnings that triggers a disciplinary block.
pub const MAX_WARNINGS: usize = 3;

/// Validation errors raised while building students and their identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudentValidationError {
    /// The identifier is not a UUID.
    #[error("student id must be a valid UUID")]
    InvalidId,
    /// The student's name is blank.
    #[error("student name must not be empty")]
    EmptyName,
    /// The student's phone number is blank.
    #[error("student phone must not be empty")]
    EmptyPhone,
    /// The monthly fee is negative.
    #[error("monthly fee must not be negative")]
    NegativeFee,
    /// A stored enum value is not recognised.
    #[error("unknown {kind} value: {value}")]
    UnknownValue {
        /// Which enumeration failed to parse.
        kind: &'static str,
        /// The raw value.
        value: String,
    },
}

/// Stable student identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(Uuid);

impl StudentId {
    /// Validate and construct a [`StudentId`] from text.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::StudentId;
    ///
    /// let id = StudentId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, StudentValidationError> {
        Uuid::parse_str(id.as_ref().trim())
            .map(Self)
            .map_err(|_| StudentValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudentId {
    type Err = StudentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<StudentId> for String {
    fn from(value: StudentId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for StudentId {
    type Error = StudentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Generates `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// variants map one-to-one onto stable lowercase identifiers.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Stable lowercase identifier used in storage and JSON.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = StudentValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(StudentValidationError::UnknownValue {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Enrolment role of a student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentRole {
    /// Attends classes in a branch and pays a monthly fee.
    #[default]
    Offline,
    /// Studies remotely; not swept by the payment scheduler.
    Online,
    /// Senior student acting as a mentor; not billed.
    Mentor,
}

string_enum!(StudentRole, "role", {
    Offline => "offline",
    Online => "online",
    Mentor => "mentor",
});

impl StudentRole {
    /// Whether the monthly payment cycle applies to this role.
    #[must_use]
    pub const fn is_fee_paying(self) -> bool {
        matches!(self, Self::Offline)
    }
}

/// Payment state for the active monthly cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The current month has been paid.
    Paid,
    /// The current month is outstanding.
    #[default]
    Unpaid,
}

string_enum!(PaymentStatus, "payment status", {
    Paid => "paid",
    Unpaid => "unpaid",
});

/// Why a student is blocked, flattened for storage and transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Not blocked.
    #[default]
    None,
    /// Still unpaid after the monthly deadline.
    Payment,
    /// Three warnings were issued.
    Disciplinary,
}

string_enum!(BlockReason, "block reason", {
    None => "none",
    Payment => "payment",
    Disciplinary => "disciplinary",
});

/// Active suspension of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Blocked by deadline enforcement or by marking unpaid after the deadline.
    Payment {
        /// When the block was applied.
        since: DateTime<Utc>,
    },
    /// Blocked by the third warning.
    Disciplinary {
        /// When the block was applied.
        since: DateTime<Utc>,
    },
}

impl Block {
    /// Flattened reason for this block.
    #[must_use]
    pub const fn reason(&self) -> BlockReason {
        match self {
            Self::Payment { .. } => BlockReason::Payment,
            Self::Disciplinary { .. } => BlockReason::Disciplinary,
        }
    }

    /// Instant the block was applied.
    #[must_use]
    pub const fn since(&self) -> DateTime<Utc> {
        match self {
            Self::Payment { since } | Self::Disciplinary { since } => *since,
        }
    }

    /// Rebuild a block from its flattened storage form.
    ///
    /// Returns `None` when the reason is [`BlockReason::None`] or the
    /// timestamp is missing.
    #[must_use]
    pub fn from_parts(reason: BlockReason, since: Option<DateTime<Utc>>) -> Option<Self> {
        match (reason, since) {
            (BlockReason::Payment, Some(since)) => Some(Self::Payment { since }),
            (BlockReason::Disciplinary, Some(since)) => Some(Self::Disciplinary { since }),
            _ => None,
        }
    }
}

/// Entry in the append-only disciplinary ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub(crate) reason: String,
    pub(crate) date: DateTime<Utc>,
    pub(crate) given_by: String,
}

impl Warning {
    /// Human-readable reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// When the warning was issued.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Staff member who issued the warning.
    #[must_use]
    pub fn given_by(&self) -> &str {
        &self.given_by
    }
}

/// Input accepted when enrolling a new student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Enrolment role; defaults to offline.
    pub role: StudentRole,
    /// Owning branch, if any.
    pub branch_id: Option<Uuid>,
    /// Amount owed per monthly cycle.
    pub monthly_fee: i64,
    /// Calendar date the student joined.
    pub join_date: NaiveDate,
}

/// Editable contact and billing details of an enrolled student.
///
/// Updating a profile never touches payment, block or warning state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfile {
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Enrolment role.
    pub role: StudentRole,
    /// Owning branch, if any.
    pub branch_id: Option<Uuid>,
    /// Amount owed per monthly cycle.
    pub monthly_fee: i64,
}

impl StudentProfile {
    /// Trim text fields and check the profile is storable.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{StudentProfile, StudentRole, StudentValidationError};
    ///
    /// let profile = StudentProfile {
    ///     name: "  Jasur Aliev ".to_owned(),
    ///     phone: "+998901112233".to_owned(),
    ///     role: StudentRole::Online,
    ///     branch_id: None,
    ///     monthly_fee: 300_000,
    /// };
    /// let blank = StudentProfile { phone: " ".to_owned(), ..profile.clone() };
    /// assert_eq!(blank.validated(), Err(StudentValidationError::EmptyPhone));
    /// assert_eq!(profile.validated().expect("valid").name, "Jasur Aliev");
    /// ```
    pub fn validated(self) -> Result<Self, StudentValidationError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        let phone = self.phone.trim().to_owned();
        if phone.is_empty() {
            return Err(StudentValidationError::EmptyPhone);
        }
        if self.monthly_fee < 0 {
            return Err(StudentValidationError::NegativeFee);
        }
        Ok(Self {
            name,
            phone,
            ..self
        })
    }
}

/// Student aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub(crate) id: StudentId,
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) role: StudentRole,
    pub(crate) branch_id: Option<Uuid>,
    pub(crate) monthly_fee: i64,
    pub(crate) join_date: NaiveDate,
    pub(crate) payment_status: PaymentStatus,
    pub(crate) last_payment_date: Option<DateTime<Utc>>,
    pub(crate) payment_deadline: Option<DateTime<Utc>>,
    pub(crate) payment_warning_shown: bool,
    pub(crate) block: Option<Block>,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Student {
    /// Enrol a new student in the unpaid state with the current cycle's
    /// deadline.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{PaymentStatus, StudentDraft, StudentId, StudentRole, Student};
    /// use chrono::{NaiveDate, TimeZone, Utc};
    ///
    /// let now = Utc.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).single().expect("valid time");
    /// let deadline = Utc.with_ymd_and_hms(2026, 3, 10, 18, 59, 59).single().expect("valid time");
    /// let draft = StudentDraft {
    ///     name: "Dilnoza Karimova".to_owned(),
    ///     phone: "+998901234567".to_owned(),
    ///     role: StudentRole::Offline,
    ///     branch_id: None,
    ///     monthly_fee: 450_000,
    ///     join_date: NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date"),
    /// };
    /// let student = Student::enrol(StudentId::random(), draft, deadline, now).expect("valid draft");
    /// assert_eq!(student.payment_status(), PaymentStatus::Unpaid);
    /// assert!(!student.is_blocked());
    /// ```
    pub fn enrol(
        id: StudentId,
        draft: StudentDraft,
        payment_deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<Self, StudentValidationError> {
        let StudentDraft {
            name,
            phone,
            role,
            branch_id,
            monthly_fee,
            join_date,
        } = draft;
        let profile = StudentProfile {
            name,
            phone,
            role,
            branch_id,
            monthly_fee,
        }
        .validated()?;

        Ok(Self {
            id,
            name: profile.name,
            phone: profile.phone,
            role: profile.role,
            branch_id: profile.branch_id,
            monthly_fee: profile.monthly_fee,
            join_date,
            payment_status: PaymentStatus::Unpaid,
            last_payment_date: None,
            payment_deadline: Some(payment_deadline),
            payment_warning_shown: false,
            block: None,
            warnings: Vec::new(),
            created_at: at,
            updated_at: at,
        })
    }

    /// Replace the editable details with an already validated profile.
    pub fn update_profile(&mut self, profile: StudentProfile, at: DateTime<Utc>) {
        let StudentProfile {
            name,
            phone,
            role,
            branch_id,
            monthly_fee,
        } = profile;
        self.name = name;
        self.phone = phone;
        self.role = role;
        self.branch_id = branch_id;
        self.monthly_fee = monthly_fee;
        self.updated_at = at;
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> StudentId {
        self.id
    }

    /// Full name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contact phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Enrolment role.
    #[must_use]
    pub const fn role(&self) -> StudentRole {
        self.role
    }

    /// Owning branch.
    #[must_use]
    pub const fn branch_id(&self) -> Option<Uuid> {
        self.branch_id
    }

    /// Amount owed per cycle.
    #[must_use]
    pub const fn monthly_fee(&self) -> i64 {
        self.monthly_fee
    }

    /// Enrolment date.
    #[must_use]
    pub const fn join_date(&self) -> NaiveDate {
        self.join_date
    }

    /// Payment state of the active cycle.
    #[must_use]
    pub const fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Most recent manual payment.
    #[must_use]
    pub const fn last_payment_date(&self) -> Option<DateTime<Utc>> {
        self.last_payment_date
    }

    /// Deadline of the active cycle.
    #[must_use]
    pub const fn payment_deadline(&self) -> Option<DateTime<Utc>> {
        self.payment_deadline
    }

    /// Whether the grace-period reminder was already shown this cycle.
    #[must_use]
    pub const fn payment_warning_shown(&self) -> bool {
        self.payment_warning_shown
    }

    /// Active block, if any.
    #[must_use]
    pub const fn block(&self) -> Option<Block> {
        self.block
    }

    /// Whether access is currently suspended for any reason.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.block.is_some()
    }

    /// Flattened block reason.
    #[must_use]
    pub fn block_reason(&self) -> BlockReason {
        self.block.map_or(BlockReason::None, |block| block.reason())
    }

    /// When the active block was applied.
    #[must_use]
    pub fn blocked_at(&self) -> Option<DateTime<Utc>> {
        self.block.map(|block| block.since())
    }

    /// Disciplinary ledger in issue order.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests;
