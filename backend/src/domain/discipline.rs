//! Three-strikes warning ledger and disciplinary blocks.
//!
//! Warnings are append-only until an unblock (manual or through amnesty)
//! clears the ledger. The third warning converts any current state into a
//! disciplinary block.

use chrono::{DateTime, TimeDelta, Utc};

use super::student::{Block, MAX_WARNINGS, Student, Warning};

/// Length of the automatic amnesty window.
pub const AMNESTY_PERIOD_DAYS: i64 = 365;

/// Reasons a warning request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WarningError {
    /// The reason is blank once trimmed.
    #[error("warning reason must not be empty")]
    EmptyReason,
    /// The issuing staff member is missing.
    #[error("warning issuer must not be empty")]
    EmptyIssuer,
    /// The student already carries the maximum number of warnings.
    #[error("student already has the maximum number of warnings")]
    LimitReached,
}

/// Validated request to append a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningDraft {
    reason: String,
    given_by: String,
}

impl WarningDraft {
    /// Validate a warning reason and issuer.
    ///
    /// Both values are trimmed.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{WarningDraft, WarningError};
    ///
    /// let draft = WarningDraft::new("  late to class ", "admin").expect("valid warning");
    /// assert_eq!(draft.reason(), "late to class");
    /// assert_eq!(WarningDraft::new(" ", "admin"), Err(WarningError::EmptyReason));
    /// ```
    pub fn new(reason: impl AsRef<str>, given_by: impl AsRef<str>) -> Result<Self, WarningError> {
        let reason = reason.as_ref().trim();
        if reason.is_empty() {
            return Err(WarningError::EmptyReason);
        }
        let given_by = given_by.as_ref().trim();
        if given_by.is_empty() {
            return Err(WarningError::EmptyIssuer);
        }
        Ok(Self {
            reason: reason.to_owned(),
            given_by: given_by.to_owned(),
        })
    }

    /// Trimmed reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Trimmed issuer.
    #[must_use]
    pub fn given_by(&self) -> &str {
        &self.given_by
    }

    /// Stamp the draft with its issue time.
    #[must_use]
    pub fn issue(self, at: DateTime<Utc>) -> Warning {
        Warning {
            reason: self.reason,
            date: at,
            given_by: self.given_by,
        }
    }
}

/// Instant at or before which a block is old enough for amnesty.
#[must_use]
pub fn amnesty_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::days(AMNESTY_PERIOD_DAYS)
}

impl Student {
    /// Append a warning, blocking the student when it is the third.
    ///
    /// Returns whether the warning produced the disciplinary block. The
    /// student is left untouched when the ledger is already full.
    pub fn issue_warning(&mut self, warning: Warning) -> Result<bool, WarningError> {
        if self.warnings.len() >= MAX_WARNINGS {
            return Err(WarningError::LimitReached);
        }
        let at = warning.date;
        self.warnings.push(warning);
        self.updated_at = at;
        if self.warnings.len() == MAX_WARNINGS {
            self.block = Some(Block::Disciplinary { since: at });
            return Ok(true);
        }
        Ok(false)
    }

    /// Lift any block and clear the warning ledger.
    pub fn unblock(&mut self, at: DateTime<Utc>) {
        self.block = None;
        self.warnings.clear();
        self.updated_at = at;
    }

    /// Apply amnesty when the active block started at or before `cutoff`.
    ///
    /// Returns whether the student was released.
    pub fn release_if_expired(&mut self, cutoff: DateTime<Utc>, at: DateTime<Utc>) -> bool {
        match self.block {
            Some(block) if block.since() <= cutoff => {
                self.unblock(at);
                true
            }
            _ => false,
        }
    }
}
