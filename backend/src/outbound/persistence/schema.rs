//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes the table.

diesel::table! {
    /// Enrolled students with their payment cycle and discipline state.
    ///
    /// `block_reason` and `blocked_at` are either both unset (`'none'` and
    /// `NULL`) or both set; a check constraint enforces this. `warnings` is a
    /// JSONB array holding at most three entries.
    students (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Full name, never blank.
        name -> Varchar,
        /// Contact phone number.
        phone -> Varchar,
        /// One of `offline`, `online` or `mentor`.
        role -> Varchar,
        /// Owning branch.
        branch_id -> Nullable<Uuid>,
        /// Monthly fee in the smallest currency unit.
        monthly_fee -> Int8,
        /// Date the student joined.
        join_date -> Date,
        /// One of `paid` or `unpaid`.
        payment_status -> Varchar,
        /// When the current month was marked paid.
        last_payment_date -> Nullable<Timestamptz>,
        /// End of the grace window for the current month.
        payment_deadline -> Nullable<Timestamptz>,
        /// Whether the payment reminder has been shown this cycle.
        payment_warning_shown -> Bool,
        /// One of `none`, `payment` or `disciplinary`.
        block_reason -> Varchar,
        /// When the active block started.
        blocked_at -> Nullable<Timestamptz>,
        /// Warning ledger as a JSONB array.
        warnings -> Jsonb,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last transition timestamp.
        updated_at -> Timestamptz,
    }
}
