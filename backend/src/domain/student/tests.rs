//! Tests for the student aggregate and its identifiers.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 5, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn draft() -> StudentDraft {
    StudentDraft {
        name: "  Dilnoza Karimova ".to_owned(),
        phone: "+998901234567".to_owned(),
        role: StudentRole::Offline,
        branch_id: None,
        monthly_fee: 450_000,
        join_date: NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date"),
    }
}

#[rstest]
fn enrol_starts_unpaid_and_unblocked(now: DateTime<Utc>, draft: StudentDraft) {
    let deadline = now + chrono::Duration::days(5);
    let student = Student::enrol(StudentId::random(), draft, deadline, now).expect("valid draft");

    assert_eq!(student.name(), "Dilnoza Karimova");
    assert_eq!(student.payment_status(), PaymentStatus::Unpaid);
    assert_eq!(student.payment_deadline(), Some(deadline));
    assert_eq!(student.block_reason(), BlockReason::None);
    assert!(student.blocked_at().is_none());
    assert!(student.warnings().is_empty());
    assert_eq!(student.created_at(), now);
    assert_eq!(student.updated_at(), now);
}

#[rstest]
#[case::blank_name(StudentDraft { name: "   ".to_owned(), ..draft() }, StudentValidationError::EmptyName)]
#[case::blank_phone(StudentDraft { phone: String::new(), ..draft() }, StudentValidationError::EmptyPhone)]
#[case::negative_fee(StudentDraft { monthly_fee: -1, ..draft() }, StudentValidationError::NegativeFee)]
fn enrol_rejects_invalid_drafts(
    now: DateTime<Utc>,
    #[case] draft: StudentDraft,
    #[case] expected: StudentValidationError,
) {
    let err = Student::enrol(StudentId::random(), draft, now, now).expect_err("invalid draft");
    assert_eq!(err, expected);
}

#[rstest]
#[case(VALID_ID, true)]
#[case("  3fa85f64-5717-4562-b3fc-2c963f66afa6  ", true)]
#[case("not-a-uuid", false)]
#[case("", false)]
fn student_id_parsing(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(StudentId::new(raw).is_ok(), ok);
}

#[rstest]
fn student_id_serialises_as_string() {
    let id = StudentId::new(VALID_ID).expect("valid id");
    let json = serde_json::to_value(id).expect("serialise id");
    assert_eq!(json, serde_json::json!(VALID_ID));
    let back: StudentId = serde_json::from_value(json).expect("deserialise id");
    assert_eq!(back, id);
}

#[rstest]
#[case("none", BlockReason::None)]
#[case("payment", BlockReason::Payment)]
#[case("disciplinary", BlockReason::Disciplinary)]
fn block_reason_parses_storage_values(#[case] raw: &str, #[case] expected: BlockReason) {
    assert_eq!(raw.parse::<BlockReason>().expect("known reason"), expected);
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn unknown_role_is_rejected() {
    let err = "teacher".parse::<StudentRole>().expect_err("unknown role");
    assert_eq!(
        err,
        StudentValidationError::UnknownValue {
            kind: "role",
            value: "teacher".to_owned(),
        }
    );
}

#[rstest]
#[case(StudentRole::Offline, true)]
#[case(StudentRole::Online, false)]
#[case(StudentRole::Mentor, false)]
fn only_offline_students_pay(#[case] role: StudentRole, #[case] expected: bool) {
    assert_eq!(role.is_fee_paying(), expected);
}

#[rstest]
fn block_from_parts_requires_timestamp(now: DateTime<Utc>) {
    assert_eq!(
        Block::from_parts(BlockReason::Payment, Some(now)),
        Some(Block::Payment { since: now })
    );
    assert_eq!(Block::from_parts(BlockReason::Disciplinary, None), None);
    assert_eq!(Block::from_parts(BlockReason::None, Some(now)), None);
}

#[rstest]
fn profile_update_leaves_payment_and_discipline_untouched(
    now: DateTime<Utc>,
    draft: StudentDraft,
) {
    let mut student = Student::enrol(StudentId::random(), draft, now, now).expect("valid draft");
    student.block = Some(Block::Payment { since: now });
    student.warnings.push(Warning {
        reason: "Late".to_owned(),
        date: now,
        given_by: "Mentor".to_owned(),
    });
    let before = student.clone();
    let later = now + chrono::Duration::hours(2);
    let branch = uuid::Uuid::new_v4();

    let profile = StudentProfile {
        name: " Dilnoza Rakhimova ".to_owned(),
        phone: "+998907654321".to_owned(),
        role: StudentRole::Online,
        branch_id: Some(branch),
        monthly_fee: 500_000,
    }
    .validated()
    .expect("valid profile");
    student.update_profile(profile, later);

    assert_eq!(student.name(), "Dilnoza Rakhimova");
    assert_eq!(student.role(), StudentRole::Online);
    assert_eq!(student.branch_id(), Some(branch));
    assert_eq!(student.monthly_fee(), 500_000);
    assert_eq!(student.updated_at(), later);
    assert_eq!(student.block(), before.block());
    assert_eq!(student.warnings(), before.warnings());
    assert_eq!(student.payment_status(), before.payment_status());
    assert_eq!(student.payment_deadline(), before.payment_deadline());
    assert_eq!(student.join_date(), before.join_date());
}

#[rstest]
#[case::blank_name(StudentProfile { name: " ".to_owned(), ..draft_profile() }, StudentValidationError::EmptyName)]
#[case::blank_phone(StudentProfile { phone: String::new(), ..draft_profile() }, StudentValidationError::EmptyPhone)]
#[case::negative_fee(StudentProfile { monthly_fee: -5, ..draft_profile() }, StudentValidationError::NegativeFee)]
fn profile_validation_matches_enrolment(
    #[case] profile: StudentProfile,
    #[case] expected: StudentValidationError,
) {
    assert_eq!(profile.validated(), Err(expected));
}

fn draft_profile() -> StudentProfile {
    StudentProfile {
        name: "Jasur Aliev".to_owned(),
        phone: "+998901112233".to_owned(),
        role: StudentRole::Offline,
        branch_id: None,
        monthly_fee: 0,
    }
}
