//! Process-local adapters.

mod in_memory_student_repository;

pub use in_memory_student_repository::InMemoryStudentRepository;
