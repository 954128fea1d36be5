//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Writes that enforce domain rules
//! run them inside the same transaction and return [`crate::error::RepoError`].

mod checks;

pub mod allocation_repo;
pub mod class_repo;
pub mod event_repo;
pub mod report_repo;
pub mod semester_repo;
pub mod student_repo;
pub mod workshop_repo;

pub use allocation_repo::AllocationRepo;
pub use class_repo::ClassRepo;
pub use event_repo::EventRepo;
pub use report_repo::ReportRepo;
pub use semester_repo::SemesterRepo;
pub use student_repo::StudentRepo;
pub use workshop_repo::WorkshopRepo;
