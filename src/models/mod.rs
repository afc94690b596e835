pub mod account;
pub mod course;
pub mod message;
pub mod profile;
pub mod result;

pub use account::{Account, Role};
pub use course::{Course, CourseKind, Semester, SemesterName};
pub use message::Message;
pub use profile::{AdvisorProfile, CoordinatorProfile, ParentProfile, SessionEntry, StudentProfile};
pub use result::ResultRow;
