pub mod application;
pub mod job;
pub mod profile;

pub use application::{Application, ApplicationStatus, NewApplication};
pub use job::{Job, JobType, NewJob, Requirement};
pub use profile::{Profile, SignUpMetadata, UserAccount, UserRole};
