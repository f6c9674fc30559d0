pub mod machine;
pub mod roadmap;
pub mod views;

pub use machine::{ensure_transition, ApplicationEvent, TransitionError};
pub use roadmap::{roadmap, Milestone, Roadmap, RoadmapStep, StepMarker};
pub use views::{applicant_total, employer_dashboard, pending_count, JobApplicantSummary};
