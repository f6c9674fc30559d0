use serde::{Deserialize, Serialize};

use crate::models::ApplicationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Review,
    Interview,
    Hired,
}

impl Milestone {
    pub const ALL: [Milestone; 3] = [Milestone::Review, Milestone::Interview, Milestone::Hired];

    pub fn label(self) -> &'static str {
        match self {
            Milestone::Review => "Review",
            Milestone::Interview => "Interview",
            Milestone::Hired => "Hired",
        }
    }
}

/// How a single roadmap step is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMarker {
    Upcoming,
    Completed,
    /// Final step of a hired application.
    Trophy,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoadmapStep {
    pub milestone: Milestone,
    pub label: &'static str,
    pub marker: StepMarker,
}

impl RoadmapStep {
    pub fn is_completed(&self) -> bool {
        matches!(self.marker, StepMarker::Completed | StepMarker::Trophy)
    }

    pub fn is_failed(&self) -> bool {
        self.marker == StepMarker::Failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roadmap {
    pub status: ApplicationStatus,
    pub steps: [RoadmapStep; 3],
    pub stage_failed: bool,
}

/// Progress view of an application. Pure in `status`.
pub fn roadmap(status: ApplicationStatus) -> Roadmap {
    let steps = Milestone::ALL.map(|milestone| RoadmapStep {
        milestone,
        label: milestone.label(),
        marker: marker_for(status, milestone),
    });
    Roadmap {
        status,
        steps,
        stage_failed: status.is_failure(),
    }
}

fn marker_for(status: ApplicationStatus, milestone: Milestone) -> StepMarker {
    use ApplicationStatus::*;

    // a failed stage wins over completion at the same step
    let failed_here = matches!(
        (status, milestone),
        (FailedShortlist, Milestone::Review) | (FailedInterview, Milestone::Interview)
    );
    if failed_here {
        return StepMarker::Failed;
    }

    let completed = match status {
        Passed => true,
        InterviewSet => milestone != Milestone::Hired,
        Pending => milestone == Milestone::Review,
        FailedShortlist | FailedInterview => false,
    };

    match (completed, status, milestone) {
        (true, Passed, Milestone::Hired) => StepMarker::Trophy,
        (true, _, _) => StepMarker::Completed,
        (false, _, _) => StepMarker::Upcoming,
    }
}
