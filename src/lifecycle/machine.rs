//! Transition table for application statuses.
//!
//! ```text
//! pending --shortlist--> interview_set --hire--> passed
//!    \                          \
//!     `--reject--> failed_shortlist `--fail--> failed_interview
//! ```
//!
//! Terminal statuses have no outgoing edges and no edge moves backward.

use serde::{Deserialize, Serialize};

use crate::models::ApplicationStatus;

/// Employer action that moves an application forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationEvent {
    Shortlist,
    Reject,
    Hire,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application is already {from}; no further status changes are allowed")]
    Terminal { from: ApplicationStatus },

    #[error("cannot move an application from {from} to {to}")]
    Illegal {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("{event:?} is not available while an application is {from}")]
    EventNotAllowed {
        from: ApplicationStatus,
        event: ApplicationEvent,
    },
}

const TABLE: [(ApplicationStatus, ApplicationEvent, ApplicationStatus); 4] = [
    (
        ApplicationStatus::Pending,
        ApplicationEvent::Shortlist,
        ApplicationStatus::InterviewSet,
    ),
    (
        ApplicationStatus::Pending,
        ApplicationEvent::Reject,
        ApplicationStatus::FailedShortlist,
    ),
    (
        ApplicationStatus::InterviewSet,
        ApplicationEvent::Hire,
        ApplicationStatus::Passed,
    ),
    (
        ApplicationStatus::InterviewSet,
        ApplicationEvent::Fail,
        ApplicationStatus::FailedInterview,
    ),
];

impl ApplicationStatus {
    /// Applies `event`, returning the resulting status.
    pub fn apply(self, event: ApplicationEvent) -> Result<ApplicationStatus, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::Terminal { from: self });
        }
        TABLE
            .iter()
            .find(|(from, ev, _)| *from == self && *ev == event)
            .map(|(_, _, to)| *to)
            .ok_or(TransitionError::EventNotAllowed { from: self, event })
    }

    /// The statuses an employer may move to from here, in table order.
    pub fn next_statuses(self) -> Vec<ApplicationStatus> {
        TABLE
            .iter()
            .filter(|(from, _, _)| *from == self)
            .map(|(_, _, to)| *to)
            .collect()
    }
}

/// Checks a requested target status against the table and names the event it
/// corresponds to.
pub fn ensure_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<ApplicationEvent, TransitionError> {
    if from.is_terminal() {
        return Err(TransitionError::Terminal { from });
    }
    TABLE
        .iter()
        .find(|(f, _, t)| *f == from && *t == to)
        .map(|(_, event, _)| *event)
        .ok_or(TransitionError::Illegal { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn table_edges_are_accepted() {
        assert_eq!(ensure_transition(Pending, InterviewSet), Ok(ApplicationEvent::Shortlist));
        assert_eq!(ensure_transition(Pending, FailedShortlist), Ok(ApplicationEvent::Reject));
        assert_eq!(ensure_transition(InterviewSet, Passed), Ok(ApplicationEvent::Hire));
        assert_eq!(ensure_transition(InterviewSet, FailedInterview), Ok(ApplicationEvent::Fail));
    }

    #[test]
    fn terminal_statuses_are_absorbing() {
        for from in [Passed, FailedShortlist, FailedInterview] {
            assert!(from.next_statuses().is_empty());
            for to in ApplicationStatus::ALL {
                assert_eq!(
                    ensure_transition(from, to),
                    Err(TransitionError::Terminal { from })
                );
            }
            for event in [
                ApplicationEvent::Shortlist,
                ApplicationEvent::Reject,
                ApplicationEvent::Hire,
                ApplicationEvent::Fail,
            ] {
                assert!(from.apply(event).is_err());
            }
        }
    }

    #[test]
    fn skipping_and_backward_moves_are_illegal() {
        assert_eq!(
            ensure_transition(Pending, Passed),
            Err(TransitionError::Illegal { from: Pending, to: Passed })
        );
        assert_eq!(
            ensure_transition(InterviewSet, Pending),
            Err(TransitionError::Illegal { from: InterviewSet, to: Pending })
        );
        assert!(ensure_transition(Pending, Pending).is_err());
    }

    #[test]
    fn events_only_fire_from_their_source_status() {
        assert_eq!(Pending.apply(ApplicationEvent::Shortlist), Ok(InterviewSet));
        assert_eq!(
            Pending.apply(ApplicationEvent::Hire),
            Err(TransitionError::EventNotAllowed { from: Pending, event: ApplicationEvent::Hire })
        );
        assert_eq!(InterviewSet.apply(ApplicationEvent::Fail), Ok(FailedInterview));
        assert!(InterviewSet.apply(ApplicationEvent::Reject).is_err());
    }

    #[test]
    fn next_statuses_follow_table_order() {
        assert_eq!(Pending.next_statuses(), vec![InterviewSet, FailedShortlist]);
        assert_eq!(InterviewSet.next_statuses(), vec![Passed, FailedInterview]);
    }
}
