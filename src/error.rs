use crate::data::{GradeLevel, SectionId, TeacherId};
use thiserror::Error;

/// Errors that abort a scheduling action.
///
/// Unstaffed or unplaceable subjects are not errors; they are reported as
/// [`PlanningGap`](crate::data::PlanningGap)s in the run report.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No time grid exists for the grade level. Raised before any write.
    #[error("no time grid is configured for grade level {0}")]
    UnknownGradeLevel(GradeLevel),

    /// The requested section does not exist.
    #[error("section {0} not found")]
    SectionNotFound(SectionId),

    #[error("teacher {0} not found")]
    TeacherNotFound(TeacherId),

    /// A read or write against the roster store failed.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A blocking worker panicked or the shared connection was poisoned.
    #[error("worker failed: {0}")]
    Worker(String),
}

impl SchedulerError {
    /// True for errors caused by the caller's input rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownGradeLevel(_)
                | Self::SectionNotFound(_)
                | Self::TeacherNotFound(_)
        )
    }
}
