//! Per-view state machines driving the schedule and enrollment screens.
//!
//! Controllers own their state behind an async mutex that is released before
//! every gateway call, so overlapping triggers on one controller settle
//! independently. Failures never escape a controller; they become
//! [`Notice`]s drained with `take_notices`.

use shared::domain::Role;
use thiserror::Error;

mod enrollment;
mod notice;
mod schedule;
mod view_kind;

pub use enrollment::{EnrollmentController, EnrollmentSnapshot};
pub use notice::{Notice, NoticeKind};
pub use schedule::{ScheduleViewController, ViewPhase, ViewSnapshot};
pub use view_kind::{
    CourseView, FilterChange, FilterField, MasterView, StudentView, TeacherView,
    ViewFilterState, ViewKind,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("the {view} view is not available to {role} accounts")]
    AccessDenied { view: &'static str, role: Role },
}

/// Field a role may not change: students see only themselves, teachers only themselves.
pub(crate) fn is_locked(role: Role, field: FilterField) -> bool {
    matches!(
        (role, field),
        (Role::Student, FilterField::Student) | (Role::Teacher, FilterField::Teacher)
    )
}

pub(crate) fn locked_field_message(field: FilterField) -> &'static str {
    match field {
        FilterField::Student => "Students can only view their own records.",
        FilterField::Teacher => "Teachers can only view their own schedule.",
        FilterField::Semester => "This filter cannot be changed.",
    }
}

#[cfg(test)]
#[path = "tests/fake_gateway.rs"]
pub(crate) mod fake_gateway;
