use std::sync::Arc;

use shared::domain::{CourseId, PersonSummary, Role, SectionAssignment, Semester};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{
    is_locked, locked_field_message,
    notice::{Notice, NoticeKind},
    schedule::SEMESTERS_FAILED,
    view_kind::{FilterChange, FilterField, StudentView, ViewFilterState, ViewKind},
    ControllerError,
};
use crate::{gateway::DataGateway, session::SessionUser};

pub const ELIGIBLE_FAILED: &str = "Failed to load eligible sections.";
pub const ENROLLED: &str = "Enrolled successfully!";
pub const ENROLL_FAILED: &str = "Enrollment failed.";

const ALLOWED_ROLES: &[Role] = &[Role::Admin, Role::Student];

#[derive(Debug, Default)]
struct EnrollmentState {
    filter: ViewFilterState,
    semesters: Vec<Semester>,
    sections: Vec<SectionAssignment>,
    student: Option<PersonSummary>,
    message: Option<String>,
    in_flight: usize,
    notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentSnapshot {
    pub loading: bool,
    pub filter: ViewFilterState,
    pub semesters: Vec<Semester>,
    pub sections: Vec<SectionAssignment>,
    pub student: Option<PersonSummary>,
    /// Server message from the last eligibility lookup, or the failure text.
    pub message: Option<String>,
}

/// Lists the sections a student may join and enrolls them.
pub struct EnrollmentController {
    gateway: Arc<dyn DataGateway>,
    session: SessionUser,
    state: Mutex<EnrollmentState>,
}

impl EnrollmentController {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        session: SessionUser,
    ) -> Result<Self, ControllerError> {
        if !ALLOWED_ROLES.contains(&session.role) {
            return Err(ControllerError::AccessDenied {
                view: "enrollment",
                role: session.role,
            });
        }
        let state = EnrollmentState {
            filter: ViewFilterState {
                student_id: session.student_id(),
                ..ViewFilterState::default()
            },
            ..EnrollmentState::default()
        };
        Ok(Self {
            gateway,
            session,
            state: Mutex::new(state),
        })
    }

    pub fn session(&self) -> &SessionUser {
        &self.session
    }

    /// Loads the semester list and selects its first entry.
    pub async fn open(&self) {
        self.state.lock().await.in_flight += 1;
        let result = self.gateway.fetch_semesters().await;
        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        match result {
            Ok(semesters) => {
                if state.filter.semester_id.is_none() {
                    state.filter.semester_id = semesters.first().map(|s| s.id);
                }
                state.semesters = semesters;
            }
            Err(err) => {
                debug!(error = %err, "semester list fetch failed");
                state
                    .notices
                    .push(Notice::new(NoticeKind::FetchFailed, SEMESTERS_FAILED));
            }
        }
    }

    /// Updates the student or semester selection; never fetches on its own.
    pub async fn select_filter(&self, change: FilterChange) {
        let field = change.field();
        if field == FilterField::Teacher {
            return;
        }
        let mut state = self.state.lock().await;
        let mut next = state.filter;
        if !next.apply(change) {
            return;
        }
        if is_locked(self.session.role, field) {
            warn!(?field, role = %self.session.role, "rejected change to locked filter");
            state.notices.push(Notice::new(
                NoticeKind::NotPermitted,
                locked_field_message(field),
            ));
            return;
        }
        state.filter = next;
    }

    pub async fn fetch_eligible(&self) {
        let (student_id, semester_id) = {
            let mut state = self.state.lock().await;
            match (state.filter.student_id, state.filter.semester_id) {
                (Some(student), Some(semester)) => {
                    state.in_flight += 1;
                    (student, semester)
                }
                _ => {
                    let prompt = StudentView::missing_selection(&state.filter);
                    state
                        .notices
                        .push(Notice::new(NoticeKind::MissingSelection, prompt));
                    return;
                }
            }
        };

        let result = self
            .gateway
            .fetch_eligible_sections(student_id, semester_id)
            .await;

        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        match result {
            Ok(eligible) => {
                debug!(
                    student = %student_id,
                    semester = %semester_id,
                    sections = eligible.sections.len(),
                    "eligible sections loaded"
                );
                state.sections = eligible.sections;
                state.student = eligible.student;
                state.message = Some(eligible.message).filter(|m| !m.is_empty());
            }
            Err(err) => {
                debug!(student = %student_id, error = %err, "eligible sections fetch failed");
                state.sections.clear();
                state.student = None;
                state.message = Some(ELIGIBLE_FAILED.to_string());
                state
                    .notices
                    .push(Notice::new(NoticeKind::FetchFailed, ELIGIBLE_FAILED));
            }
        }
    }

    /// Enrolls the selected student in `course_id`, then refreshes the
    /// eligible list. Returns whether the server accepted the enrollment.
    pub async fn enroll(&self, course_id: CourseId) -> bool {
        let (student_id, semester_id) = {
            let mut state = self.state.lock().await;
            match (state.filter.student_id, state.filter.semester_id) {
                (Some(student), Some(semester)) => {
                    state.in_flight += 1;
                    (student, semester)
                }
                _ => return false,
            }
        };

        let result = self
            .gateway
            .enroll(student_id, course_id, semester_id)
            .await;

        {
            let mut state = self.state.lock().await;
            state.in_flight = state.in_flight.saturating_sub(1);
            match &result {
                Ok(()) => {
                    info!(student = %student_id, course = %course_id, semester = %semester_id, "enrolled");
                    state.notices.push(Notice::new(NoticeKind::Info, ENROLLED));
                }
                Err(err) => {
                    debug!(student = %student_id, course = %course_id, error = %err, "enrollment failed");
                    let message = err.server_message().unwrap_or(ENROLL_FAILED);
                    state
                        .notices
                        .push(Notice::new(NoticeKind::EnrollFailed, message));
                }
            }
        }

        if result.is_ok() {
            self.fetch_eligible().await;
        }
        result.is_ok()
    }

    pub async fn snapshot(&self) -> EnrollmentSnapshot {
        let state = self.state.lock().await;
        EnrollmentSnapshot {
            loading: state.in_flight > 0,
            filter: state.filter,
            semesters: state.semesters.clone(),
            sections: state.sections.clone(),
            student: state.student.clone(),
            message: state.message.clone(),
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.in_flight > 0
    }

    pub async fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.lock().await.notices)
    }
}

#[cfg(test)]
#[path = "tests/enrollment_tests.rs"]
mod tests;
