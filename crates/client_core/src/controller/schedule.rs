use std::{future::Future, marker::PhantomData, sync::Arc};

use shared::domain::{PersonSummary, SectionAssignment, Semester, TeacherSummary};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{
    is_locked, locked_field_message,
    notice::{Notice, NoticeKind},
    view_kind::{FilterChange, FilterField, MasterView, ViewFilterState, ViewKind, SELECT_SEMESTER},
    ControllerError,
};
use crate::{
    config::StaleResponsePolicy,
    gateway::{DataGateway, GenerationReport, ScheduleKind, ScheduleTarget},
    grid::{self, WeeklyGrid},
    session::SessionUser,
};

pub const SEMESTERS_FAILED: &str = "Failed to load semesters";
pub const TEACHERS_FAILED: &str = "Failed to load teachers";
pub const GENERATE_FAILED: &str = "Failed to generate master schedule";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Loaded,
    Failed,
}

#[derive(Debug)]
struct ViewState {
    filter: ViewFilterState,
    semesters: Vec<Semester>,
    teachers: Vec<TeacherSummary>,
    sections: Vec<SectionAssignment>,
    subject: Option<PersonSummary>,
    caption: Option<String>,
    grid: WeeklyGrid,
    schedule_exists: bool,
    last_outcome: Option<Outcome>,
    in_flight: usize,
    /// Generation token of the most recently issued schedule fetch.
    issued: u64,
    notices: Vec<Notice>,
}

impl ViewState {
    fn new(filter: ViewFilterState) -> Self {
        Self {
            filter,
            semesters: Vec::new(),
            teachers: Vec::new(),
            sections: Vec::new(),
            subject: None,
            caption: None,
            grid: WeeklyGrid::empty(),
            schedule_exists: false,
            last_outcome: None,
            in_flight: 0,
            issued: 0,
            notices: Vec::new(),
        }
    }

    fn phase(&self) -> ViewPhase {
        if self.in_flight > 0 {
            return ViewPhase::Loading;
        }
        match self.last_outcome {
            None => ViewPhase::Idle,
            Some(Outcome::Loaded) => ViewPhase::Loaded,
            Some(Outcome::Failed) => ViewPhase::Failed,
        }
    }

    fn clear_schedule(&mut self) {
        self.sections.clear();
        self.subject = None;
        self.caption = None;
        self.grid = WeeklyGrid::empty();
        self.schedule_exists = false;
    }
}

/// Render-ready copy of a controller's state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub kind: ScheduleKind,
    pub phase: ViewPhase,
    pub filter: ViewFilterState,
    pub semesters: Vec<Semester>,
    pub teachers: Vec<TeacherSummary>,
    pub sections: Vec<SectionAssignment>,
    pub subject: Option<PersonSummary>,
    pub caption: Option<String>,
    pub grid: WeeklyGrid,
    pub schedule_exists: bool,
}

impl ViewSnapshot {
    pub fn is_loading(&self) -> bool {
        self.phase == ViewPhase::Loading
    }
}

/// Drives one schedule screen: filter selection, fetching, and the weekly grid.
pub struct ScheduleViewController<K: ViewKind> {
    gateway: Arc<dyn DataGateway>,
    session: SessionUser,
    policy: StaleResponsePolicy,
    state: Mutex<ViewState>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ViewKind> ScheduleViewController<K> {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        session: SessionUser,
    ) -> Result<Self, ControllerError> {
        if !K::ALLOWED_ROLES.contains(&session.role) {
            return Err(ControllerError::AccessDenied {
                view: K::KIND.as_str(),
                role: session.role,
            });
        }

        let mut filter = ViewFilterState::default();
        if K::FIELDS.contains(&FilterField::Student) {
            filter.student_id = session.student_id();
        }
        if K::FIELDS.contains(&FilterField::Teacher) {
            filter.teacher_id = session.teacher_id();
        }

        Ok(Self {
            gateway,
            session,
            policy: StaleResponsePolicy::default(),
            state: Mutex::new(ViewState::new(filter)),
            _kind: PhantomData,
        })
    }

    pub fn with_policy(mut self, policy: StaleResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn kind(&self) -> ScheduleKind {
        K::KIND
    }

    pub fn session(&self) -> &SessionUser {
        &self.session
    }

    /// Filter fields the current user may change.
    pub fn exposed_filters(&self) -> Vec<FilterField> {
        K::FIELDS
            .iter()
            .copied()
            .filter(|field| !is_locked(self.session.role, *field))
            .collect()
    }

    /// Initial page load: populate the selector lists and pick their first
    /// entries where nothing is selected yet, which fetches the schedule once
    /// the target is complete.
    pub async fn open(&self) {
        if K::FIELDS.contains(&FilterField::Semester) {
            match self.tracked(self.gateway.fetch_semesters()).await {
                Ok(semesters) => {
                    let first = {
                        let mut state = self.state.lock().await;
                        let first = semesters.first().map(|s| s.id);
                        state.semesters = semesters;
                        first.filter(|_| state.filter.semester_id.is_none())
                    };
                    if let Some(id) = first {
                        self.select_filter(FilterChange::Semester(Some(id))).await;
                    }
                }
                Err(err) => {
                    debug!(kind = %K::KIND, error = %err, "semester list fetch failed");
                    self.notify(Notice::new(NoticeKind::FetchFailed, SEMESTERS_FAILED))
                        .await;
                }
            }
        }

        if K::FIELDS.contains(&FilterField::Teacher) {
            if is_locked(self.session.role, FilterField::Teacher) {
                self.load().await;
                return;
            }
            match self.tracked(self.gateway.fetch_teachers()).await {
                Ok(teachers) => {
                    let first = {
                        let mut state = self.state.lock().await;
                        let first = teachers.first().map(|t| t.id);
                        state.teachers = teachers;
                        first.filter(|_| state.filter.teacher_id.is_none())
                    };
                    if let Some(id) = first {
                        self.select_filter(FilterChange::Teacher(Some(id))).await;
                    }
                }
                Err(err) => {
                    debug!(kind = %K::KIND, error = %err, "teacher list fetch failed");
                    self.notify(Notice::new(NoticeKind::FetchFailed, TEACHERS_FAILED))
                        .await;
                }
            }
        }
    }

    /// Updates one filter field and fetches when the target becomes complete.
    pub async fn select_filter(&self, change: FilterChange) {
        let field = change.field();
        if !K::FIELDS.contains(&field) {
            debug!(kind = %K::KIND, ?field, "ignoring filter the view does not use");
            return;
        }

        let target = {
            let mut state = self.state.lock().await;
            let mut next = state.filter;
            if !next.apply(change) {
                return;
            }
            if is_locked(self.session.role, field) {
                warn!(kind = %K::KIND, ?field, role = %self.session.role, "rejected change to locked filter");
                state.notices.push(Notice::new(
                    NoticeKind::NotPermitted,
                    locked_field_message(field),
                ));
                return;
            }
            state.filter = next;
            K::target(&state.filter)
        };

        if let Some(target) = target {
            self.fetch(target).await;
        }
    }

    /// Explicit fetch for the current filter.
    pub async fn load(&self) {
        let target = {
            let mut state = self.state.lock().await;
            match K::target(&state.filter) {
                Some(target) => target,
                None => {
                    let prompt = K::missing_selection(&state.filter);
                    state
                        .notices
                        .push(Notice::new(NoticeKind::MissingSelection, prompt));
                    return;
                }
            }
        };
        self.fetch(target).await;
    }

    async fn fetch(&self, target: ScheduleTarget) {
        let token = {
            let mut state = self.state.lock().await;
            state.in_flight += 1;
            state.issued += 1;
            state.issued
        };
        debug!(kind = %K::KIND, ?target, token, "fetching schedule");

        let result = self.gateway.fetch_schedule(&target).await;

        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        if self.policy == StaleResponsePolicy::LastIssued && token != state.issued {
            debug!(kind = %K::KIND, token, latest = state.issued, "discarding stale schedule response");
            return;
        }

        match result {
            Ok(listing) => {
                let grid = grid::build(&listing.sections);
                state.schedule_exists = !grid.is_empty();
                state.grid = grid;
                state.sections = listing.sections;
                state.subject = listing.subject;
                state.caption = listing.caption;
                state.last_outcome = Some(Outcome::Loaded);
                debug!(
                    kind = %K::KIND,
                    sections = state.sections.len(),
                    schedule_exists = state.schedule_exists,
                    "schedule loaded"
                );
            }
            Err(err) => {
                debug!(kind = %K::KIND, ?target, error = %err, "schedule fetch failed");
                state.clear_schedule();
                state.last_outcome = Some(Outcome::Failed);
                state
                    .notices
                    .push(Notice::new(NoticeKind::FetchFailed, K::LOAD_FAILED));
            }
        }
    }

    async fn tracked<T>(&self, call: impl Future<Output = T>) -> T {
        self.state.lock().await.in_flight += 1;
        let output = call.await;
        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        output
    }

    async fn notify(&self, notice: Notice) {
        self.state.lock().await.notices.push(notice);
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let state = self.state.lock().await;
        ViewSnapshot {
            kind: K::KIND,
            phase: state.phase(),
            filter: state.filter,
            semesters: state.semesters.clone(),
            teachers: state.teachers.clone(),
            sections: state.sections.clone(),
            subject: state.subject.clone(),
            caption: state.caption.clone(),
            grid: state.grid.clone(),
            schedule_exists: state.schedule_exists,
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.in_flight > 0
    }

    pub async fn schedule_exists(&self) -> bool {
        self.state.lock().await.schedule_exists
    }

    /// Drains pending notices; each is delivered once.
    pub async fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.lock().await.notices)
    }
}

impl ScheduleViewController<MasterView> {
    /// Asks the server to build the semester's master schedule, then reloads.
    ///
    /// Does nothing when a schedule is already present.
    pub async fn generate(&self) -> Option<GenerationReport> {
        let semester_id = {
            let mut state = self.state.lock().await;
            if state.schedule_exists {
                debug!("master schedule already present; skipping generation");
                return None;
            }
            match state.filter.semester_id {
                Some(id) => {
                    // Held until the reload settles so loading never dips in between.
                    state.in_flight += 1;
                    id
                }
                None => {
                    state
                        .notices
                        .push(Notice::new(NoticeKind::MissingSelection, SELECT_SEMESTER));
                    return None;
                }
            }
        };

        let outcome = match self.gateway.generate_master_schedule(semester_id).await {
            Ok(report) => {
                info!(
                    semester = %semester_id,
                    generated = report.generated_sections,
                    "master schedule generated"
                );
                self.load().await;
                Some(report)
            }
            Err(err) => {
                debug!(semester = %semester_id, error = %err, "master schedule generation failed");
                self.notify(Notice::new(NoticeKind::GenerateFailed, GENERATE_FAILED))
                    .await;
                None
            }
        };

        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        outcome
    }
}

#[cfg(test)]
#[path = "tests/schedule_tests.rs"]
mod tests;
