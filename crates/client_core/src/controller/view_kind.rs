//! Per-view descriptors for [`ScheduleViewController`](super::ScheduleViewController).

use shared::domain::{Role, SemesterId, StudentId, TeacherId};

use crate::gateway::{ScheduleKind, ScheduleTarget};

pub const SELECT_SEMESTER: &str = "Select a semester";
pub const SELECT_TEACHER: &str = "Please select a teacher.";
pub const ENTER_STUDENT_ID: &str = "Please enter a student ID (Admin only)";
pub const SELECT_STUDENT_SEMESTER: &str = "Please select a semester";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Semester,
    Student,
    Teacher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    Semester(Option<SemesterId>),
    Student(Option<StudentId>),
    Teacher(Option<TeacherId>),
}

impl FilterChange {
    pub fn field(&self) -> FilterField {
        match self {
            FilterChange::Semester(_) => FilterField::Semester,
            FilterChange::Student(_) => FilterField::Student,
            FilterChange::Teacher(_) => FilterField::Teacher,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewFilterState {
    pub semester_id: Option<SemesterId>,
    pub student_id: Option<StudentId>,
    pub teacher_id: Option<TeacherId>,
}

impl ViewFilterState {
    /// Stores the new value; returns `false` when it equals the current one.
    pub fn apply(&mut self, change: FilterChange) -> bool {
        match change {
            FilterChange::Semester(value) => replace_if_changed(&mut self.semester_id, value),
            FilterChange::Student(value) => replace_if_changed(&mut self.student_id, value),
            FilterChange::Teacher(value) => replace_if_changed(&mut self.teacher_id, value),
        }
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

pub trait ViewKind: Send + Sync + 'static {
    const KIND: ScheduleKind;
    /// Filter fields the view exposes, in display order.
    const FIELDS: &'static [FilterField];
    const ALLOWED_ROLES: &'static [Role];
    /// Notice text when the schedule fetch fails.
    const LOAD_FAILED: &'static str;

    /// The fetch target, once every field the view needs is set.
    fn target(filter: &ViewFilterState) -> Option<ScheduleTarget>;

    /// Prompt for the first field still missing.
    fn missing_selection(filter: &ViewFilterState) -> &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct MasterView;

#[derive(Debug, Clone, Copy)]
pub struct CourseView;

#[derive(Debug, Clone, Copy)]
pub struct TeacherView;

#[derive(Debug, Clone, Copy)]
pub struct StudentView;

const ANY_ROLE: &[Role] = &[Role::Admin, Role::Teacher, Role::Student];

impl ViewKind for MasterView {
    const KIND: ScheduleKind = ScheduleKind::Master;
    const FIELDS: &'static [FilterField] = &[FilterField::Semester];
    const ALLOWED_ROLES: &'static [Role] = ANY_ROLE;
    const LOAD_FAILED: &'static str = "Failed to load schedule";

    fn target(filter: &ViewFilterState) -> Option<ScheduleTarget> {
        filter
            .semester_id
            .map(|semester_id| ScheduleTarget::Master { semester_id })
    }

    fn missing_selection(_filter: &ViewFilterState) -> &'static str {
        SELECT_SEMESTER
    }
}

impl ViewKind for CourseView {
    const KIND: ScheduleKind = ScheduleKind::Course;
    const FIELDS: &'static [FilterField] = &[FilterField::Semester];
    const ALLOWED_ROLES: &'static [Role] = ANY_ROLE;
    const LOAD_FAILED: &'static str = "Failed to load course schedules";

    fn target(filter: &ViewFilterState) -> Option<ScheduleTarget> {
        filter
            .semester_id
            .map(|semester_id| ScheduleTarget::Course { semester_id })
    }

    fn missing_selection(_filter: &ViewFilterState) -> &'static str {
        SELECT_SEMESTER
    }
}

impl ViewKind for TeacherView {
    const KIND: ScheduleKind = ScheduleKind::Teacher;
    const FIELDS: &'static [FilterField] = &[FilterField::Teacher];
    const ALLOWED_ROLES: &'static [Role] = &[Role::Admin, Role::Teacher];
    const LOAD_FAILED: &'static str = "Failed to load teacher schedule";

    fn target(filter: &ViewFilterState) -> Option<ScheduleTarget> {
        filter
            .teacher_id
            .map(|teacher_id| ScheduleTarget::Teacher { teacher_id })
    }

    fn missing_selection(_filter: &ViewFilterState) -> &'static str {
        SELECT_TEACHER
    }
}

impl ViewKind for StudentView {
    const KIND: ScheduleKind = ScheduleKind::Student;
    const FIELDS: &'static [FilterField] = &[FilterField::Student, FilterField::Semester];
    const ALLOWED_ROLES: &'static [Role] = &[Role::Admin, Role::Student];
    const LOAD_FAILED: &'static str = "Failed to load student schedule";

    fn target(filter: &ViewFilterState) -> Option<ScheduleTarget> {
        Some(ScheduleTarget::Student {
            student_id: filter.student_id?,
            semester_id: filter.semester_id?,
        })
    }

    fn missing_selection(filter: &ViewFilterState) -> &'static str {
        if filter.student_id.is_none() {
            ENTER_STUDENT_ID
        } else {
            SELECT_STUDENT_SEMESTER
        }
    }
}
