//! The boundary between view controllers and the portal API.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{
        CourseId, PersonSummary, SectionAssignment, Semester, SemesterId, StudentId,
        TeacherId, TeacherSummary,
    },
    protocol::{EligibleSectionsResult, ProgressResult, RoomStat, TeacherStat, TranscriptResult},
};

use crate::{error::GatewayResult, session::SessionUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Master,
    Course,
    Teacher,
    Student,
}

impl ScheduleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleKind::Master => "master",
            ScheduleKind::Course => "course",
            ScheduleKind::Teacher => "teacher",
            ScheduleKind::Student => "student",
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully determined schedule request: the view kind plus every id it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleTarget {
    Master {
        semester_id: SemesterId,
    },
    Course {
        semester_id: SemesterId,
    },
    Teacher {
        teacher_id: TeacherId,
    },
    Student {
        student_id: StudentId,
        semester_id: SemesterId,
    },
}

impl ScheduleTarget {
    pub fn kind(&self) -> ScheduleKind {
        match self {
            ScheduleTarget::Master { .. } => ScheduleKind::Master,
            ScheduleTarget::Course { .. } => ScheduleKind::Course,
            ScheduleTarget::Teacher { .. } => ScheduleKind::Teacher,
            ScheduleTarget::Student { .. } => ScheduleKind::Student,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleListing {
    pub sections: Vec<SectionAssignment>,
    /// Teacher or student the schedule belongs to.
    pub subject: Option<PersonSummary>,
    /// Server-side caption, e.g. the semester name of a master schedule.
    pub caption: Option<String>,
}

impl ScheduleListing {
    pub fn from_sections(sections: Vec<SectionAssignment>) -> Self {
        Self {
            sections,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationReport {
    pub generated_sections: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceAnalytics {
    pub teacher_stats: Vec<TeacherStat>,
    pub room_stats: Vec<RoomStat>,
}

#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> GatewayResult<SessionUser>;
    async fn fetch_semesters(&self) -> GatewayResult<Vec<Semester>>;
    async fn fetch_teachers(&self) -> GatewayResult<Vec<TeacherSummary>>;
    async fn fetch_schedule(&self, target: &ScheduleTarget) -> GatewayResult<ScheduleListing>;
    async fn fetch_eligible_sections(
        &self,
        student_id: StudentId,
        semester_id: SemesterId,
    ) -> GatewayResult<EligibleSectionsResult>;
    async fn generate_master_schedule(
        &self,
        semester_id: SemesterId,
    ) -> GatewayResult<GenerationReport>;
    async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        semester_id: SemesterId,
    ) -> GatewayResult<()>;
    async fn fetch_progress(&self, student_id: StudentId) -> GatewayResult<ProgressResult>;
    async fn fetch_transcript(&self, student_id: StudentId) -> GatewayResult<TranscriptResult>;
    async fn fetch_resource_analytics(&self) -> GatewayResult<ResourceAnalytics>;
}
