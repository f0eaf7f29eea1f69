use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    CourseId, PersonSummary, Role, SectionAssignment, SemesterId, StudentId, UserId,
};

/// Success envelope wrapping most portal responses: `{"success": true, "result": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl<T> ApiEnvelope<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: UserId,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterScheduleResult {
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionAssignment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseScheduleResult {
    #[serde(default)]
    pub semester_id: Option<SemesterId>,
    /// Sections grouped by course code.
    #[serde(default)]
    pub courses: BTreeMap<String, Vec<SectionAssignment>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeacherScheduleResult {
    #[serde(default)]
    pub teacher: Option<PersonSummary>,
    #[serde(default)]
    pub schedule: Vec<SectionAssignment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentScheduleResult {
    #[serde(default)]
    pub student: Option<PersonSummary>,
    #[serde(default)]
    pub sections: Vec<SectionAssignment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EligibleSectionsResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub student: Option<PersonSummary>,
    #[serde(default)]
    pub sections: Vec<SectionAssignment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub generated_sections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester_id: Option<SemesterId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub credits_earned: f64,
    #[serde(default)]
    pub credits_required: f64,
    #[serde(default)]
    pub credits_remaining: f64,
    #[serde(default)]
    pub core_passed: u32,
    #[serde(default)]
    pub core_required: u32,
    #[serde(default)]
    pub gpa: f64,
    #[serde(default)]
    pub predicted_semesters_to_graduate: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreCourseSummary {
    pub course_id: CourseId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub semester_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResult {
    #[serde(default)]
    pub student: Option<PersonSummary>,
    #[serde(default)]
    pub progress: ProgressSnapshot,
    #[serde(default)]
    pub remaining_core_courses: Vec<CoreCourseSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRecord {
    pub course_id: CourseId,
    #[serde(default)]
    pub course_code: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub credits: Option<f64>,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub recorded_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptResult {
    #[serde(default)]
    pub student: Option<PersonSummary>,
    #[serde(default)]
    pub transcript: Vec<TranscriptRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStat {
    pub teacher_id: i64,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub sections_assigned: u32,
    #[serde(default)]
    pub weekly_hours: f64,
    #[serde(default)]
    pub utilization_percent: f64,
    #[serde(default)]
    pub daily_load: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStat {
    pub room_id: i64,
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub weekly_hours_used: f64,
    #[serde(default)]
    pub utilization_percent: f64,
    #[serde(default)]
    pub daily_load: BTreeMap<String, f64>,
    #[serde(default)]
    pub overlap_count: u32,
}

/// Accepts ISO local timestamps with or without fractional seconds and maps
/// anything else (arrays, garbage, null) to `None`.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let parsed = raw.as_str().and_then(|s| {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .ok()
    });
    Ok(parsed)
}
