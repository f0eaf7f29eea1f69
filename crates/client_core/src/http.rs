//! `reqwest` implementation of [`DataGateway`] against the portal REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CourseId, Semester, SemesterId, StudentId, TeacherSummary},
    error::{ApiErrorBody, ApiException},
    protocol::{
        ApiEnvelope, CourseScheduleResult, EligibleSectionsResult, EnrollmentRequest,
        GenerateResponse, LoginRequest, LoginResponse, MasterScheduleResult, ProgressResult,
        RoomStat, StudentScheduleResult, TeacherScheduleResult, TeacherStat, TranscriptResult,
    },
};
use tracing::debug;

use crate::{
    config::ClientSettings,
    error::{GatewayError, GatewayResult},
    gateway::{DataGateway, GenerationReport, ResourceAnalytics, ScheduleListing, ScheduleTarget},
    session::SessionUser,
};

const API_PREFIX: &str = "/api/v1";

pub struct HttpGateway {
    http: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn from_settings(settings: &ClientSettings) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
            .build()?;
        Ok(Self::with_client(http, settings.api_base_url.as_str()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    async fn get_result<T>(&self, path: &str, query: &[(&str, i64)]) -> GatewayResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let response = self.http.get(&url).query(query).send().await?;
        let envelope: ApiEnvelope<T> = decode_json(&url, ensure_success(response).await?).await?;
        unwrap_envelope(envelope)
    }
}

async fn ensure_success(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .bytes()
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<ApiErrorBody>(&bytes).ok())
        .unwrap_or_default();
    Err(ApiException::from_body(status.as_u16(), body).into())
}

async fn decode_json<T: DeserializeOwned>(url: &str, response: Response) -> GatewayResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| GatewayError::Decode {
        endpoint: url.to_string(),
        reason: err.to_string(),
    })
}

fn unwrap_envelope<T: Default>(envelope: ApiEnvelope<T>) -> GatewayResult<T> {
    if !envelope.success {
        return Err(GatewayError::Rejected(envelope.message.unwrap_or_default()));
    }
    Ok(envelope.result.unwrap_or_default())
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn login(&self, username: &str, password: &str) -> GatewayResult<SessionUser> {
        let url = self.endpoint("/login");
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: LoginResponse = decode_json(&url, ensure_success(response).await?).await?;
        let role = body
            .role
            .ok_or_else(|| GatewayError::Rejected("Invalid login response.".to_string()))?;
        Ok(SessionUser::new(body.user_id, role, body.name, body.email))
    }

    async fn fetch_semesters(&self) -> GatewayResult<Vec<Semester>> {
        self.get_result("/semesters", &[]).await
    }

    async fn fetch_teachers(&self) -> GatewayResult<Vec<TeacherSummary>> {
        self.get_result("/teachers", &[]).await
    }

    async fn fetch_schedule(&self, target: &ScheduleTarget) -> GatewayResult<ScheduleListing> {
        match *target {
            ScheduleTarget::Master { semester_id } => {
                let result: MasterScheduleResult = self
                    .get_result(&format!("/schedule/{semester_id}"), &[])
                    .await?;
                Ok(ScheduleListing {
                    sections: result.sections,
                    subject: None,
                    caption: result.semester.filter(|s| !s.is_empty()),
                })
            }
            ScheduleTarget::Course { semester_id } => {
                let result: CourseScheduleResult = self
                    .get_result(&format!("/schedule/courses/{semester_id}"), &[])
                    .await?;
                // BTreeMap iteration keeps course codes in a stable order.
                let sections = result.courses.into_values().flatten().collect();
                Ok(ScheduleListing::from_sections(sections))
            }
            ScheduleTarget::Teacher { teacher_id } => {
                let result: TeacherScheduleResult = self
                    .get_result(&format!("/schedule/teacher/{teacher_id}"), &[])
                    .await?;
                Ok(ScheduleListing {
                    sections: result.schedule,
                    subject: result.teacher,
                    caption: None,
                })
            }
            ScheduleTarget::Student {
                student_id,
                semester_id,
            } => {
                let result: StudentScheduleResult = self
                    .get_result(
                        &format!("/enrollment/student/{student_id}/schedule"),
                        &[("semesterId", semester_id.0)],
                    )
                    .await?;
                Ok(ScheduleListing {
                    sections: result.sections,
                    subject: result.student,
                    caption: None,
                })
            }
        }
    }

    async fn fetch_eligible_sections(
        &self,
        student_id: StudentId,
        semester_id: SemesterId,
    ) -> GatewayResult<EligibleSectionsResult> {
        self.get_result(
            &format!("/enrollment/student/{student_id}/eligible"),
            &[("semesterId", semester_id.0)],
        )
        .await
    }

    async fn generate_master_schedule(
        &self,
        semester_id: SemesterId,
    ) -> GatewayResult<GenerationReport> {
        let url = self.endpoint("/schedule/generate");
        let response = self
            .http
            .post(&url)
            .query(&[("semesterId", semester_id.0)])
            .send()
            .await?;
        let body: GenerateResponse = decode_json(&url, ensure_success(response).await?).await?;
        if !body.success {
            return Err(GatewayError::Rejected(
                "schedule generation reported failure".to_string(),
            ));
        }
        Ok(GenerationReport {
            generated_sections: body.generated_sections,
        })
    }

    async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        semester_id: SemesterId,
    ) -> GatewayResult<()> {
        let url = self.endpoint("/enrollment");
        let response = self
            .http
            .post(&url)
            .json(&EnrollmentRequest {
                student_id,
                course_id,
                semester_id: Some(semester_id),
            })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn fetch_progress(&self, student_id: StudentId) -> GatewayResult<ProgressResult> {
        self.get_result(&format!("/student/academic/{student_id}/progress"), &[])
            .await
    }

    async fn fetch_transcript(&self, student_id: StudentId) -> GatewayResult<TranscriptResult> {
        self.get_result(&format!("/student/academic/{student_id}/transcript"), &[])
            .await
    }

    async fn fetch_resource_analytics(&self) -> GatewayResult<ResourceAnalytics> {
        let (teacher_stats, room_stats) = futures::try_join!(
            self.get_result::<Vec<TeacherStat>>("/resource/teachers", &[]),
            self.get_result::<Vec<RoomStat>>("/resource/rooms", &[]),
        )?;
        Ok(ResourceAnalytics {
            teacher_stats,
            room_stats,
        })
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
