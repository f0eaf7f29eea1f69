use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(SemesterId);
id_newtype!(StudentId);
id_newtype!(TeacherId);
id_newtype!(CourseId);
id_newtype!(SectionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "TEACHER" => Ok(Role::Teacher),
            "STUDENT" => Ok(Role::Student),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// One scheduled offering of a course, as the portal API reports it.
///
/// `meetings` holds free-text descriptors such as `"MONDAY 9AM-11AM"`; a
/// section may meet zero times.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionAssignment {
    #[serde(rename = "course", default)]
    pub course_label: String,
    #[serde(rename = "teacher", default)]
    pub teacher_label: String,
    #[serde(rename = "room", default)]
    pub room_label: String,
    #[serde(rename = "schedule", default)]
    pub meetings: Vec<String>,
    #[serde(
        rename = "sectionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub section_id: Option<SectionId>,
    #[serde(rename = "courseId", default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<CourseId>,
    #[serde(rename = "email", default, skip_serializing_if = "Option::is_none")]
    pub teacher_email: Option<String>,
    #[serde(rename = "students", default, skip_serializing_if = "Option::is_none")]
    pub enrollment_summary: Option<String>,
}

impl SectionAssignment {
    pub fn new(
        course_label: impl Into<String>,
        teacher_label: impl Into<String>,
        room_label: impl Into<String>,
    ) -> Self {
        Self {
            course_label: course_label.into(),
            teacher_label: teacher_label.into(),
            room_label: room_label.into(),
            ..Self::default()
        }
    }

    pub fn with_meetings<I, S>(mut self, meetings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meetings = meetings.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_course_id(mut self, course_id: CourseId) -> Self {
        self.course_id = Some(course_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: SemesterId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub id: TeacherId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl TeacherSummary {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Profile block the server attaches to teacher and student responses.
///
/// The server fills unknown people with `"Unknown"` strings and reports the
/// grade level either as a number or as text, so it is kept untyped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "Grade level", skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<serde_json::Value>,
}

impl PersonSummary {
    pub fn grade_level_label(&self) -> Option<String> {
        match self.grade_level.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
