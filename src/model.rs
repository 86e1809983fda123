use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: i64,
    pub name: String,
    pub room: Option<String>,
    pub description: Option<String>,
    pub teacher_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewClass {
    pub name: String,
    pub room: Option<String>,
    pub description: Option<String>,
    pub teacher_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// An enrollment as stored. `student` is `None` when the student row it
/// points at cannot be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub student: Option<Student>,
}

#[derive(Debug, Clone)]
pub struct ClassWithEnrollments {
    pub class: SchoolClass,
    pub enrollments: Vec<Enrollment>,
}

#[derive(Debug, Clone)]
pub struct EnrollmentDetail {
    pub enrollment_id: i64,
    pub student: Student,
    pub class: SchoolClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub is_present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub assessment: String,
    pub date_recorded: NaiveDate,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentGrade {
    #[serde(flatten)]
    pub record: GradeRecord,
    pub student_name: String,
    pub class_name: String,
}

/// A calendar entry owned by one user. `day`/`month`/`year` are kept as
/// entered and need not form a valid date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by_user_id: i64,
}

/// Trims `value`, mapping blank input to `None`.
pub fn trimmed_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
