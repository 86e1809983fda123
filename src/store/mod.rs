//! Storage port consumed by the roster, sheet, calendar and membership logic.
//!
//! `SqliteStore` backs the running service; `MemoryStore` backs unit tests.

#[cfg(test)]
pub mod memory;
pub mod sqlite;

use crate::model::{
    trimmed_or_none, Announcement, AttendanceRecord, ClassWithEnrollments, EnrollmentDetail,
    EventItem, GradeRecord, NewClass, RecentGrade, SchoolClass, Student,
};
use crate::roster::{GradeValue, ReconcileSummary};
use chrono::NaiveDate;

#[cfg(test)]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// One row of a grade submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeSubmission {
    pub student_id: i64,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

impl GradeSubmission {
    pub fn value(&self) -> GradeValue {
        GradeValue {
            score: self.score,
            comment: trimmed_or_none(self.comment.as_deref()),
        }
    }
}

pub trait Store {
    // classes
    fn get_classes_for_teacher(&self, teacher_id: i64) -> anyhow::Result<Vec<SchoolClass>>;
    fn get_all_classes(&self) -> anyhow::Result<Vec<SchoolClass>>;
    fn add_class(&self, class: &NewClass) -> anyhow::Result<SchoolClass>;
    /// `teacher_id = None` skips the ownership filter.
    fn get_class_with_enrollments(
        &self,
        class_id: i64,
        teacher_id: Option<i64>,
    ) -> anyhow::Result<Option<ClassWithEnrollments>>;
    fn get_class_name(&self, class_id: i64) -> anyhow::Result<Option<String>>;
    fn get_class_count(&self, teacher_id: i64) -> anyhow::Result<usize>;
    fn get_distinct_student_count(&self, teacher_id: i64) -> anyhow::Result<usize>;

    // students and enrollments
    fn get_students_for_class(&self, class_id: i64) -> anyhow::Result<Vec<Student>>;
    fn get_student_by_email(&self, email: &str) -> anyhow::Result<Option<Student>>;
    fn add_student(
        &self,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
    ) -> anyhow::Result<Student>;
    fn enrollment_exists(&self, student_id: i64, class_id: i64) -> anyhow::Result<bool>;
    fn add_enrollment(&self, student_id: i64, class_id: i64) -> anyhow::Result<i64>;
    /// Only resolves enrollments in a class owned by `teacher_id`.
    fn get_enrollment_detail(
        &self,
        enrollment_id: i64,
        teacher_id: i64,
    ) -> anyhow::Result<Option<EnrollmentDetail>>;
    fn remove_enrollment(&self, enrollment_id: i64) -> anyhow::Result<()>;

    // attendance
    fn get_attendance_records(
        &self,
        class_id: i64,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<AttendanceRecord>>;
    /// Reconciles the `(class_id, date)` scope against `incoming` atomically.
    fn replace_attendance_records(
        &self,
        class_id: i64,
        date: NaiveDate,
        incoming: &[(i64, bool)],
    ) -> anyhow::Result<ReconcileSummary>;

    // grades
    fn get_grade_records(
        &self,
        class_id: i64,
        assessment: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<GradeRecord>>;
    /// Reconciles the `(class_id, assessment, date)` scope against `incoming`
    /// atomically; `max_score` is written to every updated or inserted row.
    fn replace_grade_records(
        &self,
        class_id: i64,
        assessment: &str,
        date: NaiveDate,
        max_score: Option<f64>,
        incoming: &[GradeSubmission],
    ) -> anyhow::Result<ReconcileSummary>;
    fn get_recent_grades(&self, teacher_id: i64, take: usize) -> anyhow::Result<Vec<RecentGrade>>;

    // events
    /// Ordered by day, then time.
    fn get_events_for_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> anyhow::Result<Vec<EventItem>>;
    /// Every event the user owns, unfiltered and unsorted.
    fn get_events_for_user(&self, user_id: i64) -> anyhow::Result<Vec<EventItem>>;
    fn get_event(&self, id: &str, user_id: i64) -> anyhow::Result<Option<EventItem>>;
    fn add_event(&self, item: &EventItem) -> anyhow::Result<()>;
    fn update_event(&self, item: &EventItem) -> anyhow::Result<()>;
    fn delete_event(&self, id: &str, user_id: i64) -> anyhow::Result<()>;

    // announcements
    /// Newest first; `take = None` returns all of them.
    fn get_announcements(&self, take: Option<usize>) -> anyhow::Result<Vec<Announcement>>;
    fn get_announcement(&self, id: &str) -> anyhow::Result<Option<Announcement>>;
    fn add_announcement(&self, announcement: &Announcement) -> anyhow::Result<()>;
    fn delete_announcement(&self, id: &str) -> anyhow::Result<()>;
}
