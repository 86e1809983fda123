//! Attendance rosters and grade sheets: the enrolled students of a class
//! joined with whatever is stored for one scope, ready to edit and submit
//! back through the reconciler.

use crate::error::{LogicError, LogicResult};
use crate::model::Student;
use crate::roster::ReconcileSummary;
use crate::store::{GradeSubmission, Store};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub student_name: String,
    /// `None` when nothing is stored for the student on this date.
    pub is_present: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRoster {
    pub class_id: i64,
    pub class_name: String,
    pub date: NaiveDate,
    pub students: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntry {
    pub student_id: i64,
    pub student_name: String,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSheet {
    pub class_id: i64,
    pub class_name: String,
    pub assessment: String,
    pub date: NaiveDate,
    pub max_score: Option<f64>,
    pub entries: Vec<GradeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedAttendance {
    pub summary: ReconcileSummary,
    pub roster: AttendanceRoster,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedGrades {
    pub summary: ReconcileSummary,
    pub sheet: GradeSheet,
}

/// Byte-wise `(last, first)` ordering; `id` keeps equal names deterministic.
pub fn sort_students(students: &mut [Student]) {
    students.sort_by(|a, b| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn class_name(store: &dyn Store, class_id: i64) -> LogicResult<String> {
    store
        .get_class_name(class_id)?
        .ok_or_else(|| LogicError::not_found("Class not found."))
}

fn sorted_students(store: &dyn Store, class_id: i64) -> LogicResult<Vec<Student>> {
    let mut students = store.get_students_for_class(class_id)?;
    sort_students(&mut students);
    Ok(students)
}

fn normalize_assessment(assessment: &str) -> LogicResult<String> {
    let assessment = assessment.trim();
    if assessment.is_empty() {
        return Err(LogicError::validation("Assessment name is required."));
    }
    Ok(assessment.to_string())
}

pub fn build_attendance_roster(
    store: &dyn Store,
    class_id: i64,
    date: NaiveDate,
) -> LogicResult<AttendanceRoster> {
    let class_name = class_name(store, class_id)?;
    let students = sorted_students(store, class_id)?;
    let present: HashMap<i64, bool> = store
        .get_attendance_records(class_id, date)?
        .into_iter()
        .map(|r| (r.student_id, r.is_present))
        .collect();

    let students = students
        .into_iter()
        .map(|s| AttendanceEntry {
            is_present: present.get(&s.id).copied(),
            student_name: s.full_name(),
            student_id: s.id,
        })
        .collect();

    Ok(AttendanceRoster {
        class_id,
        class_name,
        date,
        students,
    })
}

pub fn save_attendance(
    store: &dyn Store,
    class_id: i64,
    date: NaiveDate,
    entries: &[(i64, bool)],
) -> LogicResult<SavedAttendance> {
    let summary = store.replace_attendance_records(class_id, date, entries)?;
    let roster = build_attendance_roster(store, class_id, date)?;
    Ok(SavedAttendance { summary, roster })
}

pub fn build_grade_sheet(
    store: &dyn Store,
    class_id: i64,
    assessment: &str,
    date: NaiveDate,
) -> LogicResult<GradeSheet> {
    let assessment = normalize_assessment(assessment)?;
    let class_name = class_name(store, class_id)?;
    let students = sorted_students(store, class_id)?;
    let records = store.get_grade_records(class_id, &assessment, date)?;
    let max_score = records.iter().find_map(|r| r.max_score);
    let mut by_student: HashMap<i64, _> = records
        .into_iter()
        .map(|r| (r.student_id, r))
        .collect();

    let entries = students
        .into_iter()
        .map(|s| {
            let record = by_student.remove(&s.id);
            GradeEntry {
                student_name: s.full_name(),
                student_id: s.id,
                score: record.as_ref().and_then(|r| r.score),
                comment: record.and_then(|r| r.comment),
            }
        })
        .collect();

    Ok(GradeSheet {
        class_id,
        class_name,
        assessment,
        date,
        max_score,
        entries,
    })
}

pub fn save_grades(
    store: &dyn Store,
    class_id: i64,
    assessment: &str,
    date: NaiveDate,
    max_score: Option<f64>,
    entries: &[GradeSubmission],
) -> LogicResult<SavedGrades> {
    let assessment = normalize_assessment(assessment)?;
    let summary = store.replace_grade_records(class_id, &assessment, date, max_score, entries)?;
    let sheet = build_grade_sheet(store, class_id, &assessment, date)?;
    Ok(SavedGrades { summary, sheet })
}
