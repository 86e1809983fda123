use super::{GradeSubmission, Store};
use crate::model::{
    Announcement, AttendanceRecord, ClassWithEnrollments, Enrollment, EnrollmentDetail,
    EventItem, GradeRecord, NewClass, RecentGrade, SchoolClass, Student,
};
use crate::roster::{self, ReconcileSummary, StoredRow};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashSet;

#[derive(Default)]
struct Data {
    next_id: i64,
    classes: Vec<SchoolClass>,
    students: Vec<Student>,
    enrollments: Vec<(i64, i64, i64)>,
    attendance: Vec<AttendanceRecord>,
    grades: Vec<GradeRecord>,
    events: Vec<EventItem>,
    announcements: Vec<Announcement>,
}

impl Data {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn student(&self, id: i64) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    fn class(&self, id: i64) -> Option<&SchoolClass> {
        self.classes.iter().find(|c| c.id == id)
    }
}

/// `Store` over plain vectors. Dangling enrollments and student ids are
/// allowed so tests can model inconsistent data.
#[derive(Default)]
pub struct MemoryStore {
    data: RefCell<Data>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an enrollment without checking that the student exists.
    pub fn add_dangling_enrollment(&self, student_id: i64, class_id: i64) -> i64 {
        let mut d = self.data.borrow_mut();
        let id = d.next_id();
        d.enrollments.push((id, student_id, class_id));
        id
    }

    pub fn add_raw_event(&self, item: EventItem) {
        self.data.borrow_mut().events.push(item);
    }
}

impl Store for MemoryStore {
    fn get_classes_for_teacher(&self, teacher_id: i64) -> anyhow::Result<Vec<SchoolClass>> {
        let mut out: Vec<SchoolClass> = self
            .data
            .borrow()
            .classes
            .iter()
            .filter(|c| c.teacher_id == teacher_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn get_all_classes(&self) -> anyhow::Result<Vec<SchoolClass>> {
        let mut out = self.data.borrow().classes.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn add_class(&self, class: &NewClass) -> anyhow::Result<SchoolClass> {
        let mut d = self.data.borrow_mut();
        let created = SchoolClass {
            id: d.next_id(),
            name: class.name.clone(),
            room: class.room.clone(),
            description: class.description.clone(),
            teacher_id: class.teacher_id,
        };
        d.classes.push(created.clone());
        Ok(created)
    }

    fn get_class_with_enrollments(
        &self,
        class_id: i64,
        teacher_id: Option<i64>,
    ) -> anyhow::Result<Option<ClassWithEnrollments>> {
        let d = self.data.borrow();
        let Some(class) = d
            .class(class_id)
            .filter(|c| teacher_id.map_or(true, |t| c.teacher_id == t))
            .cloned()
        else {
            return Ok(None);
        };
        let enrollments = d
            .enrollments
            .iter()
            .filter(|(_, _, c)| *c == class_id)
            .map(|&(id, student_id, class_id)| Enrollment {
                id,
                student_id,
                class_id,
                student: d.student(student_id).cloned(),
            })
            .collect();
        Ok(Some(ClassWithEnrollments { class, enrollments }))
    }

    fn get_class_name(&self, class_id: i64) -> anyhow::Result<Option<String>> {
        Ok(self.data.borrow().class(class_id).map(|c| c.name.clone()))
    }

    fn get_class_count(&self, teacher_id: i64) -> anyhow::Result<usize> {
        Ok(self
            .data
            .borrow()
            .classes
            .iter()
            .filter(|c| c.teacher_id == teacher_id)
            .count())
    }

    fn get_distinct_student_count(&self, teacher_id: i64) -> anyhow::Result<usize> {
        let d = self.data.borrow();
        let mut ids: Vec<i64> = d
            .enrollments
            .iter()
            .filter(|(_, _, class_id)| {
                d.class(*class_id)
                    .map_or(false, |c| c.teacher_id == teacher_id)
            })
            .map(|(_, student_id, _)| *student_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids.len())
    }

    fn get_students_for_class(&self, class_id: i64) -> anyhow::Result<Vec<Student>> {
        let d = self.data.borrow();
        Ok(d.enrollments
            .iter()
            .filter(|(_, _, c)| *c == class_id)
            .filter_map(|(_, student_id, _)| d.student(*student_id).cloned())
            .collect())
    }

    fn get_student_by_email(&self, email: &str) -> anyhow::Result<Option<Student>> {
        Ok(self
            .data
            .borrow()
            .students
            .iter()
            .find(|s| s.email.as_deref() == Some(email))
            .cloned())
    }

    fn add_student(
        &self,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
    ) -> anyhow::Result<Student> {
        let mut d = self.data.borrow_mut();
        let student = Student {
            id: d.next_id(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.map(|s| s.to_string()),
        };
        d.students.push(student.clone());
        Ok(student)
    }

    fn enrollment_exists(&self, student_id: i64, class_id: i64) -> anyhow::Result<bool> {
        Ok(self
            .data
            .borrow()
            .enrollments
            .iter()
            .any(|&(_, s, c)| s == student_id && c == class_id))
    }

    fn add_enrollment(&self, student_id: i64, class_id: i64) -> anyhow::Result<i64> {
        if self.enrollment_exists(student_id, class_id)? {
            anyhow::bail!("enrollment ({}, {}) already exists", student_id, class_id);
        }
        Ok(self.add_dangling_enrollment(student_id, class_id))
    }

    fn get_enrollment_detail(
        &self,
        enrollment_id: i64,
        teacher_id: i64,
    ) -> anyhow::Result<Option<EnrollmentDetail>> {
        let d = self.data.borrow();
        let Some(&(id, student_id, class_id)) =
            d.enrollments.iter().find(|(id, _, _)| *id == enrollment_id)
        else {
            return Ok(None);
        };
        let class = d.class(class_id).filter(|c| c.teacher_id == teacher_id);
        let student = d.student(student_id);
        Ok(match (class, student) {
            (Some(class), Some(student)) => Some(EnrollmentDetail {
                enrollment_id: id,
                student: student.clone(),
                class: class.clone(),
            }),
            _ => None,
        })
    }

    fn remove_enrollment(&self, enrollment_id: i64) -> anyhow::Result<()> {
        self.data
            .borrow_mut()
            .enrollments
            .retain(|(id, _, _)| *id != enrollment_id);
        Ok(())
    }

    fn get_attendance_records(
        &self,
        class_id: i64,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        Ok(self
            .data
            .borrow()
            .attendance
            .iter()
            .filter(|r| r.class_id == class_id && r.date == date)
            .cloned()
            .collect())
    }

    fn replace_attendance_records(
        &self,
        class_id: i64,
        date: NaiveDate,
        incoming: &[(i64, bool)],
    ) -> anyhow::Result<ReconcileSummary> {
        let mut d = self.data.borrow_mut();
        let existing: Vec<StoredRow> = d
            .attendance
            .iter()
            .filter(|r| r.class_id == class_id && r.date == date)
            .map(|r| StoredRow {
                record_id: r.id,
                student_id: r.student_id,
            })
            .collect();
        let plan = roster::plan(existing, incoming.iter().copied());

        d.attendance.retain(|r| !plan.deletes.contains(&r.id));
        for (record_id, is_present) in &plan.updates {
            if let Some(r) = d.attendance.iter_mut().find(|r| r.id == *record_id) {
                r.is_present = *is_present;
            }
        }
        for (student_id, is_present) in &plan.inserts {
            let id = d.next_id();
            d.attendance.push(AttendanceRecord {
                id,
                student_id: *student_id,
                class_id,
                date,
                is_present: *is_present,
            });
        }
        Ok(plan.summary())
    }

    fn get_grade_records(
        &self,
        class_id: i64,
        assessment: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<GradeRecord>> {
        Ok(self
            .data
            .borrow()
            .grades
            .iter()
            .filter(|g| {
                g.class_id == class_id && g.assessment == assessment && g.date_recorded == date
            })
            .cloned()
            .collect())
    }

    fn replace_grade_records(
        &self,
        class_id: i64,
        assessment: &str,
        date: NaiveDate,
        max_score: Option<f64>,
        incoming: &[GradeSubmission],
    ) -> anyhow::Result<ReconcileSummary> {
        let mut d = self.data.borrow_mut();
        let existing: Vec<StoredRow> = d
            .grades
            .iter()
            .filter(|g| {
                g.class_id == class_id && g.assessment == assessment && g.date_recorded == date
            })
            .map(|g| StoredRow {
                record_id: g.id,
                student_id: g.student_id,
            })
            .collect();
        let enrolled: HashSet<i64> = d
            .enrollments
            .iter()
            .filter(|(_, student_id, c)| *c == class_id && d.student(*student_id).is_some())
            .map(|(_, student_id, _)| *student_id)
            .collect();
        let plan = roster::plan(
            existing,
            incoming
                .iter()
                .filter(|entry| enrolled.contains(&entry.student_id))
                .map(|entry| (entry.student_id, entry.value())),
        );

        d.grades.retain(|g| !plan.deletes.contains(&g.id));
        for (record_id, value) in &plan.updates {
            if let Some(g) = d.grades.iter_mut().find(|g| g.id == *record_id) {
                g.score = value.score;
                g.max_score = max_score;
                g.comment = value.comment.clone();
            }
        }
        for (student_id, value) in &plan.inserts {
            let id = d.next_id();
            d.grades.push(GradeRecord {
                id,
                student_id: *student_id,
                class_id,
                assessment: assessment.to_string(),
                date_recorded: date,
                score: value.score,
                max_score,
                comment: value.comment.clone(),
            });
        }
        Ok(plan.summary())
    }

    fn get_recent_grades(&self, teacher_id: i64, take: usize) -> anyhow::Result<Vec<RecentGrade>> {
        let d = self.data.borrow();
        let mut out: Vec<RecentGrade> = d
            .grades
            .iter()
            .filter_map(|g| {
                let class = d.class(g.class_id).filter(|c| c.teacher_id == teacher_id)?;
                let student = d.student(g.student_id)?;
                Some(RecentGrade {
                    record: g.clone(),
                    student_name: student.full_name(),
                    class_name: class.name.clone(),
                })
            })
            .collect();
        out.sort_by(|a, b| {
            b.record
                .date_recorded
                .cmp(&a.record.date_recorded)
                .then(b.record.id.cmp(&a.record.id))
        });
        out.truncate(take);
        Ok(out)
    }

    fn get_events_for_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> anyhow::Result<Vec<EventItem>> {
        let mut out: Vec<EventItem> = self
            .data
            .borrow()
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.year == year && e.month == month as i32)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.time.cmp(&b.time)));
        Ok(out)
    }

    fn get_events_for_user(&self, user_id: i64) -> anyhow::Result<Vec<EventItem>> {
        Ok(self
            .data
            .borrow()
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get_event(&self, id: &str, user_id: i64) -> anyhow::Result<Option<EventItem>> {
        Ok(self
            .data
            .borrow()
            .events
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned())
    }

    fn add_event(&self, item: &EventItem) -> anyhow::Result<()> {
        self.add_raw_event(item.clone());
        Ok(())
    }

    fn update_event(&self, item: &EventItem) -> anyhow::Result<()> {
        let mut d = self.data.borrow_mut();
        if let Some(e) = d
            .events
            .iter_mut()
            .find(|e| e.id == item.id && e.user_id == item.user_id)
        {
            *e = item.clone();
        }
        Ok(())
    }

    fn delete_event(&self, id: &str, user_id: i64) -> anyhow::Result<()> {
        self.data
            .borrow_mut()
            .events
            .retain(|e| !(e.id == id && e.user_id == user_id));
        Ok(())
    }

    fn get_announcements(&self, take: Option<usize>) -> anyhow::Result<Vec<Announcement>> {
        let d = self.data.borrow();
        // Reverse first so equal timestamps keep newest-inserted first.
        let mut out: Vec<Announcement> = d.announcements.iter().rev().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(take) = take {
            out.truncate(take);
        }
        Ok(out)
    }

    fn get_announcement(&self, id: &str) -> anyhow::Result<Option<Announcement>> {
        Ok(self
            .data
            .borrow()
            .announcements
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    fn add_announcement(&self, announcement: &Announcement) -> anyhow::Result<()> {
        self.data
            .borrow_mut()
            .announcements
            .push(announcement.clone());
        Ok(())
    }

    fn delete_announcement(&self, id: &str) -> anyhow::Result<()> {
        self.data
            .borrow_mut()
            .announcements
            .retain(|a| a.id != id);
        Ok(())
    }
}
