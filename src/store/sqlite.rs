use super::{GradeSubmission, Store};
use crate::model::{
    Announcement, AttendanceRecord, ClassWithEnrollments, Enrollment, EnrollmentDetail,
    EventItem, GradeRecord, NewClass, RecentGrade, SchoolClass, Student,
};
use crate::roster::{self, ReconcileSummary, StoredRow};
use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;

pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn map_class(r: &Row<'_>, at: usize) -> rusqlite::Result<SchoolClass> {
    Ok(SchoolClass {
        id: r.get(at)?,
        name: r.get(at + 1)?,
        room: r.get(at + 2)?,
        description: r.get(at + 3)?,
        teacher_id: r.get(at + 4)?,
    })
}

fn map_student(r: &Row<'_>, at: usize) -> rusqlite::Result<Student> {
    Ok(Student {
        id: r.get(at)?,
        first_name: r.get(at + 1)?,
        last_name: r.get(at + 2)?,
        email: r.get(at + 3)?,
    })
}

fn map_grade(r: &Row<'_>) -> rusqlite::Result<GradeRecord> {
    Ok(GradeRecord {
        id: r.get(0)?,
        student_id: r.get(1)?,
        class_id: r.get(2)?,
        assessment: r.get(3)?,
        date_recorded: r.get(4)?,
        score: r.get(5)?,
        max_score: r.get(6)?,
        comment: r.get(7)?,
    })
}

fn map_event(r: &Row<'_>) -> rusqlite::Result<EventItem> {
    Ok(EventItem {
        id: r.get(0)?,
        title: r.get(1)?,
        description: r.get(2)?,
        location: r.get(3)?,
        time: r.get(4)?,
        day: r.get(5)?,
        month: r.get(6)?,
        year: r.get(7)?,
        user_id: r.get(8)?,
    })
}

fn map_announcement(r: &Row<'_>) -> rusqlite::Result<Announcement> {
    Ok(Announcement {
        id: r.get(0)?,
        title: r.get(1)?,
        body: r.get(2)?,
        created_at: r.get(3)?,
        created_by_user_id: r.get(4)?,
    })
}

impl SqliteStore<'_> {
    fn query_classes(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> anyhow::Result<Vec<SchoolClass>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |r| map_class(r, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn load_enrollments(&self, class_id: i64) -> anyhow::Result<Vec<Enrollment>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.student_id, e.class_id,
                    s.id, s.first_name, s.last_name, s.email
             FROM enrollments e
             LEFT JOIN students s ON s.id = e.student_id
             WHERE e.class_id = ?
             ORDER BY e.id",
        )?;
        let rows = stmt
            .query_map([class_id], |r| {
                let student = match r.get::<_, Option<i64>>(3)? {
                    Some(_) => Some(map_student(r, 3)?),
                    None => None,
                };
                Ok(Enrollment {
                    id: r.get(0)?,
                    student_id: r.get(1)?,
                    class_id: r.get(2)?,
                    student,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl Store for SqliteStore<'_> {
    fn get_classes_for_teacher(&self, teacher_id: i64) -> anyhow::Result<Vec<SchoolClass>> {
        self.query_classes(
            "SELECT id, name, room, description, teacher_id
             FROM classes
             WHERE teacher_id = ?
             ORDER BY name, id",
            [teacher_id],
        )
    }

    fn get_all_classes(&self) -> anyhow::Result<Vec<SchoolClass>> {
        self.query_classes(
            "SELECT id, name, room, description, teacher_id
             FROM classes
             ORDER BY name, id",
            [],
        )
    }

    fn add_class(&self, class: &NewClass) -> anyhow::Result<SchoolClass> {
        self.conn
            .execute(
                "INSERT INTO classes(name, room, description, teacher_id) VALUES(?, ?, ?, ?)",
                params![class.name, class.room, class.description, class.teacher_id],
            )
            .context("insert classes")?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("created class {} for teacher {}", id, class.teacher_id);
        Ok(SchoolClass {
            id,
            name: class.name.clone(),
            room: class.room.clone(),
            description: class.description.clone(),
            teacher_id: class.teacher_id,
        })
    }

    fn get_class_with_enrollments(
        &self,
        class_id: i64,
        teacher_id: Option<i64>,
    ) -> anyhow::Result<Option<ClassWithEnrollments>> {
        let class = match teacher_id {
            Some(teacher_id) => self
                .conn
                .query_row(
                    "SELECT id, name, room, description, teacher_id
                     FROM classes
                     WHERE id = ? AND teacher_id = ?",
                    params![class_id, teacher_id],
                    |r| map_class(r, 0),
                )
                .optional()?,
            None => self
                .conn
                .query_row(
                    "SELECT id, name, room, description, teacher_id
                     FROM classes
                     WHERE id = ?",
                    [class_id],
                    |r| map_class(r, 0),
                )
                .optional()?,
        };
        let Some(class) = class else {
            return Ok(None);
        };
        let enrollments = self.load_enrollments(class_id)?;
        Ok(Some(ClassWithEnrollments { class, enrollments }))
    }

    fn get_class_name(&self, class_id: i64) -> anyhow::Result<Option<String>> {
        let name = self
            .conn
            .query_row("SELECT name FROM classes WHERE id = ?", [class_id], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(name)
    }

    fn get_class_count(&self, teacher_id: i64) -> anyhow::Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM classes WHERE teacher_id = ?",
            [teacher_id],
            |r| r.get(0),
        )?;
        Ok(n as usize)
    }

    fn get_distinct_student_count(&self, teacher_id: i64) -> anyhow::Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT e.student_id)
             FROM enrollments e
             JOIN classes c ON c.id = e.class_id
             WHERE c.teacher_id = ?",
            [teacher_id],
            |r| r.get(0),
        )?;
        Ok(n as usize)
    }

    fn get_students_for_class(&self, class_id: i64) -> anyhow::Result<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.first_name, s.last_name, s.email
             FROM enrollments e
             JOIN students s ON s.id = e.student_id
             WHERE e.class_id = ?
             ORDER BY s.last_name, s.first_name, s.id",
        )?;
        let rows = stmt
            .query_map([class_id], |r| map_student(r, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_student_by_email(&self, email: &str) -> anyhow::Result<Option<Student>> {
        let student = self
            .conn
            .query_row(
                "SELECT id, first_name, last_name, email
                 FROM students
                 WHERE email = ?
                 ORDER BY id
                 LIMIT 1",
                [email],
                |r| map_student(r, 0),
            )
            .optional()?;
        Ok(student)
    }

    fn add_student(
        &self,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
    ) -> anyhow::Result<Student> {
        self.conn
            .execute(
                "INSERT INTO students(first_name, last_name, email) VALUES(?, ?, ?)",
                params![first_name, last_name, email],
            )
            .context("insert students")?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("created student {}", id);
        Ok(Student {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.map(|s| s.to_string()),
        })
    }

    fn enrollment_exists(&self, student_id: i64, class_id: i64) -> anyhow::Result<bool> {
        let hit: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM enrollments WHERE student_id = ? AND class_id = ?",
                params![student_id, class_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    fn add_enrollment(&self, student_id: i64, class_id: i64) -> anyhow::Result<i64> {
        self.conn
            .execute(
                "INSERT INTO enrollments(student_id, class_id) VALUES(?, ?)",
                params![student_id, class_id],
            )
            .context("insert enrollments")?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_enrollment_detail(
        &self,
        enrollment_id: i64,
        teacher_id: i64,
    ) -> anyhow::Result<Option<EnrollmentDetail>> {
        let detail = self
            .conn
            .query_row(
                "SELECT e.id,
                        s.id, s.first_name, s.last_name, s.email,
                        c.id, c.name, c.room, c.description, c.teacher_id
                 FROM enrollments e
                 JOIN students s ON s.id = e.student_id
                 JOIN classes c ON c.id = e.class_id
                 WHERE e.id = ? AND c.teacher_id = ?",
                params![enrollment_id, teacher_id],
                |r| {
                    Ok(EnrollmentDetail {
                        enrollment_id: r.get(0)?,
                        student: map_student(r, 1)?,
                        class: map_class(r, 5)?,
                    })
                },
            )
            .optional()?;
        Ok(detail)
    }

    fn remove_enrollment(&self, enrollment_id: i64) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM enrollments WHERE id = ?", [enrollment_id])
            .context("delete enrollments")?;
        Ok(())
    }

    fn get_attendance_records(
        &self,
        class_id: i64,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, student_id, class_id, date, is_present
             FROM attendance_records
             WHERE class_id = ? AND date = ?
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![class_id, date], |r| {
                Ok(AttendanceRecord {
                    id: r.get(0)?,
                    student_id: r.get(1)?,
                    class_id: r.get(2)?,
                    date: r.get(3)?,
                    is_present: r.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn replace_attendance_records(
        &self,
        class_id: i64,
        date: NaiveDate,
        incoming: &[(i64, bool)],
    ) -> anyhow::Result<ReconcileSummary> {
        let tx = self.conn.unchecked_transaction()?;
        let existing = {
            let mut stmt = tx.prepare(
                "SELECT id, student_id
                 FROM attendance_records
                 WHERE class_id = ? AND date = ?
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![class_id, date], |r| {
                    Ok(StoredRow {
                        record_id: r.get(0)?,
                        student_id: r.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let plan = roster::plan(existing, incoming.iter().copied());
        for record_id in &plan.deletes {
            tx.execute("DELETE FROM attendance_records WHERE id = ?", [record_id])
                .context("delete attendance_records")?;
        }
        for (record_id, is_present) in &plan.updates {
            tx.execute(
                "UPDATE attendance_records SET is_present = ? WHERE id = ?",
                params![is_present, record_id],
            )
            .context("update attendance_records")?;
        }
        for (student_id, is_present) in &plan.inserts {
            tx.execute(
                "INSERT INTO attendance_records(student_id, class_id, date, is_present)
                 VALUES(?, ?, ?, ?)",
                params![student_id, class_id, date, is_present],
            )
            .context("insert attendance_records")?;
        }
        tx.commit()?;

        let summary = plan.summary();
        tracing::debug!(
            "attendance class={} date={} updated={} inserted={} deleted={}",
            class_id,
            date,
            summary.updated,
            summary.inserted,
            summary.deleted
        );
        Ok(summary)
    }

    fn get_grade_records(
        &self,
        class_id: i64,
        assessment: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<GradeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, student_id, class_id, assessment, date_recorded, score, max_score, comments
             FROM grade_records
             WHERE class_id = ? AND assessment = ? AND date_recorded = ?
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![class_id, assessment, date], map_grade)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn replace_grade_records(
        &self,
        class_id: i64,
        assessment: &str,
        date: NaiveDate,
        max_score: Option<f64>,
        incoming: &[GradeSubmission],
    ) -> anyhow::Result<ReconcileSummary> {
        let tx = self.conn.unchecked_transaction()?;
        let existing = {
            let mut stmt = tx.prepare(
                "SELECT id, student_id
                 FROM grade_records
                 WHERE class_id = ? AND assessment = ? AND date_recorded = ?
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![class_id, assessment, date], |r| {
                    Ok(StoredRow {
                        record_id: r.get(0)?,
                        student_id: r.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        // Grades are only kept for students currently enrolled in the class.
        let enrolled: HashSet<i64> = {
            let mut stmt = tx.prepare(
                "SELECT e.student_id
                 FROM enrollments e
                 JOIN students s ON s.id = e.student_id
                 WHERE e.class_id = ?",
            )?;
            let ids = stmt
                .query_map([class_id], |r| r.get(0))?
                .collect::<Result<HashSet<_>, _>>()?;
            ids
        };

        let plan = roster::plan(
            existing,
            incoming
                .iter()
                .filter(|entry| enrolled.contains(&entry.student_id))
                .map(|entry| (entry.student_id, entry.value())),
        );
        for record_id in &plan.deletes {
            tx.execute("DELETE FROM grade_records WHERE id = ?", [record_id])
                .context("delete grade_records")?;
        }
        for (record_id, value) in &plan.updates {
            tx.execute(
                "UPDATE grade_records
                 SET score = ?, max_score = ?, comments = ?
                 WHERE id = ?",
                params![value.score, max_score, value.comment, record_id],
            )
            .context("update grade_records")?;
        }
        for (student_id, value) in &plan.inserts {
            tx.execute(
                "INSERT INTO grade_records(student_id, class_id, assessment, date_recorded, score, max_score, comments)
                 VALUES(?, ?, ?, ?, ?, ?, ?)",
                params![
                    student_id,
                    class_id,
                    assessment,
                    date,
                    value.score,
                    max_score,
                    value.comment
                ],
            )
            .context("insert grade_records")?;
        }
        tx.commit()?;

        let summary = plan.summary();
        tracing::debug!(
            "grades class={} assessment={:?} date={} updated={} inserted={} deleted={}",
            class_id,
            assessment,
            date,
            summary.updated,
            summary.inserted,
            summary.deleted
        );
        Ok(summary)
    }

    fn get_recent_grades(&self, teacher_id: i64, take: usize) -> anyhow::Result<Vec<RecentGrade>> {
        let mut stmt = self.conn.prepare(
            "SELECT g.id, g.student_id, g.class_id, g.assessment, g.date_recorded,
                    g.score, g.max_score, g.comments,
                    s.first_name, s.last_name, c.name
             FROM grade_records g
             JOIN students s ON s.id = g.student_id
             JOIN classes c ON c.id = g.class_id
             WHERE c.teacher_id = ?
             ORDER BY g.date_recorded DESC, g.id DESC
             LIMIT ?",
        )?;
        let rows = stmt
            .query_map(params![teacher_id, take as i64], |r| {
                let first: String = r.get(8)?;
                let last: String = r.get(9)?;
                Ok(RecentGrade {
                    record: map_grade(r)?,
                    student_name: format!("{} {}", first, last).trim().to_string(),
                    class_name: r.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_events_for_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> anyhow::Result<Vec<EventItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, location, time, day, month, year, user_id
             FROM events
             WHERE user_id = ? AND year = ? AND month = ?
             ORDER BY day, time, rowid",
        )?;
        let rows = stmt
            .query_map(params![user_id, year, month], map_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_events_for_user(&self, user_id: i64) -> anyhow::Result<Vec<EventItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, location, time, day, month, year, user_id
             FROM events
             WHERE user_id = ?
             ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([user_id], map_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_event(&self, id: &str, user_id: i64) -> anyhow::Result<Option<EventItem>> {
        let event = self
            .conn
            .query_row(
                "SELECT id, title, description, location, time, day, month, year, user_id
                 FROM events
                 WHERE id = ? AND user_id = ?",
                params![id, user_id],
                map_event,
            )
            .optional()?;
        Ok(event)
    }

    fn add_event(&self, item: &EventItem) -> anyhow::Result<()> {
        self.conn
            .execute(
                "INSERT INTO events(id, title, description, location, time, day, month, year, user_id)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    item.id,
                    item.title,
                    item.description,
                    item.location,
                    item.time,
                    item.day,
                    item.month,
                    item.year,
                    item.user_id
                ],
            )
            .context("insert events")?;
        tracing::debug!("created event {} for user {}", item.id, item.user_id);
        Ok(())
    }

    fn update_event(&self, item: &EventItem) -> anyhow::Result<()> {
        self.conn
            .execute(
                "UPDATE events
                 SET title = ?, description = ?, location = ?, time = ?,
                     day = ?, month = ?, year = ?
                 WHERE id = ? AND user_id = ?",
                params![
                    item.title,
                    item.description,
                    item.location,
                    item.time,
                    item.day,
                    item.month,
                    item.year,
                    item.id,
                    item.user_id
                ],
            )
            .context("update events")?;
        Ok(())
    }

    fn delete_event(&self, id: &str, user_id: i64) -> anyhow::Result<()> {
        self.conn
            .execute(
                "DELETE FROM events WHERE id = ? AND user_id = ?",
                params![id, user_id],
            )
            .context("delete events")?;
        Ok(())
    }

    fn get_announcements(&self, take: Option<usize>) -> anyhow::Result<Vec<Announcement>> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = take.map(|t| t as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            "SELECT id, title, body, created_at, created_by_user_id
             FROM announcements
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?",
        )?;
        let rows = stmt
            .query_map([limit], map_announcement)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_announcement(&self, id: &str) -> anyhow::Result<Option<Announcement>> {
        let announcement = self
            .conn
            .query_row(
                "SELECT id, title, body, created_at, created_by_user_id
                 FROM announcements
                 WHERE id = ?",
                [id],
                map_announcement,
            )
            .optional()?;
        Ok(announcement)
    }

    fn add_announcement(&self, announcement: &Announcement) -> anyhow::Result<()> {
        self.conn
            .execute(
                "INSERT INTO announcements(id, title, body, created_at, created_by_user_id)
                 VALUES(?, ?, ?, ?, ?)",
                params![
                    announcement.id,
                    announcement.title,
                    announcement.body,
                    announcement.created_at,
                    announcement.created_by_user_id
                ],
            )
            .context("insert announcements")?;
        Ok(())
    }

    fn delete_announcement(&self, id: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM announcements WHERE id = ?", [id])
            .context("delete announcements")?;
        Ok(())
    }
}
