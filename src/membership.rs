//! Classes and their rosters: creation, listing, the class overlay and the
//! enroll/un-enroll workflows.

use crate::error::{LogicError, LogicResult};
use crate::model::{trimmed_or_none, NewClass, SchoolClass, Student};
use crate::store::Store;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayEntry {
    pub enrollment_id: i64,
    pub student: Student,
}

/// A class with its resolvable enrollments in `(last, first)` byte order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOverlay {
    pub class: SchoolClass,
    pub enrollments: Vec<OverlayEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResult {
    pub message: String,
    pub already_enrolled: bool,
    pub overlay: ClassOverlay,
}

pub fn create_class(
    store: &dyn Store,
    teacher_id: i64,
    name: &str,
    room: Option<&str>,
    description: Option<&str>,
) -> LogicResult<SchoolClass> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LogicError::validation("Class name is required."));
    }
    let created = store.add_class(&NewClass {
        name: name.to_string(),
        room: trimmed_or_none(room),
        description: trimmed_or_none(description),
        teacher_id,
    })?;
    Ok(created)
}

/// `teacher_id = None` lists every class.
pub fn list_classes(store: &dyn Store, teacher_id: Option<i64>) -> LogicResult<Vec<SchoolClass>> {
    let classes = match teacher_id {
        Some(teacher_id) => store.get_classes_for_teacher(teacher_id)?,
        None => store.get_all_classes()?,
    };
    Ok(classes)
}

/// The user's own classes, or all classes when they own none.
pub fn classes_for_user_or_fallback(
    store: &dyn Store,
    user_id: i64,
) -> LogicResult<Vec<SchoolClass>> {
    let own = store.get_classes_for_teacher(user_id)?;
    if !own.is_empty() {
        return Ok(own);
    }
    Ok(store.get_all_classes()?)
}

/// Loads a class and its roster. With `teacher_id` set, a class owned by
/// someone else is reported exactly like a missing one.
pub fn load_overlay(
    store: &dyn Store,
    class_id: i64,
    teacher_id: Option<i64>,
) -> LogicResult<ClassOverlay> {
    let loaded = store
        .get_class_with_enrollments(class_id, teacher_id)?
        .ok_or_else(|| LogicError::not_found("Unable to load the requested class."))?;

    let mut enrollments: Vec<OverlayEntry> = loaded
        .enrollments
        .into_iter()
        .filter_map(|e| {
            e.student.map(|student| OverlayEntry {
                enrollment_id: e.id,
                student,
            })
        })
        .collect();
    enrollments.sort_by(|a, b| {
        a.student
            .last_name
            .cmp(&b.student.last_name)
            .then_with(|| a.student.first_name.cmp(&b.student.first_name))
    });

    Ok(ClassOverlay {
        class: loaded.class,
        enrollments,
    })
}

/// Enrolls a student, reusing an existing student with the same email when
/// one is given. Enrolling someone twice is reported through
/// `already_enrolled`, not as an error. `teacher_id = None` skips the
/// ownership check.
pub fn add_student_to_class(
    store: &dyn Store,
    teacher_id: Option<i64>,
    class_id: i64,
    first_name: &str,
    last_name: &str,
    email: Option<&str>,
) -> LogicResult<MembershipResult> {
    let overlay = match load_overlay(store, class_id, teacher_id) {
        Ok(overlay) => overlay,
        Err(LogicError::NotFound(_)) => return Err(LogicError::not_found("Class not found.")),
        Err(e) => return Err(e),
    };

    let (first_name, last_name) = (first_name.trim(), last_name.trim());
    if first_name.is_empty() || last_name.is_empty() {
        return Err(LogicError::validation(
            "Student first and last name are required.",
        ));
    }

    let email = trimmed_or_none(email);
    let existing = match email.as_deref() {
        Some(email) => store.get_student_by_email(email)?,
        None => None,
    };
    let student = match existing {
        Some(student) => student,
        None => store.add_student(first_name, last_name, email.as_deref())?,
    };

    let already_enrolled = store.enrollment_exists(student.id, class_id)?;
    if !already_enrolled {
        store.add_enrollment(student.id, class_id)?;
    }

    let message = if already_enrolled {
        format!("{} is already enrolled in this class.", student.full_name())
    } else {
        format!("{} added to {}.", student.full_name(), overlay.class.name)
    };
    tracing::debug!(
        "class {} membership: student {} already_enrolled={}",
        class_id,
        student.id,
        already_enrolled
    );

    let overlay = load_overlay(store, class_id, teacher_id)?;
    Ok(MembershipResult {
        message,
        already_enrolled,
        overlay,
    })
}

pub fn remove_student_from_class(
    store: &dyn Store,
    teacher_id: i64,
    enrollment_id: i64,
) -> LogicResult<MembershipResult> {
    let detail = store
        .get_enrollment_detail(enrollment_id, teacher_id)?
        .ok_or_else(|| LogicError::not_found("Enrollment not found."))?;
    store.remove_enrollment(detail.enrollment_id)?;

    let message = format!(
        "{} removed from {}.",
        detail.student.full_name(),
        detail.class.name
    );
    let overlay = load_overlay(store, detail.class.id, Some(teacher_id))?;
    Ok(MembershipResult {
        message,
        already_enrolled: false,
        overlay,
    })
}
