use crate::error::LogicError;
use crate::ipc::helpers::{
    get_optional_i64, get_optional_str, get_required_i64, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::membership;
use crate::sheet::sort_students;
use crate::store::Store;
use serde_json::json;

fn students_list(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_i64(params, "classId")?;
    if store
        .get_class_name(class_id)
        .map_err(LogicError::from)?
        .is_none()
    {
        return Err(LogicError::not_found("Class not found.").into());
    }
    let mut students = store
        .get_students_for_class(class_id)
        .map_err(LogicError::from)?;
    sort_students(&mut students);
    Ok(json!({ "students": students }))
}

fn students_add(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_i64(params, "classId")?;
    let first_name = get_optional_str(params, "firstName")?.unwrap_or_default();
    let last_name = get_optional_str(params, "lastName")?.unwrap_or_default();
    let email = get_optional_str(params, "email")?;
    let teacher_id = get_optional_i64(params, "teacherId")?;
    let result = membership::add_student_to_class(
        store,
        teacher_id,
        class_id,
        &first_name,
        &last_name,
        email.as_deref(),
    )?;
    Ok(json!({
        "message": result.message,
        "alreadyEnrolled": result.already_enrolled,
        "overlay": result.overlay,
    }))
}

fn students_remove(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_i64(params, "teacherId")?;
    let enrollment_id = get_required_i64(params, "enrollmentId")?;
    let result = membership::remove_student_from_class(store, teacher_id, enrollment_id)?;
    Ok(json!({
        "message": result.message,
        "overlay": result.overlay,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_store(state, req, |s, p| students_list(s, p))),
        "students.add" => Some(with_store(state, req, |s, p| students_add(s, p))),
        "students.remove" => Some(with_store(state, req, |s, p| students_remove(s, p))),
        _ => None,
    }
}

