use crate::ipc::helpers::{
    get_day_or_today, get_optional_bool, get_required_array, get_required_i64, with_store,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::sheet;
use crate::store::Store;
use serde_json::json;

/// `[{studentId, isPresent?}]`; an unset `isPresent` is an unchecked box.
fn parse_attendance_rows(params: &serde_json::Value) -> Result<Vec<(i64, bool)>, HandlerErr> {
    let rows = get_required_array(params, "students")?;
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if !row.is_object() {
            return Err(HandlerErr::bad_params(format!("students[{}] must be an object", i)));
        }
        let student_id = get_required_i64(row, "studentId")?;
        let is_present = get_optional_bool(row, "isPresent")?.unwrap_or(false);
        out.push((student_id, is_present));
    }
    Ok(out)
}

fn attendance_open(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_i64(params, "classId")?;
    let date = get_day_or_today(params)?;
    let roster = sheet::build_attendance_roster(store, class_id, date)?;
    Ok(json!({ "roster": roster }))
}

fn attendance_save(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_i64(params, "classId")?;
    let date = get_day_or_today(params)?;
    let rows = parse_attendance_rows(params)?;
    let saved = sheet::save_attendance(store, class_id, date, &rows)?;
    Ok(json!({ "summary": saved.summary, "roster": saved.roster }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.open" => Some(with_store(state, req, |s, p| attendance_open(s, p))),
        "attendance.save" => Some(with_store(state, req, |s, p| attendance_save(s, p))),
        _ => None,
    }
}
