use crate::dashboard;
use crate::ipc::helpers::{
    get_day_or_today, get_optional_f64, get_optional_str, get_required_array, get_required_i64,
    get_required_str, get_take, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::sheet;
use crate::store::{GradeSubmission, Store};
use serde_json::json;

fn parse_grade_entries(params: &serde_json::Value) -> Result<Vec<GradeSubmission>, HandlerErr> {
    let rows = get_required_array(params, "entries")?;
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if !row.is_object() {
            return Err(HandlerErr::bad_params(format!("entries[{}] must be an object", i)));
        }
        out.push(GradeSubmission {
            student_id: get_required_i64(row, "studentId")?,
            score: get_optional_f64(row, "score")?,
            comment: get_optional_str(row, "comment")?,
        });
    }
    Ok(out)
}

fn grades_open(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_i64(params, "classId")?;
    let assessment = get_required_str(params, "assessment")?;
    let date = get_day_or_today(params)?;
    let sheet = sheet::build_grade_sheet(store, class_id, &assessment, date)?;
    Ok(json!({ "sheet": sheet }))
}

fn grades_save(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_i64(params, "classId")?;
    let assessment = get_required_str(params, "assessment")?;
    let date = get_day_or_today(params)?;
    let max_score = get_optional_f64(params, "maxScore")?;
    let entries = parse_grade_entries(params)?;
    let saved = sheet::save_grades(store, class_id, &assessment, date, max_score, &entries)?;
    Ok(json!({ "summary": saved.summary, "sheet": saved.sheet }))
}

fn grades_recent(
    store: &dyn Store,
    default_take: usize,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_i64(params, "teacherId")?;
    let take = get_take(params, default_take)?;
    let grades = dashboard::recent_grades(store, teacher_id, take)?;
    Ok(json!({ "grades": grades }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let default_take = state.config.recent_grades_take;
    match req.method.as_str() {
        "grades.open" => Some(with_store(state, req, |s, p| grades_open(s, p))),
        "grades.save" => Some(with_store(state, req, |s, p| grades_save(s, p))),
        "grades.recent" => Some(with_store(state, req, |s, p| {
            grades_recent(s, default_take, p)
        })),
        _ => None,
    }
}
