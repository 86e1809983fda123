use crate::calendar;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_i64, get_required_i64, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use chrono::{Datelike, Local};
use serde_json::json;

fn get_i32_or(params: &serde_json::Value, key: &str, default: i32) -> Result<i32, HandlerErr> {
    match get_optional_i64(params, key)? {
        None => Ok(default),
        Some(v) => i32::try_from(v)
            .map_err(|_| HandlerErr::bad_params(format!("{} is out of range", key))),
    }
}

fn calendar_month(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let year = get_optional_i64(params, "year")?;
    let month = get_optional_i64(params, "month")?;
    if year.is_none() && month.is_none() {
        return Ok(json!({ "calendar": calendar::build_current_month() }));
    }
    let today = Local::now().date_naive();
    let year = get_i32_or(params, "year", today.year())?;
    let month = get_i32_or(params, "month", today.month() as i32)?;
    Ok(json!({ "calendar": calendar::build_month(year, month) }))
}

fn calendar_view(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let today = Local::now().date_naive();
    let user_id = get_required_i64(params, "userId")?;
    let selected_day = get_i32_or(params, "selectedDay", today.day() as i32)?;
    let view = if get_optional_i64(params, "year")?.is_none()
        && get_optional_i64(params, "month")?.is_none()
    {
        calendar::build_current_calendar_view(store, user_id, selected_day)?
    } else {
        let year = get_i32_or(params, "year", today.year())?;
        let month = get_i32_or(params, "month", today.month() as i32)?;
        calendar::build_calendar_view(store, user_id, year, month, selected_day)?
    };
    Ok(json!({ "view": view }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "calendar.month" => Some(match calendar_month(&req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        "calendar.view" => Some(with_store(state, req, |s, p| calendar_view(s, p))),
        _ => None,
    }
}
