use crate::error::LogicError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::SqliteStore;
use chrono::{Local, NaiveDate};
use serde_json::Value;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<LogicError> for HandlerErr {
    fn from(e: LogicError) -> Self {
        HandlerErr {
            code: e.code(),
            message: e.to_string(),
            details: None,
        }
    }
}

/// Runs `f` against the open workspace and wraps its outcome in a response
/// envelope.
pub fn with_store<F>(state: &AppState, req: &Request, f: F) -> Value
where
    F: FnOnce(&SqliteStore<'_>, &Value) -> Result<Value, HandlerErr>,
{
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let store = SqliteStore::new(conn);
    match f(&store, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => {
            tracing::warn!("{} failed: {} ({})", req.method, e.message, e.code);
            e.response(&req.id)
        }
    }
}

fn is_absent(v: Option<&Value>) -> bool {
    matches!(v, None | Some(Value::Null))
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &Value, key: &str) -> Result<Option<String>, HandlerErr> {
    let v = params.get(key);
    if is_absent(v) {
        return Ok(None);
    }
    v.and_then(|v| v.as_str())
        .map(|s| Some(s.to_string()))
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key)))
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn get_required_i64(params: &Value, key: &str) -> Result<i64, HandlerErr> {
    let Some(v) = params.get(key).filter(|v| !v.is_null()) else {
        return Err(HandlerErr::bad_params(format!("missing {}", key)));
    };
    as_i64(v).ok_or_else(|| HandlerErr::bad_params(format!("{} must be an integer", key)))
}

pub fn get_optional_i64(params: &Value, key: &str) -> Result<Option<i64>, HandlerErr> {
    if is_absent(params.get(key)) {
        return Ok(None);
    }
    get_required_i64(params, key).map(Some)
}

/// Accepts a number, a numeric string, or blank/null for "no value".
pub fn get_optional_f64(params: &Value, key: &str) -> Result<Option<f64>, HandlerErr> {
    let bad = || HandlerErr::bad_params(format!("{} must be a number", key));
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(bad),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| bad()),
        Some(_) => Err(bad()),
    }
}

pub fn get_optional_bool(params: &Value, key: &str) -> Result<Option<bool>, HandlerErr> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(HandlerErr::bad_params(format!("{} must be a boolean", key))),
    }
}

/// `take` when present; negative values are rejected.
pub fn get_optional_take(params: &Value) -> Result<Option<usize>, HandlerErr> {
    match get_optional_i64(params, "take")? {
        None => Ok(None),
        Some(n) if n >= 0 => Ok(Some(n as usize)),
        Some(_) => Err(HandlerErr::bad_params("take must not be negative")),
    }
}

pub fn get_take(params: &Value, default: usize) -> Result<usize, HandlerErr> {
    Ok(get_optional_take(params)?.unwrap_or(default))
}

pub fn get_required_array<'a>(params: &'a Value, key: &str) -> Result<&'a Vec<Value>, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Parses `YYYY-MM-DD`, also accepting a timestamp whose first ten
/// characters are the day (`2024-09-03T08:15:00`).
pub fn parse_day(raw: &str) -> Result<NaiveDate, HandlerErr> {
    let t = raw.trim();
    let day = match t.get(..10) {
        Some(head) if t.len() == 10 || t[10..].starts_with(['T', ' ']) => head,
        _ => t,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| HandlerErr::bad_params(format!("invalid date: {}", raw)))
}

/// `params.date`, defaulting to today.
pub fn get_day_or_today(params: &Value) -> Result<NaiveDate, HandlerErr> {
    match get_optional_str(params, "date")? {
        Some(raw) if !raw.trim().is_empty() => parse_day(&raw),
        _ => Ok(Local::now().date_naive()),
    }
}
