use crate::announcements;
use crate::ipc::helpers::{
    get_optional_str, get_optional_take, get_required_i64, get_required_str, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn announcements_list(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let take = get_optional_take(params)?;
    let list = announcements::list_announcements(store, take)?;
    Ok(json!({ "announcements": list }))
}

fn announcements_create(
    store: &dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let user_id = get_required_i64(params, "userId")?;
    let title = get_optional_str(params, "title")?.unwrap_or_default();
    let body = get_optional_str(params, "body")?;
    let announcement = announcements::create_announcement(store, user_id, &title, body.as_deref())?;
    Ok(json!({ "announcement": announcement }))
}

fn announcements_delete(
    store: &dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    announcements::delete_announcement(store, &id)?;
    Ok(json!({ "deleted": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "announcements.list" => Some(with_store(state, req, |s, p| announcements_list(s, p))),
        "announcements.create" => Some(with_store(state, req, |s, p| announcements_create(s, p))),
        "announcements.delete" => Some(with_store(state, req, |s, p| announcements_delete(s, p))),
        _ => None,
    }
}
