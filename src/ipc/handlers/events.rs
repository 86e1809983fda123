use crate::calendar::{self, EventInput};
use crate::ipc::helpers::{
    get_optional_str, get_required_i64, get_required_str, get_take, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn event_input(params: &serde_json::Value) -> Result<EventInput, HandlerErr> {
    Ok(EventInput {
        title: get_optional_str(params, "title")?.unwrap_or_default(),
        description: get_optional_str(params, "description")?,
        location: get_optional_str(params, "location")?,
        time: get_optional_str(params, "time")?,
    })
}

fn get_i32(params: &serde_json::Value, key: &str) -> Result<i32, HandlerErr> {
    let v = get_required_i64(params, key)?;
    i32::try_from(v).map_err(|_| HandlerErr::bad_params(format!("{} is out of range", key)))
}

fn events_upcoming(
    store: &dyn Store,
    default_take: usize,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let user_id = get_required_i64(params, "userId")?;
    let take = get_take(params, default_take)?;
    let events = calendar::upcoming_events(store, user_id, take)?;
    Ok(json!({ "events": events }))
}

fn events_create(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let user_id = get_required_i64(params, "userId")?;
    let input = event_input(params)?;
    let day = get_i32(params, "day")?;
    let month = get_i32(params, "month")?;
    let year = get_i32(params, "year")?;
    let event = calendar::create_event(store, user_id, &input, day, month, year)?;
    Ok(json!({ "event": event }))
}

fn events_update(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let user_id = get_required_i64(params, "userId")?;
    let id = get_required_str(params, "id")?;
    let input = event_input(params)?;
    let event = calendar::update_event_details(store, user_id, &id, &input)?;
    Ok(json!({ "event": event }))
}

fn events_delete(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let user_id = get_required_i64(params, "userId")?;
    let id = get_required_str(params, "id")?;
    calendar::delete_event_for_user(store, user_id, &id)?;
    Ok(json!({ "deleted": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let default_take = state.config.upcoming_take;
    match req.method.as_str() {
        "events.upcoming" => Some(with_store(state, req, |s, p| {
            events_upcoming(s, default_take, p)
        })),
        "events.create" => Some(with_store(state, req, |s, p| events_create(s, p))),
        "events.update" => Some(with_store(state, req, |s, p| events_update(s, p))),
        "events.delete" => Some(with_store(state, req, |s, p| events_delete(s, p))),
        _ => None,
    }
}
