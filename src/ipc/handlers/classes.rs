use crate::ipc::helpers::{
    get_optional_i64, get_optional_str, get_required_i64, get_required_str, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::membership;
use crate::store::Store;
use serde_json::json;

fn classes_list(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_optional_i64(params, "teacherId")?;
    let classes = membership::list_classes(store, teacher_id)?;
    Ok(json!({ "classes": classes }))
}

fn classes_list_for_user(
    store: &dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let user_id = get_required_i64(params, "userId")?;
    let classes = membership::classes_for_user_or_fallback(store, user_id)?;
    Ok(json!({ "classes": classes }))
}

fn classes_create(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_i64(params, "teacherId")?;
    let name = get_required_str(params, "name")?;
    let room = get_optional_str(params, "room")?;
    let description = get_optional_str(params, "description")?;
    let class = membership::create_class(
        store,
        teacher_id,
        &name,
        room.as_deref(),
        description.as_deref(),
    )?;
    Ok(json!({ "class": class }))
}

fn class_overlay(store: &dyn Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_i64(params, "classId")?;
    let teacher_id = get_optional_i64(params, "teacherId")?;
    let overlay = membership::load_overlay(store, class_id, teacher_id)?;
    Ok(json!({ "overlay": overlay }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(with_store(state, req, |s, p| classes_list(s, p))),
        "classes.listForUser" => Some(with_store(state, req, |s, p| classes_list_for_user(s, p))),
        "classes.create" => Some(with_store(state, req, |s, p| classes_create(s, p))),
        "class.overlay" => Some(with_store(state, req, |s, p| class_overlay(s, p))),
        _ => None,
    }
}
