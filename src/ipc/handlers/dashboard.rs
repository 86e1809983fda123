use crate::config::Config;
use crate::dashboard;
use crate::ipc::helpers::{get_required_i64, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn dashboard_open(
    store: &dyn Store,
    config: &Config,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_i64(params, "teacherId")?;
    let dash = dashboard::build_dashboard(store, config, teacher_id)?;
    Ok(json!(dash))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.open" => {
            let config = state.config.clone();
            Some(with_store(state, req, |s, p| dashboard_open(s, &config, p)))
        }
        _ => None,
    }
}
