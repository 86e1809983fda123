mod common;

use common::Sidecar;
use serde_json::json;

fn create_event(sidecar: &mut Sidecar, user_id: i64, title: &str, day: i64, month: i64, year: i64, time: Option<&str>) -> String {
    let res = sidecar.request_ok(
        "events.create",
        json!({
            "userId": user_id,
            "title": title,
            "time": time,
            "day": day,
            "month": month,
            "year": year
        }),
    );
    res["event"]["id"].as_str().expect("event id").to_string()
}

fn titles(list: &serde_json::Value) -> Vec<String> {
    list.as_array()
        .expect("events")
        .iter()
        .map(|e| e["title"].as_str().unwrap_or("").to_string())
        .collect()
}

#[test]
fn month_and_day_views() {
    let (mut sidecar, workspace) = Sidecar::with_workspace("schoold-calendar-view");
    create_event(&mut sidecar, 1, "Lunch duty", 3, 5, 2025, Some("12:00"));
    create_event(&mut sidecar, 1, "Assembly", 3, 5, 2025, Some("08:45"));
    create_event(&mut sidecar, 1, "Staff meeting", 4, 5, 2025, Some("15:30"));
    create_event(&mut sidecar, 2, "Not mine", 3, 5, 2025, None);

    let res = sidecar.request_ok(
        "calendar.view",
        json!({ "userId": 1, "year": 2025, "month": 5, "selectedDay": 3 }),
    );
    let view = &res["view"];
    assert_eq!(view["calendar"]["monthName"], json!("May"));
    assert_eq!(view["calendar"]["days"].as_array().map(|d| d.len()), Some(31));
    assert_eq!(titles(&view["selectedDayEvents"]), vec!["Assembly", "Lunch duty"]);
    assert_eq!(
        titles(&view["monthEvents"]),
        vec!["Assembly", "Lunch duty", "Staff meeting"]
    );

    let clamped = sidecar.request_ok(
        "calendar.view",
        json!({ "userId": 1, "year": 2025, "month": 13, "selectedDay": 40 }),
    );
    assert_eq!(clamped["view"]["calendar"]["month"], json!(12));
    assert_eq!(clamped["view"]["selectedDay"], json!(31));

    let feb = sidecar.request_ok("calendar.month", json!({ "year": 2023, "month": 2 }));
    let days = feb["calendar"]["days"].as_array().expect("days");
    assert_eq!(days.len(), 28);
    assert_eq!(days.first(), Some(&json!(1)));
    assert_eq!(days.last(), Some(&json!(28)));

    drop(sidecar);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn upcoming_skips_impossible_dates() {
    let (mut sidecar, workspace) = Sidecar::with_workspace("schoold-calendar-upcoming");
    create_event(&mut sidecar, 1, "Phantom", 31, 9, 2025, None);
    create_event(&mut sidecar, 1, "Later", 2, 10, 2025, None);
    create_event(&mut sidecar, 1, "Afternoon", 1, 10, 2025, Some("14:00"));
    create_event(&mut sidecar, 1, "Morning", 1, 10, 2025, Some("09:00"));

    let res = sidecar.request_ok("events.upcoming", json!({ "userId": 1 }));
    assert_eq!(titles(&res["events"]), vec!["Morning", "Afternoon", "Later"]);

    let res = sidecar.request_ok("events.upcoming", json!({ "userId": 1, "take": 1 }));
    assert_eq!(titles(&res["events"]), vec!["Morning"]);

    drop(sidecar);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn edits_are_owner_scoped() {
    let (mut sidecar, workspace) = Sidecar::with_workspace("schoold-calendar-edit");
    let (code, message) = sidecar.request_err(
        "events.create",
        json!({ "userId": 1, "title": "  ", "day": 1, "month": 1, "year": 2025 }),
    );
    assert_eq!(code, "validation_failed");
    assert_eq!(message, "Event title is required.");

    let id = create_event(&mut sidecar, 1, "Trip", 10, 6, 2025, None);

    let (code, message) = sidecar.request_err(
        "events.update",
        json!({ "userId": 2, "id": id, "title": "Hijack" }),
    );
    assert_eq!(code, "not_found");
    assert_eq!(message, "Event not found.");

    let updated = sidecar.request_ok(
        "events.update",
        json!({ "userId": 1, "id": id, "title": " Museum trip ", "location": " Museum ", "time": "09:15" }),
    );
    assert_eq!(updated["event"]["title"], json!("Museum trip"));
    assert_eq!(updated["event"]["location"], json!("Museum"));
    assert_eq!(updated["event"]["day"], json!(10));

    let (code, _) = sidecar.request_err("events.delete", json!({ "userId": 2, "id": id }));
    assert_eq!(code, "not_found");
    let deleted = sidecar.request_ok("events.delete", json!({ "userId": 1, "id": id }));
    assert_eq!(deleted["deleted"], json!(true));
    let res = sidecar.request_ok("events.upcoming", json!({ "userId": 1 }));
    assert_eq!(res["events"], json!([]));

    drop(sidecar);
    let _ = std::fs::remove_dir_all(workspace);
}
