//! Month grids, per-day event views and the upcoming-events feed, plus the
//! owner-scoped event edits that feed them.

use crate::error::{LogicError, LogicResult};
use crate::model::{trimmed_or_none, EventItem};
use crate::store::Store;
use chrono::{Datelike, Local, Month, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarData {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub days: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub calendar: CalendarData,
    pub selected_day: u32,
    pub month_events: Vec<EventItem>,
    pub selected_day_events: Vec<EventItem>,
}

/// Caller-supplied event fields. Blank optional fields are stored as absent.
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => 31,
    }
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

/// Out-of-range months are clamped into 1..=12 rather than rejected.
pub fn build_month(year: i32, month: i32) -> CalendarData {
    let month = month.clamp(1, 12) as u32;
    CalendarData {
        year,
        month,
        month_name: month_name(month),
        days: (1..=days_in_month(year, month)).collect(),
    }
}

pub fn build_current_month() -> CalendarData {
    let today = Local::now().date_naive();
    build_month(today.year(), today.month() as i32)
}

/// Loads a user's events for the month and picks out those on the selected
/// day (clamped into the month), ordered by time with untimed events first.
pub fn build_calendar_view(
    store: &dyn Store,
    user_id: i64,
    year: i32,
    month: i32,
    selected_day: i32,
) -> LogicResult<CalendarView> {
    let calendar = build_month(year, month);
    let month_events = store.get_events_for_month(user_id, calendar.year, calendar.month)?;

    let last_day = calendar.days.len() as i32;
    let selected_day = selected_day.clamp(1, last_day);
    let mut selected_day_events: Vec<EventItem> = month_events
        .iter()
        .filter(|e| e.day == selected_day)
        .cloned()
        .collect();
    selected_day_events.sort_by(|a, b| a.time.cmp(&b.time));

    Ok(CalendarView {
        calendar,
        selected_day: selected_day as u32,
        month_events,
        selected_day_events,
    })
}

pub fn build_current_calendar_view(
    store: &dyn Store,
    user_id: i64,
    selected_day: i32,
) -> LogicResult<CalendarView> {
    let today = Local::now().date_naive();
    build_calendar_view(
        store,
        user_id,
        today.year(),
        today.month() as i32,
        selected_day,
    )
}

fn event_date(item: &EventItem) -> Option<NaiveDate> {
    let month = u32::try_from(item.month).ok()?;
    let day = u32::try_from(item.day).ok()?;
    NaiveDate::from_ymd_opt(item.year, month, day)
}

/// The user's events in date order, then time order, at most `take` of them.
/// Events whose day/month/year do not form a real date are skipped.
pub fn upcoming_events(
    store: &dyn Store,
    user_id: i64,
    take: usize,
) -> LogicResult<Vec<EventItem>> {
    let mut dated: Vec<(NaiveDate, EventItem)> = store
        .get_events_for_user(user_id)?
        .into_iter()
        .filter_map(|e| event_date(&e).map(|d| (d, e)))
        .collect();
    dated.sort_by(|(da, a), (db, b)| da.cmp(db).then_with(|| a.time.cmp(&b.time)));
    Ok(dated.into_iter().take(take).map(|(_, e)| e).collect())
}

fn required_title(title: &str) -> LogicResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LogicError::validation("Event title is required."));
    }
    Ok(title.to_string())
}

/// Day, month and year are stored as given; an impossible date simply never
/// shows up in the upcoming feed.
pub fn create_event(
    store: &dyn Store,
    user_id: i64,
    input: &EventInput,
    day: i32,
    month: i32,
    year: i32,
) -> LogicResult<EventItem> {
    let item = EventItem {
        id: uuid::Uuid::new_v4().to_string(),
        title: required_title(&input.title)?,
        description: trimmed_or_none(input.description.as_deref()),
        location: trimmed_or_none(input.location.as_deref()),
        time: trimmed_or_none(input.time.as_deref()),
        day,
        month,
        year,
        user_id,
    };
    store.add_event(&item)?;
    Ok(item)
}

/// Replaces the text fields of an event the user owns. The date is fixed.
pub fn update_event_details(
    store: &dyn Store,
    user_id: i64,
    id: &str,
    input: &EventInput,
) -> LogicResult<EventItem> {
    let mut item = store
        .get_event(id, user_id)?
        .ok_or_else(|| LogicError::not_found("Event not found."))?;
    item.title = required_title(&input.title)?;
    item.description = trimmed_or_none(input.description.as_deref());
    item.location = trimmed_or_none(input.location.as_deref());
    item.time = trimmed_or_none(input.time.as_deref());
    store.update_event(&item)?;
    Ok(item)
}

pub fn delete_event_for_user(store: &dyn Store, user_id: i64, id: &str) -> LogicResult<()> {
    if store.get_event(id, user_id)?.is_none() {
        return Err(LogicError::not_found("Event not found."));
    }
    store.delete_event(id, user_id)?;
    Ok(())
}
