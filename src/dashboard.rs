use crate::announcements::list_announcements;
use crate::calendar::upcoming_events;
use crate::config::Config;
use crate::error::LogicResult;
use crate::model::{Announcement, EventItem, RecentGrade};
use crate::store::Store;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub class_count: usize,
    pub student_count: usize,
    pub upcoming_events: Vec<EventItem>,
    pub recent_grades: Vec<RecentGrade>,
    pub announcements: Vec<Announcement>,
}

pub fn recent_grades(store: &dyn Store, teacher_id: i64, take: usize) -> LogicResult<Vec<RecentGrade>> {
    Ok(store.get_recent_grades(teacher_id, take)?)
}

pub fn build_dashboard(store: &dyn Store, config: &Config, teacher_id: i64) -> LogicResult<Dashboard> {
    Ok(Dashboard {
        class_count: store.get_class_count(teacher_id)?,
        student_count: store.get_distinct_student_count(teacher_id)?,
        upcoming_events: upcoming_events(store, teacher_id, config.upcoming_take)?,
        recent_grades: recent_grades(store, teacher_id, config.recent_grades_take)?,
        announcements: list_announcements(store, Some(config.announcements_take))?,
    })
}
