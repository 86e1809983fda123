use crate::error::{LogicError, LogicResult};
use crate::model::{trimmed_or_none, Announcement};
use crate::store::Store;
use chrono::Utc;

pub fn create_announcement(
    store: &dyn Store,
    created_by_user_id: i64,
    title: &str,
    body: Option<&str>,
) -> LogicResult<Announcement> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LogicError::validation("Announcement title is required."));
    }
    let announcement = Announcement {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        body: trimmed_or_none(body),
        created_at: Utc::now(),
        created_by_user_id,
    };
    store.add_announcement(&announcement)?;
    Ok(announcement)
}

pub fn delete_announcement(store: &dyn Store, id: &str) -> LogicResult<()> {
    let id = id.trim();
    if id.is_empty() || store.get_announcement(id)?.is_none() {
        return Err(LogicError::not_found("Announcement not found."));
    }
    store.delete_announcement(id)?;
    Ok(())
}

/// Newest first. `take = None` returns everything.
pub fn list_announcements(store: &dyn Store, take: Option<usize>) -> LogicResult<Vec<Announcement>> {
    Ok(store.get_announcements(take)?)
}
