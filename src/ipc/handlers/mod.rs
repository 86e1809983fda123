pub mod announcements;
pub mod attendance;
pub mod calendar;
pub mod classes;
pub mod core;
pub mod dashboard;
pub mod events;
pub mod grades;
pub mod students;
