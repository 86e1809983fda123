//! Runtime configuration, read once from the environment at start-up.

use std::path::PathBuf;

pub const DEFAULT_UPCOMING_TAKE: usize = 5;
pub const DEFAULT_RECENT_GRADES_TAKE: usize = 10;
pub const DEFAULT_ANNOUNCEMENTS_TAKE: usize = 5;

/// Filter used when `SCHOOLD_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "schoold=info";

#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace opened before the first request is read.
    pub workspace: Option<PathBuf>,
    pub upcoming_take: usize,
    pub recent_grades_take: usize,
    pub announcements_take: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            upcoming_take: DEFAULT_UPCOMING_TAKE,
            recent_grades_take: DEFAULT_RECENT_GRADES_TAKE,
            announcements_take: DEFAULT_ANNOUNCEMENTS_TAKE,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let workspace = lookup("SCHOOLD_WORKSPACE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        Self {
            workspace,
            upcoming_take: take_setting(&lookup, "SCHOOLD_UPCOMING_TAKE", DEFAULT_UPCOMING_TAKE),
            recent_grades_take: take_setting(
                &lookup,
                "SCHOOLD_RECENT_GRADES_TAKE",
                DEFAULT_RECENT_GRADES_TAKE,
            ),
            announcements_take: take_setting(
                &lookup,
                "SCHOOLD_ANNOUNCEMENTS_TAKE",
                DEFAULT_ANNOUNCEMENTS_TAKE,
            ),
        }
    }
}

fn take_setting<F>(lookup: &F, key: &str, default: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<usize>() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!("ignoring {}={:?}; using default {}", key, raw, default);
            default
        }
    }
}
